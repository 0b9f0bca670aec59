//! Business logic services

pub mod authors;
pub mod books;
pub mod media;
pub mod users;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub authors: authors::AuthorsService,
    pub books: books::BooksService,
    pub users: users::UsersService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let media = media::MediaStorage::new(&config.media);
        Self {
            authors: authors::AuthorsService::new(repository.clone(), media.clone()),
            books: books::BooksService::new(repository.clone(), media),
            users: users::UsersService::new(repository.clone(), config.auth.clone()),
            repository,
        }
    }
}
