//! Author use cases

use std::collections::HashMap;

use validator::Validate;

use super::media::MediaStorage;
use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorQuery, AuthorResponse, CreateAuthor, UpdateAuthor},
        book::{BookResponse, BookRow},
    },
    query::Page,
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
    media: MediaStorage,
}

impl AuthorsService {
    pub fn new(repository: Repository, media: MediaStorage) -> Self {
        Self { repository, media }
    }

    /// Page of authors, each with its book count and its books
    pub async fn list(&self, query: &AuthorQuery, page: Page) -> AppResult<(Vec<AuthorResponse>, i64)> {
        let (authors, total) = self.repository.authors.list(query, page).await?;

        let ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
        let mut books = group_by_author(self.repository.authors.books_of(&ids).await?, &self.media);

        let items = authors
            .into_iter()
            .map(|author| {
                let count = author.books_count.unwrap_or_default();
                let own = books.remove(&author.id).unwrap_or_default();
                AuthorResponse::with_books(author, count, own)
            })
            .collect();

        Ok((items, total))
    }

    /// Single author with a live book count and its books
    pub async fn get(&self, id: i32) -> AppResult<AuthorResponse> {
        let author = self.repository.authors.get_by_id(id).await?;
        self.render(author).await
    }

    async fn render(&self, author: Author) -> AppResult<AuthorResponse> {
        let count = self.repository.authors.count_books(author.id).await?;
        let books = self
            .repository
            .authors
            .books_of(&[author.id])
            .await?
            .into_iter()
            .map(|row| BookResponse::from_row(row, &self.media))
            .collect();
        Ok(AuthorResponse::with_books(author, count, books))
    }

    pub async fn create(&self, data: CreateAuthor, actor: &str) -> AppResult<AuthorResponse> {
        data.validate()?;
        let author = self.repository.authors.create(&data).await?;
        tracing::info!(author_id = author.id, user = %actor, "Author created");
        Ok(AuthorResponse::with_books(author, 0, Vec::new()))
    }

    pub async fn replace(&self, id: i32, data: CreateAuthor, actor: &str) -> AppResult<AuthorResponse> {
        data.validate()?;
        let author = self.repository.authors.replace(id, &data).await?;
        tracing::info!(author_id = id, user = %actor, "Author replaced");
        self.render(author).await
    }

    pub async fn update(&self, id: i32, data: UpdateAuthor, actor: &str) -> AppResult<AuthorResponse> {
        data.validate()?;
        let author = self.repository.authors.update(id, &data).await?;
        tracing::info!(author_id = id, user = %actor, "Author updated");
        self.render(author).await
    }

    pub async fn delete(&self, id: i32, actor: &str) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!(author_id = id, user = %actor, "Author deleted");
        Ok(())
    }
}

/// Bucket prefetched rows per author, keeping their title order
fn group_by_author(rows: Vec<BookRow>, media: &MediaStorage) -> HashMap<i32, Vec<BookResponse>> {
    let mut grouped: HashMap<i32, Vec<BookResponse>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.author_id)
            .or_default()
            .push(BookResponse::from_row(row, media));
    }
    grouped
}
