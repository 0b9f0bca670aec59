//! Book use cases

use validator::Validate;

use super::media::{self, MediaStorage};
use crate::{
    error::{AppError, AppResult},
    models::book::{BookQuery, BookResponse, CreateBook, UpdateBook},
    query::Page,
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    media: MediaStorage,
}

impl BooksService {
    pub fn new(repository: Repository, media: MediaStorage) -> Self {
        Self { repository, media }
    }

    pub async fn list(&self, query: &BookQuery, page: Page) -> AppResult<(Vec<BookResponse>, i64)> {
        let (rows, total) = self.repository.books.list(query, page).await?;
        let items = rows
            .into_iter()
            .map(|row| BookResponse::from_row(row, &self.media))
            .collect();
        Ok((items, total))
    }

    pub async fn get(&self, id: i32) -> AppResult<BookResponse> {
        let row = self.repository.books.get_by_id(id).await?;
        Ok(BookResponse::from_row(row, &self.media))
    }

    pub async fn create(&self, data: CreateBook, actor: &str) -> AppResult<BookResponse> {
        data.validate()?;
        let row = self.repository.books.create(&data).await?;
        tracing::info!(book_id = row.id, author_id = row.author_id, user = %actor, "Book created");
        Ok(BookResponse::from_row(row, &self.media))
    }

    pub async fn replace(&self, id: i32, data: CreateBook, actor: &str) -> AppResult<BookResponse> {
        data.validate()?;
        let row = self.repository.books.replace(id, &data).await?;
        tracing::info!(book_id = id, user = %actor, "Book replaced");
        Ok(BookResponse::from_row(row, &self.media))
    }

    pub async fn update(&self, id: i32, data: UpdateBook, actor: &str) -> AppResult<BookResponse> {
        data.validate()?;
        let row = self.repository.books.update(id, &data).await?;
        tracing::info!(book_id = id, user = %actor, "Book updated");
        Ok(BookResponse::from_row(row, &self.media))
    }

    pub async fn delete(&self, id: i32, actor: &str) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, user = %actor, "Book deleted");
        Ok(())
    }

    /// Store an uploaded image and attach it as the book's cover
    pub async fn set_cover(
        &self,
        id: i32,
        file_name: &str,
        content_type: &str,
        data: &[u8],
        actor: &str,
    ) -> AppResult<BookResponse> {
        let extension = check_cover(content_type, data)?;

        // Fails with 404 before anything is written
        self.repository.books.get_by_id(id).await?;

        let path = self.media.save_cover(file_name, extension, data).await?;
        let attached = self.repository.books.set_cover(id, Some(&path)).await;
        let row = discard_on_error(attached, &self.media, &path).await?;

        tracing::info!(book_id = id, path = %path, user = %actor, "Cover attached");
        Ok(BookResponse::from_row(row, &self.media))
    }

    /// Detach the cover; the stored file is left in place
    pub async fn clear_cover(&self, id: i32, actor: &str) -> AppResult<BookResponse> {
        let row = self.repository.books.set_cover(id, None).await?;
        tracing::info!(book_id = id, user = %actor, "Cover detached");
        Ok(BookResponse::from_row(row, &self.media))
    }
}

/// Remove the file just written when attaching it failed; the attach error wins
async fn discard_on_error<T>(result: AppResult<T>, media: &MediaStorage, path: &str) -> AppResult<T> {
    if result.is_err() {
        if let Err(cleanup) = media.remove(path).await {
            tracing::warn!(path = %path, "Orphaned cover left on disk: {}", cleanup);
        }
    }
    result
}

/// Accept raster images only, judged by their bytes; returns the extension to store under
pub fn check_cover(content_type: &str, data: &[u8]) -> AppResult<&'static str> {
    if data.is_empty() {
        return Err(AppError::field("cover", "The submitted file is empty"));
    }
    if !content_type.starts_with("image/") {
        return Err(AppError::field("cover", "Upload a valid image"));
    }
    media::cover_extension(data).ok_or_else(|| {
        AppError::field(
            "cover",
            "Upload a valid image. The file you uploaded was either not an image or a corrupted image",
        )
    })
}
