//! Book endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::Multipart;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookQuery, BookResponse, CreateBook, UpdateBook},
        user::UserClaims,
    },
    query::Page,
};

use super::PaginatedResponse;

/// Multipart form accepted by the cover upload
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CoverUpload {
    /// JPEG, PNG, GIF, WebP or BMP image
    #[schema(value_type = String, format = Binary)]
    pub cover: Vec<u8>,
}

/// List books with filters, search, ordering and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Page of books", body = PaginatedResponse<BookResponse>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<BookResponse>>> {
    let page = Page::new(query.page, query.per_page, &state.config.pagination);
    let (items, total) = state.services.books.list(&query, page).await?;
    Ok(Json(PaginatedResponse::new(items, total, page)))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookResponse>> {
    Ok(Json(state.services.books.get(id).await?))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Author already has a book with this title", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<UserClaims>,
    Json(data): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    let created = state.services.books.create(data, &claims.sub).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = CreateBook,
    responses(
        (status = 200, description = "Book replaced", body = BookResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Author already has a book with this title")
    )
)]
pub async fn replace_book(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<i32>,
    Json(data): Json<CreateBook>,
) -> AppResult<Json<BookResponse>> {
    Ok(Json(state.services.books.replace(id, data, &claims.sub).await?))
}

/// Update some fields of a book
#[utoipa::path(
    patch,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Author already has a book with this title")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateBook>,
) -> AppResult<Json<BookResponse>> {
    Ok(Json(state.services.books.update(id, data, &claims.sub).await?))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.books.delete(id, &claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload and attach a cover image
#[utoipa::path(
    put,
    path = "/books/{id}/cover",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body(content = CoverUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Cover attached", body = BookResponse),
        (status = 400, description = "Missing or invalid image", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn upload_cover(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> AppResult<Json<BookResponse>> {
    let max_bytes = state.config.media.max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("cover") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("cover").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        if data.len() > max_bytes {
            return Err(AppError::field(
                "cover",
                format!("Image must be at most {} bytes", max_bytes),
            ));
        }

        let book = state
            .services
            .books
            .set_cover(id, &file_name, &content_type, &data, &claims.sub)
            .await?;
        return Ok(Json(book));
    }

    Err(AppError::field("cover", "No file was submitted"))
}

/// Detach the cover image
#[utoipa::path(
    delete,
    path = "/books/{id}/cover",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Cover detached", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_cover(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookResponse>> {
    Ok(Json(state.services.books.clear_cover(id, &claims.sub).await?))
}
