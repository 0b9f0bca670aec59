//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use crate::{
    error::AppResult,
    models::{
        author::{AuthorQuery, AuthorResponse, CreateAuthor, UpdateAuthor},
        user::UserClaims,
    },
    query::Page,
};

use super::PaginatedResponse;

/// List authors with search, ordering and pagination
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(AuthorQuery),
    responses(
        (status = 200, description = "Page of authors with their books", body = PaginatedResponse<AuthorResponse>)
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    Query(query): Query<AuthorQuery>,
) -> AppResult<Json<PaginatedResponse<AuthorResponse>>> {
    let page = Page::new(query.page, query.per_page, &state.config.pagination);
    let (items, total) = state.services.authors.list(&query, page).await?;
    Ok(Json(PaginatedResponse::new(items, total, page)))
}

/// Get author details by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = AuthorResponse),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorResponse>> {
    Ok(Json(state.services.authors.get(id).await?))
}

/// Create a new author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = AuthorResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not a staff account")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<UserClaims>,
    Json(data): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<AuthorResponse>)> {
    let created = state.services.authors.create(data, &claims.sub).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body = CreateAuthor,
    responses(
        (status = 200, description = "Author replaced", body = AuthorResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Author not found")
    )
)]
pub async fn replace_author(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<i32>,
    Json(data): Json<CreateAuthor>,
) -> AppResult<Json<AuthorResponse>> {
    Ok(Json(state.services.authors.replace(id, data, &claims.sub).await?))
}

/// Update some fields of an author
#[utoipa::path(
    patch,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = AuthorResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAuthor>,
) -> AppResult<Json<AuthorResponse>> {
    Ok(Json(state.services.authors.update(id, data, &claims.sub).await?))
}

/// Delete an author without books
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author still has books", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.authors.delete(id, &claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}
