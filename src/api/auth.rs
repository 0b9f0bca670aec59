//! Token endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::user::{AccessToken, RefreshRequest, TokenPair, TokenRequest},
};

/// Obtain an access/refresh token pair
#[utoipa::path(
    post,
    path = "/token",
    tag = "auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Tokens issued", body = TokenPair),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn obtain_token(
    State(state): State<crate::AppState>,
    Json(request): Json<TokenRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state
        .services
        .users
        .authenticate(&request.username, &request.password)
        .await?;
    Ok(Json(pair))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/token/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = AccessToken),
        (status = 401, description = "Invalid or expired refresh token", body = crate::error::ErrorResponse)
    )
)]
pub async fn refresh_token(
    State(state): State<crate::AppState>,
    Json(request): Json<RefreshRequest>,
) -> AppResult<Json<AccessToken>> {
    Ok(Json(state.services.users.refresh(&request.refresh).await?))
}
