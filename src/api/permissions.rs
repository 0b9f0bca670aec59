//! Write access to the catalog.
//!
//! Reads are public. Every other method needs an access token issued to a
//! staff account; the decoded claims are handed to the handler through the
//! request extensions.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    error::{AppError, AppResult},
    models::user::UserClaims,
    AppState,
};

pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Decide whether a request with the given credentials may proceed
pub fn check(method: &Method, claims: Option<&UserClaims>) -> AppResult<()> {
    if is_safe_method(method) {
        return Ok(());
    }
    match claims {
        None => Err(AppError::Authentication(
            "Authentication credentials were not provided".to_string(),
        )),
        Some(claims) => claims.require_admin(),
    }
}

/// Middleware guarding the catalog routes
pub async fn require_admin_for_writes(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if is_safe_method(req.method()) {
        return next.run(req).await;
    }

    let claims = match req.headers().typed_get::<Authorization<Bearer>>() {
        Some(Authorization(bearer)) => match state.services.users.verify_access(bearer.token()) {
            Ok(claims) => Some(claims),
            Err(e) => return e.into_response(),
        },
        None => None,
    };

    if let Err(e) = check(req.method(), claims.as_ref()) {
        tracing::debug!(method = %req.method(), path = %req.uri().path(), "Write rejected: {}", e);
        return e.into_response();
    }

    if let Some(claims) = claims {
        req.extensions_mut().insert(claims);
    }
    next.run(req).await
}
