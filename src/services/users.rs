//! Authentication and account service

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{AccessToken, TokenKind, TokenPair, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Check credentials and issue an access/refresh token pair
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&user.password, password)? {
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        tracing::info!(user = %user.username, "Tokens issued");
        Ok(TokenPair {
            access: self.issue(&user, TokenKind::Access)?,
            refresh: self.issue(&user, TokenKind::Refresh)?,
        })
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AccessToken> {
        let claims = UserClaims::from_token_of_kind(refresh_token, &self.config.jwt_secret, TokenKind::Refresh)?;

        // Account state may have changed since the refresh token was issued
        let user = self.repository.users.get_by_id(claims.user_id).await.map_err(|e| match e {
            AppError::NotFound(_) => AppError::Authentication("Account no longer exists".to_string()),
            other => other,
        })?;
        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        Ok(AccessToken {
            access: self.issue(&user, TokenKind::Access)?,
        })
    }

    /// Decode an access token presented on a request
    pub fn verify_access(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token_of_kind(token, &self.config.jwt_secret, TokenKind::Access)
    }

    fn issue(&self, user: &User, kind: TokenKind) -> AppResult<String> {
        let lifetime = match kind {
            TokenKind::Access => chrono::Duration::minutes(self.config.access_token_minutes),
            TokenKind::Refresh => chrono::Duration::days(self.config.refresh_token_days),
        };
        UserClaims::for_user(user, kind, lifetime)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Create or reset the configured staff account
    pub async fn ensure_admin(&self) -> AppResult<()> {
        let (Some(username), Some(password)) = (
            self.config.admin_username.as_deref().filter(|u| !u.is_empty()),
            self.config.admin_password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Ok(());
        };

        match self.repository.users.get_by_username(username).await? {
            Some(user) if user.is_staff && user.is_active && verify_password(&user.password, password)? => {
                tracing::debug!(user = %username, "Admin account up to date");
            }
            Some(user) => {
                self.repository
                    .users
                    .update_credentials(user.id, &hash_password(password)?, true)
                    .await?;
                tracing::info!(user = %username, "Admin account updated");
            }
            None => {
                self.repository
                    .users
                    .create(username, &hash_password(password)?, true)
                    .await?;
                tracing::info!(user = %username, "Admin account created");
            }
        }
        Ok(())
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
