//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username (case-insensitive)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Create a user from an already hashed password
    pub async fn create(&self, username: &str, password_hash: &str, is_staff: bool) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, is_staff)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(is_staff)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            err if err.violated_constraint() == Some("users_username_key") => {
                AppError::Conflict(format!("Username '{}' already exists", username))
            }
            err => err,
        })
    }

    /// Reset the password and staff flag of an existing user
    pub async fn update_credentials(&self, id: i32, password_hash: &str, is_staff: bool) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET password = $1, is_staff = $2, is_active = TRUE
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(password_hash)
        .bind(is_staff)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }
}
