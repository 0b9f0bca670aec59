//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::book::BookResponse;

/// Full author row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub bio: String,
    /// Book count annotated by list queries; absent on plain row fetches
    #[sqlx(default)]
    pub books_count: Option<i64>,
}

impl Author {
    /// Surname, given name and patronymic joined by single spaces, skipping empty parts
    pub fn full_name(&self) -> String {
        join_name_parts(&[
            Some(self.last_name.as_str()),
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
        ])
    }
}

pub fn join_name_parts(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Author as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorResponse {
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    /// Derived from the name parts, never stored
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub bio: String,
    /// Number of books by this author (author endpoints only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub books_count: Option<i64>,
    /// Books by this author sorted by title (author endpoints only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub books: Option<Vec<BookResponse>>,
}

impl From<Author> for AuthorResponse {
    /// Embedded form, as nested inside a book
    fn from(author: Author) -> Self {
        AuthorResponse {
            full_name: author.full_name(),
            id: author.id,
            last_name: author.last_name,
            first_name: author.first_name,
            middle_name: author.middle_name,
            birth_date: author.birth_date,
            bio: author.bio,
            books_count: None,
            books: None,
        }
    }
}

impl AuthorResponse {
    /// Top-level form carrying the derived book count and the author's books
    pub fn with_books(author: Author, books_count: i64, books: Vec<BookResponse>) -> Self {
        AuthorResponse {
            books_count: Some(books_count),
            books: Some(books),
            ..AuthorResponse::from(author)
        }
    }
}

/// Create (or fully replace) author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: String,
    #[validate(length(max = 100, message = "Middle name must be at most 100 characters"))]
    pub middle_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub bio: Option<String>,
}

/// Partial author update request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: Option<String>,
    /// `null` clears the middle name
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 100, message = "Middle name must be at most 100 characters"))]
    pub middle_name: Option<Option<String>>,
    /// `null` clears the birth date
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub birth_date: Option<Option<NaiveDate>>,
    pub bio: Option<String>,
}

impl UpdateAuthor {
    pub fn is_empty(&self) -> bool {
        self.last_name.is_none()
            && self.first_name.is_none()
            && self.middle_name.is_none()
            && self.birth_date.is_none()
            && self.bio.is_none()
    }
}

/// Author list query parameters
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuthorQuery {
    /// Matches last, first or middle name (case-insensitive, partial)
    pub search: Option<String>,
    /// Comma-separated among `last_name`, `first_name`; `-` prefix for descending
    pub ordering: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[param(value_type = Option<i64>)]
    pub page: Option<i64>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[param(value_type = Option<i64>)]
    pub per_page: Option<i64>,
}
