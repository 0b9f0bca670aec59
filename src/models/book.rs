//! Book model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::author::{Author, AuthorResponse};
use crate::services::media::MediaStorage;

/// Earliest accepted publication year
pub const YEAR_MIN: i32 = 1000;
/// Latest accepted publication year
pub const YEAR_MAX: i32 = 2030;

pub const YEAR_RANGE_MESSAGE: &str = "Publication year must be between 1000 and 2030";

/// Book row joined with the columns of its author
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub author_id: i32,
    pub year: i16,
    pub title: String,
    pub preface: String,
    /// Path of the cover file relative to the media root
    pub cover: Option<String>,
    pub author_last_name: String,
    pub author_first_name: String,
    pub author_middle_name: Option<String>,
    pub author_birth_date: Option<NaiveDate>,
    pub author_bio: String,
}

impl BookRow {
    /// The author resolved by the join
    pub fn author(&self) -> Author {
        Author {
            id: self.author_id,
            last_name: self.author_last_name.clone(),
            first_name: self.author_first_name.clone(),
            middle_name: self.author_middle_name.clone(),
            birth_date: self.author_birth_date,
            bio: self.author_bio.clone(),
            books_count: None,
        }
    }
}

/// Book as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub id: i32,
    pub title: String,
    pub year: i32,
    pub preface: String,
    /// Absolute or host-relative URL of the cover image
    pub cover: Option<String>,
    pub author: AuthorResponse,
}

impl BookResponse {
    pub fn from_row(row: BookRow, media: &MediaStorage) -> Self {
        BookResponse {
            author: AuthorResponse::from(row.author()),
            cover: media.cover_url(row.cover.as_deref()),
            id: row.id,
            title: row.title,
            year: i32::from(row.year),
            preface: row.preface,
        }
    }
}

/// Create (or fully replace) book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,
    #[validate(range(min = 1000, max = 2030, message = "Publication year must be between 1000 and 2030"))]
    pub year: i32,
    pub preface: Option<String>,
    /// Identifier of an existing author (never echoed back)
    pub author_id: i32,
}

/// Partial book update request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,
    #[validate(range(min = 1000, max = 2030, message = "Publication year must be between 1000 and 2030"))]
    pub year: Option<i32>,
    pub preface: Option<String>,
    pub author_id: Option<i32>,
}

impl UpdateBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.year.is_none() && self.preface.is_none() && self.author_id.is_none()
    }
}

/// Storage representation of a validated year
pub fn year_to_db(year: i32) -> Result<i16, crate::error::AppError> {
    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        return Err(crate::error::AppError::field("year", YEAR_RANGE_MESSAGE));
    }
    i16::try_from(year).map_err(|_| crate::error::AppError::field("year", YEAR_RANGE_MESSAGE))
}

/// Book list query parameters
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Exact author identifier
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[param(value_type = Option<i32>)]
    pub author: Option<i32>,
    /// Exact publication year
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[param(value_type = Option<i32>)]
    pub year: Option<i32>,
    /// Matches the title (case-insensitive, partial)
    pub search: Option<String>,
    /// Comma-separated among `title`, `year`, `author__last_name`; `-` prefix for descending
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
