//! Data models for the catalog

pub mod author;
pub mod book;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorQuery, AuthorResponse, CreateAuthor, UpdateAuthor};
pub use book::{BookQuery, BookResponse, BookRow, CreateBook, UpdateBook};
pub use user::{TokenKind, User, UserClaims};
