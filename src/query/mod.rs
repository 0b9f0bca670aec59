//! Request-driven filtering, search, ordering and pagination.
//!
//! Each collection declares which columns may be searched and ordered on;
//! anything a client asks for outside of those lists is dropped silently.

pub mod ordering;
pub mod pagination;
pub mod search;

pub use ordering::OrderingFilter;
pub use pagination::Page;
pub use search::SearchFilter;

use sqlx::{Postgres, QueryBuilder};

/// Joins predicates pushed onto a query with `WHERE` then `AND`
#[derive(Debug, Default)]
pub struct Conditions {
    started: bool,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the keyword that introduces the next predicate
    pub fn next(&mut self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(if self.started { " AND " } else { " WHERE " });
        self.started = true;
    }
}
