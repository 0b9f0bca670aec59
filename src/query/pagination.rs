//! Page window for list endpoints

use sqlx::{Postgres, QueryBuilder};

use crate::config::PaginationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub number: i64,
    pub per_page: i64,
}

impl Page {
    /// Clamp requested values to the configured bounds
    pub fn new(page: Option<i64>, per_page: Option<i64>, config: &PaginationConfig) -> Self {
        let max = config.max_per_page.max(1);
        Self {
            number: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(config.default_per_page).clamp(1, max),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.per_page)
    }

    pub fn push_limit(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" LIMIT ").push_bind(self.per_page);
        builder.push(" OFFSET ").push_bind(self.offset());
    }
}
