//! Offset pagination for list endpoints.
//!
//! # Usage
//!
//! ```rust,ignore
//! // In a route handler
//! let page = query.pagination.validate();
//!
//! // In a model
//! let (items, total) = Job::search(&filters, &page, pool).await?;
//!
//! Json(Page::new(items, total, &page))
//! ```

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;
/// Highest page number honoured; larger requests land on this page
pub const MAX_PAGE: i64 = 1_000_000;

/// Raw pagination query parameters (`?page=2&per_page=50`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationArgs {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PaginationArgs {
    /// Apply defaults and clamp to sane bounds.
    ///
    /// Pages are 1-based and capped at `MAX_PAGE`; `per_page` is clamped to 1..=100.
    pub fn validate(&self) -> ValidatedPagination {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);

        ValidatedPagination { page, per_page }
    }
}

/// Validated and normalized pagination arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedPagination {
    pub page: i64,
    pub per_page: i64,
}

impl ValidatedPagination {
    /// SQL LIMIT value.
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, args: &ValidatedPagination) -> Self {
        Self {
            items,
            total,
            page: args.page,
            per_page: args.per_page,
        }
    }
}
