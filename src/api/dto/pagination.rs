//! Pagination-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters for pagination.
#[derive(Debug, Clone, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-based)
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    #[param(minimum = 1, example = 1)]
    pub page: u32,

    /// Number of items per page (max 100)
    #[serde(default = "default_size")]
    #[validate(range(min = 1, max = 100, message = "size must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, example = 20)]
    pub size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

impl PaginationParams {
    /// Calculates the offset for repository queries.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.size)
    }

    /// Returns the limit for repository queries.
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    20
}

/// Generic paged response wrapper.
#[derive(Debug, Serialize, ToSchema)]
pub struct PagedResponse<T> {
    /// The data items for this page
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

/// Pagination metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number (1-based)
    #[schema(example = 1)]
    pub page: u32,

    /// Number of items per page
    #[schema(example = 20)]
    pub page_size: u32,

    /// Total number of items across all pages
    #[schema(example = 100)]
    pub total_items: u64,

    /// Total number of pages
    #[schema(example = 5)]
    pub total_pages: u64,

    /// Whether there is a next page
    #[schema(example = true)]
    pub has_next: bool,

    /// Whether there is a previous page
    #[schema(example = false)]
    pub has_prev: bool,
}

impl<T> PagedResponse<T> {
    /// Creates a new paged response.
    pub fn new(data: Vec<T>, params: &PaginationParams, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(u64::from(params.size.max(1)));
        let has_next = u64::from(params.page) < total_pages;
        let has_prev = params.page > 1;

        Self {
            data,
            pagination: PaginationMeta {
                page: params.page,
                page_size: params.size,
                total_items,
                total_pages,
                has_next,
                has_prev,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let params: PaginationParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.size, 20);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_size_over_limit_is_invalid() {
        let params = PaginationParams { page: 1, size: 101 };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_meta_for_last_page() {
        let params = PaginationParams { page: 3, size: 10 };
        let paged = PagedResponse::new(vec![1, 2], &params, 22);
        assert_eq!(paged.pagination.total_pages, 3);
        assert!(!paged.pagination.has_next);
        assert!(paged.pagination.has_prev);
    }

    proptest! {
        #[test]
        fn prop_pages_cover_all_items(total in 0u64..10_000, size in 1u32..=100) {
            let params = PaginationParams { page: 1, size };
            let meta = PagedResponse::<()>::new(vec![], &params, total).pagination;
            prop_assert!(meta.total_pages * u64::from(size) >= total);
            prop_assert!(meta.total_pages == 0 || (meta.total_pages - 1) * u64::from(size) < total);
        }
    }
}
