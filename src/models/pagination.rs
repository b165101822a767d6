//! Page/limit handling shared by the paginated listings

use serde::Serialize;

/// A clamped page request (1-based page)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

pub const MAX_PAGE_SIZE: i64 = 100;

impl Pagination {
    /// Page below 1 becomes 1; limit is kept within 1..=100.
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Metadata for a result set of `total` rows
    pub fn meta(&self, total: i64) -> PaginationMeta {
        PaginationMeta {
            total,
            page: self.page,
            pages: (total + self.limit - 1) / self.limit,
            limit: self.limit,
        }
    }
}

/// `pagination` block of list responses
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        assert_eq!(Pagination::new(None, None, 12), Pagination { page: 1, limit: 12 });
        assert_eq!(Pagination::new(Some(0), Some(0), 12), Pagination { page: 1, limit: 1 });
        assert_eq!(Pagination::new(Some(-3), Some(500), 12), Pagination { page: 1, limit: 100 });
    }

    #[test]
    fn test_offset_and_pages() {
        let page = Pagination::new(Some(3), Some(12), 12);
        assert_eq!(page.offset(), 24);
        assert_eq!(page.meta(25).pages, 3);
        assert_eq!(page.meta(24).pages, 2);
        assert_eq!(page.meta(0).pages, 0);
    }
}
