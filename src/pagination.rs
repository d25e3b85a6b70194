//! Page requests and paginated results for listing operations.

use serde::{Deserialize, Serialize};

/// Page size used when none (or an unusable one) is supplied.
pub const DEFAULT_LIMIT: u32 = 10;

/// Zero-based page selection with a page size.
///
/// Records are skipped as `page * limit` before `limit` records are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    limit: u32,
    page: u32,
}

impl PageRequest {
    /// Creates a page request. A zero `limit` falls back to
    /// [`DEFAULT_LIMIT`].
    #[must_use]
    pub const fn new(limit: u32, page: u32) -> Self {
        let effective_limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
        Self {
            limit: effective_limit,
            page,
        }
    }

    /// Parses raw query values leniently with [`DEFAULT_LIMIT`].
    ///
    /// See [`PageRequest::parse_with_default`].
    #[must_use]
    pub fn parse(raw_limit: Option<&str>, raw_page: Option<&str>) -> Self {
        Self::parse_with_default(raw_limit, raw_page, DEFAULT_LIMIT)
    }

    /// Parses raw query values leniently.
    ///
    /// A value that is absent, not an integer, or not strictly positive is
    /// replaced by the default (`default_limit` for the limit, `0` for the
    /// page) instead of being rejected.
    #[must_use]
    pub fn parse_with_default(
        raw_limit: Option<&str>,
        raw_page: Option<&str>,
        default_limit: u32,
    ) -> Self {
        let limit = positive(raw_limit).unwrap_or(default_limit);
        let page = positive(raw_page).unwrap_or(0);
        Self::new(limit, page)
    }

    /// Returns the page size.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Returns the zero-based page index.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Returns the number of records to skip.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.page).saturating_mul(u64::from(self.limit))
    }

    /// Applies this request to records already in listing order.
    ///
    /// Used by in-memory adapters; the total counts every supplied record.
    #[must_use]
    pub fn slice<T>(self, matching: Vec<T>) -> Page<T> {
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let skip = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(skip).take(take).collect();
        Page::new(items, self, total)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}

fn positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
}

/// Pagination metadata returned alongside a page of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Page size that was applied.
    pub limit: u32,
    /// Zero-based page index that was applied.
    pub page: u32,
    /// Number of records matching the filter, independent of pagination.
    pub total: u64,
}

/// One page of records plus the total number of matching records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    list: Vec<T>,
    pagination: Pagination,
}

impl<T> Page<T> {
    /// Creates a page from already-selected records.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            list: items,
            pagination: Pagination {
                limit: request.limit,
                page: request.page,
                total,
            },
        }
    }

    /// Returns the records on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.list
    }

    /// Consumes the page, returning its records.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.list
    }

    /// Returns the total number of matching records.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.pagination.total
    }

    /// Returns the pagination metadata.
    #[must_use]
    pub const fn pagination(&self) -> Pagination {
        self.pagination
    }
}
