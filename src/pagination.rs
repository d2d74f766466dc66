//! Page arithmetic and the generic count-then-fetch routine shared by both
//! list endpoints.

use sea_orm::DatabaseConnection;

use crate::errors::ApiError;
use crate::response::PaginationMeta;
use crate::traits::ListResource;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest page, limit or offset handed to the database, which binds them
/// as signed 64-bit integers.
pub const MAX_BOUND: u64 = i64::MAX.unsigned_abs();

/// A validated page request. Both fields are at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Zero values are replaced by the defaults; larger values are capped
    /// at [`MAX_BOUND`].
    #[must_use]
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page.min(MAX_BOUND) },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit.min(MAX_BOUND) },
        }
    }

    /// Lenient query-string form: missing, empty, non-numeric or
    /// non-positive values fall back to the defaults.
    #[must_use]
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        Self::new(
            parse_positive(page).unwrap_or(DEFAULT_PAGE),
            parse_positive(limit).unwrap_or(DEFAULT_LIMIT),
        )
    }

    /// Never exceeds [`MAX_BOUND`].
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .checked_mul(self.limit)
            .map_or(MAX_BOUND, |offset| offset.min(MAX_BOUND))
    }
}

/// Parses a strictly positive integer, ignoring surrounding whitespace.
#[must_use]
pub fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|n| *n > 0)
}

#[must_use]
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 { 0 } else { total.div_ceil(limit) }
}

/// One page of rows plus the numbers needed to describe it.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<R> {
    pub rows: Vec<R>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<R> Page<R> {
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        total_pages(self.total, self.limit)
    }

    #[must_use]
    pub fn meta(&self) -> PaginationMeta {
        PaginationMeta {
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages(),
        }
    }

    pub fn map<U>(self, f: impl FnMut(R) -> U) -> Page<U> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Runs the count query and then the data query with the identical
/// condition. Any storage fault aborts with "Failed to fetch {resource}".
pub async fn paginate<T: ListResource>(
    db: &DatabaseConnection,
    filters: &T::Filters,
    request: PageRequest,
) -> Result<Page<T>, ApiError> {
    let condition = T::predicates(filters).into_condition();

    let total = T::total_count(db, &condition)
        .await
        .map_err(|err| ApiError::fetch_failed(T::RESOURCE_NAME_PLURAL, err))?;

    let rows = T::fetch_page(db, &condition, request.offset(), request.limit)
        .await
        .map_err(|err| ApiError::fetch_failed(T::RESOURCE_NAME_PLURAL, err))?;

    tracing::debug!(
        resource = T::RESOURCE_NAME_PLURAL,
        total,
        page = request.page,
        limit = request.limit,
        returned = rows.len(),
        "page fetched"
    );

    Ok(Page {
        rows,
        total,
        page: request.page,
        limit: request.limit,
    })
}
