//! HTTP handlers for leadbook-web.

pub mod leads;
pub mod notes;

/// Zero-floored list offset. Page and limit arrive straight from the
/// query string, so the math saturates instead of overflowing.
pub(crate) fn page_offset(page: i64, limit: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(limit).max(0)
}
