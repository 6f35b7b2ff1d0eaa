//! Centralized default constants for leadbook.
//!
//! **This module is the single source of truth** for all shared default values.
//! All crates should reference these constants instead of defining their own
//! magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for the lead note list. Matches the default page limit
/// users see before they pick one, and is what an empty session falls back to.
pub const NOTE_PAGE_LIMIT: i64 = 30;

/// Default page size for the lead index.
pub const LEAD_PAGE_LIMIT: i64 = 50;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;

// =============================================================================
// NOTES
// =============================================================================

/// Maximum note text length in characters (mirrors the TEXT column guard).
pub const NOTE_TEXT_MAX_LENGTH: usize = 65535;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Maximum request body size in bytes (1 MB; the service only accepts small
/// form posts).
pub const MAX_BODY_SIZE_BYTES: usize = 1024 * 1024;
