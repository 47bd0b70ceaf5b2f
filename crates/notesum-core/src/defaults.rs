//! Centralized default constants for the notesum client.
//!
//! **This module is the single source of truth** for shared default values.
//! Configuration types read their fallbacks from here instead of defining
//! their own magic numbers.

// =============================================================================
// REMOTE SERVICE
// =============================================================================

/// Default base URL of the summarization service (includes the `/api` prefix).
pub const API_URL: &str = "http://localhost:8000/api";

/// Default per-request HTTP timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// JOB POLLING
// =============================================================================

/// Wait between job-status polls, in milliseconds.
pub const JOB_POLL_INTERVAL_MS: u64 = 2000;

/// Maximum number of job-status polls before giving up (6 minutes at 2s).
pub const JOB_POLL_MAX_ATTEMPTS: u32 = 180;

// =============================================================================
// LISTING CACHE
// =============================================================================

/// Freshness window for the cached note listing, in seconds.
pub const LISTING_CACHE_TTL_SECS: u64 = 300;

// =============================================================================
// NOTES
// =============================================================================

/// Default page size for note listings.
pub const PAGE_LIMIT: u32 = 20;

/// Largest page size the service accepts.
pub const PAGE_LIMIT_MAX: u32 = 100;

/// Maximum note title length in characters.
pub const TITLE_MAX_LEN: usize = 255;

/// Maximum note content length in characters.
pub const CONTENT_MAX_LEN: usize = 100_000;

// =============================================================================
// SUMMARIES
// =============================================================================

/// Smallest explicit summary line count.
pub const LINE_COUNT_MIN: u32 = 1;

/// Largest explicit summary line count.
pub const LINE_COUNT_MAX: u32 = 200;

/// Summary length label used when the service decides the line count.
pub const AUTO_LENGTH: &str = "auto";

/// Provider name substituted when the service omits one.
pub const UNKNOWN_PROVIDER: &str = "unknown";

/// Model name substituted on the polling path when the service omits one.
pub const UNKNOWN_MODEL: &str = "unknown";

/// Model name substituted on the cache-hit path when the service omits one.
pub const CACHED_MODEL: &str = "cached";

// =============================================================================
// IDENTITY
// =============================================================================

/// Display name requested for new guest identities.
pub const GUEST_DISPLAY_NAME: &str = "Guest User";
