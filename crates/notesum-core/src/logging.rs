//! Structured logging schema for notesum.
//!
//! Every event carries a `component` field whose value is one of the
//! constants below, so a log pipeline can filter one subsystem regardless of
//! which crate emitted the event.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Operation failed and nothing could be served |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (identity created, job finished) |
//! | DEBUG | Request/response lines, poll ticks, decision points |
//! | TRACE | Raw payload details |
//!
//! ## Field names
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `component` | One of the component values below |
//! | `method`, `path`, `status` | HTTP request line and response status |
//! | `note_id`, `job_id`, `user_id` | Entity being operated on |
//! | `attempt` | Poll attempt number (1-based) |
//! | `duration_ms` | Wall-clock duration |
//! | `result_count` | Items returned by a listing |
//! | `error` | Error message of an absorbed or surfaced failure |

// ─── Component values ──────────────────────────────────────────────────────

/// HTTP transport and error normalization.
pub const TRANSPORT: &str = "transport";

/// Anonymous identity bootstrap.
pub const IDENTITY: &str = "identity";

/// Staleness-bounded note listing cache.
pub const LISTING_CACHE: &str = "listing_cache";

/// Summarization job orchestrator.
pub const ORCHESTRATOR: &str = "orchestrator";

/// Note CRUD and uploads.
pub const NOTES: &str = "notes";

/// Synchronous summary endpoints and summary history.
pub const SUMMARIES: &str = "summaries";

/// Local key/value persistence.
pub const STORE: &str = "store";

/// Persisted user settings.
pub const SETTINGS: &str = "settings";
