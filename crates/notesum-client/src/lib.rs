//! # notesum-client
//!
//! Resilient client for the notesum summarization service.
//!
//! This crate provides:
//! - An HTTP transport that turns every failure into one `ServiceError`
//! - Anonymous identity bootstrap persisted across restarts
//! - A staleness-bounded note listing cache used as an offline fallback
//! - A summarization job orchestrator with bounded polling and progress events
//!
//! ## Example
//!
//! ```ignore
//! use notesum_client::{ClientConfig, Notesum};
//! use notesum_core::{JobProgress, SummarizationRequest};
//!
//! let client = Notesum::open(&ClientConfig::from_env()).await?;
//! let me = client.identity.initialize_identity().await?;
//!
//! let request = SummarizationRequest::new(42).with_line_count(5);
//! let summary = client
//!     .jobs
//!     .run_summarization(&request, &|p: &JobProgress| println!("{}", p.message))
//!     .await?;
//! ```

pub mod app;
pub mod config;
pub mod identity;
pub mod listing_cache;
pub mod notes;
pub mod orchestrator;
pub mod settings;
pub mod storage;
pub mod summaries;
pub mod transport;

// Re-export core types
pub use notesum_core::*;

pub use app::Notesum;
pub use config::ClientConfig;
pub use identity::IdentityBootstrap;
pub use listing_cache::{Listing, ListingCache, ListingSource, NoteListing};
pub use notes::NotesClient;
pub use orchestrator::{no_progress, JobOrchestrator, PollConfig, ProgressObserver};
pub use settings::SettingsStore;
pub use storage::{storage_keys, FileStore, MemoryStore};
pub use summaries::{SummariesClient, SummaryHistory};
pub use transport::{error_from_response, ApiClient};
