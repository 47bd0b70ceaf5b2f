//! Core traits for notesum abstractions.
//!
//! These traits define the seams between the client's stateful components
//! and their collaborators (remote service, local persistence, time), so
//! each component can be exercised against fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// LOCAL PERSISTENCE
// =============================================================================

/// Named-blob persistence capability.
///
/// Values are opaque JSON text. Implementations must make `set` atomic from
/// a reader's point of view: a concurrent `get` sees the old or the new
/// value, never a mix.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never set or has been removed.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Read and decode a JSON value.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and store a JSON value.
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

// =============================================================================
// TIME
// =============================================================================

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// =============================================================================
// REMOTE SERVICE SEAMS
// =============================================================================

/// Asynchronous summarization endpoints used by the job orchestrator.
#[async_trait]
pub trait SummaryJobApi: Send + Sync {
    /// `POST /summaries/notes/{note_id}/async`.
    async fn submit_summary_job(&self, request: &SummarizationRequest) -> Result<AsyncJobStatus>;

    /// `GET /summaries/jobs/{job_id}`.
    async fn job_status(&self, job_id: &str) -> Result<AsyncJobStatus>;
}

/// User endpoints used by identity bootstrap.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// `POST /users`.
    async fn create_user(&self, request: &CreateUserRequest) -> Result<Identity>;

    /// `GET /users/guest/{guest_token}`.
    async fn find_guest(&self, guest_token: &str) -> Result<Identity>;
}

/// Live note listing used by the listing refresh path.
#[async_trait]
pub trait NoteListApi: Send + Sync {
    /// `GET /notes`.
    async fn list_notes(&self, query: &ListNotesQuery) -> Result<Vec<NoteListItem>>;
}
