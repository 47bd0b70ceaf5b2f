//! Summary endpoints and the observer-side summary history.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use notesum_core::{
    defaults, logging, AsyncJobStatus, Clock, Result, SummarizationRequest, SummaryJobApi,
    SummaryPayload, SummaryResult,
};

use crate::transport::ApiClient;

#[async_trait]
impl SummaryJobApi for ApiClient {
    async fn submit_summary_job(&self, request: &SummarizationRequest) -> Result<AsyncJobStatus> {
        let path = format!("/summaries/notes/{}/async", request.note_id);
        self.post(&path, &[], request).await
    }

    async fn job_status(&self, job_id: &str) -> Result<AsyncJobStatus> {
        self.get(&format!("/summaries/jobs/{}", job_id), &[]).await
    }
}

/// Synchronous summary operations.
pub struct SummariesClient {
    api: ApiClient,
    clock: Arc<dyn Clock>,
}

impl SummariesClient {
    pub fn new(api: ApiClient, clock: Arc<dyn Clock>) -> Self {
        Self { api, clock }
    }

    /// Generate a summary and wait for it in a single request.
    ///
    /// Blocks for the whole generation; prefer the job orchestrator for
    /// anything interactive.
    #[instrument(skip(self, request), fields(note_id = request.note_id))]
    pub async fn summarize(&self, request: &SummarizationRequest) -> Result<SummaryResult> {
        request.validate()?;
        let path = format!("/summaries/notes/{}", request.note_id);
        let payload: SummaryPayload = self.api.post(&path, &[], request).await?;
        let result = payload.with_request_defaults(request).normalize(
            request.note_id,
            defaults::UNKNOWN_MODEL,
            self.clock.now(),
        )?;
        info!(
            component = logging::SUMMARIES,
            note_id = request.note_id,
            summary_id = result.id,
            "Summary generated synchronously"
        );
        Ok(result)
    }

    /// All summaries of a note, newest first.
    pub async fn list_for_note(&self, note_id: i64) -> Result<Vec<SummaryResult>> {
        let path = format!("/summaries/notes/{}", note_id);
        let payloads: Vec<SummaryPayload> = self.api.get(&path, &[]).await?;
        let now = self.clock.now();
        let mut results = payloads
            .into_iter()
            .map(|p| p.normalize(note_id, defaults::UNKNOWN_MODEL, now))
            .collect::<Result<Vec<_>>>()?;
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(results)
    }

    pub async fn get(&self, summary_id: i64) -> Result<SummaryResult> {
        let path = format!("/summaries/{}", summary_id);
        let payload: SummaryPayload = self.api.get(&path, &[]).await?;
        let note_id = payload.note_id.unwrap_or(0);
        payload.normalize(note_id, defaults::UNKNOWN_MODEL, self.clock.now())
    }

    pub async fn delete(&self, summary_id: i64) -> Result<()> {
        self.api.delete(&format!("/summaries/{}", summary_id)).await
    }
}

/// Summaries of one note as seen by a caller, newest first.
///
/// New results are prepended; nothing is ever replaced or removed.
#[derive(Debug, Clone, Default)]
pub struct SummaryHistory {
    entries: Vec<SummaryResult>,
}

impl SummaryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing newest-first list.
    pub fn seeded(entries: Vec<SummaryResult>) -> Self {
        Self { entries }
    }

    pub fn record(&mut self, result: SummaryResult) {
        self.entries.insert(0, result);
    }

    pub fn latest(&self) -> Option<&SummaryResult> {
        self.entries.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SummaryResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
