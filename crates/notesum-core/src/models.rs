//! Data models for the notesum client.
//!
//! Wire-facing types keep the service's snake_case field names; where the
//! Rust field name differs it is renamed with serde.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::timestamps;

/// Decode `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// IDENTITY
// =============================================================================

/// The anonymous (or registered) user this installation acts as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    /// Opaque token used to re-associate a guest across restarts.
    #[serde(rename = "guest_id", default)]
    pub guest_token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    pub is_guest: bool,
    #[serde(deserialize_with = "timestamps::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Identity {
    pub fn display_name_or_default(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or(defaults::GUEST_DISPLAY_NAME)
    }
}

/// Body of `POST /users`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_guest: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CreateUserRequest {
    pub fn guest() -> Self {
        Self {
            is_guest: Some(true),
            display_name: Some(defaults::GUEST_DISPLAY_NAME.to_string()),
            email: None,
        }
    }
}

// =============================================================================
// NOTES
// =============================================================================

/// Where a note's content came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Text,
    Pdf,
    Upload,
}

/// Read-only projection of a note used by listings and the listing cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteListItem {
    pub id: i64,
    pub title: String,
    pub source_type: SourceType,
    pub char_count: i64,
    #[serde(deserialize_with = "timestamps::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_preview: String,
}

/// Full note as returned by `GET /notes/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub source_type: SourceType,
    #[serde(default)]
    pub original_filename: Option<String>,
    pub char_count: i64,
    #[serde(deserialize_with = "timestamps::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamps::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary_count: i64,
}

fn validate_title(title: &str) -> Result<()> {
    let len = title.chars().count();
    if len == 0 || len > defaults::TITLE_MAX_LEN {
        return Err(Error::InvalidInput(format!(
            "title must be 1-{} characters",
            defaults::TITLE_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::InvalidInput("Content cannot be empty".to_string()));
    }
    if content.chars().count() > defaults::CONTENT_MAX_LEN {
        return Err(Error::InvalidInput(format!(
            "content exceeds {} characters",
            defaults::CONTENT_MAX_LEN
        )));
    }
    Ok(())
}

/// Body of `POST /notes`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub source_type: SourceType,
}

impl CreateNoteRequest {
    pub fn text(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            source_type: SourceType::Text,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_content(&self.content)
    }
}

/// Body of `PUT /notes/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateNoteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl UpdateNoteRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }
        if let Some(ref content) = self.content {
            validate_content(content)?;
        }
        Ok(())
    }
}

/// Query for `GET /notes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListNotesQuery {
    pub user_id: Option<i64>,
    pub skip: u32,
    pub limit: u32,
    pub search: Option<String>,
}

impl Default for ListNotesQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            skip: 0,
            limit: defaults::PAGE_LIMIT,
            search: None,
        }
    }
}

impl ListNotesQuery {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// Query-string pairs; the limit is clamped to what the service accepts.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(user_id) = self.user_id {
            pairs.push(("user_id", user_id.to_string()));
        }
        pairs.push(("skip", self.skip.to_string()));
        pairs.push((
            "limit",
            self.limit.clamp(1, defaults::PAGE_LIMIT_MAX).to_string(),
        ));
        if let Some(ref search) = self.search {
            if !search.is_empty() {
                pairs.push(("search", search.clone()));
            }
        }
        pairs
    }

    /// Both queries select the same page of the same listing.
    pub fn same_scope(&self, other: &ListNotesQuery) -> bool {
        self.to_pairs() == other.to_pairs()
    }
}

/// Listing blob persisted by the listing cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedListing {
    pub items: Vec<NoteListItem>,
    pub timestamp: DateTime<Utc>,
    /// Query that produced `items`; `None` when stored without one.
    #[serde(default)]
    pub query: Option<ListNotesQuery>,
}

// =============================================================================
// SUMMARIES
// =============================================================================

/// Summary writing style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
    /// Service decides the best style
    #[default]
    BestFit,
    Technical,
    Casual,
}

impl SummaryStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BestFit => "best_fit",
            Self::Technical => "technical",
            Self::Casual => "casual",
        }
    }
}

impl std::str::FromStr for SummaryStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "best_fit" => Ok(Self::BestFit),
            "technical" => Ok(Self::Technical),
            "casual" => Ok(Self::Casual),
            other => Err(Error::InvalidInput(format!("unknown summary style: {other}"))),
        }
    }
}

/// Shape of the generated output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryType {
    #[default]
    Summary,
    KeyPoints,
    Flashcards,
}

impl SummaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::KeyPoints => "key_points",
            Self::Flashcards => "flashcards",
        }
    }
}

impl std::str::FromStr for SummaryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "summary" => Ok(Self::Summary),
            "key_points" => Ok(Self::KeyPoints),
            "flashcards" => Ok(Self::Flashcards),
            other => Err(Error::InvalidInput(format!("unknown summary type: {other}"))),
        }
    }
}

/// A request to summarize one note. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummarizationRequest {
    /// Path parameter, not part of the body.
    #[serde(skip)]
    pub note_id: i64,
    /// `None` lets the service decide.
    pub line_count: Option<u32>,
    #[serde(rename = "summary_style")]
    pub style: SummaryStyle,
    pub summary_type: SummaryType,
    pub force_regenerate: bool,
}

impl SummarizationRequest {
    pub fn new(note_id: i64) -> Self {
        Self {
            note_id,
            line_count: None,
            style: SummaryStyle::default(),
            summary_type: SummaryType::default(),
            force_regenerate: false,
        }
    }

    pub fn with_line_count(mut self, line_count: u32) -> Self {
        self.line_count = Some(line_count);
        self
    }

    pub fn with_style(mut self, style: SummaryStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_type(mut self, summary_type: SummaryType) -> Self {
        self.summary_type = summary_type;
        self
    }

    pub fn with_force_regenerate(mut self, force: bool) -> Self {
        self.force_regenerate = force;
        self
    }

    /// Length label the service stores: the line count or "auto".
    pub fn length_label(&self) -> String {
        self.line_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| defaults::AUTO_LENGTH.to_string())
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.line_count {
            if !(defaults::LINE_COUNT_MIN..=defaults::LINE_COUNT_MAX).contains(&n) {
                return Err(Error::InvalidInput(format!(
                    "line_count must be between {} and {}",
                    defaults::LINE_COUNT_MIN,
                    defaults::LINE_COUNT_MAX
                )));
            }
        }
        Ok(())
    }
}

/// Remote job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Summary as the service sends it. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryPayload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub note_id: Option<i64>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary_type: Option<String>,
    #[serde(default)]
    pub summary_length: Option<String>,
    #[serde(default)]
    pub summary_style: Option<String>,
    #[serde(default)]
    pub ai_provider: Option<String>,
    #[serde(default)]
    pub ai_model: Option<String>,
    #[serde(default)]
    pub generation_time_ms: Option<i64>,
    #[serde(default)]
    pub token_count: Option<i64>,
    #[serde(default)]
    pub compression_ratio: Option<f64>,
    #[serde(default, deserialize_with = "timestamps::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SummaryPayload {
    /// Fill type, length, and style from the request that produced it.
    pub fn with_request_defaults(mut self, request: &SummarizationRequest) -> Self {
        self.note_id.get_or_insert(request.note_id);
        self.summary_type
            .get_or_insert_with(|| request.summary_type.as_str().to_string());
        self.summary_length
            .get_or_insert_with(|| request.length_label());
        self.summary_style
            .get_or_insert_with(|| request.style.as_str().to_string());
        self
    }

    /// Synthesize a complete result, substituting defaults for absent fields.
    ///
    /// Only `content` is required; without it there is nothing to show.
    pub fn normalize(
        self,
        note_id: i64,
        fallback_model: &str,
        now: DateTime<Utc>,
    ) -> Result<SummaryResult> {
        let content = self
            .content
            .ok_or_else(|| Error::Protocol("Summary payload has no content".to_string()))?;

        Ok(SummaryResult {
            id: self.id.unwrap_or(0),
            note_id: self.note_id.unwrap_or(note_id),
            content,
            summary_type: self
                .summary_type
                .unwrap_or_else(|| SummaryType::default().as_str().to_string()),
            length: self
                .summary_length
                .unwrap_or_else(|| defaults::AUTO_LENGTH.to_string()),
            style: self.summary_style,
            provider: self
                .ai_provider
                .unwrap_or_else(|| defaults::UNKNOWN_PROVIDER.to_string()),
            model: self.ai_model.unwrap_or_else(|| fallback_model.to_string()),
            generation_time_ms: self.generation_time_ms.unwrap_or(0),
            token_count: self.token_count.unwrap_or(0),
            compression_ratio: self.compression_ratio.unwrap_or(0.0),
            created_at: self.created_at.unwrap_or(now),
        })
    }
}

/// Wire shape of `POST /summaries/notes/{id}/async` and `GET /summaries/jobs/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncJobStatus {
    #[serde(default)]
    pub job_id: Option<String>,
    pub status: JobStatus,
    #[serde(rename = "progress", default, deserialize_with = "null_as_default")]
    pub progress_percent: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cached: bool,
    #[serde(rename = "summary", default)]
    pub result: Option<SummaryPayload>,
    #[serde(rename = "error", default)]
    pub error_message: Option<String>,
}

/// A fully-populated summary. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub id: i64,
    pub note_id: i64,
    pub content: String,
    pub summary_type: String,
    #[serde(rename = "summary_length")]
    pub length: String,
    #[serde(rename = "summary_style")]
    pub style: Option<String>,
    #[serde(rename = "ai_provider")]
    pub provider: String,
    #[serde(rename = "ai_model")]
    pub model: String,
    pub generation_time_ms: i64,
    pub token_count: i64,
    pub compression_ratio: f64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// JOB PROGRESS
// =============================================================================

/// Stage reported to progress observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStage {
    Pending,
    Processing,
    Completed,
}

/// One progress event emitted by the job orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    pub stage: JobStage,
    pub percent: f64,
    pub message: String,
}

impl JobProgress {
    pub fn new(stage: JobStage, percent: f64, message: impl Into<String>) -> Self {
        Self {
            stage,
            percent,
            message: message.into(),
        }
    }

    /// Two events describe the same transition.
    pub fn same_transition(&self, other: &JobProgress) -> bool {
        self.stage == other.stage && self.percent.round() == other.percent.round()
    }
}

// =============================================================================
// SERVICE HEALTH & SETTINGS
// =============================================================================

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Locally persisted summarization preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub default_line_count: Option<u32>,
    pub default_style: SummaryStyle,
    pub default_type: SummaryType,
}

impl UserSettings {
    /// Build a request for `note_id` from these preferences.
    pub fn request_for(&self, note_id: i64) -> SummarizationRequest {
        SummarizationRequest {
            note_id,
            line_count: self.default_line_count,
            style: self.default_style,
            summary_type: self.default_type,
            force_regenerate: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // =========================================================================
    // Identity
    // =========================================================================

    #[test]
    fn test_identity_deserializes_guest_id() {
        let identity: Identity = serde_json::from_value(json!({
            "id": 7,
            "guest_id": "g-123",
            "email": null,
            "display_name": "Guest User",
            "is_guest": true,
            "created_at": "2026-03-01T10:15:30.123456"
        }))
        .unwrap();
        assert_eq!(identity.id, 7);
        assert_eq!(identity.guest_token.as_deref(), Some("g-123"));
        assert!(identity.is_guest);
    }

    #[test]
    fn test_identity_roundtrips_through_store_format() {
        let identity: Identity = serde_json::from_value(json!({
            "id": 1,
            "is_guest": true,
            "created_at": "2026-03-01T10:15:30"
        }))
        .unwrap();
        let stored = serde_json::to_string(&identity).unwrap();
        let back: Identity = serde_json::from_str(&stored).unwrap();
        assert_eq!(back, identity);
        assert_eq!(back.display_name_or_default(), "Guest User");
    }

    #[test]
    fn test_create_user_request_guest_body() {
        let body = serde_json::to_value(CreateUserRequest::guest()).unwrap();
        assert_eq!(body, json!({"is_guest": true, "display_name": "Guest User"}));
    }

    // =========================================================================
    // Notes
    // =========================================================================

    #[test]
    fn test_note_list_item_tolerates_missing_counts() {
        let item: NoteListItem = serde_json::from_value(json!({
            "id": 3,
            "title": "Lecture",
            "source_type": "pdf",
            "char_count": 1200,
            "created_at": "2026-03-01T10:15:30"
        }))
        .unwrap();
        assert_eq!(item.source_type, SourceType::Pdf);
        assert_eq!(item.summary_count, 0);
        assert_eq!(item.content_preview, "");
    }

    #[test]
    fn test_create_note_validation() {
        assert!(CreateNoteRequest::text("t", "body").validate().is_ok());
        assert!(CreateNoteRequest::text("", "body").validate().is_err());
        assert!(CreateNoteRequest::text("t", "   ").validate().is_err());
        let long_title = "x".repeat(defaults::TITLE_MAX_LEN + 1);
        assert!(CreateNoteRequest::text(long_title, "body").validate().is_err());
    }

    #[test]
    fn test_update_note_validation_only_checks_present_fields() {
        assert!(UpdateNoteRequest::default().validate().is_ok());
        let req = UpdateNoteRequest {
            title: None,
            content: Some("  ".to_string()),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_list_query_pairs() {
        let query = ListNotesQuery {
            user_id: Some(4),
            skip: 20,
            limit: 500,
            search: Some("rust".to_string()),
        };
        let pairs = query.to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("user_id", "4".to_string()),
                ("skip", "20".to_string()),
                ("limit", "100".to_string()),
                ("search", "rust".to_string()),
            ]
        );
    }

    #[test]
    fn test_list_query_same_scope() {
        let mine = ListNotesQuery::for_user(7);
        assert!(mine.same_scope(&ListNotesQuery::for_user(7)));
        let empty_search = ListNotesQuery {
            search: Some(String::new()),
            ..ListNotesQuery::for_user(7)
        };
        assert!(mine.same_scope(&empty_search));
        let searched = ListNotesQuery {
            search: Some("rust".to_string()),
            ..ListNotesQuery::for_user(7)
        };
        assert!(!mine.same_scope(&searched));
        assert!(!mine.same_scope(&ListNotesQuery::for_user(8)));
    }

    #[test]
    fn test_cached_listing_without_query_field() {
        let listing: CachedListing = serde_json::from_value(json!({
            "items": [],
            "timestamp": "2026-03-01T10:15:30Z"
        }))
        .unwrap();
        assert!(listing.query.is_none());
    }

    #[test]
    fn test_list_query_omits_empty_search() {
        let query = ListNotesQuery {
            search: Some(String::new()),
            ..ListNotesQuery::default()
        };
        assert!(query.to_pairs().iter().all(|(k, _)| *k != "search"));
    }

    // =========================================================================
    // Summaries
    // =========================================================================

    #[test]
    fn test_summarization_request_body_excludes_note_id() {
        let req = SummarizationRequest::new(9)
            .with_line_count(5)
            .with_style(SummaryStyle::Technical)
            .with_type(SummaryType::KeyPoints);
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            json!({
                "line_count": 5,
                "summary_style": "technical",
                "summary_type": "key_points",
                "force_regenerate": false
            })
        );
    }

    #[test]
    fn test_summarization_request_null_line_count() {
        let body = serde_json::to_value(SummarizationRequest::new(1)).unwrap();
        assert!(body["line_count"].is_null());
        assert_eq!(SummarizationRequest::new(1).length_label(), "auto");
    }

    #[test]
    fn test_summarization_request_line_count_bounds() {
        assert!(SummarizationRequest::new(1).validate().is_ok());
        assert!(SummarizationRequest::new(1).with_line_count(1).validate().is_ok());
        assert!(SummarizationRequest::new(1).with_line_count(200).validate().is_ok());
        assert!(SummarizationRequest::new(1).with_line_count(0).validate().is_err());
        assert!(SummarizationRequest::new(1).with_line_count(201).validate().is_err());
    }

    #[test]
    fn test_style_and_type_from_str() {
        assert_eq!("casual".parse::<SummaryStyle>().unwrap(), SummaryStyle::Casual);
        assert_eq!(
            "flashcards".parse::<SummaryType>().unwrap(),
            SummaryType::Flashcards
        );
        assert!("loud".parse::<SummaryStyle>().is_err());
    }

    #[test]
    fn test_async_job_status_submit_response() {
        let status: AsyncJobStatus = serde_json::from_value(json!({
            "job_id": "abc",
            "status": "pending",
            "progress": 0,
            "cached": false
        }))
        .unwrap();
        assert_eq!(status.job_id.as_deref(), Some("abc"));
        assert_eq!(status.status, JobStatus::Pending);
        assert!(status.result.is_none());
    }

    #[test]
    fn test_async_job_status_poll_response_without_cached() {
        let status: AsyncJobStatus = serde_json::from_value(json!({
            "job_id": "abc",
            "status": "failed",
            "progress": null,
            "error": "boom"
        }))
        .unwrap();
        assert!(!status.cached);
        assert_eq!(status.progress_percent, 0.0);
        assert_eq!(status.error_message.as_deref(), Some("boom"));
        assert!(status.status.is_terminal());
    }

    #[test]
    fn test_normalize_fills_missing_fields() {
        let now = Utc::now();
        let payload = SummaryPayload {
            content: Some("short".to_string()),
            ..SummaryPayload::default()
        };
        let result = payload.normalize(11, "cached", now).unwrap();
        assert_eq!(result.note_id, 11);
        assert_eq!(result.provider, "unknown");
        assert_eq!(result.model, "cached");
        assert_eq!(result.generation_time_ms, 0);
        assert_eq!(result.token_count, 0);
        assert_eq!(result.compression_ratio, 0.0);
        assert_eq!(result.created_at, now);
        assert_eq!(result.length, "auto");
    }

    #[test]
    fn test_normalize_requires_content() {
        let err = SummaryPayload::default()
            .normalize(1, "unknown", Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn test_with_request_defaults_keeps_service_values() {
        let request = SummarizationRequest::new(2)
            .with_line_count(3)
            .with_style(SummaryStyle::Casual);
        let payload = SummaryPayload {
            summary_style: Some("technical".to_string()),
            ..SummaryPayload::default()
        }
        .with_request_defaults(&request);
        assert_eq!(payload.summary_style.as_deref(), Some("technical"));
        assert_eq!(payload.summary_length.as_deref(), Some("3"));
        assert_eq!(payload.summary_type.as_deref(), Some("summary"));
        assert_eq!(payload.note_id, Some(2));
    }

    #[test]
    fn test_summary_result_serializes_wire_names() {
        let result = SummaryPayload {
            content: Some("c".to_string()),
            ..SummaryPayload::default()
        }
        .normalize(1, "cached", Utc::now())
        .unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["ai_model"], "cached");
        assert_eq!(value["ai_provider"], "unknown");
        assert_eq!(value["summary_length"], "auto");
    }

    // =========================================================================
    // Progress, health, settings
    // =========================================================================

    #[test]
    fn test_progress_same_transition_rounds_percent() {
        let a = JobProgress::new(JobStage::Processing, 30.2, "a");
        let b = JobProgress::new(JobStage::Processing, 29.8, "b");
        let c = JobProgress::new(JobStage::Processing, 70.0, "c");
        assert!(a.same_transition(&b));
        assert!(!a.same_transition(&c));
    }

    #[test]
    fn test_health_status() {
        let health: HealthStatus = serde_json::from_value(json!({
            "status": "healthy",
            "app_name": "AI Note Summarizer",
            "version": "1.0.0"
        }))
        .unwrap();
        assert!(health.is_healthy());
    }

    #[test]
    fn test_user_settings_defaults_and_request() {
        let settings: UserSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, UserSettings::default());

        let settings = UserSettings {
            default_line_count: Some(8),
            default_style: SummaryStyle::Casual,
            default_type: SummaryType::Flashcards,
        };
        let req = settings.request_for(5);
        assert_eq!(req.note_id, 5);
        assert_eq!(req.line_count, Some(8));
        assert_eq!(req.summary_type, SummaryType::Flashcards);
        assert!(!req.force_regenerate);
    }
}
