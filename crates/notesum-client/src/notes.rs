//! Note endpoints.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::{info, instrument};

use notesum_core::{
    logging, CreateNoteRequest, Error, ListNotesQuery, Note, NoteListItem, NoteListApi, Result,
    UpdateNoteRequest,
};

use crate::transport::ApiClient;

fn user_query(user_id: Option<i64>) -> Vec<(&'static str, String)> {
    user_id
        .map(|id| vec![("user_id", id.to_string())])
        .unwrap_or_default()
}

fn validate_pdf_name(filename: &str) -> Result<()> {
    if filename.to_ascii_lowercase().ends_with(".pdf") {
        Ok(())
    } else {
        Err(Error::InvalidInput(
            "Only PDF files are supported".to_string(),
        ))
    }
}

/// CRUD operations on notes.
#[derive(Debug, Clone)]
pub struct NotesClient {
    api: ApiClient,
}

impl NotesClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// One page of the live listing. No caching; see `NoteListing`.
    pub async fn list(&self, query: &ListNotesQuery) -> Result<Vec<NoteListItem>> {
        self.api.list_notes(query).await
    }

    pub async fn get(&self, note_id: i64) -> Result<Note> {
        self.api.get(&format!("/notes/{}", note_id), &[]).await
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create(&self, request: &CreateNoteRequest, user_id: Option<i64>) -> Result<Note> {
        request.validate()?;
        let note: Note = self.api.post("/notes", &user_query(user_id), request).await?;
        info!(
            component = logging::NOTES,
            note_id = note.id,
            char_count = note.char_count,
            "Note created"
        );
        Ok(note)
    }

    pub async fn update(&self, note_id: i64, request: &UpdateNoteRequest) -> Result<Note> {
        request.validate()?;
        self.api.put(&format!("/notes/{}", note_id), request).await
    }

    pub async fn delete(&self, note_id: i64) -> Result<()> {
        self.api.delete(&format!("/notes/{}", note_id)).await
    }

    /// Upload PDF bytes; the service extracts the text into a new note.
    ///
    /// Without a title the service derives one from the file name.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_pdf(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        title: Option<&str>,
        user_id: Option<i64>,
    ) -> Result<Note> {
        validate_pdf_name(filename)?;

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let mut query = user_query(user_id);
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            query.push(("title", title.to_string()));
        }

        let path = "/notes/upload/pdf";
        let req = self
            .api
            .request(Method::POST, path)
            .query(&query)
            .multipart(form);
        let note: Note = self.api.execute(Method::POST, path, req).await?;
        info!(
            component = logging::NOTES,
            note_id = note.id,
            filename,
            "PDF note uploaded"
        );
        Ok(note)
    }

    /// Read a PDF from disk and upload it.
    pub async fn upload_pdf_file(
        &self,
        path: &Path,
        title: Option<&str>,
        user_id: Option<i64>,
    ) -> Result<Note> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidInput(format!("not a file path: {}", path.display())))?;
        validate_pdf_name(filename)?;
        let bytes = tokio::fs::read(path).await?;
        self.upload_pdf(filename, bytes, title, user_id).await
    }
}
