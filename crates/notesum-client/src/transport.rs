//! HTTP transport with error normalization.
//!
//! Every call either yields the decoded payload or fails with a single
//! [`ServiceError`]: status 500 with the underlying message when no response
//! arrived, otherwise the server status with the body's `detail` field (or
//! the raw status line when the body has none). No retries happen here.

use std::time::{Duration, Instant};

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use notesum_core::{logging, Error, HealthStatus, Result, ServiceError};

use crate::config::ClientConfig;

/// Build the normalized error for a non-success response.
pub fn error_from_response(status: StatusCode, body: &str) -> ServiceError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| match value.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Null) | None => None,
            // Validation errors arrive as a list of objects
            Some(other) => Some(other.to_string()),
        });

    ServiceError::new(
        status.as_u16(),
        detail.unwrap_or_else(|| status_line(status)),
    )
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// HTTP client bound to one service base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_timeout(&config.api_url, config.timeout())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            component = logging::TRANSPORT,
            base_url, "Initializing API client"
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// `GET path?query` and decode the body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let req = self.request(Method::GET, path).query(query);
        self.execute(Method::GET, path, req).await
    }

    /// `POST path` with a JSON body and decode the response.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T> {
        let req = self.request(Method::POST, path).query(query).json(body);
        self.execute(Method::POST, path, req).await
    }

    /// `PUT path` with a JSON body and decode the response.
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let req = self.request(Method::PUT, path).json(body);
        self.execute(Method::PUT, path, req).await
    }

    /// `DELETE path`, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let req = self.request(Method::DELETE, path);
        self.send(Method::DELETE, path, req).await.map(|_| ())
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get("/health", &[]).await
    }

    /// Send a prepared request and decode its JSON body.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        req: RequestBuilder,
    ) -> Result<T> {
        let bytes = self.send(method, path, req).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::Protocol(format!("Unexpected response from {}: {}", path, e)))
    }

    /// Send a prepared request; non-success statuses become `ServiceError`.
    async fn send(&self, method: Method, path: &str, req: RequestBuilder) -> Result<Vec<u8>> {
        let start = Instant::now();

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(
                    component = logging::TRANSPORT,
                    %method,
                    path,
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Request failed without response"
                );
                return Err(ServiceError::transport(e.to_string()).into());
            }
        };

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceError::transport(e.to_string()))?;

        debug!(
            component = logging::TRANSPORT,
            %method,
            path,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(error_from_response(status, &text).into());
        }

        Ok(body.to_vec())
    }
}
