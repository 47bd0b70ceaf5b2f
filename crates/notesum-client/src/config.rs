//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use notesum_core::defaults;

/// Configuration shared by every client component.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the remote service, including the `/api` prefix.
    pub api_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Wait between job-status polls in milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum number of job-status polls.
    pub poll_max_attempts: u32,
    /// Listing cache freshness window in seconds.
    pub cache_ttl_secs: u64,
    /// Directory holding the file-backed key/value store.
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::API_URL.to_string(),
            timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            poll_interval_ms: defaults::JOB_POLL_INTERVAL_MS,
            poll_max_attempts: defaults::JOB_POLL_MAX_ATTEMPTS,
            cache_ttl_secs: defaults::LISTING_CACHE_TTL_SECS,
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("notesum"))
        .unwrap_or_else(|| PathBuf::from(".notesum"))
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl ClientConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `NOTESUM_API_URL` | `http://localhost:8000/api` | Remote service base URL |
    /// | `NOTESUM_TIMEOUT_SECS` | `30` | Per-request HTTP timeout |
    /// | `NOTESUM_POLL_INTERVAL_MS` | `2000` | Wait between job polls |
    /// | `NOTESUM_POLL_MAX_ATTEMPTS` | `180` | Job poll attempt bound |
    /// | `NOTESUM_CACHE_TTL_SECS` | `300` | Listing cache freshness window |
    /// | `NOTESUM_DATA_DIR` | platform data dir | Local store directory |
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            api_url: std::env::var("NOTESUM_API_URL").unwrap_or(base.api_url),
            timeout_secs: env_parse("NOTESUM_TIMEOUT_SECS")
                .unwrap_or(base.timeout_secs)
                .max(1),
            poll_interval_ms: env_parse("NOTESUM_POLL_INTERVAL_MS").unwrap_or(base.poll_interval_ms),
            poll_max_attempts: env_parse("NOTESUM_POLL_MAX_ATTEMPTS")
                .unwrap_or(base.poll_max_attempts)
                .max(1),
            cache_ttl_secs: env_parse("NOTESUM_CACHE_TTL_SECS").unwrap_or(base.cache_ttl_secs),
            data_dir: std::env::var("NOTESUM_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(base.data_dir),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn with_poll_max_attempts(mut self, attempts: u32) -> Self {
        self.poll_max_attempts = attempts;
        self
    }

    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
