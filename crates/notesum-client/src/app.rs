//! Wiring of the client components around one transport and one store.

use std::sync::Arc;

use tracing::info;

use notesum_core::{Clock, KeyValueStore, Result, SystemClock};

use crate::config::ClientConfig;
use crate::identity::IdentityBootstrap;
use crate::listing_cache::{ListingCache, NoteListing};
use crate::notes::NotesClient;
use crate::orchestrator::{JobOrchestrator, PollConfig};
use crate::settings::SettingsStore;
use crate::storage::FileStore;
use crate::summaries::SummariesClient;
use crate::transport::ApiClient;

/// Every client component, sharing one HTTP client, store, and clock.
pub struct Notesum {
    pub api: ApiClient,
    pub identity: IdentityBootstrap,
    pub listing: NoteListing,
    pub notes: NotesClient,
    pub summaries: SummariesClient,
    pub jobs: JobOrchestrator,
    pub settings: SettingsStore,
}

impl Notesum {
    /// Build the components on an explicit store and clock.
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let api = ApiClient::new(config)?;
        let shared = Arc::new(api.clone());

        let cache = ListingCache::with_ttl(store.clone(), clock.clone(), config.cache_ttl());

        Ok(Self {
            identity: IdentityBootstrap::new(shared.clone(), store.clone()),
            listing: NoteListing::new(shared.clone(), cache),
            notes: NotesClient::new(api.clone()),
            summaries: SummariesClient::new(api.clone(), clock.clone()),
            jobs: JobOrchestrator::new(shared, clock, PollConfig::from(config)),
            settings: SettingsStore::new(store),
            api,
        })
    }

    /// Build the components on a file store under `config.data_dir`.
    pub async fn open(config: &ClientConfig) -> Result<Self> {
        let store = FileStore::open(&config.data_dir).await?;
        info!(
            api_url = %config.api_url,
            data_dir = %config.data_dir.display(),
            "Opening notesum client"
        );
        Self::new(config, Arc::new(store), Arc::new(SystemClock))
    }
}
