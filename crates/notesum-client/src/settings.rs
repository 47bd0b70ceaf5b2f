//! Persisted summarization preferences.

use std::sync::Arc;

use tracing::warn;

use notesum_core::{get_json, logging, set_json, KeyValueStore, Result, UserSettings};

use crate::storage::storage_keys;

pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Saved settings, or defaults when none are saved or the blob is unreadable.
    pub async fn load(&self) -> UserSettings {
        match get_json::<UserSettings>(self.store.as_ref(), storage_keys::SETTINGS).await {
            Ok(Some(settings)) => settings,
            Ok(None) => UserSettings::default(),
            Err(e) => {
                warn!(
                    component = logging::SETTINGS,
                    error = %e,
                    "Ignoring unreadable settings"
                );
                UserSettings::default()
            }
        }
    }

    pub async fn save(&self, settings: &UserSettings) -> Result<()> {
        settings.request_for(0).validate()?;
        set_json(self.store.as_ref(), storage_keys::SETTINGS, settings).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.store.remove(storage_keys::SETTINGS).await
    }
}
