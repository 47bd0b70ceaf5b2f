//! Anonymous identity bootstrap.
//!
//! Resolution order, stopping at the first success:
//!
//! 1. A persisted identity blob is returned as-is with no network call.
//! 2. A persisted guest token is looked up remotely; any failure falls
//!    through silently.
//! 3. A new guest identity is created remotely and persisted.
//!
//! Only a failure in step 3 reaches the caller. Concurrent callers share one
//! in-flight resolution: the guard is held across the whole protocol, so a
//! second caller waits and then sees the first caller's identity.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use notesum_core::{
    get_json, logging, set_json, CreateUserRequest, Error, Identity, IdentityApi, KeyValueStore,
    Result,
};

use crate::storage::storage_keys;
use crate::transport::ApiClient;

#[async_trait]
impl IdentityApi for ApiClient {
    async fn create_user(&self, request: &CreateUserRequest) -> Result<Identity> {
        self.post("/users", &[], request).await
    }

    async fn find_guest(&self, guest_token: &str) -> Result<Identity> {
        self.get(&format!("/users/guest/{}", guest_token), &[])
            .await
    }
}

/// Owner of the installation's identity lifecycle.
pub struct IdentityBootstrap {
    api: Arc<dyn IdentityApi>,
    store: Arc<dyn KeyValueStore>,
    current: Mutex<Option<Identity>>,
}

impl IdentityBootstrap {
    pub fn new(api: Arc<dyn IdentityApi>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            api,
            store,
            current: Mutex::new(None),
        }
    }

    /// Resolve the identity, creating a guest identity if necessary.
    #[instrument(skip(self))]
    pub async fn initialize_identity(&self) -> Result<Identity> {
        let mut current = self.current.lock().await;
        if let Some(ref identity) = *current {
            return Ok(identity.clone());
        }

        let identity = self.resolve().await?;
        *current = Some(identity.clone());
        Ok(identity)
    }

    /// The identity resolved so far in this process, if any.
    pub async fn current(&self) -> Option<Identity> {
        self.current.lock().await.clone()
    }

    /// Forget the identity locally. The remote service is not contacted.
    ///
    /// Both keys are removed even if the first removal fails; the first
    /// error is returned.
    #[instrument(skip(self))]
    pub async fn clear_identity(&self) -> Result<()> {
        let mut current = self.current.lock().await;
        *current = None;

        let identity_removed = self.store.remove(storage_keys::IDENTITY).await;
        let token_removed = self.store.remove(storage_keys::GUEST_TOKEN).await;
        identity_removed.and(token_removed).map_err(|e| {
            warn!(
                component = logging::IDENTITY,
                error = %e,
                "Identity only partially cleared"
            );
            e
        })?;

        info!(component = logging::IDENTITY, "Identity cleared");
        Ok(())
    }

    async fn resolve(&self) -> Result<Identity> {
        if let Some(identity) = self.load_identity().await {
            debug!(
                component = logging::IDENTITY,
                user_id = identity.id,
                "Using persisted identity"
            );
            return Ok(identity);
        }

        if let Some(token) = self.load_guest_token().await {
            match self.api.find_guest(&token).await {
                Ok(identity) => {
                    let persisted =
                        set_json(self.store.as_ref(), storage_keys::IDENTITY, &identity).await;
                    if let Err(e) = persisted {
                        warn!(
                            component = logging::IDENTITY,
                            error = %e,
                            "Failed to persist recovered identity"
                        );
                    }
                    info!(
                        component = logging::IDENTITY,
                        user_id = identity.id,
                        "Recovered guest identity from token"
                    );
                    return Ok(identity);
                }
                Err(e) => {
                    warn!(
                        component = logging::IDENTITY,
                        error = %e,
                        "Guest token lookup failed, creating a new identity"
                    );
                }
            }
        }

        self.create_guest().await
    }

    async fn create_guest(&self) -> Result<Identity> {
        let identity = self
            .api
            .create_user(&CreateUserRequest::guest())
            .await
            .map_err(|e| Error::IdentityInit(e.to_string()))?;

        if let Some(ref token) = identity.guest_token {
            set_json(self.store.as_ref(), storage_keys::GUEST_TOKEN, token)
                .await
                .map_err(|e| Error::IdentityInit(e.to_string()))?;
        }
        set_json(self.store.as_ref(), storage_keys::IDENTITY, &identity)
            .await
            .map_err(|e| Error::IdentityInit(e.to_string()))?;

        info!(
            component = logging::IDENTITY,
            user_id = identity.id,
            "Created guest identity"
        );
        Ok(identity)
    }

    /// Persisted identity; unreadable or invalid blobs count as absent.
    async fn load_identity(&self) -> Option<Identity> {
        match get_json::<Identity>(self.store.as_ref(), storage_keys::IDENTITY).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(
                    component = logging::IDENTITY,
                    error = %e,
                    "Ignoring invalid persisted identity"
                );
                None
            }
        }
    }

    async fn load_guest_token(&self) -> Option<String> {
        match get_json::<String>(self.store.as_ref(), storage_keys::GUEST_TOKEN).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(
                    component = logging::IDENTITY,
                    error = %e,
                    "Ignoring invalid persisted guest token"
                );
                None
            }
        }
    }
}
