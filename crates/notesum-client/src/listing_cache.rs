//! Staleness-bounded note listing cache and the listing refresh path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use notesum_core::{
    defaults, get_json, logging, set_json, CachedListing, Clock, Error, KeyValueStore,
    ListNotesQuery, NoteListApi, NoteListItem, Result, ServiceError,
};

use crate::storage::storage_keys;
use crate::transport::ApiClient;

#[async_trait]
impl NoteListApi for ApiClient {
    async fn list_notes(&self, query: &ListNotesQuery) -> Result<Vec<NoteListItem>> {
        self.get("/notes", &query.to_pairs()).await
    }
}

/// Last successful note listing, served only while fresh.
pub struct ListingCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
}

impl ListingCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(
            store,
            clock,
            Duration::from_secs(defaults::LISTING_CACHE_TTL_SECS),
        )
    }

    pub fn with_ttl(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            store,
            clock,
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Cached items if younger than the freshness window, otherwise empty.
    ///
    /// Ignores which query stored the items; see `get_cached_for`.
    pub async fn get_cached(&self) -> Vec<NoteListItem> {
        self.load_fresh()
            .await
            .map(|listing| listing.items)
            .unwrap_or_default()
    }

    /// Fresh cached items stored by a query with the same scope as `query`.
    pub async fn get_cached_for(&self, query: &ListNotesQuery) -> Vec<NoteListItem> {
        match self.load_fresh().await {
            Some(listing) if listing.query.as_ref().is_some_and(|q| q.same_scope(query)) => {
                listing.items
            }
            Some(_) => {
                debug!(
                    component = logging::LISTING_CACHE,
                    "Listing cache holds a different query"
                );
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Replace the cached listing, stamped with the current time.
    pub async fn set_cached(&self, items: &[NoteListItem]) -> Result<()> {
        self.store_listing(items, None).await
    }

    /// Replace the cached listing with the result of `query`.
    pub async fn set_cached_for(
        &self,
        query: &ListNotesQuery,
        items: &[NoteListItem],
    ) -> Result<()> {
        self.store_listing(items, Some(query.clone())).await
    }

    async fn store_listing(
        &self,
        items: &[NoteListItem],
        query: Option<ListNotesQuery>,
    ) -> Result<()> {
        let listing = CachedListing {
            items: items.to_vec(),
            timestamp: self.clock.now(),
            query,
        };
        set_json(self.store.as_ref(), storage_keys::NOTES_CACHE, &listing).await
    }

    /// The stored listing if it is younger than the window and not from the future.
    async fn load_fresh(&self) -> Option<CachedListing> {
        let listing =
            match get_json::<CachedListing>(self.store.as_ref(), storage_keys::NOTES_CACHE).await {
                Ok(listing) => listing?,
                Err(e) => {
                    warn!(
                        component = logging::LISTING_CACHE,
                        error = %e,
                        "Ignoring unreadable listing cache"
                    );
                    return None;
                }
            };

        let age = self.clock.now() - listing.timestamp;
        if age >= chrono::Duration::zero() && age < self.ttl {
            Some(listing)
        } else {
            debug!(
                component = logging::LISTING_CACHE,
                age_secs = age.num_seconds(),
                "Listing cache is stale"
            );
            None
        }
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(storage_keys::NOTES_CACHE).await
    }
}

/// Where a listing came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingSource {
    /// Fresh from the remote service.
    Live,
    /// From the local cache because the remote call failed.
    Cache { error: ServiceError },
}

/// Result of a listing refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub items: Vec<NoteListItem>,
    pub source: ListingSource,
}

impl Listing {
    pub fn is_stale_fallback(&self) -> bool {
        matches!(self.source, ListingSource::Cache { .. })
    }
}

/// Live listing with the cache as a degraded-mode fallback.
pub struct NoteListing {
    api: Arc<dyn NoteListApi>,
    cache: ListingCache,
}

impl NoteListing {
    pub fn new(api: Arc<dyn NoteListApi>, cache: ListingCache) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &ListingCache {
        &self.cache
    }

    /// Fetch the live listing, falling back to the cache on service failure.
    ///
    /// A successful live call always overwrites the cache. The fallback only
    /// serves items stored by a query with the same scope.
    #[instrument(skip(self))]
    pub async fn refresh(&self, query: &ListNotesQuery) -> Result<Listing> {
        match self.api.list_notes(query).await {
            Ok(items) => {
                if let Err(e) = self.cache.set_cached_for(query, &items).await {
                    warn!(
                        component = logging::LISTING_CACHE,
                        error = %e,
                        "Failed to update listing cache"
                    );
                }
                debug!(
                    component = logging::LISTING_CACHE,
                    result_count = items.len(),
                    "Listing refreshed from service"
                );
                Ok(Listing {
                    items,
                    source: ListingSource::Live,
                })
            }
            Err(Error::Service(error)) => {
                let items = self.cache.get_cached_for(query).await;
                warn!(
                    component = logging::LISTING_CACHE,
                    status = error.status,
                    error = %error,
                    result_count = items.len(),
                    "Listing unavailable, serving cache"
                );
                Ok(Listing {
                    items,
                    source: ListingSource::Cache { error },
                })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use chrono::{DateTime, Utc};
    use notesum_core::SourceType;

    use crate::storage::MemoryStore;

    /// Clock advanced by hand.
    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn new() -> Self {
            Self(Mutex::new(Utc::now()))
        }

        fn advance(&self, by: chrono::Duration) {
            *self.0.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn item(id: i64) -> NoteListItem {
        NoteListItem {
            id,
            title: format!("Note {id}"),
            source_type: SourceType::Text,
            char_count: 10,
            created_at: DateTime::from_timestamp(1_772_000_000, 0).unwrap(),
            summary_count: 0,
            content_preview: "preview".to_string(),
        }
    }

    /// Replays results in order, then empty listings.
    struct FakeListApi {
        results: Mutex<VecDeque<Result<Vec<NoteListItem>>>>,
    }

    impl FakeListApi {
        fn returning(result: Result<Vec<NoteListItem>>) -> Self {
            Self {
                results: Mutex::new(VecDeque::from([result])),
            }
        }

        fn then(self, result: Result<Vec<NoteListItem>>) -> Self {
            self.results.lock().unwrap().push_back(result);
            self
        }
    }

    #[async_trait]
    impl NoteListApi for FakeListApi {
        async fn list_notes(&self, _query: &ListNotesQuery) -> Result<Vec<NoteListItem>> {
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn cache_with(clock: Arc<ManualClock>) -> (ListingCache, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (ListingCache::new(store.clone(), clock), store)
    }

    #[tokio::test]
    async fn test_set_then_get_returns_items() {
        let clock = Arc::new(ManualClock::new());
        let (cache, _) = cache_with(clock);
        let items = vec![item(1), item(2)];
        cache.set_cached(&items).await.unwrap();
        assert_eq!(cache.get_cached().await, items);
    }

    #[tokio::test]
    async fn test_stale_cache_is_empty() {
        let clock = Arc::new(ManualClock::new());
        let (cache, _) = cache_with(clock.clone());
        cache.set_cached(&[item(1)]).await.unwrap();

        clock.advance(chrono::Duration::seconds(299));
        assert_eq!(cache.get_cached().await.len(), 1);

        clock.advance(chrono::Duration::seconds(1));
        assert!(cache.get_cached().await.is_empty());
    }

    #[tokio::test]
    async fn test_future_timestamp_is_stale() {
        let clock = Arc::new(ManualClock::new());
        let (cache, _) = cache_with(clock.clone());
        cache.set_cached(&[item(1)]).await.unwrap();

        // Wall clock stepped backwards after the write
        clock.advance(chrono::Duration::minutes(-10));
        assert!(cache.get_cached().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_cached_for_requires_same_query() {
        let clock = Arc::new(ManualClock::new());
        let (cache, _) = cache_with(clock);
        let searched = ListNotesQuery {
            search: Some("rust".to_string()),
            ..ListNotesQuery::for_user(7)
        };
        cache.set_cached_for(&searched, &[item(9)]).await.unwrap();

        assert_eq!(cache.get_cached_for(&searched).await, vec![item(9)]);
        assert!(cache.get_cached_for(&ListNotesQuery::for_user(7)).await.is_empty());
        assert!(cache.get_cached_for(&ListNotesQuery::for_user(8)).await.is_empty());
    }

    #[tokio::test]
    async fn test_unscoped_listing_is_not_a_refresh_fallback() {
        let clock = Arc::new(ManualClock::new());
        let (cache, _) = cache_with(clock);
        cache.set_cached(&[item(1)]).await.unwrap();

        assert_eq!(cache.get_cached().await.len(), 1);
        assert!(cache.get_cached_for(&ListNotesQuery::default()).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty() {
        let clock = Arc::new(ManualClock::new());
        let (cache, _) = cache_with(clock);
        assert!(cache.get_cached().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_blob_returns_empty() {
        let clock = Arc::new(ManualClock::new());
        let (cache, store) = cache_with(clock);
        store
            .set(storage_keys::NOTES_CACHE, "{\"items\": 3}")
            .await
            .unwrap();
        assert!(cache.get_cached().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_blob() {
        let clock = Arc::new(ManualClock::new());
        let (cache, store) = cache_with(clock);
        cache.set_cached(&[item(1)]).await.unwrap();
        cache.clear().await.unwrap();
        assert!(store.get(storage_keys::NOTES_CACHE).await.unwrap().is_none());
        assert!(cache.get_cached().await.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_live_overwrites_cache() {
        let clock = Arc::new(ManualClock::new());
        let (cache, _) = cache_with(clock);
        cache.set_cached(&[item(1)]).await.unwrap();

        let api = Arc::new(FakeListApi::returning(Ok(vec![item(2), item(3)])));
        let listing = NoteListing::new(api, cache);
        let result = listing.refresh(&ListNotesQuery::default()).await.unwrap();

        assert_eq!(result.source, ListingSource::Live);
        assert_eq!(result.items.len(), 2);
        let cached: Vec<i64> = listing.cache().get_cached().await.iter().map(|i| i.id).collect();
        assert_eq!(cached, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_refresh_falls_back_to_fresh_cache() {
        let clock = Arc::new(ManualClock::new());
        let (cache, _) = cache_with(clock);
        cache
            .set_cached_for(&ListNotesQuery::default(), &[item(1)])
            .await
            .unwrap();

        let api = Arc::new(FakeListApi::returning(Err(
            ServiceError::transport("connection refused").into(),
        )));
        let listing = NoteListing::new(api, cache);
        let result = listing.refresh(&ListNotesQuery::default()).await.unwrap();

        assert!(result.is_stale_fallback());
        assert_eq!(result.items, vec![item(1)]);
        match result.source {
            ListingSource::Cache { error } => assert_eq!(error.status, 500),
            ListingSource::Live => panic!("expected cache fallback"),
        }
    }

    #[tokio::test]
    async fn test_refresh_fallback_with_stale_cache_is_empty() {
        let clock = Arc::new(ManualClock::new());
        let (cache, _) = cache_with(clock.clone());
        cache
            .set_cached_for(&ListNotesQuery::default(), &[item(1)])
            .await
            .unwrap();
        clock.advance(chrono::Duration::minutes(6));

        let api = Arc::new(FakeListApi::returning(Err(
            ServiceError::new(503, "unavailable").into(),
        )));
        let listing = NoteListing::new(api, cache);
        let result = listing.refresh(&ListNotesQuery::default()).await.unwrap();

        assert!(result.is_stale_fallback());
        assert!(result.items.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_fallback_ignores_other_query() {
        let clock = Arc::new(ManualClock::new());
        let (cache, _) = cache_with(clock);
        let searched = ListNotesQuery {
            search: Some("rust".to_string()),
            ..ListNotesQuery::for_user(7)
        };
        let api = Arc::new(
            FakeListApi::returning(Ok(vec![item(9)]))
                .then(Err(ServiceError::new(503, "unavailable").into()))
                .then(Err(ServiceError::new(503, "unavailable").into())),
        );
        let listing = NoteListing::new(api, cache);

        let live = listing.refresh(&searched).await.unwrap();
        assert_eq!(live.source, ListingSource::Live);

        let other_user = listing.refresh(&ListNotesQuery::for_user(8)).await.unwrap();
        assert!(other_user.is_stale_fallback());
        assert!(other_user.items.is_empty());

        let same_query = listing.refresh(&searched).await.unwrap();
        assert!(same_query.is_stale_fallback());
        assert_eq!(same_query.items, vec![item(9)]);
    }

    #[tokio::test]
    async fn test_refresh_propagates_protocol_errors() {
        let clock = Arc::new(ManualClock::new());
        let (cache, _) = cache_with(clock);
        let api = Arc::new(FakeListApi::returning(Err(Error::Protocol(
            "Unexpected response from /notes".to_string(),
        ))));
        let listing = NoteListing::new(api, cache);
        assert!(listing.refresh(&ListNotesQuery::default()).await.is_err());
    }
}
