//! Cached, deduplicated offer queries keyed by filter state
//!
//! Every distinct request shape gets its own cache entry. A resolution is
//! only ever written back under the key it was started for, so a slow
//! response for an old filter cannot replace results for a newer one.
//! Failures never reach consumers as a separate state: they resolve to an
//! empty offer list with the reason kept in [`QuerySnapshot::error`].

pub mod key;

pub use key::QueryKey;

use crate::api::OfferSource;
use crate::error::{FetchError, FetchResult};
use crate::filters::FilterStore;
use crate::models::{FilterState, Offer};
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Nothing requested for this key yet
    Idle,
    /// First request in flight, no data yet
    Pending,
    /// At least one request resolved, successfully or not
    Success,
}

/// Result of one completed fetch
#[derive(Debug, Clone)]
pub struct Resolution {
    pub offers: Arc<Vec<Offer>>,
    pub error: Option<FetchError>,
    pub fetched_at: DateTime<Utc>,
}

impl Resolution {
    fn from_result(result: FetchResult<Vec<Offer>>) -> Self {
        let (offers, error) = match result {
            Ok(offers) => (offers, None),
            Err(e) => (Vec::new(), Some(e)),
        };

        Self {
            offers: Arc::new(offers),
            error,
            fetched_at: Utc::now(),
        }
    }
}

/// What a consumer sees for one key
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    pub key: QueryKey,
    pub status: QueryStatus,
    /// Always present; empty until the first resolution and after failures
    pub data: Arc<Vec<Offer>>,
    pub error: Option<FetchError>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub is_fetching: bool,
}

impl QuerySnapshot {
    fn idle(key: QueryKey) -> Self {
        Self {
            key,
            status: QueryStatus::Idle,
            data: Arc::new(Vec::new()),
            error: None,
            fetched_at: None,
            is_fetching: false,
        }
    }

    fn resolved(key: QueryKey, resolution: Resolution) -> Self {
        Self {
            key,
            status: QueryStatus::Success,
            data: resolution.offers,
            error: resolution.error,
            fetched_at: Some(resolution.fetched_at),
            is_fetching: false,
        }
    }
}

type SharedFetch = Shared<BoxFuture<'static, Resolution>>;

struct InFlight {
    generation: u64,
    future: SharedFetch,
}

#[derive(Default)]
struct CacheEntry {
    resolved: Option<Resolution>,
    in_flight: Option<InFlight>,
}

impl CacheEntry {
    fn snapshot(&self, key: &QueryKey) -> QuerySnapshot {
        let is_fetching = self.in_flight.is_some();
        match &self.resolved {
            Some(resolution) => QuerySnapshot {
                is_fetching,
                ..QuerySnapshot::resolved(key.clone(), resolution.clone())
            },
            None => QuerySnapshot {
                status: if is_fetching {
                    QueryStatus::Pending
                } else {
                    QueryStatus::Idle
                },
                is_fetching,
                ..QuerySnapshot::idle(key.clone())
            },
        }
    }
}

#[derive(Default)]
struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
    next_generation: u64,
}

/// Serves offer queries from an in-memory cache, fetching on a miss
pub struct QueryOrchestrator {
    source: Arc<dyn OfferSource>,
    cache: Arc<Mutex<QueryCache>>,
}

impl QueryOrchestrator {
    pub fn new(source: Arc<dyn OfferSource>) -> Self {
        Self {
            source,
            cache: Arc::new(Mutex::new(QueryCache::default())),
        }
    }

    /// Current view of `params` without triggering a request
    pub fn snapshot(&self, params: Option<&FilterState>) -> QuerySnapshot {
        let key = QueryKey::for_params(params);
        let cache = self.cache.lock();
        match cache.entries.get(&key) {
            Some(entry) => entry.snapshot(&key),
            None => QuerySnapshot::idle(key),
        }
    }

    /// Cached offers for `params`, fetching them if this key has never resolved
    ///
    /// Callers asking for a key that is already being fetched wait on that
    /// same request instead of issuing another.
    pub async fn fetch(&self, params: Option<&FilterState>) -> QuerySnapshot {
        self.run(params, false).await
    }

    /// Ask the source again even if the key is cached
    ///
    /// Joins a request already in flight for the key. The previous data
    /// stays visible through [`QueryOrchestrator::snapshot`] until the new
    /// resolution lands.
    pub async fn refresh(&self, params: Option<&FilterState>) -> QuerySnapshot {
        self.run(params, true).await
    }

    pub async fn fetch_current(&self, store: &FilterStore) -> QuerySnapshot {
        let state = store.snapshot();
        self.fetch(Some(&state)).await
    }

    /// Fetch for the current filters and again after every change
    ///
    /// Returns once the store behind `filters` has been dropped.
    pub async fn follow(
        &self,
        mut filters: watch::Receiver<FilterState>,
        mut on_update: impl FnMut(QuerySnapshot),
    ) {
        loop {
            let state = filters.borrow_and_update().clone();
            on_update(self.fetch(Some(&state)).await);

            if filters.changed().await.is_err() {
                break;
            }
        }
    }

    /// Drop the cached entry for `params`; returns whether one existed
    pub fn invalidate(&self, params: Option<&FilterState>) -> bool {
        let key = QueryKey::for_params(params);
        self.cache.lock().entries.remove(&key).is_some()
    }

    pub fn clear(&self) {
        self.cache.lock().entries.clear();
    }

    async fn run(&self, params: Option<&FilterState>, force: bool) -> QuerySnapshot {
        let key = QueryKey::for_params(params);

        let pending = {
            let mut guard = self.cache.lock();
            let QueryCache {
                entries,
                next_generation,
            } = &mut *guard;
            let entry = entries.entry(key.clone()).or_default();

            if let Some(in_flight) = &entry.in_flight {
                debug!("Joining in-flight request for {}", key);
                in_flight.future.clone()
            } else if entry.resolved.is_some() && !force {
                debug!("Cache hit for {}", key);
                return entry.snapshot(&key);
            } else {
                *next_generation += 1;
                let generation = *next_generation;
                debug!("Starting request #{} for {}", generation, key);

                let future = self.start(key.clone(), params.cloned(), generation);
                entry.in_flight = Some(InFlight {
                    generation,
                    future: future.clone(),
                });
                future
            }
        };

        QuerySnapshot::resolved(key, pending.await)
    }

    fn start(&self, key: QueryKey, params: Option<FilterState>, generation: u64) -> SharedFetch {
        let source = Arc::clone(&self.source);
        let cache = Arc::downgrade(&self.cache);

        async move {
            let resolution = Resolution::from_result(source.try_fetch(params).await);
            if let Some(e) = &resolution.error {
                debug!(
                    "{} request for {} failed ({}), serving no offers",
                    source.source_name(),
                    key,
                    e
                );
            }
            store_resolution(&cache, &key, generation, &resolution);
            resolution
        }
        .boxed()
        .shared()
    }
}

fn store_resolution(
    cache: &Weak<Mutex<QueryCache>>,
    key: &QueryKey,
    generation: u64,
    resolution: &Resolution,
) {
    let Some(cache) = cache.upgrade() else {
        return;
    };
    let mut cache = cache.lock();

    // A missing or newer entry means this key was invalidated meanwhile
    let Some(entry) = cache.entries.get_mut(key) else {
        return;
    };
    if entry.in_flight.as_ref().map(|f| f.generation) == Some(generation) {
        entry.in_flight = None;
        entry.resolved = Some(resolution.clone());
    }
}
