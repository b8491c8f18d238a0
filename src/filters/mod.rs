pub mod params;
pub mod storage;

pub use params::{serialize_params, to_query_string, QueryParams};
pub use storage::{FileStorage, MemoryStorage, StateStorage};

use crate::models::FilterState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Name of the durable record holding the filter snapshot
pub const STORE_NAME: &str = "offer-filters";

/// Bumped whenever the persisted layout changes; older records are discarded
pub const STORE_VERSION: u32 = 0;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedFilters {
    state: FilterState,
    version: u32,
}

/// Holds the current filters and mirrors every change to durable storage
///
/// Each setter replaces one field and then writes the whole state as a
/// single record, so a restart always sees a complete snapshot. Consumers
/// that need to react to edits call [`FilterStore::subscribe`].
pub struct FilterStore {
    state: watch::Sender<FilterState>,
    storage: Arc<dyn StateStorage>,
    name: String,
}

impl FilterStore {
    /// Load the filter record from `storage`, or start from defaults
    pub fn open(storage: Arc<dyn StateStorage>) -> Self {
        Self::open_named(STORE_NAME, storage)
    }

    /// Same as [`FilterStore::open`] with a custom record name
    pub fn open_named(name: impl Into<String>, storage: Arc<dyn StateStorage>) -> Self {
        let name = name.into();
        let initial = hydrate(&name, storage.as_ref());
        let (state, _) = watch::channel(initial);

        Self {
            state,
            storage,
            name,
        }
    }

    pub fn snapshot(&self) -> FilterState {
        self.state.borrow().clone()
    }

    pub fn location(&self) -> Option<String> {
        self.state.borrow().location.clone()
    }

    pub fn price(&self) -> Option<f64> {
        self.state.borrow().price
    }

    pub fn rooms(&self) -> Option<u32> {
        self.state.borrow().rooms
    }

    pub fn exclude(&self) -> Option<bool> {
        self.state.borrow().exclude
    }

    pub fn set_location(&self, location: Option<String>) {
        self.update(|state| state.location = location);
    }

    pub fn set_price(&self, price: Option<f64>) {
        self.update(|state| state.price = price);
    }

    pub fn set_rooms(&self, rooms: Option<u32>) {
        self.update(|state| state.rooms = rooms);
    }

    pub fn set_exclude(&self, exclude: Option<bool>) {
        self.update(|state| state.exclude = exclude);
    }

    /// Put every field back to its default value
    pub fn reset(&self) {
        self.update(|state| *state = FilterState::default());
    }

    /// Receive the latest state after every mutation
    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.state.subscribe()
    }

    fn update(&self, mutate: impl FnOnce(&mut FilterState)) {
        // Persist while the channel is locked so records land in mutation order.
        // Edits therefore block on the storage write.
        self.state.send_modify(|state| {
            mutate(state);
            self.persist(state);
        });
    }

    fn persist(&self, state: &FilterState) {
        let record = PersistedFilters {
            state: state.clone(),
            version: STORE_VERSION,
        };

        let result = serde_json::to_value(&record)
            .map_err(anyhow::Error::from)
            .and_then(|value| self.storage.save(&self.name, &value));

        match result {
            Ok(()) => debug!("Persisted filters: {:?}", state),
            Err(e) => warn!("Failed to persist filters to {}: {:#}", self.name, e),
        }
    }
}

fn hydrate(name: &str, storage: &dyn StateStorage) -> FilterState {
    let value = match storage.load(name) {
        Ok(Some(value)) => value,
        Ok(None) => {
            debug!("No stored filters under {}, using defaults", name);
            return FilterState::default();
        }
        Err(e) => {
            warn!("Failed to load stored filters from {}: {:#}", name, e);
            return FilterState::default();
        }
    };

    match serde_json::from_value::<PersistedFilters>(value) {
        Ok(record) if record.version == STORE_VERSION => record.state,
        Ok(record) => {
            warn!(
                "Discarding stored filters with version {} (expected {})",
                record.version, STORE_VERSION
            );
            FilterState::default()
        }
        Err(e) => {
            warn!("Discarding unreadable stored filters: {}", e);
            FilterState::default()
        }
    }
}
