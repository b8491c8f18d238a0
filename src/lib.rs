//! Browse scraped real-estate offers through persisted filters
//!
//! Filters live in a [`filters::FilterStore`] that survives restarts. The
//! [`query::QueryOrchestrator`] turns the current filters into cached,
//! deduplicated requests against the offers backend via
//! [`api::OfferClient`].

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod models;
pub mod query;

pub use api::{OfferClient, OfferSource};
pub use error::{ConfigError, FetchError, FetchResult};
pub use filters::{FilterStore, StateStorage};
pub use models::{FilterState, Offer};
pub use query::{QueryKey, QueryOrchestrator, QuerySnapshot, QueryStatus};
