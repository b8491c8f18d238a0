use crate::error::FetchResult;
use crate::models::{FilterState, Offer};
use async_trait::async_trait;

/// Anything that can answer an offers query
///
/// `None` asks for the unfiltered listing set. Failures come back as a
/// typed [`crate::error::FetchError`] so callers decide how to degrade.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferSource: Send + Sync {
    async fn try_fetch(&self, params: Option<FilterState>) -> FetchResult<Vec<Offer>>;

    /// Name used in logs
    fn source_name(&self) -> &'static str;
}
