use crate::api::traits::OfferSource;
use crate::config::ClientConfig;
use crate::error::{FetchError, FetchResult};
use crate::filters::{serialize_params, to_query_string};
use crate::models::{FilterState, Offer};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, info, warn};

/// HTTP client for the offers backend
pub struct OfferClient {
    client: Client,
    config: ClientConfig,
}

impl OfferClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("offer-scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// URL queried for `params`
    ///
    /// Present params always produce a query string, even an empty one;
    /// absent params hit the bare `/offers` resource.
    pub fn request_url(&self, params: Option<&FilterState>) -> Url {
        let mut url = self.config.offers_url();
        if let Some(state) = params {
            let query = to_query_string(&serialize_params(state));
            url.set_query(Some(&query));
        }
        url
    }

    /// Fetch offers, returning an empty list on any failure
    pub async fn fetch(&self, params: Option<&FilterState>) -> Vec<Offer> {
        self.try_fetch(params.cloned()).await.unwrap_or_default()
    }

    async fn request(&self, url: &Url) -> FetchResult<Vec<Offer>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Transport {
            message: e.to_string(),
        })?;
        debug!("Downloaded {} bytes of offers", body.len());

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl OfferSource for OfferClient {
    async fn try_fetch(&self, params: Option<FilterState>) -> FetchResult<Vec<Offer>> {
        let url = self.request_url(params.as_ref());
        debug!("Fetching URL: {}", url);

        match self.request(&url).await {
            Ok(offers) => {
                info!("Fetched {} offers from {}", offers.len(), url);
                Ok(offers)
            }
            Err(e) => {
                warn!("{} (GET {}), showing no offers", e, url);
                Err(e)
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "offers-api"
    }
}
