//! HTTP implementation of the lookup ports.

use cart_core::{CatalogRecord, ProductId, StockRecord};
use serde::de::DeserializeOwned;

use crate::{CatalogService, FetchError, StockService, TimeoutConfig};

/// Client for the shop API.
///
/// Serves both lookups from one base URL:
/// `GET {base}/stock/{id}` and `GET {base}/products/{id}`.
#[derive(Debug, Clone)]
pub struct HttpShopApi {
    client: reqwest::Client,
    base_url: String,
    timeouts: TimeoutConfig,
}

impl HttpShopApi {
    /// Create a client with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeouts(base_url, TimeoutConfig::default())
    }

    /// Create a client with explicit timeouts.
    pub fn with_timeouts(
        base_url: impl Into<String>,
        timeouts: TimeoutConfig,
    ) -> Result<Self, FetchError> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(FetchError::InvalidUrl(base_url));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.total)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeouts,
        })
    }

    /// The base URL requests are made against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, resource: &str, product_id: ProductId) -> String {
        format!("{}/{}/{}", self.base_url, resource, product_id)
    }

    /// GET a JSON document. `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, FetchError> {
        tracing::debug!(%url, "GET");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| FetchError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    fn transport_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeouts.total)
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl StockService for HttpShopApi {
    async fn stock(&self, product_id: ProductId) -> Result<StockRecord, FetchError> {
        let url = self.endpoint("stock", product_id);
        self.get_json(&url)
            .await?
            .ok_or(FetchError::Http { status: 404, url })
    }
}

#[async_trait::async_trait]
impl CatalogService for HttpShopApi {
    async fn product(&self, product_id: ProductId) -> Result<Option<CatalogRecord>, FetchError> {
        let url = self.endpoint("products", product_id);
        self.get_json(&url).await
    }
}
