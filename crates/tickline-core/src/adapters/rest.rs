use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::data_source::{HistoricalPayload, MarketDataSource, SnapshotPayload};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{ClientConfig, DateWindow, LoadError, Symbol};

/// JSON-over-HTTP market backend (`/stock`, `/historical`, `/suggestions`).
#[derive(Clone)]
pub struct RestMarketSource {
    http_client: Arc<dyn HttpClient>,
    config: ClientConfig,
}

impl Default for RestMarketSource {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl RestMarketSource {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(config: ClientConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn stock_url(&self, symbol: &Symbol) -> String {
        self.config
            .api_url(&format!("stock/{}", urlencoding::encode(symbol.as_str())))
    }

    fn historical_url(&self, symbol: &Symbol, window: &DateWindow) -> String {
        self.config.api_url(&format!(
            "historical/{}?startDate={}&endDate={}",
            urlencoding::encode(symbol.as_str()),
            window.start_param(),
            window.end_param()
        ))
    }

    fn suggestions_url(&self, prefix: &str) -> String {
        self.config
            .api_url(&format!("suggestions/{}", urlencoding::encode(prefix)))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, LoadError> {
        debug!(%url, "issuing market request");
        let request = HttpRequest::get(&url).with_timeout_ms(self.config.request_timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|e| {
            LoadError::network(format!("market request to {url} failed: {}", e.message()))
        })?;

        if !response.is_success() {
            return Err(LoadError::network(format!(
                "market backend returned status {} for {url}",
                response.status
            )));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            LoadError::data_unavailable(format!("failed to decode response from {url}: {e}"))
        })
    }
}

impl MarketDataSource for RestMarketSource {
    fn snapshot<'a>(
        &'a self,
        symbol: Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<SnapshotPayload, LoadError>> + Send + 'a>> {
        Box::pin(async move { self.get_json(self.stock_url(&symbol)).await })
    }

    fn historical<'a>(
        &'a self,
        symbol: Symbol,
        window: DateWindow,
    ) -> Pin<Box<dyn Future<Output = Result<HistoricalPayload, LoadError>> + Send + 'a>> {
        Box::pin(async move { self.get_json(self.historical_url(&symbol, &window)).await })
    }

    fn suggestions<'a>(
        &'a self,
        prefix: String,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, LoadError>> + Send + 'a>> {
        Box::pin(async move {
            if prefix.trim().is_empty() {
                return Ok(Vec::new());
            }
            self.get_json(self.suggestions_url(&prefix)).await
        })
    }
}
