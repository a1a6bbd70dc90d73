use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use super::{fallback::mock_metrics, response::PageSpeedResponse, MetricsProvider, MetricsRecord, ProviderError};

pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// PageSpeed Insights client (mobile strategy, performance category only).
#[derive(Debug, Clone)]
pub struct PageSpeedClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl PageSpeedClient {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ecoscore/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }

    fn query<'a>(&'a self, url: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![("url", url), ("strategy", "mobile"), ("category", "performance")];
        if let Some(key) = self.api_key.as_deref() {
            params.push(("key", key));
        }
        params
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Transport(e.to_string())
    }
}

#[async_trait]
impl MetricsProvider for PageSpeedClient {
    #[instrument(skip(self))]
    async fn fetch_metrics(&self, url: &str) -> Result<MetricsRecord, ProviderError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&self.query(url))
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(%url, "pagespeed quota exceeded; serving fallback metrics");
            return Ok(mock_metrics(url));
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: PageSpeedResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::Decode(e.to_string())
            }
        })?;
        if let Some(message) = body.error_message() {
            return Err(ProviderError::Api(message));
        }

        let metrics = body.into_metrics();
        debug!(%url, weight_mb = metrics.total_weight_mb, requests = metrics.total_requests, "metrics fetched");
        Ok(metrics)
    }
}
