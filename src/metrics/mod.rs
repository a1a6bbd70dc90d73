//! Page metrics from the performance provider, normalized to a fixed record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod fallback;
mod provider;
mod response;

pub use provider::{PageSpeedClient, DEFAULT_ENDPOINT as DEFAULT_PAGESPEED_ENDPOINT};

/// Normalized page metrics for one scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsRecord {
    pub total_weight_mb: f64,
    pub total_requests: u32,
    pub js_size_kb: f64,
    pub css_size_kb: f64,
    pub image_size_kb: f64,
    pub performance_score: u8,
}

impl MetricsRecord {
    /// Transfer size not attributed to scripts, stylesheets or images.
    pub fn other_size_kb(&self) -> f64 {
        let total_kb = self.total_weight_mb * 1024.0;
        (total_kb - self.js_size_kb - self.css_size_kb - self.image_size_kb).max(0.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("PageSpeed API error ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("PageSpeed API: {0}")]
    Api(String),
    #[error("PageSpeed API request timed out")]
    Timeout,
    #[error("PageSpeed API request failed: {0}")]
    Transport(String),
    #[error("PageSpeed API returned an unreadable response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Message safe to hand back to the client.
    pub fn public_message(&self) -> String {
        match self {
            ProviderError::Status { .. } | ProviderError::Api(_) | ProviderError::Timeout => {
                self.to_string()
            }
            ProviderError::Transport(_) | ProviderError::Decode(_) => {
                "Failed to analyze the website. Please try again later.".into()
            }
        }
    }
}

#[async_trait]
pub trait MetricsProvider: Send + Sync {
    async fn fetch_metrics(&self, url: &str) -> Result<MetricsRecord, ProviderError>;
}
