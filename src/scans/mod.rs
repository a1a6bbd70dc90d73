mod dto;
pub mod handlers;
pub mod rate_limit;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod validation;

use crate::metrics::ProviderError;
use crate::state::AppState;
use axum::Router;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("{0}")]
    InvalidUrl(String),
    #[error("Scanning private or internal URLs is not allowed.")]
    PrivateAddressBlocked,
    #[error("Rate limit exceeded. Try again in a minute.")]
    RateLimited,
    #[error("Scan not found")]
    NotFound,
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),
}

pub fn router() -> Router<AppState> {
    handlers::scan_routes()
}
