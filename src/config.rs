use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::metrics::DEFAULT_PAGESPEED_ENDPOINT;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// PageSpeed Insights access.
#[derive(Debug, Clone, Deserialize)]
pub struct PageSpeedConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl PageSpeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Per-IP limit on scan submissions.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub pagespeed: PageSpeedConfig,
    pub rate_limit: RateLimitConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "ecoscore".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "ecoscore-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let pagespeed = PageSpeedConfig {
            endpoint: std::env::var("PAGESPEED_API_URL")
                .unwrap_or_else(|_| DEFAULT_PAGESPEED_ENDPOINT.into()),
            api_key: std::env::var("PAGESPEED_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            timeout_secs: env_or("PAGESPEED_TIMEOUT_SECS", 60),
        };
        let rate_limit = RateLimitConfig {
            max_requests: env_or("SCAN_RATE_LIMIT", 10),
            window_secs: env_or("SCAN_RATE_WINDOW_SECS", 60),
        };
        Ok(Self {
            database_url,
            jwt,
            pagespeed,
            rate_limit,
        })
    }
}
