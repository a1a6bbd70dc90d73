use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::{
    dto::{ScanDetails, ScanSummary},
    rate_limit::RateLimiter,
    repo::ScanStore,
    repo_types::{NewScan, ScanRecord},
    validation::validate_scan_url,
    ScanError,
};
use crate::carbon::calculator::calculate;
use crate::metrics::MetricsProvider;

/// Runs a scan end to end: limits, validation, metrics, carbon estimate,
/// and storage for signed-in users.
pub struct ScanOrchestrator {
    rate_limiter: RateLimiter,
    metrics: Arc<dyn MetricsProvider>,
    store: Arc<dyn ScanStore>,
}

impl ScanOrchestrator {
    pub fn new(
        rate_limiter: RateLimiter,
        metrics: Arc<dyn MetricsProvider>,
        store: Arc<dyn ScanStore>,
    ) -> Self {
        Self {
            rate_limiter,
            metrics,
            store,
        }
    }

    /// Cheapest checks run first; nothing leaves the process until the
    /// request has passed the limiter and every URL check.
    #[instrument(skip(self))]
    pub async fn submit_scan(
        &self,
        url: &str,
        requester_ip: &str,
        user_id: Option<Uuid>,
    ) -> Result<ScanRecord, ScanError> {
        self.rate_limiter.check(requester_ip).await?;

        let url = url.trim();
        validate_scan_url(url)?;

        let metrics = self.metrics.fetch_metrics(url).await?;
        let carbon = calculate(metrics.total_weight_mb);

        let transient = ScanRecord {
            id: None,
            user_id,
            url: url.to_string(),
            metrics: metrics.clone(),
            carbon,
            is_public: true,
            created_at: OffsetDateTime::now_utc(),
        };

        let Some(user_id) = user_id else {
            info!(%url, eco_score = carbon.eco_score, "anonymous scan completed");
            return Ok(transient);
        };

        let new_scan = NewScan {
            user_id,
            url: url.to_string(),
            metrics,
            carbon,
            is_public: true,
        };
        match self.store.insert(new_scan).await {
            Ok(saved) => {
                info!(scan_id = ?saved.id, %user_id, eco_score = carbon.eco_score, "scan saved");
                Ok(saved)
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), %user_id, %url, "failed to save scan; returning unsaved result");
                Ok(transient)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn list_scans(&self, user_id: Uuid) -> Result<Vec<ScanRecord>, ScanError> {
        self.store
            .list_by_user(user_id)
            .await
            .map_err(ScanError::Storage)
    }

    #[instrument(skip(self))]
    pub async fn scan_summary(&self, user_id: Uuid) -> Result<ScanSummary, ScanError> {
        let scans = self.list_scans(user_id).await?;
        Ok(ScanSummary::from_scans(&scans))
    }

    #[instrument(skip(self))]
    pub async fn delete_scan(&self, user_id: Uuid, scan_id: Uuid) -> Result<(), ScanError> {
        let deleted = self
            .store
            .delete_owned(scan_id, user_id)
            .await
            .map_err(ScanError::Storage)?;
        if !deleted {
            return Err(ScanError::NotFound);
        }
        info!(%scan_id, %user_id, "scan deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn public_scan(&self, scan_id: Uuid) -> Result<ScanDetails, ScanError> {
        let scan = self
            .store
            .find_public(scan_id)
            .await
            .map_err(ScanError::Storage)?
            .ok_or(ScanError::NotFound)?;
        Ok(ScanDetails::from_record(scan))
    }
}
