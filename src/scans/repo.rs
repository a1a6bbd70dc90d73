use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewScan, ScanRecord, ScanRow};

#[async_trait]
pub trait ScanStore: Send + Sync {
    async fn insert(&self, scan: NewScan) -> anyhow::Result<ScanRecord>;
    /// Newest first.
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ScanRecord>>;
    async fn find_public(&self, id: Uuid) -> anyhow::Result<Option<ScanRecord>>;
    /// Returns whether a scan owned by `user_id` was removed.
    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;
}

const SCAN_COLUMNS: &str = "id, user_id, url, total_weight_mb, total_requests, js_size_kb, \
    css_size_kb, image_size_kb, performance_score, energy_kwh, co2_grams, eco_score, rating, \
    is_public, created_at";

#[derive(Clone)]
pub struct PgScanStore {
    db: PgPool,
}

impl PgScanStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScanStore for PgScanStore {
    async fn insert(&self, scan: NewScan) -> anyhow::Result<ScanRecord> {
        let sql = format!(
            r#"
            INSERT INTO scans (user_id, url, total_weight_mb, total_requests, js_size_kb,
                               css_size_kb, image_size_kb, performance_score, energy_kwh,
                               co2_grams, eco_score, rating, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {SCAN_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ScanRow>(&sql)
            .bind(scan.user_id)
            .bind(&scan.url)
            .bind(scan.metrics.total_weight_mb)
            .bind(scan.metrics.total_requests as i32)
            .bind(scan.metrics.js_size_kb)
            .bind(scan.metrics.css_size_kb)
            .bind(scan.metrics.image_size_kb)
            .bind(i32::from(scan.metrics.performance_score))
            .bind(scan.carbon.energy_kwh)
            .bind(scan.carbon.co2_grams)
            .bind(i32::from(scan.carbon.eco_score))
            .bind(scan.carbon.rating.as_str())
            .bind(scan.is_public)
            .fetch_one(&self.db)
            .await
            .context("insert scan")?;
        Ok(row.into())
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ScanRecord>> {
        let sql = format!(
            r#"
            SELECT {SCAN_COLUMNS}
              FROM scans
             WHERE user_id = $1
             ORDER BY created_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, ScanRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await
            .context("list scans by user")?;
        Ok(rows.into_iter().map(ScanRecord::from).collect())
    }

    async fn find_public(&self, id: Uuid) -> anyhow::Result<Option<ScanRecord>> {
        let sql = format!(
            r#"
            SELECT {SCAN_COLUMNS}
              FROM scans
             WHERE id = $1 AND is_public = TRUE
            "#
        );
        let row = sqlx::query_as::<_, ScanRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find public scan")?;
        Ok(row.map(ScanRecord::from))
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM scans
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .context("delete scan")?;
        Ok(res.rows_affected() > 0)
    }
}
