use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::carbon::calculator::{CarbonResult, EcoRating};
use crate::metrics::MetricsRecord;

/// Row of the `scans` table.
#[derive(Debug, Clone, FromRow)]
pub struct ScanRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub url: String,
    pub total_weight_mb: f64,
    pub total_requests: i32,
    pub js_size_kb: f64,
    pub css_size_kb: f64,
    pub image_size_kb: f64,
    pub performance_score: i32,
    pub energy_kwh: f64,
    pub co2_grams: f64,
    pub eco_score: i32,
    pub rating: String,
    pub is_public: bool,
    pub created_at: OffsetDateTime,
}

/// A completed scan. `id` is `None` when the result was never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanRecord {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub url: String,
    #[serde(flatten)]
    pub metrics: MetricsRecord,
    #[serde(flatten)]
    pub carbon: CarbonResult,
    pub is_public: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<ScanRow> for ScanRecord {
    fn from(r: ScanRow) -> Self {
        let eco_score = r.eco_score.clamp(0, 100) as u8;
        // Rating is a function of the score; rebuild it if the column is off.
        let rating = r
            .rating
            .parse::<EcoRating>()
            .unwrap_or_else(|_| EcoRating::from_score(eco_score));
        Self {
            id: Some(r.id),
            user_id: r.user_id,
            url: r.url,
            metrics: MetricsRecord {
                total_weight_mb: r.total_weight_mb,
                total_requests: r.total_requests.max(0) as u32,
                js_size_kb: r.js_size_kb,
                css_size_kb: r.css_size_kb,
                image_size_kb: r.image_size_kb,
                performance_score: r.performance_score.clamp(0, 100) as u8,
            },
            carbon: CarbonResult {
                energy_kwh: r.energy_kwh,
                co2_grams: r.co2_grams,
                eco_score,
                rating,
            },
            is_public: r.is_public,
            created_at: r.created_at,
        }
    }
}

/// Values inserted for a new scan; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewScan {
    pub user_id: Uuid,
    pub url: String,
    pub metrics: MetricsRecord,
    pub carbon: CarbonResult,
    pub is_public: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(rating: &str, eco_score: i32) -> ScanRow {
        ScanRow {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            url: "https://example.com/".into(),
            total_weight_mb: 2.5,
            total_requests: 42,
            js_size_kb: 500.0,
            css_size_kb: 50.0,
            image_size_kb: 1024.0,
            performance_score: 87,
            energy_kwh: 0.001978,
            co2_grams: 0.9393,
            eco_score,
            rating: rating.into(),
            is_public: true,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn row_converts_to_record() {
        let r = row("green", 81);
        let id = r.id;
        let rec = ScanRecord::from(r);
        assert_eq!(rec.id, Some(id));
        assert_eq!(rec.metrics.total_requests, 42);
        assert_eq!(rec.carbon.rating, EcoRating::Green);
        assert_eq!(rec.carbon.eco_score, 81);
    }

    #[test]
    fn unknown_rating_is_rebuilt_from_score() {
        let rec = ScanRecord::from(row("GREEN!!", 45));
        assert_eq!(rec.carbon.rating, EcoRating::Moderate);
    }

    #[test]
    fn record_serializes_flat() {
        let rec = ScanRecord::from(row("green", 81));
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["total_weight_mb"], 2.5);
        assert_eq!(v["eco_score"], 81);
        assert_eq!(v["rating"], "green");
        assert!(v["created_at"].as_str().unwrap().contains('T'));
        assert!(v.get("metrics").is_none());
    }
}
