use serde::{Deserialize, Serialize};

use super::repo_types::ScanRecord;
use crate::carbon::{
    benchmarks::{position, BenchmarkPosition},
    calculator::{round_to, EcoRating},
    format::DisplaySummary,
};

#[derive(Debug, Deserialize)]
pub struct SubmitScanRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteScanQuery {
    pub id: Option<String>,
}

/// A stored scan with everything a result page shows next to it.
#[derive(Debug, Serialize)]
pub struct ScanDetails {
    pub scan: ScanRecord,
    pub other_size_kb: f64,
    pub benchmark: BenchmarkPosition,
    pub display: DisplaySummary,
}

/// Per-account totals for the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    pub total_scans: usize,
    pub avg_eco_score: u8,
    pub avg_rating: EcoRating,
}

impl ScanSummary {
    /// An empty history averages to 0, which rates heavy.
    pub fn from_scans(scans: &[ScanRecord]) -> Self {
        let total_scans = scans.len();
        let avg_eco_score = if total_scans == 0 {
            0
        } else {
            let sum: u32 = scans.iter().map(|s| u32::from(s.carbon.eco_score)).sum();
            (f64::from(sum) / total_scans as f64).round() as u8
        };
        Self {
            total_scans,
            avg_eco_score,
            avg_rating: EcoRating::from_score(avg_eco_score),
        }
    }
}

impl ScanDetails {
    pub fn from_record(scan: ScanRecord) -> Self {
        let other_size_kb = round_to(scan.metrics.other_size_kb(), 2);
        let benchmark = position(scan.carbon.co2_grams);
        let display = DisplaySummary::new(
            scan.carbon.co2_grams,
            scan.carbon.energy_kwh,
            scan.metrics.total_weight_mb,
            scan.carbon.rating,
        );
        Self {
            scan,
            other_size_kb,
            benchmark,
            display,
        }
    }
}
