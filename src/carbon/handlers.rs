use axum::{extract::Query, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{
    benchmarks::{benchmarks, position, Benchmark, BenchmarkPosition},
    calculator::{calculate, CarbonResult},
    format::DisplaySummary,
};
use crate::{
    error::{ApiError, ApiResponse},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct EstimateQuery {
    pub weight_mb: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CarbonEstimate {
    pub weight_mb: f64,
    #[serde(flatten)]
    pub carbon: CarbonResult,
    pub benchmark: BenchmarkPosition,
    pub display: DisplaySummary,
}

pub fn carbon_routes() -> Router<AppState> {
    Router::new()
        .route("/benchmarks", get(list_benchmarks))
        .route("/carbon", get(estimate))
}

pub async fn list_benchmarks() -> Json<ApiResponse<&'static [Benchmark]>> {
    ApiResponse::ok(benchmarks())
}

/// GET /carbon?weight_mb=2.5
#[instrument]
pub async fn estimate(
    Query(q): Query<EstimateQuery>,
) -> Result<Json<ApiResponse<CarbonEstimate>>, ApiError> {
    let weight_mb = q
        .weight_mb
        .filter(|w| w.is_finite() && *w >= 0.0)
        .ok_or_else(|| ApiError::BadRequest("weight_mb must be a non-negative number".into()))?;

    let carbon = calculate(weight_mb);
    Ok(ApiResponse::ok(CarbonEstimate {
        weight_mb,
        carbon,
        benchmark: position(carbon.co2_grams),
        display: DisplaySummary::new(carbon.co2_grams, carbon.energy_kwh, weight_mb, carbon.rating),
    }))
}
