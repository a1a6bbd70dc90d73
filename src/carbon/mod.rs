//! Page weight to energy, emissions, eco-score and rating.

pub mod benchmarks;
pub mod calculator;
pub mod format;
pub mod handlers;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::carbon_routes()
}
