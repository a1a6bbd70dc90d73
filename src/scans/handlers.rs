use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{
    dto::{DeleteScanQuery, ScanDetails, ScanSummary, SubmitScanRequest},
    repo_types::ScanRecord,
};
use crate::{
    auth::{AuthUser, MaybeAuthUser},
    error::{ApiError, ApiResponse},
    state::AppState,
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn scan_routes() -> Router<AppState> {
    Router::new()
        .route("/scan", post(submit_scan))
        .route("/scans", get(list_scans).delete(delete_scan))
        .route("/scans/summary", get(scan_summary))
        .route("/scans/:id", get(get_public_scan))
}

/// First hop of `X-Forwarded-For`, or `unknown` behind no proxy.
pub(crate) fn requester_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// POST /scan { url }
#[instrument(skip(state, headers, payload))]
pub async fn submit_scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    MaybeAuthUser(user_id): MaybeAuthUser,
    payload: Result<Json<SubmitScanRequest>, JsonRejection>,
) -> ApiResult<ScanRecord> {
    let ip = requester_ip(&headers);
    // An unreadable body still counts against the limiter, then fails URL parsing.
    let url = match payload {
        Ok(Json(body)) => body.url,
        Err(e) => {
            warn!(error = %e, %ip, "unreadable scan request body");
            String::new()
        }
    };

    let scan = state.scanner.submit_scan(&url, &ip, user_id).await?;
    Ok(ApiResponse::ok(scan))
}

/// GET /scans
#[instrument(skip(state))]
pub async fn list_scans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Vec<ScanRecord>> {
    let scans = state.scanner.list_scans(user_id).await?;
    Ok(ApiResponse::ok(scans))
}

/// GET /scans/summary
#[instrument(skip(state))]
pub async fn scan_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<ScanSummary> {
    let summary = state.scanner.scan_summary(user_id).await?;
    Ok(ApiResponse::ok(summary))
}

/// DELETE /scans?id=<uuid>
#[instrument(skip(state))]
pub async fn delete_scan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DeleteScanQuery>,
) -> ApiResult<()> {
    let raw = q
        .id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Scan ID is required".into()))?;
    let scan_id: Uuid = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid scan ID".into()))?;

    state.scanner.delete_scan(user_id, scan_id).await?;
    Ok(ApiResponse::empty())
}

/// GET /scans/:id, public scans only.
#[instrument(skip(state))]
pub async fn get_public_scan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ScanDetails> {
    let details = state.scanner.public_scan(id).await?;
    Ok(ApiResponse::ok(details))
}
