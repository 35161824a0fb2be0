//! Dashboard statistics handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdminToken;
use crate::state::AppState;
use crate::stats::StatsSnapshot;

/// Stats payload: the snapshot plus the error side-channel.
///
/// `error` is display-only; the counters are always the last good values,
/// never blanked by a failure.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: StatsSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub retry_attempts: u32,
}

/// Visibility toggle request.
#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

/// Simple acknowledgement.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub success: bool,
}

fn stats_response(state: &AppState, stats: StatsSnapshot) -> StatsResponse {
    StatsResponse {
        stats,
        error: state.stats().last_error(),
        retry_attempts: state.stats().retry().attempts(),
    }
}

/// Current dashboard statistics (cached when fresh).
#[instrument(skip(state))]
pub async fn stats(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>> {
    let snapshot = state.stats().get_stats(false).await;
    Ok(Json(stats_response(&state, snapshot)))
}

/// Force a refresh past the cache.
#[instrument(skip(state))]
pub async fn refresh(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>> {
    let snapshot = state.stats().get_stats(true).await;
    Ok(Json(stats_response(&state, snapshot)))
}

/// Mark the dashboard visible or backgrounded; the poller only runs while
/// someone is actually looking.
#[instrument(skip(state))]
pub async fn visibility(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    Json(body): Json<VisibilityRequest>,
) -> Result<Json<AckResponse>> {
    state.stats().set_visible(body.visible);
    Ok(Json(AckResponse { success: true }))
}
