//! Route definitions for the admin panel.

pub mod assistant;
pub mod dashboard;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the admin API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/stats", get(dashboard::stats))
        .route("/api/stats/refresh", post(dashboard::refresh))
        .route("/api/dashboard/visibility", post(dashboard::visibility))
        .route("/api/orders/recent", get(orders::recent))
        .route("/api/assistant", post(assistant::generate))
}
