//! AI shopping-assistant proxy handler.
//!
//! A stateless pass-through: validate the prompt, make one upstream call,
//! return the text. Nothing is stored between calls. Requests with the
//! wrong method get axum's own 405.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminToken;
use crate::state::AppState;

/// Assistant request body.
#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    #[serde(default)]
    pub prompt: String,
}

/// Assistant response body.
#[derive(Debug, Serialize)]
pub struct AssistantResponse {
    pub response: String,
}

/// Generate a response for a shopper prompt.
#[instrument(skip(state, body))]
pub async fn generate(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    Json(body): Json<AssistantRequest>,
) -> Result<Json<AssistantResponse>> {
    let prompt = body.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::BadRequest("Prompt is required".to_string()));
    }

    let response = state.assistant().generate(prompt).await?;
    Ok(Json(AssistantResponse { response }))
}
