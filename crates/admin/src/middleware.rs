//! Authentication extractor for admin routes.
//!
//! The panel sits behind the private network, but every API route still
//! requires the configured bearer token. Identity management itself lives
//! in the hosted auth provider; this token is the service-level gate.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};

use crate::config::token_matches;
use crate::state::AppState;

/// Extractor that requires the admin bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_auth: RequireAdminToken) -> impl IntoResponse {
///     "hello, admin"
/// }
/// ```
#[derive(Debug)]
pub struct RequireAdminToken;

/// Error returned when the bearer token is missing or wrong.
pub struct AdminAuthRejection;

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, "Admin token required").into_response()
    }
}

impl FromRequestParts<AppState> for RequireAdminToken {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AdminAuthRejection)?;

        if !token_matches(presented, &state.config().admin_token) {
            return Err(AdminAuthRejection);
        }

        Ok(Self)
    }
}
