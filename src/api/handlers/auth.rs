//! Handlers for token endpoints.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::auth::RefreshTokenRequest;
use crate::api::middleware::CurrentUser;
use crate::application::services::token_service::{TokenError, TokenPair, TokenPayload};
use crate::error::AppError;
use crate::state::AppState;

/// Exchanges a refresh token for a new token pair.
///
/// # Endpoint
///
/// `POST /api/v1/auth/refresh`
///
/// # Request
///
/// ```json
/// { "refreshToken": "eyJhbGciOiJIUzI1NiJ9..." }
/// ```
///
/// # Errors
///
/// Returns 401 with `INVALID_REFRESH_TOKEN` if the token is expired, tampered
/// with or is an access token.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, AppError> {
    payload.validate()?;

    let identity = state
        .token_service
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| match e {
            TokenError::Expired => AppError::invalid_refresh_token("Refresh token has expired"),
            _ => AppError::invalid_refresh_token("Refresh token is invalid"),
        })?;

    let pair = state
        .token_service
        .issue_pair(&identity)
        .map_err(|e| AppError::internal_with("Failed to issue tokens", e))?;

    tracing::info!(sub = %identity.sub, "Token pair refreshed");
    Ok(Json(pair))
}

/// Returns the identity of the access token.
///
/// # Endpoint
///
/// `GET /api/v1/auth/me`
pub async fn me_handler(CurrentUser(user): CurrentUser) -> Json<TokenPayload> {
    Json(user)
}
