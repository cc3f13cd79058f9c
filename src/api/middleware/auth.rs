//! Bearer token access guard.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::application::services::token_service::{TokenError, TokenPayload};
use crate::{error::AppError, state::AppState};

/// Authenticates requests using access tokens from the Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Authentication Flow
///
/// 1. Extract token from `Authorization` header
/// 2. Verify signature and expiry with the access secret
/// 3. Store the verified [`TokenPayload`] in request extensions
/// 4. Continue to next middleware/handler
///
/// # Errors
///
/// Returns `401 Unauthorized` with code:
/// - `UNAUTHORIZED` if the header is missing or not a Bearer credential
/// - `INVALID_TOKEN` if the token is expired, tampered with or signed with another secret
///
/// The handler is never reached on failure.
///
/// # Example
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/examples", get(list_examples_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| AppError::unauthorized("Authorization header is missing or invalid"))?;

    let payload = st
        .token_service
        .verify_access(&token)
        .map_err(|e| match e {
            TokenError::Expired => AppError::invalid_token("Access token has expired"),
            _ => AppError::invalid_token("Access token is invalid"),
        })?;

    tracing::debug!(sub = %payload.sub, "Authenticated request");
    parts.extensions.insert(payload);

    let req = Request::from_parts(parts, body);

    Ok(next.run(req).await)
}

/// Identity attached by [`layer`].
///
/// Extracting it outside a guarded route fails with `401 UNAUTHORIZED`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub TokenPayload);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TokenPayload>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::unauthorized("Request is not authenticated"))
    }
}
