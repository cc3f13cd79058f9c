//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`                - Health check: cache, mail queue (public)
//! - `POST /api/v1/auth/refresh`   - Token refresh (public)
//! - `/api/v1/*`                   - REST API (Bearer access token required)
//!
//! # Middleware
//!
//! Outermost first:
//!
//! - **Request id** - `x-request-id` generated when absent and echoed back
//! - **Tracing** - Structured request/response logging
//! - **Error envelope** - Every API error rendered in one JSON shape
//! - **Rate limiting** - Per-IP token bucket, when `THROTTLE_ENABLED`
//! - **Panic catching** - Panics become 500 responses
//! - **Authentication** - Bearer access token on protected routes
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{EnvelopeSettings, auth, error_envelope, rate_limit, tracing};
use crate::error::AppError;
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

async fn route_not_found() -> AppError {
    AppError::not_found("Route not found")
}

/// Builds the router with every route and middleware except path
/// normalization.
///
/// Integration tests drive this router directly.
pub fn build_router(state: AppState) -> Router {
    let settings = EnvelopeSettings::from(&state.config.app);

    let protected = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let api_router = Router::new()
        .nest(
            "/api/v1",
            protected.merge(api::routes::public_routes()),
        )
        .fallback(route_not_found)
        .layer(CatchPanicLayer::new());

    let api_router = match rate_limit::layer(&state.config.throttler) {
        Some(governor) => api_router.layer(governor),
        None => api_router,
    };

    let api_router = api_router
        .layer(middleware::from_fn_with_state(settings, error_envelope::layer))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
        .merge(api_router)
        .layer(tracing::layer())
        .layer(tracing::propagate_request_id_layer())
        .layer(tracing::set_request_id_layer())
}

/// Constructs the application router with trailing slashes trimmed before
/// routing.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state))
}
