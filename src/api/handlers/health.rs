//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Cache**: PING for Redis, always up for the in-memory store
/// 2. **Mail Queue**: Worker still receiving, or disabled by configuration
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "cache": { "status": "ok", "message": "redis connected" },
///     "mailQueue": { "status": "ok", "message": "Pending: 0, failed: 0" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let cache_check = check_cache(&state).await;
    let queue_check = check_mail_queue(&state).await;

    let all_healthy = cache_check.status != "error" && queue_check.status != "error";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            cache: cache_check,
            mail_queue: queue_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    let backend = state.cache.backend();
    if state.cache.health_check().await {
        CheckStatus {
            status: "ok".to_string(),
            message: Some(format!("{} connected", backend)),
        }
    } else {
        CheckStatus {
            status: "error".to_string(),
            message: Some(format!("{} connection failed", backend)),
        }
    }
}

async fn check_mail_queue(state: &AppState) -> CheckStatus {
    let queue = &state.mailer_queue;

    if !queue.is_enabled() {
        return CheckStatus {
            status: "disabled".to_string(),
            message: Some("Queue is disabled".to_string()),
        };
    }

    if queue.is_accepting() {
        CheckStatus {
            status: "ok".to_string(),
            message: Some(format!(
                "Pending: {}, failed: {}",
                queue.pending(),
                queue.failed_jobs().len().await
            )),
        }
    } else {
        CheckStatus {
            status: "error".to_string(),
            message: Some("Mail worker has stopped".to_string()),
        }
    }
}
