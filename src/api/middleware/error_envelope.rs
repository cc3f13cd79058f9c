//! Final formatting of error responses.
//!
//! Runs outermost in the router so it sees every response, including those
//! produced by extractor rejections, the rate limiter, the fallback route and
//! the panic catcher. Responses carrying an [`ErrorReport`] are completed with
//! the request path and timestamp; bare framework errors are classified first.

use axum::{
    Json,
    body::{self, Body},
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::AppConfig;
use crate::error::ErrorReport;

/// Largest framework error body read back for classification.
const MAX_ERROR_BODY: usize = 16 * 1024;

/// Envelope settings derived from configuration.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeSettings {
    /// Include the `stack` field in error bodies.
    pub expose_stack: bool,
}

impl From<&AppConfig> for EnvelopeSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            expose_stack: !config.env.is_production(),
        }
    }
}

/// Rewrites every error response into the canonical envelope.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/examples", get(list_examples_handler))
///     .layer(middleware::from_fn_with_state(settings, error_envelope::layer));
/// ```
pub async fn layer(State(settings): State<EnvelopeSettings>, req: Request, next: Next) -> Response {
    let path = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), |pq| pq.as_str().to_string());
    let response = next.run(req).await;
    normalize(response, &path, settings.expose_stack).await
}

async fn normalize(response: Response, path: &str, expose_stack: bool) -> Response {
    let status = response.status();
    let report = response.extensions().get::<ErrorReport>().cloned();

    if report.is_none() && !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();

    let report = match report {
        Some(report) => report,
        None => {
            let text = match body::to_bytes(body, MAX_ERROR_BODY).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_string(),
                Err(_) => String::new(),
            };
            tracing::debug!(status = status.as_u16(), body = %text, "Normalizing framework error");
            ErrorReport::from_status(status, text)
        }
    };

    parts.status = report.status;
    parts.extensions.remove::<ErrorReport>();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    let envelope = report.into_envelope(path, expose_stack);
    let body: Body = Json(envelope).into_response().into_body();

    Response::from_parts(parts, body)
}
