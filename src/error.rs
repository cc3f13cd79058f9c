//! Application error type and the canonical JSON error envelope.
//!
//! Every failure that reaches a client is rendered as:
//!
//! ```json
//! {
//!   "status": { "code": 404, "message": "Not Found" },
//!   "error":  { "code": 1002, "message": "Resource not found", "errors": [] },
//!   "path": "/api/v1/examples/…",
//!   "timestamp": "2026-01-01T00:00:00.000Z"
//! }
//! ```
//!
//! [`AppError`] renders the envelope itself and leaves an [`ErrorReport`] in the
//! response extensions; [`crate::api::middleware::error_envelope`] then fills
//! `path`, `timestamp` and, outside production, `stack`.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Value, json};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Numeric domain error codes exposed in `error.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InternalServerError,
    ValidateError,
    NotFound,
    Conflict,
    Unauthorized,
    InvalidCredentials,
    InvalidRefreshToken,
    InvalidToken,
    TooManyRequests,
    ServiceUnavailable,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        match self {
            Self::InternalServerError => 1000,
            Self::ValidateError => 1001,
            Self::NotFound => 1002,
            Self::Conflict => 1003,
            Self::Unauthorized => 1004,
            Self::InvalidCredentials => 1005,
            Self::InvalidRefreshToken => 1006,
            Self::InvalidToken => 1007,
            Self::TooManyRequests => 1008,
            Self::ServiceUnavailable => 1009,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::ValidateError => "VALIDATE_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    /// Canonical message used when no specific one is given.
    pub fn message(self) -> &'static str {
        match self {
            Self::InternalServerError => "Internal server error",
            Self::ValidateError => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Resource already exists",
            Self::Unauthorized => "Unauthorized",
            Self::InvalidCredentials => "Invalid credentials",
            Self::InvalidRefreshToken => "Invalid refresh token",
            Self::InvalidToken => "Invalid token",
            Self::TooManyRequests => "Too many requests",
            Self::ServiceUnavailable => "Service unavailable",
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.as_u16())
    }
}

/// Failure returned by handlers, services and datasources.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected; `errors` maps field names to messages.
    #[error("{message}")]
    Validation { message: String, errors: Value },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Conflict { message: String },

    /// Authentication failed. `code` tells which check rejected the request.
    #[error("{message}")]
    Unauthorized { code: ErrorCode, message: String },

    #[error("{message}")]
    TooManyRequests { message: String },

    #[error("{message}")]
    ServiceUnavailable { message: String },

    #[error("{message}")]
    Internal {
        message: String,
        cause: Option<Arc<dyn StdError + Send + Sync>>,
    },
}

impl AppError {
    pub fn validation(message: impl Into<String>, errors: Value) -> Self {
        Self::Validation {
            message: message.into(),
            errors,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Missing or malformed credentials.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code: ErrorCode::Unauthorized,
            message: message.into(),
        }
    }

    /// Access token failed verification.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code: ErrorCode::InvalidToken,
            message: message.into(),
        }
    }

    /// Refresh token failed verification.
    pub fn invalid_refresh_token(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code: ErrorCode::InvalidRefreshToken,
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            cause: None,
        }
    }

    /// Internal failure keeping the underlying error for the `stack` field.
    pub fn internal_with<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Internal {
            message: message.into(),
            cause: Some(Arc::new(cause)),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::ValidateError,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Conflict { .. } => ErrorCode::Conflict,
            Self::Unauthorized { code, .. } => *code,
            Self::TooManyRequests { .. } => ErrorCode::TooManyRequests,
            Self::ServiceUnavailable { .. } => ErrorCode::ServiceUnavailable,
            Self::Internal { .. } => ErrorCode::InternalServerError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Per-field detail; an empty list when there is none.
    pub fn errors(&self) -> Value {
        match self {
            Self::Validation { errors, .. } => errors.clone(),
            _ => json!([]),
        }
    }

    /// Error name, message and cause chain, one line each.
    pub fn stack(&self) -> String {
        let mut lines = vec![format!("{}: {}", self.code().name(), self)];
        if let Self::Internal {
            cause: Some(cause), ..
        } = self
        {
            let mut current: Option<&(dyn StdError + 'static)> = Some(cause.as_ref());
            while let Some(err) = current {
                lines.push(format!("    caused by: {err}"));
                current = err.source();
            }
        }
        lines.join("\n")
    }

    fn report(&self) -> ErrorReport {
        ErrorReport {
            status: self.status(),
            code: self.code(),
            message: self.to_string(),
            errors: self.errors(),
            stack: Some(self.stack()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();
        collect_field_errors(&errors, None, &mut fields);
        AppError::validation(ErrorCode::ValidateError.message(), json!(fields))
    }
}

/// Flattens nested validator output into `field -> [messages]`.
fn collect_field_errors(
    errors: &ValidationErrors,
    prefix: Option<&str>,
    out: &mut BTreeMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let name = match prefix {
            Some(p) => format!("{p}.{}", camel_case(field)),
            None => camel_case(field),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages: Vec<String> = list
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => format!("{name} is invalid ({})", e.code),
                    })
                    .collect();
                out.entry(name).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_field_errors(nested, Some(&name), out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_field_errors(nested, Some(&format!("{name}[{index}]")), out);
                }
            }
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Summary of a failure, carried in response extensions so the envelope
/// middleware can finish the body.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
    pub errors: Value,
    pub stack: Option<String>,
}

impl ErrorReport {
    /// Classifies a framework-generated error response that carries no report.
    ///
    /// `body` is the original plain-text body, used as detail for client
    /// errors and kept in `stack` for server errors.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let detail = if body.is_empty() {
            json!([])
        } else {
            json!([body])
        };

        let (status, code, errors) = match status.as_u16() {
            400 | 415 | 422 => (StatusCode::BAD_REQUEST, ErrorCode::ValidateError, detail),
            401 | 403 => (status, ErrorCode::Unauthorized, json!([])),
            404 | 405 => (status, ErrorCode::NotFound, json!([])),
            409 => (status, ErrorCode::Conflict, json!([])),
            429 => (status, ErrorCode::TooManyRequests, json!([])),
            503 => (status, ErrorCode::ServiceUnavailable, json!([])),
            400..=499 => (status, ErrorCode::ValidateError, detail),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                json!([]),
            ),
        };

        let stack = (!body.is_empty()).then(|| format!("{}: {}", code.name(), body));

        Self {
            status,
            code,
            message: code.message().to_string(),
            errors,
            stack,
        }
    }

    pub fn into_envelope(self, path: &str, expose_stack: bool) -> ErrorEnvelope {
        ErrorEnvelope {
            status: StatusInfo {
                code: self.status.as_u16(),
                message: self
                    .status
                    .canonical_reason()
                    .unwrap_or("Unknown")
                    .to_string(),
            },
            error: ErrorInfo {
                code: self.code,
                message: self.message,
                errors: self.errors,
            },
            path: path.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            stack: if expose_stack { self.stack } else { None },
        }
    }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub status: StatusInfo,
    pub error: ErrorInfo,
    pub path: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusInfo {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
    pub errors: Value,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal { .. } => tracing::error!(error = %self.stack(), "Request failed"),
            AppError::ServiceUnavailable { .. } => tracing::warn!(error = %self, "Request failed"),
            _ => tracing::debug!(code = self.code().name(), error = %self, "Request rejected"),
        }

        let report = self.report();
        let status = report.status;
        let envelope = report.clone().into_envelope("", false);

        let mut response = (status, Json(envelope)).into_response();
        response.extensions_mut().insert(report);
        response
    }
}
