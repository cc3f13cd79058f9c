//! HTTP middleware for request processing and protection.
//!
//! Provides authentication, error normalization, rate limiting, and
//! observability middleware.

pub mod auth;
pub mod error_envelope;
pub mod rate_limit;
pub mod tracing;

pub use auth::CurrentUser;
pub use error_envelope::EnvelopeSettings;
