//! # App Starter
//!
//! Backend service starter built with Axum: validated configuration, JWT
//! access guard, pluggable cache, background email queue and a paginated CRUD
//! module to copy from.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Entities, datasource traits, pagination and the email job model
//! - **Application Layer** ([`application`]) - Business logic and service orchestration
//! - **Infrastructure Layer** ([`infrastructure`]) - Cache, storage and SMTP integrations
//! - **API Layer** ([`api`]) - REST API handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Schema-validated configuration with human readable durations (`"15m"`, `"7d"`)
//! - HS256 access and refresh tokens with a Bearer guard
//! - Redis or in-memory cache behind one trait
//! - Email queue with retries, exponential backoff and a failed-job store
//! - One JSON error envelope for every failure
//! - Rate limiting, request ids and structured logging
//!
//! ## Quick Start
//!
//! ```bash
//! export APP_NAME=app-starter
//! export JWT_ACCESS_SECRET=change-me-access
//! export JWT_REFRESH_SECRET=change-me-refresh
//!
//! cargo run
//! cargo run --bin admin -- token issue --sub user-1
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;
pub mod telemetry;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{ExampleService, MailerQueue, TokenService};
    pub use crate::config::Config;
    pub use crate::domain::entities::{Example, NewExample};
    pub use crate::domain::pagination::{PageRequest, Paginated};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
