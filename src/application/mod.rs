//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating datasource calls,
//! caching and token handling. Services consume domain traits and provide a
//! clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::example_service::ExampleService`] - Example record listing and CRUD
//! - [`services::token_service::TokenService`] - JWT access and refresh tokens
//! - [`services::mailer_queue::MailerQueue`] - Email job producer
pub mod services;
