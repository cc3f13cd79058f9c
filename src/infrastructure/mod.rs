//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for storage, caching and email delivery.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis and in-memory implementations)
//! - [`mailer`] - SMTP transport, templates and the email job processor
//! - [`persistence`] - Datasource implementations

pub mod cache;
pub mod mailer;
pub mod persistence;
