//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod auth;
pub mod examples;
pub mod health;

pub use auth::{me_handler, refresh_handler};
pub use examples::{
    create_example_handler, delete_example_handler, get_example_handler, list_examples_handler,
    update_example_handler,
};
pub use health::health_handler;
