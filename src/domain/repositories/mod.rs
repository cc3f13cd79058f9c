//! Datasource trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are
//! auto-generated via `mockall` for testing.
//!
//! # Available Datasources
//!
//! - [`ExampleDatasource`] - example record CRUD operations

pub mod example_datasource;

pub use example_datasource::ExampleDatasource;

#[cfg(test)]
pub use example_datasource::MockExampleDatasource;
