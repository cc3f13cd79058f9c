//! Datasource implementations.
//!
//! # Datasources
//!
//! - [`InMemoryExampleDatasource`] - example records held in process memory

pub mod memory_example_datasource;

pub use memory_example_datasource::InMemoryExampleDatasource;
