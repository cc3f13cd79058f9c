//! Core domain entities.
//!
//! Entities are plain data structures with small predicates; persistence and
//! HTTP concerns live elsewhere.
//!
//! # Entity Types
//!
//! - [`Example`] - the CRUD template record
//!
//! # Design Pattern
//!
//! Separate structs describe creation and partial updates:
//! - [`NewExample`] - for creating new records
//! - [`ExamplePatch`] - for partial updates
//! - [`ExampleFilter`] - for listing

pub mod example;

pub use example::{Example, ExampleFilter, ExamplePatch, NewExample};
