//! Small helpers shared across the application.
//!
//! - [`duration`] - Human readable duration parsing and formatting

pub mod duration;
