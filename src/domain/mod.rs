//! Domain layer containing business entities and logic.
//!
//! Entities, datasource interfaces and the email pipeline model, independent
//! of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`pagination`] - Page requests and paginated envelopes
//! - [`email_job`] - Email job model and handler trait
//! - [`email_worker`] - Background delivery worker with retries
//!
//! # Email Processing Flow
//!
//! 1. A caller queues a job through [`crate::application::services::MailerQueue`]
//! 2. [`email_job::QueuedEmail`] travels over a bounded channel
//! 3. [`email_worker::run_email_worker`] delivers it with retry and backoff
//! 4. Jobs that exhaust their attempts land in [`email_worker::FailedJobs`]

pub mod email_job;
pub mod email_worker;
pub mod entities;
pub mod pagination;
pub mod repositories;
