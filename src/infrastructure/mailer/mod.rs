//! Email delivery: SMTP transport, template rendering and the job processor.
//!
//! [`EmailProcessor`] is the [`crate::domain::email_job::EmailHandler`] the
//! worker runs; it renders template jobs with [`TemplateRenderer`] and hands
//! the result to a [`MailTransport`].

pub mod processor;
pub mod smtp;
pub mod templates;
pub mod transport;

pub use processor::EmailProcessor;
pub use smtp::SmtpTransport;
pub use templates::TemplateRenderer;
pub use transport::{MailTransport, OutgoingEmail};

#[cfg(test)]
pub use transport::MockMailTransport;
