//! Outbound mail transport trait.

use async_trait::async_trait;

use crate::domain::email_job::MailerError;

/// Rendered message handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
}

/// Delivers rendered messages.
///
/// # Implementations
///
/// - [`crate::infrastructure::mailer::SmtpTransport`] - SMTP via lettre
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`MailerError::Address`] for an unparsable recipient and
    /// [`MailerError::Transport`] when the server rejects or drops the message.
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailerError>;
}
