//! SMTP transport built on lettre.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use tracing::{debug, error};

use super::transport::{MailTransport, OutgoingEmail};
use crate::config::MailerConfig;
use crate::domain::email_job::MailerError;

/// Port on which the server expects TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;

pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpTransport {
    /// Builds a pooled SMTP transport.
    ///
    /// Port 465 uses implicit TLS; any other port starts in plain text and
    /// upgrades with STARTTLS when offered. Credentials are sent only when
    /// both `MAIL_USER` and `MAIL_PASSWORD` are set.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Transport`] for invalid TLS settings and
    /// [`MailerError::Address`] for an unparsable sender.
    pub fn new(config: &MailerConfig) -> Result<Self, MailerError> {
        let builder = if config.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host).map_err(|e| {
                MailerError::Transport(format!("Failed to configure SMTP relay: {}", e))
            })?
        } else {
            let tls = TlsParameters::new(config.host.clone())
                .map_err(|e| MailerError::Transport(format!("Invalid TLS parameters: {}", e)))?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .tls(Tls::Opportunistic(tls))
        };

        let builder = builder.port(config.port);
        let builder = match (&config.user, &config.password) {
            (Some(user), Some(password)) => {
                builder.credentials(Credentials::new(user.clone(), password.clone()))
            }
            _ => builder,
        };

        let sender = config.from_mailbox();
        let from = sender.parse::<Mailbox>().map_err(|e| MailerError::Address {
            address: sender.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, email: OutgoingEmail) -> Result<Message, MailerError> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| MailerError::Address {
                address: email.to.clone(),
                reason: e.to_string(),
            })?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject);

        let message = match email.text {
            Some(text) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(email.html),
                    ),
            ),
            None => builder
                .header(header::ContentType::TEXT_HTML)
                .body(email.html),
        };

        message.map_err(|e| MailerError::Message(e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailerError> {
        let recipient = email.to.clone();
        let message = self.build_message(email)?;

        match self.transport.send(message).await {
            Ok(_) => {
                debug!("Email delivered to {}", recipient);
                Ok(())
            }
            Err(e) => {
                error!("Failed to send email to {}: {}", recipient, e);
                Err(MailerError::Transport(e.to_string()))
            }
        }
    }
}
