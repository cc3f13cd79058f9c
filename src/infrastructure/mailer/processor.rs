//! Turns queued email jobs into outgoing messages.

use async_trait::async_trait;
use std::sync::Arc;

use super::templates::TemplateRenderer;
use super::transport::{MailTransport, OutgoingEmail};
use crate::domain::email_job::{EmailHandler, EmailJob, MailerError};

/// [`EmailHandler`] that renders template jobs and hands messages to a transport.
pub struct EmailProcessor {
    transport: Arc<dyn MailTransport>,
    templates: Arc<TemplateRenderer>,
}

impl EmailProcessor {
    pub fn new(transport: Arc<dyn MailTransport>, templates: Arc<TemplateRenderer>) -> Self {
        Self {
            transport,
            templates,
        }
    }

    /// Renders the job if needed and delivers it.
    ///
    /// # Errors
    ///
    /// Template, address and transport failures, unchanged for the retry loop.
    pub async fn process(&self, job: &EmailJob) -> Result<(), MailerError> {
        let email = self.prepare(job)?;
        self.transport.send(email).await
    }

    fn prepare(&self, job: &EmailJob) -> Result<OutgoingEmail, MailerError> {
        match job {
            EmailJob::SendMail(mail) => Ok(OutgoingEmail {
                to: mail.to.clone(),
                subject: mail.subject.clone(),
                html: mail.html.clone(),
                text: mail.text.clone(),
            }),
            EmailJob::SendTemplate(template) => {
                let html = self
                    .templates
                    .render(&template.template_name, &template.context)?;
                Ok(OutgoingEmail {
                    to: template.to.clone(),
                    subject: template.subject.clone(),
                    html,
                    text: None,
                })
            }
        }
    }
}

#[async_trait]
impl EmailHandler for EmailProcessor {
    async fn handle(&self, job: &EmailJob) -> Result<(), MailerError> {
        self.process(job).await
    }
}
