//! Email job model shared by the queue producer and the worker.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Fully rendered message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMailOptions {
    pub to: String,
    pub subject: String,
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Message rendered from a named template at delivery time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTemplateOptions {
    pub to: String,
    pub subject: String,
    pub template_name: String,
    #[serde(default)]
    pub context: Value,
}

/// A unit of email work. Jobs with a `templateName` are template jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmailJob {
    SendTemplate(SendTemplateOptions),
    SendMail(SendMailOptions),
}

impl EmailJob {
    pub fn recipient(&self) -> &str {
        match self {
            Self::SendTemplate(t) => &t.to,
            Self::SendMail(m) => &m.to,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::SendTemplate(_) => "send-template",
            Self::SendMail(_) => "send-mail",
        }
    }
}

/// Job as it travels through the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedEmail {
    pub id: Uuid,
    pub job: EmailJob,
    pub enqueued_at: DateTime<Utc>,
}

impl QueuedEmail {
    pub fn new(job: EmailJob) -> Self {
        Self {
            id: Uuid::new_v4(),
            job,
            enqueued_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailerError {
    #[error("Queue is disabled")]
    QueueDisabled,
    #[error("Queue is full")]
    QueueFull,
    #[error("Queue is closed")]
    QueueClosed,
    #[error("template '{name}' failed to render: {reason}")]
    Template { name: String, reason: String },
    #[error("invalid address '{address}': {reason}")]
    Address { address: String, reason: String },
    #[error("failed to build message: {0}")]
    Message(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("delivery timed out after {0} ms")]
    Timeout(u64),
}

/// Executes one email job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailHandler: Send + Sync {
    /// Renders (if needed) and delivers the job.
    ///
    /// # Errors
    ///
    /// Any [`MailerError`]; the worker retries until attempts run out.
    async fn handle(&self, job: &EmailJob) -> Result<(), MailerError>;
}
