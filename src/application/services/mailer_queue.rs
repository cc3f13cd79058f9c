//! Producer side of the email pipeline.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::QueueConfig;
use crate::domain::email_job::{
    EmailHandler, EmailJob, MailerError, QueuedEmail, SendMailOptions, SendTemplateOptions,
};
use crate::domain::email_worker::{FailedJobs, RetryPolicy, run_email_worker};

/// Enqueues email jobs for the background worker.
///
/// A disabled queue rejects every job with [`MailerError::QueueDisabled`]
/// and enqueues nothing.
pub struct MailerQueue {
    sender: Option<mpsc::Sender<QueuedEmail>>,
    failed: Arc<FailedJobs>,
}

impl MailerQueue {
    pub fn new(sender: mpsc::Sender<QueuedEmail>, failed: Arc<FailedJobs>) -> Self {
        Self {
            sender: Some(sender),
            failed,
        }
    }

    pub fn disabled() -> Self {
        Self {
            sender: None,
            failed: Arc::new(FailedJobs::new(0)),
        }
    }

    /// Creates the channel and spawns the worker when the queue is enabled.
    ///
    /// The worker exits once every clone of the returned queue is dropped and
    /// in-flight jobs finish; await the handle to wait for that.
    pub fn start(
        config: &QueueConfig,
        handler: Arc<dyn EmailHandler>,
    ) -> (Self, Option<JoinHandle<()>>) {
        if !config.enabled {
            tracing::info!("Email queue disabled");
            return (Self::disabled(), None);
        }

        let (tx, rx) = mpsc::channel(config.capacity.max(1));
        let failed = Arc::new(FailedJobs::new(config.remove_on_fail));
        let worker = tokio::spawn(run_email_worker(
            rx,
            handler,
            RetryPolicy::from_config(config),
            failed.clone(),
        ));

        (Self::new(tx, failed), Some(worker))
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Enabled and the worker is still receiving.
    pub fn is_accepting(&self) -> bool {
        self.sender.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Jobs waiting in the channel.
    pub fn pending(&self) -> usize {
        self.sender
            .as_ref()
            .map_or(0, |tx| tx.max_capacity() - tx.capacity())
    }

    pub fn failed_jobs(&self) -> &Arc<FailedJobs> {
        &self.failed
    }

    /// Queues a pre-rendered message.
    ///
    /// # Errors
    ///
    /// - [`MailerError::QueueDisabled`] when the queue is off
    /// - [`MailerError::QueueFull`] when the channel is at capacity
    /// - [`MailerError::QueueClosed`] when the worker has stopped
    pub fn queue_mail(&self, options: SendMailOptions) -> Result<Uuid, MailerError> {
        self.enqueue(EmailJob::SendMail(options))
    }

    /// Queues a message rendered from `template_name` at delivery time.
    ///
    /// # Errors
    ///
    /// See [`Self::queue_mail`].
    pub fn queue_template(
        &self,
        to: impl Into<String>,
        subject: impl Into<String>,
        template_name: impl Into<String>,
        context: Value,
    ) -> Result<Uuid, MailerError> {
        self.enqueue(EmailJob::SendTemplate(SendTemplateOptions {
            to: to.into(),
            subject: subject.into(),
            template_name: template_name.into(),
            context,
        }))
    }

    fn enqueue(&self, job: EmailJob) -> Result<Uuid, MailerError> {
        let sender = self.sender.as_ref().ok_or(MailerError::QueueDisabled)?;

        let email = QueuedEmail::new(job);
        let id = email.id;
        let kind = email.job.kind();

        sender.try_send(email).map_err(|e| match e {
            TrySendError::Full(_) => MailerError::QueueFull,
            TrySendError::Closed(_) => MailerError::QueueClosed,
        })?;

        metrics::counter!("email_jobs_queued_total", "kind" => kind).increment(1);
        tracing::debug!(job_id = %id, kind, "Email job queued");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::email_job::MockEmailHandler;
    use crate::config::ParsedDuration;
    use serde_json::json;

    fn mail(to: &str) -> SendMailOptions {
        SendMailOptions {
            to: to.to_string(),
            subject: "Hi".to_string(),
            html: "<p>Hi</p>".to_string(),
            text: None,
        }
    }

    #[test]
    fn test_disabled_queue_rejects_without_enqueueing() {
        let queue = MailerQueue::disabled();
        assert!(!queue.is_enabled());
        assert!(!queue.is_accepting());
        assert_eq!(queue.queue_mail(mail("a@example.com")), Err(MailerError::QueueDisabled));
        assert_eq!(
            queue.queue_template("a@example.com", "Hi", "welcome", json!({})),
            Err(MailerError::QueueDisabled)
        );
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_enqueued_job_reaches_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let queue = MailerQueue::new(tx, Arc::new(FailedJobs::new(10)));

        let id = queue
            .queue_template("a@example.com", "Welcome", "welcome", json!({"name": "Ada"}))
            .unwrap();
        assert_eq!(queue.pending(), 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, id);
        assert_eq!(received.job.kind(), "send-template");
        assert_eq!(received.job.recipient(), "a@example.com");
    }

    #[tokio::test]
    async fn test_full_and_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        let queue = MailerQueue::new(tx, Arc::new(FailedJobs::new(10)));

        queue.queue_mail(mail("a@example.com")).unwrap();
        assert_eq!(queue.queue_mail(mail("b@example.com")), Err(MailerError::QueueFull));

        drop(rx);
        assert!(!queue.is_accepting());
        assert_eq!(queue.queue_mail(mail("c@example.com")), Err(MailerError::QueueClosed));
    }

    #[tokio::test]
    async fn test_start_runs_worker_until_queue_dropped() {
        let mut handler = MockEmailHandler::new();
        handler.expect_handle().times(2).returning(|_| Ok(()));

        let config = QueueConfig {
            enabled: true,
            capacity: 8,
            concurrency: 2,
            attempts: 3,
            backoff_delay: ParsedDuration {
                raw: "1s".to_string(),
                ms: 1000,
            },
            job_timeout_ms: 1000,
            remove_on_fail: 10,
        };

        let (queue, worker) = MailerQueue::start(&config, Arc::new(handler));
        queue.queue_mail(mail("a@example.com")).unwrap();
        queue.queue_mail(mail("b@example.com")).unwrap();

        let failed = queue.failed_jobs().clone();
        drop(queue);
        worker.unwrap().await.unwrap();
        assert!(failed.is_empty().await);
    }

    #[test]
    fn test_start_disabled_spawns_nothing() {
        let config = QueueConfig {
            enabled: false,
            capacity: 8,
            concurrency: 1,
            attempts: 1,
            backoff_delay: ParsedDuration {
                raw: "1s".to_string(),
                ms: 1000,
            },
            job_timeout_ms: 1000,
            remove_on_fail: 10,
        };
        let (queue, worker) = MailerQueue::start(&config, Arc::new(MockEmailHandler::new()));
        assert!(!queue.is_enabled());
        assert!(worker.is_none());
    }
}
