//! Background worker delivering queued emails with retries.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;

use crate::config::QueueConfig;
use crate::domain::email_job::{EmailHandler, MailerError, QueuedEmail};

/// How many times and how patiently a job is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub attempts: usize,
    /// Delay before the first retry; doubled for each further retry.
    pub backoff_delay: Duration,
    /// Upper bound for a single attempt.
    pub job_timeout: Duration,
    /// Jobs processed at the same time.
    pub concurrency: usize,
}

impl RetryPolicy {
    pub fn from_config(config: &QueueConfig) -> Self {
        Self {
            attempts: config.attempts.max(1),
            backoff_delay: config.backoff_delay.as_std(),
            job_timeout: Duration::from_millis(config.job_timeout_ms),
            concurrency: config.concurrency.max(1),
        }
    }

    /// Delays between attempts: `delay, 2*delay, 4*delay, ...`.
    pub fn backoff(&self) -> impl Iterator<Item = Duration> + use<> {
        let base_ms = u64::try_from(self.backoff_delay.as_millis()).unwrap_or(u64::MAX);
        // from_millis(2) yields 2, 4, 8, ... times the factor; halving gives delay * 2^n
        ExponentialBackoff::from_millis(2)
            .factor(base_ms)
            .map(|delay| delay / 2)
            .take(self.attempts.saturating_sub(1))
    }
}

/// A job that exhausted its attempts.
#[derive(Debug, Clone)]
pub struct FailedJob {
    pub email: QueuedEmail,
    pub error: MailerError,
    pub attempts: usize,
    pub failed_at: DateTime<Utc>,
}

/// Bounded history of failed jobs; the oldest entry is evicted first.
pub struct FailedJobs {
    capacity: usize,
    jobs: Mutex<VecDeque<FailedJob>>,
}

impl FailedJobs {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            jobs: Mutex::new(VecDeque::new()),
        }
    }

    pub async fn push(&self, job: FailedJob) {
        if self.capacity == 0 {
            return;
        }
        let mut jobs = self.jobs.lock().await;
        while jobs.len() >= self.capacity {
            jobs.pop_front();
        }
        jobs.push_back(job);
    }

    /// Snapshot, oldest first.
    pub async fn list(&self) -> Vec<FailedJob> {
        self.jobs.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Runs one job to completion, retrying with exponential backoff.
///
/// Returns the last error once every attempt has failed.
async fn deliver_with_retry(
    handler: &dyn EmailHandler,
    email: &QueuedEmail,
    policy: &RetryPolicy,
) -> Result<usize, (MailerError, usize)> {
    let mut attempt = 0usize;
    let timeout_ms = u64::try_from(policy.job_timeout.as_millis()).unwrap_or(u64::MAX);

    let result = Retry::start(policy.backoff(), || {
        attempt += 1;
        let current = attempt;
        async move {
            if current > 1 {
                metrics::counter!("email_job_retries_total").increment(1);
                tracing::info!(job_id = %email.id, attempt = current, "Retrying email job");
            }

            match tokio::time::timeout(policy.job_timeout, handler.handle(&email.job)).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => {
                    tracing::warn!(job_id = %email.id, attempt = current, error = %e, "Email job attempt failed");
                    Err(e)
                }
                Err(_) => {
                    tracing::warn!(job_id = %email.id, attempt = current, "Email job attempt timed out");
                    Err(MailerError::Timeout(timeout_ms))
                }
            }
        }
    })
    .await;

    match result {
        Ok(()) => Ok(attempt),
        Err(e) => Err((e, attempt)),
    }
}

/// Consumes queued emails until every sender is dropped.
///
/// # Concurrency
///
/// At most `policy.concurrency` jobs run at once. When the channel closes the
/// worker stops accepting jobs, waits for in-flight ones, and returns.
///
/// # Failure Handling
///
/// Each attempt is bounded by `policy.job_timeout`. Failed attempts are
/// retried after `backoff_delay * 2^n`; jobs that exhaust `policy.attempts`
/// are recorded in `failed`.
pub async fn run_email_worker(
    mut rx: mpsc::Receiver<QueuedEmail>,
    handler: Arc<dyn EmailHandler>,
    policy: RetryPolicy,
    failed: Arc<FailedJobs>,
) {
    let semaphore = Arc::new(Semaphore::new(policy.concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    tracing::info!(concurrency = policy.concurrency, attempts = policy.attempts, "Email worker started");

    while let Some(email) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let handler = handler.clone();
        let failed = failed.clone();

        in_flight.spawn(async move {
            let _permit = permit;
            tracing::debug!(job_id = %email.id, kind = email.job.kind(), to = email.job.recipient(), "Processing email job");

            match deliver_with_retry(handler.as_ref(), &email, &policy).await {
                Ok(attempts) => {
                    metrics::counter!("email_jobs_total", "outcome" => "sent").increment(1);
                    tracing::info!(job_id = %email.id, attempts, "Email sent");
                }
                Err((error, attempts)) => {
                    metrics::counter!("email_jobs_total", "outcome" => "failed").increment(1);
                    tracing::error!(job_id = %email.id, attempts, error = %error, "Email job failed permanently");
                    failed
                        .push(FailedJob {
                            email,
                            error,
                            attempts,
                            failed_at: Utc::now(),
                        })
                        .await;
                }
            }
        });

        while let Some(done) = in_flight.try_join_next() {
            if let Err(e) = done {
                tracing::error!(error = %e, "Email job task panicked");
            }
        }
    }

    while let Some(done) = in_flight.join_next().await {
        if let Err(e) = done {
            tracing::error!(error = %e, "Email job task panicked");
        }
    }

    tracing::info!("Email worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::email_job::{EmailJob, MockEmailHandler, SendMailOptions};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn policy(attempts: usize) -> RetryPolicy {
        RetryPolicy {
            attempts,
            backoff_delay: Duration::from_millis(1000),
            job_timeout: Duration::from_secs(30),
            concurrency: 2,
        }
    }

    fn email(to: &str) -> QueuedEmail {
        QueuedEmail::new(EmailJob::SendMail(SendMailOptions {
            to: to.to_string(),
            subject: "Hello".to_string(),
            html: "<p>Hello</p>".to_string(),
            text: None,
        }))
    }

    #[test]
    fn test_backoff_doubles_from_base_delay() {
        let delays: Vec<_> = policy(4).backoff().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(4000)
            ]
        );
        assert_eq!(policy(1).backoff().count(), 0);
    }

    #[test]
    fn test_backoff_keeps_odd_delays_exact() {
        let mut odd = policy(4);
        odd.backoff_delay = Duration::from_millis(1001);
        let delays: Vec<_> = odd.backoff().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(1001),
                Duration::from_millis(2002),
                Duration::from_millis(4004)
            ]
        );

        let mut tiny = policy(3);
        tiny.backoff_delay = Duration::from_millis(1);
        let delays: Vec<_> = tiny.backoff().collect();
        assert_eq!(delays, vec![Duration::from_millis(1), Duration::from_millis(2)]);
    }

    #[tokio::test]
    async fn test_failed_jobs_evicts_oldest() {
        let store = FailedJobs::new(2);
        for to in ["a@x.io", "b@x.io", "c@x.io"] {
            store
                .push(FailedJob {
                    email: email(to),
                    error: MailerError::Transport("down".into()),
                    attempts: 3,
                    failed_at: Utc::now(),
                })
                .await;
        }
        let recipients: Vec<_> = store
            .list()
            .await
            .iter()
            .map(|f| f.email.job.recipient().to_string())
            .collect();
        assert_eq!(recipients, vec!["b@x.io", "c@x.io"]);

        let none = FailedJobs::new(0);
        none.push(store.list().await.remove(0)).await;
        assert!(none.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut handler = MockEmailHandler::new();
        handler.expect_handle().times(2).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(MailerError::Transport("connection reset".into()))
            } else {
                Ok(())
            }
        });

        let failed = Arc::new(FailedJobs::new(10));
        let (tx, rx) = mpsc::channel(4);
        tx.send(email("ok@example.com")).await.unwrap();
        drop(tx);

        run_email_worker(rx, Arc::new(handler), policy(3), failed.clone()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(failed.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_job_lands_in_failed_store() {
        let mut handler = MockEmailHandler::new();
        handler
            .expect_handle()
            .times(3)
            .returning(|_| Err(MailerError::Transport("smtp down".into())));

        let failed = Arc::new(FailedJobs::new(10));
        let (tx, rx) = mpsc::channel(4);
        tx.send(email("lost@example.com")).await.unwrap();
        drop(tx);

        run_email_worker(rx, Arc::new(handler), policy(3), failed.clone()).await;

        let jobs = failed.list().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].attempts, 3);
        assert_eq!(jobs[0].error, MailerError::Transport("smtp down".into()));
    }

    struct SlowHandler;

    #[async_trait::async_trait]
    impl EmailHandler for SlowHandler {
        async fn handle(&self, _job: &EmailJob) -> Result<(), MailerError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_timeout_counts_as_failure() {
        let failed = Arc::new(FailedJobs::new(10));
        let (tx, rx) = mpsc::channel(4);
        tx.send(email("slow@example.com")).await.unwrap();
        drop(tx);

        let mut policy = policy(2);
        policy.job_timeout = Duration::from_secs(5);
        run_email_worker(rx, Arc::new(SlowHandler), policy, failed.clone()).await;

        let jobs = failed.list().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].error, MailerError::Timeout(5_000));
        assert_eq!(jobs[0].attempts, 2);
    }
}
