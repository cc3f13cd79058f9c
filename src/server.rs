//! HTTP server initialization and runtime setup.
//!
//! Handles cache selection, email worker spawning, and the Axum server
//! lifecycle including graceful shutdown.

use crate::application::services::MailerQueue;
use crate::config::Config;
use crate::domain::repositories::ExampleDatasource;
use crate::infrastructure::cache::build_cache;
use crate::infrastructure::mailer::{EmailProcessor, SmtpTransport, TemplateRenderer};
use crate::infrastructure::persistence::InMemoryExampleDatasource;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Time allowed for queued emails to finish after the server stops.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Cache (Redis or in-memory)
/// - Email queue and background worker, when `QUEUE_ENABLED`
/// - Example datasource
/// - Axum HTTP server
///
/// On Ctrl-C or SIGTERM the server stops accepting connections, finishes
/// in-flight requests, then waits for queued emails to drain.
///
/// # Errors
///
/// Returns an error if:
/// - SMTP settings are invalid
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let config = Arc::new(config);

    let cache = build_cache(&config.redis);

    let (mailer_queue, worker) = if config.queue.enabled {
        let transport = SmtpTransport::new(&config.mailer)?;
        let templates = TemplateRenderer::load(&config.mailer.template_dir);
        let processor = EmailProcessor::new(Arc::new(transport), Arc::new(templates));
        MailerQueue::start(&config.queue, Arc::new(processor))
    } else {
        (MailerQueue::disabled(), None)
    };
    if worker.is_none() {
        tracing::info!("Email queue disabled");
    }

    let datasource: Arc<dyn ExampleDatasource> = Arc::new(InMemoryExampleDatasource::new());
    let state = AppState::new(config.clone(), datasource, cache, mailer_queue);

    let app = app_router(state);

    let addr: SocketAddr = config.app.listen_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("HTTP server stopped");

    if let Some(worker) = worker {
        match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
            Ok(Ok(())) => tracing::info!("Email worker drained"),
            Ok(Err(e)) => tracing::error!("Email worker crashed: {}", e),
            Err(_) => tracing::warn!(
                "Email worker did not drain within {}s",
                WORKER_DRAIN_TIMEOUT.as_secs()
            ),
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
