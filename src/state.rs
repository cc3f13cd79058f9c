//! Shared state handed to every handler.

use std::sync::Arc;

use crate::application::services::{ExampleService, MailerQueue, TokenService};
use crate::config::Config;
use crate::domain::repositories::ExampleDatasource;
use crate::infrastructure::cache::Cache;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub example_service: Arc<ExampleService<dyn ExampleDatasource>>,
    pub token_service: Arc<TokenService>,
    pub cache: Cache,
    pub mailer_queue: Arc<MailerQueue>,
}

impl AppState {
    /// Wires services from configuration and injected backends.
    pub fn new(
        config: Arc<Config>,
        datasource: Arc<dyn ExampleDatasource>,
        cache: Cache,
        mailer_queue: MailerQueue,
    ) -> Self {
        let token_service = Arc::new(TokenService::from_config(&config.auth));
        let example_service = Arc::new(ExampleService::new(datasource, cache.clone()));

        Self {
            config,
            example_service,
            token_service,
            cache,
            mailer_queue: Arc::new(mailer_queue),
        }
    }
}
