#![allow(dead_code)]

use app_starter::application::services::{MailerQueue, TokenPayload, TokenService};
use app_starter::config::Config;
use app_starter::infrastructure::cache::Cache;
use app_starter::infrastructure::persistence::InMemoryExampleDatasource;
use app_starter::state::AppState;
use axum_test::TestServer;
use std::collections::HashMap;
use std::sync::Arc;

pub const ACCESS_SECRET: &str = "test-access-secret";
pub const REFRESH_SECRET: &str = "test-refresh-secret";

/// Configuration with rate limiting and the mail queue switched off.
pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut raw: HashMap<String, String> = [
        ("APP_NAME", "app-starter-test"),
        ("APP_ENV", "test"),
        ("JWT_ACCESS_SECRET", ACCESS_SECRET),
        ("JWT_REFRESH_SECRET", REFRESH_SECRET),
        ("REDIS_ENABLED", "false"),
        ("QUEUE_ENABLED", "false"),
        ("THROTTLE_ENABLED", "false"),
        ("PAGINATION_MAX_PER_PAGE", "100"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (k, v) in overrides {
        raw.insert(k.to_string(), v.to_string());
    }

    Config::from_map(&raw).unwrap()
}

pub fn create_test_state() -> AppState {
    create_test_state_with(test_config(&[]))
}

pub fn create_test_state_with(config: Config) -> AppState {
    AppState::new(
        Arc::new(config),
        Arc::new(InMemoryExampleDatasource::new()),
        Cache::in_memory(),
        MailerQueue::disabled(),
    )
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(app_starter::routes::build_router(state)).unwrap()
}

pub fn payload(sub: &str) -> TokenPayload {
    TokenPayload {
        sub: sub.to_string(),
        email: Some(format!("{}@example.com", sub)),
    }
}

pub fn access_token(state: &AppState, sub: &str) -> String {
    state.token_service.sign_access(&payload(sub)).unwrap()
}

pub fn refresh_token(state: &AppState, sub: &str) -> String {
    state.token_service.sign_refresh(&payload(sub)).unwrap()
}

/// Token service with a different access secret, for signature tests.
pub fn foreign_token_service() -> TokenService {
    TokenService::new(
        "another-access-secret",
        chrono::Duration::minutes(15),
        "another-refresh-secret",
        chrono::Duration::days(7),
    )
}
