//! API route configuration.
//!
//! Protected routes require a Bearer access token via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    create_example_handler, delete_example_handler, get_example_handler, list_examples_handler,
    me_handler, refresh_handler, update_example_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes reachable with a valid access token.
///
/// # Endpoints
///
/// - `GET    /auth/me`        - Identity of the current token
/// - `GET    /examples`       - List example records (paginated, searchable)
/// - `POST   /examples`       - Create a record
/// - `GET    /examples/{id}`  - Fetch a record
/// - `PUT    /examples/{id}`  - Update a record
/// - `DELETE /examples/{id}`  - Delete a record
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me_handler))
        .route(
            "/examples",
            get(list_examples_handler).post(create_example_handler),
        )
        .route(
            "/examples/{id}",
            get(get_example_handler)
                .put(update_example_handler)
                .delete(delete_example_handler),
        )
}

/// Routes that need no token.
///
/// # Endpoints
///
/// - `POST /auth/refresh` - Exchange a refresh token for a new pair
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/auth/refresh", post(refresh_handler))
}
