//! Handlers for example record endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::example::{CreateExampleRequest, ExampleResponse, UpdateExampleRequest};
use crate::api::dto::pagination::ExampleListQuery;
use crate::domain::entities::ExampleFilter;
use crate::domain::pagination::Paginated;
use crate::error::AppError;
use crate::state::AppState;

const EXAMPLES_PATH: &str = "/api/v1/examples";

/// Lists example records, newest first.
///
/// # Endpoint
///
/// `GET /api/v1/examples?page=1&perPage=30&search=report`
///
/// `page < 1` falls back to the default page and `perPage` is capped at
/// `PAGINATION_MAX_PER_PAGE`. `search` matches titles case-insensitively.
pub async fn list_examples_handler(
    State(state): State<AppState>,
    Query(query): Query<ExampleListQuery>,
) -> Result<Json<Paginated<ExampleResponse>>, AppError> {
    let page = query.pagination.resolve(&state.config.pagination);
    let filter = ExampleFilter::with_search(query.search);

    let base_path = match &filter.search {
        Some(term) => format!("{}?search={}", EXAMPLES_PATH, encode_query_value(term)),
        None => EXAMPLES_PATH.to_string(),
    };

    let examples = state.example_service.find_all(filter, page).await?;

    Ok(Json(
        examples.map(ExampleResponse::from).with_links(&base_path),
    ))
}

/// # Endpoint
///
/// `GET /api/v1/examples/{id}`
///
/// # Errors
///
/// Returns 404 if no record has this id.
pub async fn get_example_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExampleResponse>, AppError> {
    let example = state.example_service.find_one(id).await?;
    Ok(Json(example.into()))
}

/// # Endpoint
///
/// `POST /api/v1/examples`
///
/// # Errors
///
/// Returns 400 if the title is missing, empty or longer than 255 characters,
/// or the description is longer than 1000.
pub async fn create_example_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateExampleRequest>,
) -> Result<(StatusCode, Json<ExampleResponse>), AppError> {
    payload.validate()?;

    let example = state
        .example_service
        .create(payload.into_new_example())
        .await?;

    Ok((StatusCode::CREATED, Json(example.into())))
}

/// Partially updates a record.
///
/// # Endpoint
///
/// `PUT /api/v1/examples/{id}`
///
/// # Errors
///
/// Returns 400 on invalid fields and 404 if no record has this id.
pub async fn update_example_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExampleRequest>,
) -> Result<Json<ExampleResponse>, AppError> {
    payload.validate()?;

    let example = state.example_service.update(id, payload.into()).await?;
    Ok(Json(example.into()))
}

/// # Endpoint
///
/// `DELETE /api/v1/examples/{id}`
///
/// # Errors
///
/// Returns 404 if no record has this id.
pub async fn delete_example_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.example_service.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
