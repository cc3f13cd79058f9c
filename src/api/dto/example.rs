//! DTOs for example record endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::entities::{Example, ExamplePatch, NewExample};

/// Request to create an example record.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExampleRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = 1, max = 255, message = "Title must be 1 to 255 characters")
    )]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

impl CreateExampleRequest {
    /// Call after [`Validate::validate`]; a missing title becomes empty.
    pub fn into_new_example(self) -> NewExample {
        NewExample {
            title: self.title.unwrap_or_default(),
            description: non_blank(self.description),
        }
    }
}

/// Partial update. Omitted fields stay as they are; a blank description
/// clears it.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExampleRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

impl From<UpdateExampleRequest> for ExamplePatch {
    fn from(req: UpdateExampleRequest) -> Self {
        ExamplePatch {
            title: req.title,
            description: req.description.map(|d| non_blank(Some(d))),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Example record as returned by the API.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_recently_created: bool,
    pub has_description: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Example> for ExampleResponse {
    fn from(e: Example) -> Self {
        Self {
            is_recently_created: e.is_recently_created(Utc::now()),
            has_description: e.has_description(),
            id: e.id,
            title: e.title,
            description: e.description,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}
