//! In-process [`ExampleDatasource`] backed by a `HashMap`.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{Example, ExampleFilter, ExamplePatch, NewExample};
use crate::domain::repositories::ExampleDatasource;
use crate::error::AppError;

/// Example store living in process memory. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryExampleDatasource {
    records: RwLock<HashMap<Uuid, Example>>,
}

impl InMemoryExampleDatasource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matching records, newest first. Ties break on id for a stable order.
    fn select(records: &HashMap<Uuid, Example>, filter: &ExampleFilter) -> Vec<Example> {
        let mut matched: Vec<Example> = records
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        matched
    }
}

#[async_trait]
impl ExampleDatasource for InMemoryExampleDatasource {
    async fn find_many(
        &self,
        filter: ExampleFilter,
        skip: u64,
        take: u64,
    ) -> Result<Vec<Example>, AppError> {
        let records = self.records.read().await;
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let take = usize::try_from(take).unwrap_or(usize::MAX);
        Ok(Self::select(&records, &filter)
            .into_iter()
            .skip(skip)
            .take(take)
            .collect())
    }

    async fn count(&self, filter: ExampleFilter) -> Result<u64, AppError> {
        let records = self.records.read().await;
        Ok(records.values().filter(|e| filter.matches(e)).count() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Example>, AppError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn create(&self, new_example: NewExample) -> Result<Example, AppError> {
        let now = Utc::now();
        let example = Example {
            id: Uuid::new_v4(),
            title: new_example.title,
            description: new_example.description,
            created_at: now,
            updated_at: now,
        };
        self.records
            .write()
            .await
            .insert(example.id, example.clone());
        Ok(example)
    }

    async fn update(&self, id: Uuid, patch: ExamplePatch) -> Result<Option<Example>, AppError> {
        let mut records = self.records.write().await;
        let Some(example) = records.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            example.title = title;
        }
        if let Some(description) = patch.description {
            example.description = description;
        }
        example.updated_at = Utc::now();

        Ok(Some(example.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.records.write().await.remove(&id).is_some())
    }
}
