//! Datasource trait for example records.

use crate::domain::entities::{Example, ExampleFilter, ExamplePatch, NewExample};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Storage interface for [`Example`] records.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::InMemoryExampleDatasource`] - in-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExampleDatasource: Send + Sync {
    /// Returns up to `take` records matching `filter`, newest first, after
    /// skipping `skip`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_many(
        &self,
        filter: ExampleFilter,
        skip: u64,
        take: u64,
    ) -> Result<Vec<Example>, AppError>;

    /// Counts records matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count(&self, filter: ExampleFilter) -> Result<u64, AppError>;

    /// # Returns
    ///
    /// - `Ok(Some(Example))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Example>, AppError>;

    /// Stores a new record with a generated id and timestamps.
    async fn create(&self, new_example: NewExample) -> Result<Example, AppError>;

    /// Applies `patch` and bumps `updated_at`.
    ///
    /// Returns `Ok(None)` if no record has this id.
    async fn update(&self, id: Uuid, patch: ExamplePatch) -> Result<Option<Example>, AppError>;

    /// Returns `Ok(true)` if a record was removed, `Ok(false)` if none existed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
