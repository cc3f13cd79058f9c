//! Example record CRUD service.

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entities::{Example, ExampleFilter, ExamplePatch, NewExample};
use crate::domain::pagination::{PageRequest, Paginated, paginate};
use crate::domain::repositories::ExampleDatasource;
use crate::error::AppError;
use crate::infrastructure::cache::Cache;

const CACHE_TTL: Duration = Duration::from_secs(300);

/// Service for listing and managing example records.
///
/// Single-record reads go through the cache; writes refresh or drop the
/// cached entry. Cache failures never fail a request.
pub struct ExampleService<D: ExampleDatasource + ?Sized> {
    datasource: Arc<D>,
    cache: Cache,
}

impl<D: ExampleDatasource + ?Sized> ExampleService<D> {
    pub fn new(datasource: Arc<D>, cache: Cache) -> Self {
        Self { datasource, cache }
    }

    fn cache_key(id: Uuid) -> String {
        format!("examples:{}", id)
    }

    /// Lists records newest first.
    ///
    /// # Arguments
    ///
    /// - `filter` - optional case-insensitive title search
    /// - `page` - resolved page number and size
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on datasource errors.
    pub async fn find_all(
        &self,
        filter: ExampleFilter,
        page: PageRequest,
    ) -> Result<Paginated<Example>, AppError> {
        paginate(
            page,
            self.datasource
                .find_many(filter.clone(), page.skip(), page.take()),
            self.datasource.count(filter),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this id.
    pub async fn find_one(&self, id: Uuid) -> Result<Example, AppError> {
        let key = Self::cache_key(id);

        match self.cache.get::<Example>(&key).await {
            Ok(Some(example)) => return Ok(example),
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache read failed for {}: {}", key, e),
        }

        let example = self
            .datasource
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        if let Err(e) = self.cache.set(&key, &example, Some(CACHE_TTL)).await {
            tracing::warn!("Cache write failed for {}: {}", key, e);
        }

        Ok(example)
    }

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on datasource errors.
    pub async fn create(&self, new_example: NewExample) -> Result<Example, AppError> {
        let example = self.datasource.create(new_example).await?;
        tracing::info!(id = %example.id, "Example created");
        Ok(example)
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this id.
    pub async fn update(&self, id: Uuid, patch: ExamplePatch) -> Result<Example, AppError> {
        let example = self
            .datasource
            .update(id, patch)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        if let Err(e) = self
            .cache
            .set(&Self::cache_key(id), &example, Some(CACHE_TTL))
            .await
        {
            tracing::warn!("Cache refresh failed for example {}: {}", id, e);
        }

        Ok(example)
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this id.
    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        if !self.datasource.delete(id).await? {
            return Err(Self::not_found(id));
        }

        if let Err(e) = self.cache.del(&Self::cache_key(id)).await {
            tracing::warn!("Cache invalidation failed for example {}: {}", id, e);
        }

        tracing::info!(id = %id, "Example removed");
        Ok(())
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::not_found(format!("Example {} not found", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockExampleDatasource;
    use crate::error::ErrorCode;
    use chrono::Utc;
    use mockall::predicate::*;

    fn example(id: Uuid, title: &str) -> Example {
        let now = Utc::now();
        Example {
            id,
            title: title.to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(mock: MockExampleDatasource) -> ExampleService<MockExampleDatasource> {
        ExampleService::new(Arc::new(mock), Cache::in_memory())
    }

    #[tokio::test]
    async fn test_find_all_passes_skip_take_and_counts() {
        let mut mock = MockExampleDatasource::new();
        mock.expect_find_many()
            .with(always(), eq(20), eq(10))
            .times(1)
            .returning(|_, _, _| Ok(vec![example(Uuid::new_v4(), "a")]));
        mock.expect_count().times(1).returning(|_| Ok(21));

        let page = service(mock)
            .find_all(ExampleFilter::default(), PageRequest { page: 3, per_page: 10 })
            .await
            .unwrap();

        assert_eq!(page.meta.total_items, 21);
        assert_eq!(page.meta.item_count, 1);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.meta.current_page, 3);
    }

    #[tokio::test]
    async fn test_find_all_forwards_search_filter() {
        let filter = ExampleFilter::with_search(Some("report".into()));
        let expected = filter.clone();

        let mut mock = MockExampleDatasource::new();
        mock.expect_find_many()
            .withf(move |f, _, _| *f == expected)
            .returning(|_, _, _| Ok(vec![]));
        mock.expect_count().returning(|_| Ok(0));

        let page = service(mock)
            .find_all(filter, PageRequest { page: 1, per_page: 30 })
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.meta.total_pages, 0);
    }

    #[tokio::test]
    async fn test_find_one_is_cached_after_first_read() {
        let id = Uuid::new_v4();
        let mut mock = MockExampleDatasource::new();
        mock.expect_find_by_id()
            .with(eq(id))
            .times(1)
            .returning(move |id| Ok(Some(example(id, "cached"))));

        let service = service(mock);
        let first = service.find_one(id).await.unwrap();
        let second = service.find_one(id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_find_one_missing_is_not_found() {
        let mut mock = MockExampleDatasource::new();
        mock.expect_find_by_id().returning(|_| Ok(None));

        let err = service(mock).find_one(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let mut mock = MockExampleDatasource::new();
        mock.expect_update().returning(|_, _| Ok(None));

        let err = service(mock)
            .update(Uuid::new_v4(), ExamplePatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_update_refreshes_cached_copy() {
        let id = Uuid::new_v4();
        let mut mock = MockExampleDatasource::new();
        mock.expect_find_by_id()
            .times(1)
            .returning(move |id| Ok(Some(example(id, "old"))));
        mock.expect_update()
            .times(1)
            .returning(move |id, _| Ok(Some(example(id, "new"))));

        let service = service(mock);
        service.find_one(id).await.unwrap();
        service
            .update(
                id,
                ExamplePatch {
                    title: Some("new".into()),
                    description: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(service.find_one(id).await.unwrap().title, "new");
    }

    #[tokio::test]
    async fn test_remove_evicts_cache() {
        let id = Uuid::new_v4();
        let mut mock = MockExampleDatasource::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_find_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |id| Ok(Some(example(id, "doomed"))));
        mock.expect_delete()
            .with(eq(id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        mock.expect_find_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));

        let service = service(mock);
        service.find_one(id).await.unwrap();
        service.remove(id).await.unwrap();

        let err = service.find_one(id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let mut mock = MockExampleDatasource::new();
        mock.expect_delete().returning(|_| Ok(false));

        let err = service(mock).remove(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_create_delegates_to_datasource() {
        let mut mock = MockExampleDatasource::new();
        mock.expect_create()
            .withf(|n| n.title == "New")
            .times(1)
            .returning(|n| Ok(example(Uuid::new_v4(), &n.title)));

        let created = service(mock)
            .create(NewExample {
                title: "New".into(),
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(created.title, "New");
    }
}
