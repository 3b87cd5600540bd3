//! Blog operations as seen by the handlers.
//!
//! `BlogModel` bounds every storage call with the configured timeout and
//! records its latency. A call that runs past the deadline is reported as
//! `ModelError::Timeout`, never as not-found or conflict.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use shared::{Blog, Filter, ModelError, ModelResult, NewBlog};

use crate::metrics;
use crate::store::BlogStore;

#[derive(Clone)]
pub struct BlogModel {
    store: Arc<dyn BlogStore>,
    timeout: Duration,
}

impl BlogModel {
    pub fn new(store: Arc<dyn BlogStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    async fn call<T, F>(&self, operation: &'static str, fut: F) -> ModelResult<T>
    where
        F: Future<Output = ModelResult<T>>,
    {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ModelError::Timeout),
        };

        let kind = result.as_ref().err().map(ModelError::kind);
        metrics::observe_storage(operation, start.elapsed().as_secs_f64(), kind);
        if let Some(kind) = kind {
            tracing::debug!(operation, kind, "storage call failed");
        }

        result
    }

    pub async fn insert(&self, blog: &NewBlog) -> ModelResult<Blog> {
        self.call("insert", self.store.insert(blog)).await
    }

    pub async fn get(&self, id: i64) -> ModelResult<Blog> {
        self.call("get", self.store.get(id)).await
    }

    /// Conditional write; on success `blog.version` holds the new version
    pub async fn update(&self, blog: &mut Blog) -> ModelResult<()> {
        let version = self.call("update", self.store.update(blog)).await?;
        blog.version = version;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> ModelResult<()> {
        self.call("delete", self.store.delete(id)).await
    }

    pub async fn list(
        &self,
        title: &str,
        category: &[String],
        filter: &Filter,
    ) -> ModelResult<(Vec<Blog>, i64)> {
        self.call("list", self.store.list(title, category, filter)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::store::MemoryBlogStore;

    /// Store whose reads never finish in time
    struct SlowStore;

    #[async_trait]
    impl BlogStore for SlowStore {
        async fn insert(&self, _blog: &NewBlog) -> ModelResult<Blog> {
            Err(ModelError::Timeout)
        }

        async fn get(&self, _id: i64) -> ModelResult<Blog> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(ModelError::RecordNotFound)
        }

        async fn update(&self, _blog: &Blog) -> ModelResult<i32> {
            Err(ModelError::EditConflict)
        }

        async fn delete(&self, _id: i64) -> ModelResult<()> {
            Ok(())
        }

        async fn list(
            &self,
            _title: &str,
            _category: &[String],
            _filter: &Filter,
        ) -> ModelResult<(Vec<Blog>, i64)> {
            Ok((Vec::new(), 0))
        }
    }

    #[tokio::test]
    async fn test_slow_store_times_out_instead_of_not_found() {
        let model = BlogModel::new(Arc::new(SlowStore), Duration::from_millis(50));
        let err = model.get(1).await.unwrap_err();
        assert!(matches!(err, ModelError::Timeout), "{err:?}");
    }

    #[tokio::test]
    async fn test_update_bumps_version_in_place() {
        let model = BlogModel::new(Arc::new(MemoryBlogStore::new()), Duration::from_secs(3));
        let mut blog = model
            .insert(&NewBlog {
                title: "t".into(),
                body: "b".into(),
                category: vec!["c".into()],
            })
            .await
            .unwrap();

        model.update(&mut blog).await.unwrap();
        assert_eq!(blog.version, 2);
        assert_eq!(model.get(blog.id).await.unwrap().version, 2);
    }
}
