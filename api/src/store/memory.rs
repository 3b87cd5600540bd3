//! In-process blog store.
//!
//! Used when the server runs without a database and by the test suite.
//! Follows the same versioning rules as the PostgreSQL store.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use shared::{Blog, Filter, ModelError, ModelResult, NewBlog, SortDirection};
use tokio::sync::RwLock;

use super::BlogStore;

#[derive(Default)]
struct Inner {
    next_id: i64,
    blogs: BTreeMap<i64, Blog>,
}

#[derive(Default)]
pub struct MemoryBlogStore {
    inner: RwLock<Inner>,
}

impl MemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.blogs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Every word of the query appears in the title, ignoring case
fn title_matches(title: &str, query: &str) -> bool {
    let title = title.to_lowercase();
    query
        .split_whitespace()
        .all(|word| title.contains(&word.to_lowercase()))
}

fn compare(a: &Blog, b: &Blog, column: &str) -> Ordering {
    match column {
        "title" => a.title.cmp(&b.title),
        "created_at" => a.created_at.cmp(&b.created_at),
        _ => a.id.cmp(&b.id),
    }
}

#[async_trait]
impl BlogStore for MemoryBlogStore {
    async fn insert(&self, blog: &NewBlog) -> ModelResult<Blog> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;

        let created = Blog {
            id: inner.next_id,
            created_at: Utc::now().trunc_subsecs(0),
            title: blog.title.clone(),
            body: blog.body.clone(),
            category: blog.category.clone(),
            version: 1,
        };
        inner.blogs.insert(created.id, created.clone());

        Ok(created)
    }

    async fn get(&self, id: i64) -> ModelResult<Blog> {
        self.inner
            .read()
            .await
            .blogs
            .get(&id)
            .cloned()
            .ok_or(ModelError::RecordNotFound)
    }

    async fn update(&self, blog: &Blog) -> ModelResult<i32> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .blogs
            .get_mut(&blog.id)
            .ok_or(ModelError::RecordNotFound)?;

        if stored.version != blog.version {
            return Err(ModelError::EditConflict);
        }

        stored.title = blog.title.clone();
        stored.body = blog.body.clone();
        stored.category = blog.category.clone();
        stored.version += 1;

        Ok(stored.version)
    }

    async fn delete(&self, id: i64) -> ModelResult<()> {
        self.inner
            .write()
            .await
            .blogs
            .remove(&id)
            .map(|_| ())
            .ok_or(ModelError::RecordNotFound)
    }

    async fn list(
        &self,
        title: &str,
        category: &[String],
        filter: &Filter,
    ) -> ModelResult<(Vec<Blog>, i64)> {
        let inner = self.inner.read().await;

        let mut matched: Vec<&Blog> = inner
            .blogs
            .values()
            .filter(|b| title_matches(&b.title, title))
            .filter(|b| category.iter().all(|c| b.category.contains(c)))
            .collect();

        let column = filter.sort_column();
        let direction = filter.sort_direction();
        matched.sort_by(|a, b| {
            let ord = compare(a, b, column);
            let ord = match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            ord.then(a.id.cmp(&b.id))
        });

        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_blog(title: &str, category: &[&str]) -> NewBlog {
        NewBlog {
            title: title.into(),
            body: "body".into(),
            category: category.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn filter(page: i64, page_size: i64, sort: &str) -> Filter {
        Filter {
            page,
            page_size,
            sort: sort.into(),
            sort_safe_list: shared::BLOG_SORT_SAFE_LIST.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_version() {
        let store = MemoryBlogStore::new();
        let a = store.insert(&new_blog("first", &["Golang"])).await.unwrap();
        let b = store.insert(&new_blog("second", &["Golang"])).await.unwrap();
        assert_eq!((a.id, a.version), (1, 1));
        assert_eq!(b.id, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_update_checks_version() {
        let store = MemoryBlogStore::new();
        let mut blog = store.insert(&new_blog("first", &["Golang"])).await.unwrap();

        blog.title = "renamed".into();
        assert_eq!(store.update(&blog).await.unwrap(), 2);

        // still holding version 1
        assert!(matches!(store.update(&blog).await, Err(ModelError::EditConflict)));

        blog.id = 99;
        assert!(matches!(store.update(&blog).await, Err(ModelError::RecordNotFound)));
    }

    #[tokio::test]
    async fn test_delete_is_terminal() {
        let store = MemoryBlogStore::new();
        let blog = store.insert(&new_blog("first", &["Golang"])).await.unwrap();
        store.delete(blog.id).await.unwrap();

        assert!(matches!(store.get(blog.id).await, Err(ModelError::RecordNotFound)));
        assert!(matches!(store.update(&blog).await, Err(ModelError::RecordNotFound)));
        assert!(matches!(store.delete(blog.id).await, Err(ModelError::RecordNotFound)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_filters_sorts_and_pages() {
        let store = MemoryBlogStore::new();
        store.insert(&new_blog("gRPC in Go", &["Golang", "Network"])).await.unwrap();
        store.insert(&new_blog("Async Rust", &["Rust"])).await.unwrap();
        store.insert(&new_blog("Go generics", &["Golang"])).await.unwrap();

        let (blogs, total) = store.list("", &[], &filter(1, 2, "-id")).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(blogs.iter().map(|b| b.id).collect::<Vec<_>>(), vec![3, 2]);

        let (blogs, total) = store
            .list("", &["Golang".to_string()], &filter(1, 20, "title"))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(blogs[0].title, "Go generics");

        let (blogs, total) = store.list("rust", &[], &filter(1, 20, "id")).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(blogs[0].title, "Async Rust");
    }

    #[tokio::test]
    async fn test_list_starts_empty() {
        let store = MemoryBlogStore::new();
        let (blogs, total) = store.list("", &[], &filter(1, 20, "id")).await.unwrap();
        assert!(blogs.is_empty());
        assert_eq!(total, 0);
    }
}
