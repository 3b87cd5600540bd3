//! Blog storage
//!
//! Handlers never talk to a database directly; they go through
//! [`BlogModel`](crate::model::BlogModel), which wraps one of these stores.

use async_trait::async_trait;
use shared::{Blog, Filter, ModelResult, NewBlog};

pub mod memory;
pub mod postgres;

pub use memory::MemoryBlogStore;
pub use postgres::PgBlogStore;

/// Storage capability for blogs.
///
/// Implementations report a missing row as `ModelError::RecordNotFound` and
/// a version mismatch on update as `ModelError::EditConflict`.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Insert a blog; storage assigns id, created_at and version
    async fn insert(&self, blog: &NewBlog) -> ModelResult<Blog>;

    async fn get(&self, id: i64) -> ModelResult<Blog>;

    /// Write `blog` only if the stored version still equals `blog.version`.
    /// Returns the new version.
    async fn update(&self, blog: &Blog) -> ModelResult<i32>;

    async fn delete(&self, id: i64) -> ModelResult<()>;

    /// One page of blogs matching the title query and containing every
    /// category in `category`, plus the total number of matches.
    ///
    /// `filter` must already have passed `validate_filter`.
    async fn list(&self, title: &str, category: &[String], filter: &Filter)
        -> ModelResult<(Vec<Blog>, i64)>;
}
