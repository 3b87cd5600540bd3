//! PostgreSQL-backed blog store.
//!
//! Expects the table:
//!
//! ```sql
//! CREATE TABLE blogs (
//!     id         bigserial PRIMARY KEY,
//!     created_at timestamp(0) with time zone NOT NULL DEFAULT now(),
//!     title      text NOT NULL,
//!     body       text NOT NULL,
//!     category   text[] NOT NULL,
//!     version    integer NOT NULL DEFAULT 1
//! );
//! ```

use async_trait::async_trait;
use shared::{Blog, Filter, ModelError, ModelResult, NewBlog};
use sqlx::{FromRow, PgPool};

use super::BlogStore;

const BLOG_COLUMNS: &str = "id, created_at, title, body, category, version";

#[derive(Clone)]
pub struct PgBlogStore {
    db: PgPool,
}

#[derive(FromRow)]
struct BlogPageRow {
    total: i64,
    #[sqlx(flatten)]
    blog: Blog,
}

impl PgBlogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Page query for `list`. Column and direction come from a validated filter,
/// everything user-supplied is bound as a parameter.
fn list_query(filter: &Filter) -> String {
    format!(
        "SELECT count(*) OVER() AS total, {BLOG_COLUMNS}
         FROM blogs
         WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '')
         AND (category @> $2 OR $2 = '{{}}')
         ORDER BY {} {}, id ASC
         LIMIT $3 OFFSET $4",
        filter.sort_column(),
        filter.sort_direction().as_sql(),
    )
}

#[async_trait]
impl BlogStore for PgBlogStore {
    async fn insert(&self, blog: &NewBlog) -> ModelResult<Blog> {
        let created: Blog = sqlx::query_as(&format!(
            "INSERT INTO blogs (title, body, category)
             VALUES ($1, $2, $3)
             RETURNING {BLOG_COLUMNS}"
        ))
        .bind(&blog.title)
        .bind(&blog.body)
        .bind(&blog.category)
        .fetch_one(&self.db)
        .await?;

        Ok(created)
    }

    async fn get(&self, id: i64) -> ModelResult<Blog> {
        if id < 1 {
            return Err(ModelError::RecordNotFound);
        }

        sqlx::query_as(&format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(ModelError::RecordNotFound)
    }

    async fn update(&self, blog: &Blog) -> ModelResult<i32> {
        let version: Option<i32> = sqlx::query_scalar(
            "UPDATE blogs
             SET title = $1, body = $2, category = $3, version = version + 1
             WHERE id = $4 AND version = $5
             RETURNING version",
        )
        .bind(&blog.title)
        .bind(&blog.body)
        .bind(&blog.category)
        .bind(blog.id)
        .bind(blog.version)
        .fetch_optional(&self.db)
        .await?;

        if let Some(version) = version {
            return Ok(version);
        }

        // Nothing matched: tell a deleted row apart from a stale version
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM blogs WHERE id = $1)")
            .bind(blog.id)
            .fetch_one(&self.db)
            .await?;

        if exists {
            Err(ModelError::EditConflict)
        } else {
            Err(ModelError::RecordNotFound)
        }
    }

    async fn delete(&self, id: i64) -> ModelResult<()> {
        if id < 1 {
            return Err(ModelError::RecordNotFound);
        }

        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::RecordNotFound);
        }
        Ok(())
    }

    async fn list(
        &self,
        title: &str,
        category: &[String],
        filter: &Filter,
    ) -> ModelResult<(Vec<Blog>, i64)> {
        let rows: Vec<BlogPageRow> = sqlx::query_as(&list_query(filter))
            .bind(title)
            .bind(category)
            .bind(filter.limit())
            .bind(filter.offset())
            .fetch_all(&self.db)
            .await?;

        let total = rows.first().map_or(0, |row| row.total);
        let blogs = rows.into_iter().map(|row| row.blog).collect();

        Ok((blogs, total))
    }
}
