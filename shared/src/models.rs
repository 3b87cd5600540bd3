use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::filter::Metadata;
use crate::validator::{count_between, max_bytes, provided, unique, Validator};

pub const TITLE_MAX_BYTES: usize = 80;
pub const BODY_MAX_BYTES: usize = 100_000;
pub const MIN_CATEGORIES: usize = 1;
pub const MAX_CATEGORIES: usize = 5;

/// Sort keys accepted by the blog list endpoint
pub const BLOG_SORT_SAFE_LIST: [&str; 6] =
    ["id", "title", "created_at", "-id", "-title", "-created_at"];

// ═══════════════════════════════════════════════════════════════════════════
// BLOG
// ═══════════════════════════════════════════════════════════════════════════

/// A blog post as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Blog {
    pub id: i64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub category: Vec<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub version: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl Blog {
    pub fn validate(&self, v: &mut Validator) {
        validate_blog(v, &self.title, &self.body, Some(self.category.as_slice()));
    }

    /// Overwrite the fields present in `input`
    pub fn apply(&mut self, input: UpdateBlogRequest) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(body) = input.body {
            self.body = body;
        }
        if let Some(category) = input.category {
            self.category = category;
        }
    }
}

/// Fields supplied on insert; id, created_at and version come from storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlog {
    pub title: String,
    pub body: String,
    pub category: Vec<String>,
}

/// Body of `POST /v1/blogs`.
///
/// Missing fields decode to their empty form so validation can report each
/// of them; `category` stays `None` when absent so "not provided" and
/// "provided but empty" produce different messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateBlogRequest {
    pub title: String,
    pub body: String,
    pub category: Option<Vec<String>>,
}

impl CreateBlogRequest {
    pub fn validate(&self, v: &mut Validator) {
        validate_blog(v, &self.title, &self.body, self.category.as_deref());
    }

    pub fn into_new_blog(self) -> NewBlog {
        NewBlog {
            title: self.title,
            body: self.body,
            category: self.category.unwrap_or_default(),
        }
    }
}

/// Body of `PATCH /v1/blogs/:id`; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: Option<Vec<String>>,
}

pub fn validate_blog(v: &mut Validator, title: &str, body: &str, category: Option<&[String]>) {
    v.check(provided(title), "title", "must be provided");
    v.check(
        max_bytes(title, TITLE_MAX_BYTES),
        "title",
        format!("must not be more than {TITLE_MAX_BYTES} bytes long"),
    );

    v.check(provided(body), "body", "must be provided");
    v.check(
        max_bytes(body, BODY_MAX_BYTES),
        "body",
        format!("must not be more than {BODY_MAX_BYTES} bytes long"),
    );

    let Some(category) = category else {
        v.add_error("category", "must be provided");
        return;
    };
    v.check(
        count_between(category.len(), MIN_CATEGORIES, usize::MAX),
        "category",
        format!("must contain at least {MIN_CATEGORIES} categories"),
    );
    v.check(
        count_between(category.len(), 0, MAX_CATEGORIES),
        "category",
        format!("must not contain more than {MAX_CATEGORIES} categories"),
    );
    v.check(
        unique(category),
        "category",
        "must not contain duplicate categories",
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// RESPONSE ENVELOPES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogEnvelope {
    pub blog: Blog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogsEnvelope {
    pub blogs: Vec<Blog>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub message: String,
}

impl MessageEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
