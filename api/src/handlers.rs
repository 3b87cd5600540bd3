use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use shared::{
    calculate_metadata, validate_filter, BlogEnvelope, BlogsEnvelope, CreateBlogRequest, Filter,
    MessageEnvelope, UpdateBlogRequest, Validator, BLOG_SORT_SAFE_LIST,
};

use crate::{
    error::{ApiError, ApiResult},
    json::StrictJson,
    metrics,
    params::{read_csv, read_int, read_string, BlogId},
    state::AppState,
};

const EXPECTED_VERSION_HEADER: &str = "x-expected-version";

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let uptime = state.started_at.elapsed().as_secs();
    tracing::debug!(uptime_secs = uptime, "health check");

    Json(json!({
        "message": "works",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": uptime
    }))
}

pub async fn create_blog(
    State(state): State<AppState>,
    StrictJson(input): StrictJson<CreateBlogRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut v = Validator::new();
    input.validate(&mut v);
    if !v.valid() {
        return Err(ApiError::failed_validation(v));
    }

    let blog = state.blogs.insert(&input.into_new_blog()).await?;
    metrics::BLOGS_CREATED.inc();
    tracing::info!(blog_id = blog.id, "blog created");

    let location = format!("/v1/blogs/{}", blog.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(BlogEnvelope { blog }),
    ))
}

pub async fn show_blog(
    State(state): State<AppState>,
    BlogId(id): BlogId,
) -> ApiResult<Json<BlogEnvelope>> {
    let blog = state.blogs.get(id).await?;
    Ok(Json(BlogEnvelope { blog }))
}

/// Partial update.
///
/// When the client sends `X-Expected-Version` and it differs from the stored
/// version, the request fails with an edit conflict before anything is
/// written. Otherwise the write is conditional on the version just read.
pub async fn update_blog(
    State(state): State<AppState>,
    BlogId(id): BlogId,
    headers: HeaderMap,
    StrictJson(input): StrictJson<UpdateBlogRequest>,
) -> ApiResult<Json<BlogEnvelope>> {
    let expected = expected_version(&headers)?;

    let mut blog = state.blogs.get(id).await?;
    if let Some(expected) = expected {
        if expected != blog.version {
            tracing::info!(blog_id = id, expected, actual = blog.version, "stale update rejected");
            return Err(ApiError::edit_conflict());
        }
    }

    blog.apply(input);

    let mut v = Validator::new();
    blog.validate(&mut v);
    if !v.valid() {
        return Err(ApiError::failed_validation(v));
    }

    state.blogs.update(&mut blog).await?;
    tracing::info!(blog_id = id, version = blog.version, "blog updated");

    Ok(Json(BlogEnvelope { blog }))
}

fn expected_version(headers: &HeaderMap) -> ApiResult<Option<i32>> {
    let Some(raw) = headers.get(EXPECTED_VERSION_HEADER) else {
        return Ok(None);
    };

    raw.to_str()
        .ok()
        .and_then(|s| s.trim().parse::<i32>().ok())
        .map(Some)
        .ok_or_else(|| ApiError::bad_request("invalid X-Expected-Version header"))
}

pub async fn delete_blog(
    State(state): State<AppState>,
    BlogId(id): BlogId,
) -> ApiResult<Json<MessageEnvelope>> {
    state.blogs.delete(id).await?;
    metrics::BLOGS_DELETED.inc();
    tracing::info!(blog_id = id, "blog deleted");

    Ok(Json(MessageEnvelope::new("blog successfully deleted")))
}

pub async fn list_blogs(
    State(state): State<AppState>,
    Query(qs): Query<HashMap<String, String>>,
) -> ApiResult<Json<BlogsEnvelope>> {
    let mut v = Validator::new();

    let title = read_string(&qs, "title", "");
    let category = read_csv(&qs, "category", &[]);
    let filter = Filter {
        page: read_int(&qs, "page", 1, &mut v),
        page_size: read_int(&qs, "page_size", 20, &mut v),
        sort: read_string(&qs, "sort", "id"),
        sort_safe_list: BLOG_SORT_SAFE_LIST.iter().map(|s| s.to_string()).collect(),
    };

    validate_filter(&mut v, &filter);
    if !v.valid() {
        return Err(ApiError::failed_validation(v));
    }

    let (blogs, total) = state.blogs.list(&title, &category, &filter).await?;
    let metadata = calculate_metadata(total, filter.page, filter.page_size);

    Ok(Json(BlogsEnvelope { blogs, metadata }))
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let body = metrics::gather_metrics(&state.registry);
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}

pub async fn route_not_found() -> ApiError {
    ApiError::not_found()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_expected_version_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(expected_version(&headers).unwrap(), None);

        headers.insert(EXPECTED_VERSION_HEADER, HeaderValue::from_static("3"));
        assert_eq!(expected_version(&headers).unwrap(), Some(3));

        headers.insert(EXPECTED_VERSION_HEADER, HeaderValue::from_static("three"));
        let err = expected_version(&headers).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
