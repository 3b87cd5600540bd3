//! Readers for path and query-string parameters.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use shared::Validator;

use crate::error::ApiError;

/// Parse a path id; anything other than an integer >= 1 is rejected
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ApiError::bad_request("invalid id parameter")),
    }
}

/// Blog id taken from the `:id` path segment.
///
/// Runs before any body extractor, so a bad id is reported even when the
/// body is malformed too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlogId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for BlogId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("invalid id parameter"))?;
        parse_id(&raw).map(BlogId)
    }
}

pub fn read_string(qs: &HashMap<String, String>, key: &str, default: &str) -> String {
    match qs.get(key) {
        Some(s) if !s.is_empty() => s.clone(),
        _ => default.to_string(),
    }
}

pub fn read_csv(qs: &HashMap<String, String>, key: &str, default: &[String]) -> Vec<String> {
    match qs.get(key) {
        Some(csv) if !csv.is_empty() => csv.split(',').map(str::to_string).collect(),
        _ => default.to_vec(),
    }
}

/// Integer parameter; a non-integer records "must be an integer" under `key`
/// and yields the default
pub fn read_int(qs: &HashMap<String, String>, key: &str, default: i64, v: &mut Validator) -> i64 {
    let Some(s) = qs.get(key).filter(|s| !s.is_empty()) else {
        return default;
    };

    match s.parse::<i64>() {
        Ok(i) => i,
        Err(_) => {
            v.add_error(key, "must be an integer");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("11").unwrap(), 11);
        for bad in ["-11", "0", "1.11", "", "abc", "\"11\"", "99999999999999999999"] {
            let err = parse_id(bad).unwrap_err();
            assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST, "{bad}");
        }
    }

    #[test]
    fn test_read_string_and_csv() {
        let q = qs(&[("title", "rust"), ("category", "Golang,Network"), ("empty", "")]);
        assert_eq!(read_string(&q, "title", ""), "rust");
        assert_eq!(read_string(&q, "empty", "fallback"), "fallback");
        assert_eq!(read_csv(&q, "category", &[]), vec!["Golang", "Network"]);
        assert!(read_csv(&q, "missing", &[]).is_empty());
    }

    #[test]
    fn test_read_int() {
        let q = qs(&[("page", "3"), ("page_size", "ten")]);
        let mut v = Validator::new();
        assert_eq!(read_int(&q, "page", 1, &mut v), 3);
        assert_eq!(read_int(&q, "page_size", 20, &mut v), 20);
        assert_eq!(read_int(&q, "missing", 7, &mut v), 7);
        assert_eq!(v.errors()["page_size"], "must be an integer");
        assert_eq!(v.error_count(), 1);
    }
}
