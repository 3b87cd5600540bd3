//! Strict JSON request decoding
//!
//! `decode_json` turns a request body into a typed input and explains
//! exactly what was wrong with it when it cannot. `StrictJson<T>` is the
//! extractor handlers use; it applies the same rules to the request body.

use axum::{
    async_trait,
    body::Bytes,
    extract::{
        rejection::{BytesRejection, FailedToBufferBody},
        FromRequest, Request,
    },
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use thiserror::Error;

use crate::error::ApiError;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 1_048_576;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("body contains badly-formed JSON (at character {0})")]
    Syntax(usize),

    #[error("body contains badly-formed JSON")]
    UnexpectedEof,

    #[error("body contains incorrect JSON type for field \"{0}\"")]
    FieldType(String),

    #[error("body contains incorrect JSON type (at character {0})")]
    Type(usize),

    #[error("body must not be empty")]
    Empty,

    #[error("body contains unknown key \"{0}\"")]
    UnknownField(String),

    #[error("body contains duplicate key \"{0}\"")]
    DuplicateField(String),

    #[error("body must not be larger than {} bytes", MAX_BODY_BYTES)]
    TooLarge,

    #[error("body must only contain a single JSON value")]
    TrailingData,

    #[error("failed to read request body")]
    Io,
}

/// Decode exactly one JSON value of type `T` from `bytes`.
///
/// The body must be a JSON object. `T` is expected to deny unknown fields;
/// the error for an unknown key is built from serde's message.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    if bytes.len() > MAX_BODY_BYTES {
        return Err(DecodeError::TooLarge);
    }
    let Some(start) = bytes.iter().position(|b| !b.is_ascii_whitespace()) else {
        return Err(DecodeError::Empty);
    };

    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value: T = serde_path_to_error::deserialize(&mut de).map_err(|err| {
        let field = err
            .path()
            .iter()
            .next()
            .and_then(|segment| match segment {
                serde_path_to_error::Segment::Map { key } => Some(key.clone()),
                _ => None,
            });
        classify(bytes, err.into_inner(), field)
    })?;

    // derived struct impls also fill fields from an array, in order
    if bytes[start] != b'{' {
        return Err(DecodeError::Type(start + 1));
    }

    de.end().map_err(|_| DecodeError::TrailingData)?;

    Ok(value)
}

fn classify(input: &[u8], err: serde_json::Error, field: Option<String>) -> DecodeError {
    match err.classify() {
        Category::Syntax => DecodeError::Syntax(offset_of(input, err.line(), err.column())),
        Category::Eof => DecodeError::UnexpectedEof,
        Category::Io => DecodeError::Io,
        Category::Data => {
            let message = err.to_string();
            if let Some(name) = quoted_name(&message, "unknown field `") {
                return DecodeError::UnknownField(name);
            }
            if let Some(name) = quoted_name(&message, "duplicate field `") {
                return DecodeError::DuplicateField(name);
            }
            match field {
                Some(field) => DecodeError::FieldType(field),
                None => DecodeError::Type(offset_of(input, err.line(), err.column())),
            }
        }
    }
}

/// serde names fields in backticks: "unknown field `name`, expected ..."
fn quoted_name(message: &str, prefix: &str) -> Option<String> {
    let rest = message.strip_prefix(prefix)?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

/// Byte offset for serde_json's 1-based line and column
fn offset_of(input: &[u8], line: usize, column: usize) -> usize {
    let line_start: usize = input
        .split(|b| *b == b'\n')
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum();
    line_start + column
}

/// JSON body extractor with strict decoding.
///
/// The body limit itself is enforced by the router's `DefaultBodyLimit`;
/// hitting it is reported as [`DecodeError::TooLarge`].
pub struct StrictJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for StrictJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| match rejection {
                BytesRejection::FailedToBufferBody(FailedToBufferBody::LengthLimitError(_)) => {
                    DecodeError::TooLarge
                }
                _ => DecodeError::Io,
            })?;

        Ok(StrictJson(decode_json(&bytes)?))
    }
}
