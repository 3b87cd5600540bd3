//! Field validation
//!
//! `Validator` collects one message per field for a single validation pass.
//! The rule functions below are pure predicates; resource validation routines
//! combine them with `Validator::check`.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Email-shaped strings: local part, `@`, domain labels
    pub static ref EMAIL_RX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Accumulates field-level validation errors.
///
/// Only the first message recorded for a field is kept, so rules should be
/// checked in dependency order (presence before bounds).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }

    /// True when no errors have been recorded
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record an error unless the field already has one
    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors.entry(key.into()).or_insert_with(|| message.into());
        self
    }

    /// Record `message` under `key` when `ok` is false
    pub fn check(&mut self, ok: bool, key: &str, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.add_error(key, message);
        }
        self
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn into_errors(self) -> BTreeMap<String, String> {
        self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Value is not the empty string
pub fn provided(value: &str) -> bool {
    !value.is_empty()
}

/// Byte length is at most `max`
pub fn max_bytes(value: &str, max: usize) -> bool {
    value.len() <= max
}

/// Byte length is within `[min, max]`
pub fn bytes_between(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.len())
}

/// Sequence length is within `[min, max]`
pub fn count_between(len: usize, min: usize, max: usize) -> bool {
    (min..=max).contains(&len)
}

/// Value is one of `permitted`
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.iter().any(|p| p == value)
}

/// Value matches the pattern
pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

/// All elements are pairwise distinct (exact comparison)
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(v))
}
