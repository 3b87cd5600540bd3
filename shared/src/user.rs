//! User accounts
//!
//! Only the entity and its validation rules live here; no endpoint serves
//! users yet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validator::{bytes_between, matches, max_bytes, provided, Validator, EMAIL_RX};

pub const NAME_MAX_BYTES: usize = 500;
pub const PASSWORD_MIN_BYTES: usize = 8;
pub const PASSWORD_MAX_BYTES: usize = 72;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub activated: bool,
    #[serde(skip)]
    pub version: i32,
}

/// Registration input
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(provided(email), "email", "must be provided");
    v.check(matches(email, &EMAIL_RX), "email", "must be a valid email address");
}

pub fn validate_password_plaintext(v: &mut Validator, password: &str) {
    v.check(provided(password), "password", "must be provided");
    v.check(
        bytes_between(password, PASSWORD_MIN_BYTES, usize::MAX),
        "password",
        format!("must be at least {PASSWORD_MIN_BYTES} bytes long"),
    );
    v.check(
        max_bytes(password, PASSWORD_MAX_BYTES),
        "password",
        format!("must not be more than {PASSWORD_MAX_BYTES} bytes long"),
    );
}

fn validate_name(v: &mut Validator, name: &str) {
    v.check(provided(name), "name", "must be provided");
    v.check(
        max_bytes(name, NAME_MAX_BYTES),
        "name",
        format!("must not be more than {NAME_MAX_BYTES} bytes long"),
    );
}

pub fn validate_user(v: &mut Validator, user: &User) {
    validate_name(v, &user.name);
    validate_email(v, &user.email);
}

impl RegisterUserRequest {
    pub fn validate(&self, v: &mut Validator) {
        validate_name(v, &self.name);
        validate_email(v, &self.email);
        validate_password_plaintext(v, &self.password);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_all_missing() {
        let mut v = Validator::new();
        RegisterUserRequest::default().validate(&mut v);
        let errors = v.into_errors();
        assert_eq!(errors["name"], "must be provided");
        assert_eq!(errors["email"], "must be provided");
        assert_eq!(errors["password"], "must be provided");
    }

    #[test]
    fn test_email_and_password_rules() {
        let mut v = Validator::new();
        RegisterUserRequest {
            name: "Alice".into(),
            email: "alice-at-example".into(),
            password: "short".into(),
        }
        .validate(&mut v);
        let errors = v.into_errors();
        assert!(!errors.contains_key("name"));
        assert_eq!(errors["email"], "must be a valid email address");
        assert_eq!(errors["password"], "must be at least 8 bytes long");

        let mut v = Validator::new();
        validate_password_plaintext(&mut v, &"p".repeat(73));
        assert_eq!(v.errors()["password"], "must not be more than 72 bytes long");
    }

    #[test]
    fn test_valid_user() {
        let user = User {
            id: 1,
            created_at: Utc::now(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            activated: false,
            version: 1,
        };
        let mut v = Validator::new();
        validate_user(&mut v, &user);
        assert!(v.valid());
    }
}
