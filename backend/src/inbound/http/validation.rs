//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure becomes `400 invalid_request` with
//! `details.field` naming the offending JSON field and `details.code` a
//! stable sub-code.

use serde_json::json;

use crate::domain::{
    Error, PostId, PostValidationError, ProfileValidationError, SignInValidationError, UserId,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    EmptyEmail,
    EmptyPassword,
    EmptyUsername,
    EmptyAvatarUrl,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::EmptyEmail => "empty_email",
            ErrorCode::EmptyPassword => "empty_password",
            ErrorCode::EmptyUsername => "empty_username",
            ErrorCode::EmptyAvatarUrl => "empty_avatar_url",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_post_id(value: &str) -> Result<PostId, Error> {
    PostId::new(value).map_err(|_| invalid_uuid_error(FieldName::new("id"), value))
}

pub(crate) fn post_validation_error(error: &PostValidationError) -> Error {
    field_error(error.field(), error.code(), error.to_string())
}

pub(crate) fn profile_validation_error(error: &ProfileValidationError) -> Error {
    let (field, code) = match error {
        ProfileValidationError::EmptyUsername => ("username", ErrorCode::EmptyUsername),
        ProfileValidationError::EmptyAvatarUrl => ("avatarUrl", ErrorCode::EmptyAvatarUrl),
    };
    field_error(field, code.as_str(), error.to_string())
}

pub(crate) fn sign_in_validation_error(error: &SignInValidationError) -> Error {
    let (field, code) = match error {
        SignInValidationError::EmptyEmail => ("email", ErrorCode::EmptyEmail),
        SignInValidationError::EmptyPassword => ("password", ErrorCode::EmptyPassword),
    };
    field_error(field, code.as_str(), error.to_string())
}
