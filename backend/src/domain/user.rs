//! User identity as issued by the hosted authentication service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
}

/// Stable user identifier stored as a UUID.
///
/// Matches the authentication subject, and therefore the profile's primary
/// key in the hosted database.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    ///
    /// # Examples
    /// ```
    /// use blog_backend::domain::UserId;
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
    /// assert_eq!(id.short_prefix(), "3fa85f64");
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        let uuid = Uuid::new_v4();
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First eight characters of the identifier, used for generated names.
    pub fn short_prefix(&self) -> &str {
        self.1.get(..8).unwrap_or(self.1.as_str())
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Authenticated account as reported by the hosted authentication service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    /// Authentication subject.
    pub id: UserId,
    /// Account email, when the provider exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Most recent successful sign-in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    /// Build an account with only an identifier.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            email: None,
            last_sign_in_at: None,
        }
    }

    /// Attach the account email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    #[rstest]
    #[case("", UserValidationError::EmptyId)]
    #[case("not-a-uuid", UserValidationError::InvalidId)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
    fn rejects_invalid_ids(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserId::new(raw), Err(expected));
    }

    #[rstest]
    fn short_prefix_takes_first_eight_characters() {
        let id = UserId::new(VALID_ID).expect("valid id");
        assert_eq!(id.short_prefix(), "3fa85f64");
    }

    #[rstest]
    fn user_id_serialises_as_plain_string() {
        let id = UserId::new(VALID_ID).expect("valid id");
        assert_eq!(serde_json::to_value(&id).expect("serialise"), json!(VALID_ID));
        let decoded: UserId = serde_json::from_value(json!(VALID_ID)).expect("deserialise");
        assert_eq!(decoded, id);
    }

    #[rstest]
    fn auth_user_omits_missing_optional_fields() {
        let user = AuthUser::new(UserId::new(VALID_ID).expect("valid id"));
        let value = serde_json::to_value(&user).expect("serialise");
        assert_eq!(value, json!({ "id": VALID_ID }));
    }

    #[rstest]
    fn auth_user_uses_camel_case() {
        let mut user = AuthUser::new(UserId::new(VALID_ID).expect("valid id")).with_email("a@b.c");
        user.last_sign_in_at = Some(
            DateTime::parse_from_rfc3339("2024-03-05T10:00:00Z")
                .expect("timestamp")
                .with_timezone(&Utc),
        );
        let value = serde_json::to_value(&user).expect("serialise");
        assert!(value.get("lastSignInAt").is_some());
        assert_eq!(value.get("email"), Some(&json!("a@b.c")));
    }
}
