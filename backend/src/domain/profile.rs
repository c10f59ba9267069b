//! Per-user profile metadata, distinct from the authentication identity.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Validation errors for profile fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileValidationError {
    /// The username was blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// The avatar reference was blank once trimmed.
    #[error("avatar url must not be empty")]
    EmptyAvatarUrl,
}

/// Display name shown alongside a user's posts.
///
/// ## Invariants
/// - Trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(raw: impl Into<String>) -> Result<Self, ProfileValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ProfileValidationError::EmptyUsername);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Derive a username for a freshly provisioned profile.
    ///
    /// Uses the local part of the account email when available, otherwise
    /// `user_` followed by the first eight characters of the identifier.
    ///
    /// # Examples
    /// ```
    /// use blog_backend::domain::{UserId, Username};
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
    /// assert_eq!(Username::derive(&id, Some("ada@example.com")).as_ref(), "ada");
    /// assert_eq!(Username::derive(&id, None).as_ref(), "user_3fa85f64");
    /// ```
    pub fn derive(user_id: &UserId, email: Option<&str>) -> Self {
        email
            .and_then(|address| address.split('@').next())
            .and_then(|local| Self::new(local).ok())
            .unwrap_or_else(|| Self::generated(user_id))
    }

    /// Fallback name built from the identifier alone.
    pub fn generated(user_id: &UserId) -> Self {
        Self(format!("user_{}", user_id.short_prefix()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = ProfileValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Persisted profile row.
///
/// ## Invariants
/// - At most one profile exists per `id`; the hosted backend's primary key
///   enforces this and provisioning never inserts twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Matches the authentication subject.
    pub id: UserId,
    /// Display name.
    pub username: Username,
    /// Optional avatar reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Creation timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Row inserted when provisioning a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    /// Owner identifier.
    pub id: UserId,
    /// Initial display name.
    pub username: Username,
    /// Creation and update timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Mutable profile fields accepted by an upsert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    /// Replacement display name.
    pub username: Option<Username>,
    /// Replacement avatar reference.
    pub avatar_url: Option<String>,
}

impl ProfileChanges {
    /// Validate raw inputs into a change set.
    pub fn try_from_parts(
        username: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<Self, ProfileValidationError> {
        let username = username.map(Username::new).transpose()?;
        let avatar_url = match avatar_url.map(str::trim) {
            Some("") => return Err(ProfileValidationError::EmptyAvatarUrl),
            other => other.map(str::to_owned),
        };
        Ok(Self {
            username,
            avatar_url,
        })
    }
}

/// Row written by a profile upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpsert {
    /// Owner identifier.
    pub id: UserId,
    /// Display name to store.
    pub username: Username,
    /// Avatar reference to store.
    pub avatar_url: Option<String>,
    /// Update timestamp.
    pub updated_at: DateTime<Utc>,
}
