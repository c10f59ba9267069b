//! Blog post model and validated write payloads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// Validation errors for post identifiers and fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    /// The identifier was not a UUID.
    #[error("post id must be a valid UUID")]
    InvalidId,
    /// The title was blank once trimmed.
    #[error("Title is required")]
    EmptyTitle,
    /// The body was blank once trimmed.
    #[error("Content is required")]
    EmptyContent,
    /// An update carried no fields.
    #[error("update must change the title or the content")]
    EmptyUpdate,
}

impl PostValidationError {
    /// Field the error refers to, for client-side highlighting.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyTitle => "title",
            Self::EmptyContent => "content",
            Self::EmptyUpdate => "body",
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_post_id",
            Self::EmptyTitle => "empty_title",
            Self::EmptyContent => "empty_content",
            Self::EmptyUpdate => "empty_update",
        }
    }
}

/// Identifier assigned to a post by the hosted backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(Uuid);

impl PostId {
    /// Parse a post identifier from its textual form.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PostValidationError> {
        Uuid::parse_str(raw.as_ref().trim())
            .map(Self)
            .map_err(|_| PostValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted post row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Backend-assigned identifier.
    pub id: PostId,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Owning profile.
    pub user_id: UserId,
    /// Creation timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Whether `user_id` owns this post.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

/// Title and body of a post before it is persisted.
///
/// ## Invariants
/// - Both fields are trimmed and non-empty.
///
/// # Examples
/// ```
/// use blog_backend::domain::PostDraft;
///
/// let draft = PostDraft::try_from_parts("  Hello ", "World").unwrap();
/// assert_eq!(draft.title(), "Hello");
/// assert!(PostDraft::try_from_parts("", "World").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    title: String,
    content: String,
}

impl PostDraft {
    /// Validate raw title and body inputs.
    pub fn try_from_parts(title: &str, content: &str) -> Result<Self, PostValidationError> {
        Ok(Self {
            title: non_blank(title, PostValidationError::EmptyTitle)?,
            content: non_blank(content, PostValidationError::EmptyContent)?,
        })
    }

    /// Trimmed title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Trimmed body.
    pub fn content(&self) -> &str {
        self.content.as_str()
    }
}

/// Row inserted when creating a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    /// Validated title and body.
    pub draft: PostDraft,
    /// Owning profile.
    pub user_id: UserId,
    /// Creation and update timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Fields an update may replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    title: Option<String>,
    content: Option<String>,
}

impl PostChanges {
    /// Validate optional title and body replacements.
    ///
    /// Fields that are present must be non-blank; at least one must be set.
    pub fn try_from_parts(
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Self, PostValidationError> {
        if title.is_none() && content.is_none() {
            return Err(PostValidationError::EmptyUpdate);
        }
        Ok(Self {
            title: title
                .map(|raw| non_blank(raw, PostValidationError::EmptyTitle))
                .transpose()?,
            content: content
                .map(|raw| non_blank(raw, PostValidationError::EmptyContent))
                .transpose()?,
        })
    }

    /// Replacement title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Replacement body.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

/// Update applied by the post repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostUpdate {
    /// Validated replacements.
    pub changes: PostChanges,
    /// Refreshed update timestamp.
    pub updated_at: DateTime<Utc>,
}

fn non_blank(raw: &str, error: PostValidationError) -> Result<String, PostValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(error)
    } else {
        Ok(trimmed.to_owned())
    }
}
