//! Driven port for post rows in the hosted database.

use async_trait::async_trait;

use crate::domain::{Caller, NewPost, Post, PostId, PostUpdate, UserId};

use super::BackendError;

/// Port for post persistence.
///
/// Listings are ordered newest first by creation time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post. The owning profile must already exist.
    async fn insert(&self, caller: &Caller, post: &NewPost) -> Result<Post, BackendError>;

    /// Fetch one post.
    async fn find_by_id(&self, caller: &Caller, id: &PostId)
    -> Result<Option<Post>, BackendError>;

    /// List every post.
    async fn list_all(&self, caller: &Caller) -> Result<Vec<Post>, BackendError>;

    /// List the posts owned by one profile.
    async fn list_by_owner(
        &self,
        caller: &Caller,
        owner: &UserId,
    ) -> Result<Vec<Post>, BackendError>;

    /// Apply an update, returning the new row or `None` when nothing matched.
    async fn update(
        &self,
        caller: &Caller,
        id: &PostId,
        update: &PostUpdate,
    ) -> Result<Option<Post>, BackendError>;

    /// Delete a post, returning whether a row was removed.
    async fn delete(&self, caller: &Caller, id: &PostId) -> Result<bool, BackendError>;
}
