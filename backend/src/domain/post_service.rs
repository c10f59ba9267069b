//! Post authoring use-cases.
//!
//! Creating a post provisions the author's profile first because the hosted
//! database rejects posts whose owner has no profile row. The two writes are
//! not transactional: a profile created here persists even if the post
//! insert then fails.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::backend_failure::{foreign_key_violation, map_backend_error};
use crate::domain::ports::{BackendError, PostRepository};
use crate::domain::{
    Caller, Error, NewPost, Post, PostChanges, PostDraft, PostId, PostUpdate, ProfileService,
    UserId, Username,
};

/// Title of the post created by [`PostService::create_sample_post`].
pub const SAMPLE_POST_TITLE: &str = "Test Blog Post";
/// Body of the post created by [`PostService::create_sample_post`].
pub const SAMPLE_POST_CONTENT: &str =
    "This is a test blog post created via the API to verify your backend setup is working correctly.";

/// Post use-cases backed by a [`PostRepository`].
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    profiles: ProfileService,
    clock: Arc<dyn Clock>,
}

impl PostService {
    /// Create a new service.
    pub fn new(
        posts: Arc<dyn PostRepository>,
        profiles: ProfileService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts,
            profiles,
            clock,
        }
    }

    fn map_post_error(error: BackendError) -> Error {
        match error {
            BackendError::ForeignKeyViolation { message } => {
                warn!(reason = %message, "post owner has no profile");
                foreign_key_violation(&message)
            }
            BackendError::NotFound => Self::post_not_found(),
            other => map_backend_error(other),
        }
    }

    fn post_not_found() -> Error {
        Error::not_found("Blog post not found")
    }

    fn profile_required() -> Error {
        Error::invalid_request("Profile not found").with_details(json!({
            "code": "profile_required",
            "hint": "You must create a profile before creating blog posts.",
        }))
    }

    fn require_actor(caller: &Caller) -> Result<&UserId, Error> {
        caller
            .user_id()
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    async fn insert(&self, caller: &Caller, owner: &UserId, draft: PostDraft) -> Result<Post, Error> {
        let new_post = NewPost {
            draft,
            user_id: owner.clone(),
            timestamp: self.clock.utc(),
        };
        let post = self
            .posts
            .insert(caller, &new_post)
            .await
            .map_err(Self::map_post_error)?;
        info!(post_id = %post.id, user_id = %owner, "created post");
        Ok(post)
    }

    /// Create a post owned by `owner`, provisioning its profile if needed.
    pub async fn create_post(
        &self,
        caller: &Caller,
        owner: &UserId,
        draft: PostDraft,
    ) -> Result<Post, Error> {
        self.profiles
            .ensure_profile(caller, owner, Username::generated(owner))
            .await?;
        self.insert(caller, owner, draft).await
    }

    /// Create the fixed sample post used to verify a deployment.
    ///
    /// Unlike [`Self::create_post`] this never provisions a profile.
    pub async fn create_sample_post(&self, caller: &Caller, owner: &UserId) -> Result<Post, Error> {
        if self.profiles.get_profile(caller, owner).await?.is_none() {
            return Err(Self::profile_required());
        }
        let draft = PostDraft::try_from_parts(SAMPLE_POST_TITLE, SAMPLE_POST_CONTENT)
            .map_err(|err| Error::internal(format!("sample post is invalid: {err}")))?;
        self.insert(caller, owner, draft).await
    }

    /// Fetch one post.
    pub async fn get_post(&self, caller: &Caller, id: &PostId) -> Result<Post, Error> {
        self.posts
            .find_by_id(caller, id)
            .await
            .map_err(Self::map_post_error)?
            .ok_or_else(Self::post_not_found)
    }

    /// List every post, newest first.
    pub async fn list_posts(&self, caller: &Caller) -> Result<Vec<Post>, Error> {
        self.posts
            .list_all(caller)
            .await
            .map_err(Self::map_post_error)
    }

    /// List the posts owned by `owner`, newest first.
    pub async fn list_posts_by_owner(
        &self,
        caller: &Caller,
        owner: &UserId,
    ) -> Result<Vec<Post>, Error> {
        self.posts
            .list_by_owner(caller, owner)
            .await
            .map_err(Self::map_post_error)
    }

    /// Update a post owned by the signed-in caller. Last writer wins.
    pub async fn update_post(
        &self,
        caller: &Caller,
        id: &PostId,
        changes: PostChanges,
    ) -> Result<Post, Error> {
        let actor = Self::require_actor(caller)?;
        let existing = self.get_post(caller, id).await?;
        if !existing.is_owned_by(actor) {
            return Err(Error::forbidden("Only the author can edit this post"));
        }

        let update = PostUpdate {
            changes,
            updated_at: self.clock.utc(),
        };
        self.posts
            .update(caller, id, &update)
            .await
            .map_err(Self::map_post_error)?
            .ok_or_else(Self::post_not_found)
    }

    /// Delete a post owned by the signed-in caller.
    pub async fn delete_post(&self, caller: &Caller, id: &PostId) -> Result<(), Error> {
        let actor = Self::require_actor(caller)?;
        let existing = self.get_post(caller, id).await?;
        if !existing.is_owned_by(actor) {
            return Err(Error::forbidden("Only the author can delete this post"));
        }

        let deleted = self
            .posts
            .delete(caller, id)
            .await
            .map_err(Self::map_post_error)?;
        if !deleted {
            return Err(Self::post_not_found());
        }
        info!(post_id = %id, "deleted post");
        Ok(())
    }
}

#[cfg(test)]
#[path = "post_service_tests.rs"]
mod tests;
