//! Profile provisioning and maintenance.
//!
//! Provisioning is idempotent: the repository inserts with "ignore
//! duplicates" semantics and the service re-reads the row when the insert
//! was skipped, so concurrent callers converge on the same profile.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::backend_failure::map_backend_error;
use crate::domain::ports::{BackendError, ProfileRepository};
use crate::domain::{
    Caller, Error, NewProfile, Profile, ProfileChanges, ProfileUpsert, UserId, Username,
};

/// Result of [`ProfileService::ensure_profile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedProfile {
    /// The stored profile.
    pub profile: Profile,
    /// Whether this call inserted it.
    pub created: bool,
}

/// Profile use-cases backed by a [`ProfileRepository`].
#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    clock: Arc<dyn Clock>,
}

impl ProfileService {
    /// Create a new service with the given repository and clock.
    pub fn new(profiles: Arc<dyn ProfileRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { profiles, clock }
    }

    fn map_profile_error(error: BackendError) -> Error {
        match error {
            BackendError::UniqueViolation { message } => {
                Error::invalid_request("Profile already exists").with_details(json!({
                    "code": "duplicate_profile",
                    "reason": message,
                }))
            }
            BackendError::MissingTable { message } => {
                Error::invalid_request("The profiles table does not exist").with_details(json!({
                    "code": "missing_table",
                    "hint": "Provision the profiles table in the hosted backend.",
                    "reason": message,
                }))
            }
            other => map_backend_error(other),
        }
    }

    /// Fetch the profile for `user_id`, if one exists.
    pub async fn get_profile(
        &self,
        caller: &Caller,
        user_id: &UserId,
    ) -> Result<Option<Profile>, Error> {
        self.profiles
            .find_by_id(caller, user_id)
            .await
            .map_err(Self::map_profile_error)
    }

    /// Fetch the profile for `user_id`, failing with `not_found` when absent.
    pub async fn require_profile(&self, caller: &Caller, user_id: &UserId) -> Result<Profile, Error> {
        self.get_profile(caller, user_id)
            .await?
            .ok_or_else(|| Error::not_found("Profile not found"))
    }

    /// Return the caller's profile, inserting one named `username` if missing.
    pub async fn ensure_profile(
        &self,
        caller: &Caller,
        user_id: &UserId,
        username: Username,
    ) -> Result<ProvisionedProfile, Error> {
        let new_profile = NewProfile {
            id: user_id.clone(),
            username,
            timestamp: self.clock.utc(),
        };
        let inserted = self
            .profiles
            .insert_if_absent(caller, &new_profile)
            .await
            .map_err(Self::map_profile_error)?;

        if let Some(profile) = inserted {
            info!(user_id = %user_id, username = %profile.username, "provisioned profile");
            return Ok(ProvisionedProfile {
                profile,
                created: true,
            });
        }

        let existing = self.get_profile(caller, user_id).await?.ok_or_else(|| {
            Error::internal("profile insert was skipped but no profile row exists")
        })?;
        Ok(ProvisionedProfile {
            profile: existing,
            created: false,
        })
    }

    /// Create or update the caller's profile.
    ///
    /// Fields missing from `changes` keep their stored value; a brand-new
    /// profile without a username receives a generated one.
    pub async fn upsert_profile(
        &self,
        caller: &Caller,
        user_id: &UserId,
        changes: ProfileChanges,
    ) -> Result<Profile, Error> {
        let existing = self.get_profile(caller, user_id).await?;
        let ProfileChanges {
            username,
            avatar_url,
        } = changes;

        let username = username
            .or_else(|| existing.as_ref().map(|profile| profile.username.clone()))
            .unwrap_or_else(|| Username::generated(user_id));
        let avatar_url =
            avatar_url.or_else(|| existing.and_then(|profile| profile.avatar_url));

        let row = ProfileUpsert {
            id: user_id.clone(),
            username,
            avatar_url,
            updated_at: self.clock.utc(),
        };
        self.profiles
            .upsert(caller, &row)
            .await
            .map_err(Self::map_profile_error)
    }
}

#[cfg(test)]
#[path = "profile_service_tests.rs"]
mod tests;
