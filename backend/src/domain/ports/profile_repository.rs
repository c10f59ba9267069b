//! Driven port for profile rows in the hosted database.

use async_trait::async_trait;

use crate::domain::{Caller, NewProfile, Profile, ProfileUpsert, UserId};

use super::BackendError;

/// Port for reading and provisioning profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch a profile by owner identifier.
    async fn find_by_id(
        &self,
        caller: &Caller,
        id: &UserId,
    ) -> Result<Option<Profile>, BackendError>;

    /// Insert a profile unless one already exists for the identifier.
    ///
    /// Returns the inserted row, or `None` when an existing row made the
    /// insert a no-op. Implementations must resolve concurrent inserts for
    /// the same identifier without reporting a uniqueness failure.
    async fn insert_if_absent(
        &self,
        caller: &Caller,
        profile: &NewProfile,
    ) -> Result<Option<Profile>, BackendError>;

    /// Insert or merge a profile keyed on its identifier.
    async fn upsert(
        &self,
        caller: &Caller,
        profile: &ProfileUpsert,
    ) -> Result<Profile, BackendError>;
}
