//! Wire representations of hosted backend rows and auth payloads.
//!
//! Rows use the database's snake_case column names. Conversion into domain
//! types re-validates identifiers so a malformed row surfaces as a decode
//! error rather than a panic further up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ports::BackendError;
use crate::domain::{
    AccessToken, AuthSession, AuthUser, NewPost, NewProfile, Post, PostId, PostUpdate, Profile,
    ProfileUpsert, RefreshToken, UserId, Username,
};

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileRowDto {
    id: String,
    username: String,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl ProfileRowDto {
    pub(crate) fn into_domain(self) -> Result<Profile, BackendError> {
        Ok(Profile {
            id: parse_user_id(&self.id)?,
            username: Username::new(self.username)
                .map_err(|error| BackendError::decode(format!("profile row: {error}")))?,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewProfileRowDto<'a> {
    id: &'a str,
    username: &'a str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'a> From<&'a NewProfile> for NewProfileRowDto<'a> {
    fn from(profile: &'a NewProfile) -> Self {
        Self {
            id: profile.id.as_ref(),
            username: profile.username.as_ref(),
            created_at: profile.timestamp,
            updated_at: profile.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileUpsertRowDto<'a> {
    id: &'a str,
    username: &'a str,
    avatar_url: Option<&'a str>,
    updated_at: DateTime<Utc>,
}

impl<'a> From<&'a ProfileUpsert> for ProfileUpsertRowDto<'a> {
    fn from(profile: &'a ProfileUpsert) -> Self {
        Self {
            id: profile.id.as_ref(),
            username: profile.username.as_ref(),
            avatar_url: profile.avatar_url.as_deref(),
            updated_at: profile.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostRowDto {
    id: String,
    title: String,
    content: String,
    user_id: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl PostRowDto {
    pub(crate) fn into_domain(self) -> Result<Post, BackendError> {
        Ok(Post {
            id: PostId::new(&self.id)
                .map_err(|error| BackendError::decode(format!("post row: {error}")))?,
            title: self.title,
            content: self.content,
            user_id: parse_user_id(&self.user_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewPostRowDto<'a> {
    title: &'a str,
    content: &'a str,
    user_id: &'a str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'a> From<&'a NewPost> for NewPostRowDto<'a> {
    fn from(post: &'a NewPost) -> Self {
        Self {
            title: post.draft.title(),
            content: post.draft.content(),
            user_id: post.user_id.as_ref(),
            created_at: post.timestamp,
            updated_at: post.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PostPatchDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    updated_at: DateTime<Utc>,
}

impl<'a> From<&'a PostUpdate> for PostPatchDto<'a> {
    fn from(update: &'a PostUpdate) -> Self {
        Self {
            title: update.changes.title(),
            content: update.changes.content(),
            updated_at: update.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PasswordGrantDto<'a> {
    pub(crate) email: &'a str,
    pub(crate) password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshGrantDto<'a> {
    pub(crate) refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthUserDto {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    last_sign_in_at: Option<DateTime<Utc>>,
}

impl AuthUserDto {
    pub(crate) fn into_domain(self) -> Result<AuthUser, BackendError> {
        let mut user = AuthUser::new(parse_user_id(&self.id)?);
        user.email = self.email.filter(|email| !email.trim().is_empty());
        user.last_sign_in_at = self.last_sign_in_at;
        Ok(user)
    }
}

#[derive(Deserialize)]
pub(crate) struct AuthSessionDto {
    access_token: String,
    refresh_token: String,
    user: AuthUserDto,
}

impl AuthSessionDto {
    pub(crate) fn into_domain(self) -> Result<AuthSession, BackendError> {
        Ok(AuthSession {
            access_token: AccessToken::new(self.access_token),
            refresh_token: RefreshToken::new(self.refresh_token),
            user: self.user.into_domain()?,
        })
    }
}

fn parse_user_id(raw: &str) -> Result<UserId, BackendError> {
    UserId::new(raw).map_err(|error| BackendError::decode(format!("user id {raw:?}: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PostChanges, PostDraft};
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
    const POST_ID: &str = "9b2f0d1e-6c1a-4d7e-8f3b-2a5c4e6d7f80";

    #[rstest]
    fn decodes_post_rows_with_vendor_timestamps() {
        let row: PostRowDto = serde_json::from_value(json!({
            "id": POST_ID,
            "title": "Hello",
            "content": "World",
            "user_id": USER_ID,
            "created_at": "2024-03-05T09:00:00.123456+00:00",
            "updated_at": null
        }))
        .expect("row decodes");

        let post = row.into_domain().expect("valid row");
        assert_eq!(post.user_id.as_ref(), USER_ID);
        assert_eq!(
            post.created_at.map(|ts| ts.date_naive().to_string()),
            Some("2024-03-05".to_owned())
        );
        assert!(post.updated_at.is_none());
    }

    #[rstest]
    fn rejects_rows_with_malformed_ids() {
        let row: ProfileRowDto = serde_json::from_value(json!({
            "id": "not-a-uuid",
            "username": "ada"
        }))
        .expect("row decodes");
        assert!(matches!(row.into_domain(), Err(BackendError::Decode { .. })));
    }

    #[rstest]
    fn patch_omits_unchanged_fields() {
        let update = PostUpdate {
            changes: PostChanges::try_from_parts(None, Some("Body")).expect("valid"),
            updated_at: Utc
                .with_ymd_and_hms(2024, 3, 5, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
        };
        let body = serde_json::to_value(PostPatchDto::from(&update)).expect("serialises");
        assert_eq!(
            body,
            json!({ "content": "Body", "updated_at": "2024-03-05T09:00:00Z" })
        );
    }

    #[rstest]
    fn new_post_rows_use_snake_case_columns() {
        let new_post = NewPost {
            draft: PostDraft::try_from_parts("Title", "Body").expect("valid"),
            user_id: UserId::new(USER_ID).expect("valid"),
            timestamp: Utc
                .with_ymd_and_hms(2024, 3, 5, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
        };
        let body = serde_json::to_value(NewPostRowDto::from(&new_post)).expect("serialises");
        assert_eq!(body["user_id"], USER_ID);
        assert_eq!(body["created_at"], body["updated_at"]);
    }

    #[rstest]
    fn decodes_auth_sessions() {
        let dto: AuthSessionDto = serde_json::from_value(json!({
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh",
            "user": { "id": USER_ID, "email": "ada@example.com", "aud": "authenticated" }
        }))
        .expect("session decodes");
        let session = dto.into_domain().expect("valid session");
        assert_eq!(session.access_token.expose(), "jwt");
        assert_eq!(session.user.email.as_deref(), Some("ada@example.com"));
    }
}
