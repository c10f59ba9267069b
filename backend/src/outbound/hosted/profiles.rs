//! REST adapter for the `profiles` table.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};

use super::HostedClient;
use super::dto::{NewProfileRowDto, ProfileRowDto, ProfileUpsertRowDto};
use super::error_mapping::decode_json;
use crate::domain::ports::{BackendError, ProfileRepository};
use crate::domain::{Caller, NewProfile, Profile, ProfileUpsert, UserId};

const TABLE: &str = "profiles";
const IGNORE_DUPLICATES: &str = "resolution=ignore-duplicates,return=representation";
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=representation";

/// [`ProfileRepository`] backed by the hosted REST API.
#[derive(Debug, Clone)]
pub struct HostedProfileRepository {
    client: HostedClient,
}

impl HostedProfileRepository {
    /// Create a repository sharing `client`.
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }

    fn first_row(body: &[u8]) -> Result<Option<Profile>, BackendError> {
        let rows: Vec<ProfileRowDto> = decode_json(body)?;
        rows.into_iter()
            .next()
            .map(ProfileRowDto::into_domain)
            .transpose()
    }

    fn find_request(&self, caller: &Caller, id: &UserId) -> Result<RequestBuilder, BackendError> {
        Ok(self
            .client
            .rest(Method::GET, TABLE, caller)?
            .query(&[("select", "*".to_owned()), ("id", format!("eq.{id}"))]))
    }

    /// Conflicts on the primary key resolve according to `prefer`; the
    /// affected row comes back only when one was written.
    fn on_conflict_request(
        &self,
        caller: &Caller,
        prefer: &'static str,
    ) -> Result<RequestBuilder, BackendError> {
        Ok(self
            .client
            .rest(Method::POST, TABLE, caller)?
            .query(&[("on_conflict", "id")])
            .header("Prefer", prefer))
    }

    fn insert_if_absent_request(
        &self,
        caller: &Caller,
        profile: &NewProfile,
    ) -> Result<RequestBuilder, BackendError> {
        Ok(self
            .on_conflict_request(caller, IGNORE_DUPLICATES)?
            .json(&[NewProfileRowDto::from(profile)]))
    }

    fn upsert_request(
        &self,
        caller: &Caller,
        profile: &ProfileUpsert,
    ) -> Result<RequestBuilder, BackendError> {
        Ok(self
            .on_conflict_request(caller, MERGE_DUPLICATES)?
            .json(&[ProfileUpsertRowDto::from(profile)]))
    }
}

#[async_trait]
impl ProfileRepository for HostedProfileRepository {
    async fn find_by_id(
        &self,
        caller: &Caller,
        id: &UserId,
    ) -> Result<Option<Profile>, BackendError> {
        let body = self.client.send(self.find_request(caller, id)?).await?;
        Self::first_row(&body)
    }

    async fn insert_if_absent(
        &self,
        caller: &Caller,
        profile: &NewProfile,
    ) -> Result<Option<Profile>, BackendError> {
        let body = self
            .client
            .send(self.insert_if_absent_request(caller, profile)?)
            .await?;
        Self::first_row(&body)
    }

    async fn upsert(
        &self,
        caller: &Caller,
        profile: &ProfileUpsert,
    ) -> Result<Profile, BackendError> {
        let body = self
            .client
            .send(self.upsert_request(caller, profile)?)
            .await?;
        Self::first_row(&body)?
            .ok_or_else(|| BackendError::decode("profile upsert returned no rows"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{DateTime, TimeZone, Utc};
    use reqwest::{Request, Url};
    use rstest::{fixture, rstest};

    use crate::domain::{AccessToken, Username};
    use crate::outbound::hosted::PublicKey;

    const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    #[fixture]
    fn repo() -> HostedProfileRepository {
        let base = Url::parse("https://project.example.co/").expect("valid url");
        let client = HostedClient::new(base, PublicKey::new("anon-key"), Duration::from_secs(5))
            .expect("client builds");
        HostedProfileRepository::new(client)
    }

    fn user_id() -> UserId {
        UserId::new(USER_ID).expect("valid id")
    }

    fn caller() -> Caller {
        Caller::user(user_id(), AccessToken::new("user-jwt"))
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn build(builder: Result<RequestBuilder, BackendError>) -> Request {
        builder.expect("builder").build().expect("request")
    }

    fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    fn json_body(request: &Request) -> serde_json::Value {
        let bytes = request
            .body()
            .and_then(reqwest::Body::as_bytes)
            .expect("buffered body");
        serde_json::from_slice(bytes).expect("json body")
    }

    #[rstest]
    fn lookup_selects_by_id(repo: HostedProfileRepository) {
        let request = build(repo.find_request(&caller(), &user_id()));
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url().path(), "/rest/v1/profiles");
        assert_eq!(
            request.url().query(),
            Some(format!("select=*&id=eq.{USER_ID}").as_str())
        );
    }

    #[rstest]
    fn provisioning_ignores_existing_rows(repo: HostedProfileRepository) {
        let profile = NewProfile {
            id: user_id(),
            username: Username::new("ada").expect("valid"),
            timestamp: timestamp(),
        };
        let request = build(repo.insert_if_absent_request(&caller(), &profile));
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().path(), "/rest/v1/profiles");
        assert_eq!(request.url().query(), Some("on_conflict=id"));
        assert_eq!(
            header(&request, "Prefer"),
            Some("resolution=ignore-duplicates,return=representation")
        );
        assert_eq!(header(&request, "authorization"), Some("Bearer user-jwt"));

        let body = json_body(&request);
        assert_eq!(body[0]["id"], USER_ID);
        assert_eq!(body[0]["username"], "ada");
    }

    #[rstest]
    fn upsert_merges_existing_rows(repo: HostedProfileRepository) {
        let profile = ProfileUpsert {
            id: user_id(),
            username: Username::new("ada").expect("valid"),
            avatar_url: Some("https://cdn.example/ada.png".to_owned()),
            updated_at: timestamp(),
        };
        let request = build(repo.upsert_request(&caller(), &profile));
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().query(), Some("on_conflict=id"));
        assert_eq!(
            header(&request, "Prefer"),
            Some("resolution=merge-duplicates,return=representation")
        );
        assert_eq!(json_body(&request)[0]["avatar_url"], "https://cdn.example/ada.png");
    }
}
