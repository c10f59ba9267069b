//! REST adapter for the `blog_posts` table.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};

use super::HostedClient;
use super::dto::{NewPostRowDto, PostPatchDto, PostRowDto};
use super::error_mapping::decode_json;
use crate::domain::ports::{BackendError, PostRepository};
use crate::domain::{Caller, NewPost, Post, PostId, PostUpdate, UserId};

const TABLE: &str = "blog_posts";
const NEWEST_FIRST: &str = "created_at.desc";
const RETURN_ROWS: &str = "return=representation";

/// [`PostRepository`] backed by the hosted REST API.
#[derive(Debug, Clone)]
pub struct HostedPostRepository {
    client: HostedClient,
}

impl HostedPostRepository {
    /// Create a repository sharing `client`.
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }

    fn rows(body: &[u8]) -> Result<Vec<Post>, BackendError> {
        let rows: Vec<PostRowDto> = decode_json(body)?;
        rows.into_iter().map(PostRowDto::into_domain).collect()
    }

    fn first_row(body: &[u8]) -> Result<Option<Post>, BackendError> {
        Ok(Self::rows(body)?.into_iter().next())
    }

    fn select_request(
        &self,
        caller: &Caller,
        filters: &[(&str, String)],
    ) -> Result<RequestBuilder, BackendError> {
        Ok(self
            .client
            .rest(Method::GET, TABLE, caller)?
            .query(&[("select", "*")])
            .query(filters))
    }

    fn insert_request(
        &self,
        caller: &Caller,
        post: &NewPost,
    ) -> Result<RequestBuilder, BackendError> {
        Ok(self
            .client
            .rest(Method::POST, TABLE, caller)?
            .header("Prefer", RETURN_ROWS)
            .json(&[NewPostRowDto::from(post)]))
    }

    fn update_request(
        &self,
        caller: &Caller,
        id: &PostId,
        update: &PostUpdate,
    ) -> Result<RequestBuilder, BackendError> {
        Ok(self
            .client
            .rest(Method::PATCH, TABLE, caller)?
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", RETURN_ROWS)
            .json(&PostPatchDto::from(update)))
    }

    fn delete_request(&self, caller: &Caller, id: &PostId) -> Result<RequestBuilder, BackendError> {
        Ok(self
            .client
            .rest(Method::DELETE, TABLE, caller)?
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", RETURN_ROWS))
    }

    async fn select(
        &self,
        caller: &Caller,
        filters: &[(&str, String)],
    ) -> Result<Vec<Post>, BackendError> {
        let body = self
            .client
            .send(self.select_request(caller, filters)?)
            .await?;
        Self::rows(&body)
    }
}

fn by_id(id: &PostId) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

fn by_owner(owner: &UserId) -> [(&'static str, String); 2] {
    [
        ("user_id", format!("eq.{owner}")),
        ("order", NEWEST_FIRST.to_owned()),
    ]
}

#[async_trait]
impl PostRepository for HostedPostRepository {
    async fn insert(&self, caller: &Caller, post: &NewPost) -> Result<Post, BackendError> {
        let body = self
            .client
            .send(self.insert_request(caller, post)?)
            .await?;
        Self::first_row(&body)?.ok_or_else(|| BackendError::decode("post insert returned no rows"))
    }

    async fn find_by_id(
        &self,
        caller: &Caller,
        id: &PostId,
    ) -> Result<Option<Post>, BackendError> {
        let rows = self.select(caller, &by_id(id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_all(&self, caller: &Caller) -> Result<Vec<Post>, BackendError> {
        self.select(caller, &[("order", NEWEST_FIRST.to_owned())])
            .await
    }

    async fn list_by_owner(
        &self,
        caller: &Caller,
        owner: &UserId,
    ) -> Result<Vec<Post>, BackendError> {
        self.select(caller, &by_owner(owner)).await
    }

    async fn update(
        &self,
        caller: &Caller,
        id: &PostId,
        update: &PostUpdate,
    ) -> Result<Option<Post>, BackendError> {
        let body = self
            .client
            .send(self.update_request(caller, id, update)?)
            .await?;
        Self::first_row(&body)
    }

    async fn delete(&self, caller: &Caller, id: &PostId) -> Result<bool, BackendError> {
        let body = self
            .client
            .send(self.delete_request(caller, id)?)
            .await?;
        Ok(!Self::rows(&body)?.is_empty())
    }
}
