//! Blog post endpoints.
//!
//! ```text
//! GET    /api/blog
//! POST   /api/blog {"title":"...","content":"..."}
//! GET    /api/blog/mine
//! POST   /api/blog/test-post {"userId":"..."}
//! GET    /api/blog/{id}
//! PUT    /api/blog/{id} {"title":"..."}
//! DELETE /api/blog/{id}
//! ```
//!
//! `mine` and `test-post` are registered before `{id}` so the literal
//! segments win.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Post, PostChanges, PostDraft, format_date, format_timestamp};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_post_id, post_validation_error};

/// Post as returned to clients, with a display-ready creation date.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    #[schema(value_type = String, example = "5b0c6f1e-3a9b-4f2e-9f57-0d2c1f9c3e11")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// `March 5, 2024` style date, or `Unknown date`.
    #[schema(example = "March 5, 2024")]
    pub created_at_display: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        let created_at_display = post
            .created_at
            .map_or_else(|| format_date(None), format_timestamp);
        Self {
            id: post.id.to_string(),
            title: post.title,
            content: post.content,
            user_id: post.user_id.to_string(),
            created_at: post.created_at,
            updated_at: post.updated_at,
            created_at_display,
        }
    }
}

/// Listing wrapper, newest first.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostsResponse {
    pub posts: Vec<PostResponse>,
}

impl From<Vec<Post>> for PostsResponse {
    fn from(posts: Vec<Post>) -> Self {
        Self {
            posts: posts.into_iter().map(PostResponse::from).collect(),
        }
    }
}

/// Body of `POST /api/blog`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Body of `PUT /api/blog/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Optional owner hint for `POST /api/blog/test-post`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SamplePostRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Result of `POST /api/blog/test-post`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SamplePostResponse {
    pub success: bool,
    pub message: String,
    pub post: PostResponse,
}

/// Body of `DELETE /api/blog/{id}`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletePostResponse {
    pub deleted: bool,
}

/// List every post, newest first.
#[utoipa::path(
    get,
    path = "/api/blog",
    responses(
        (status = 200, description = "All posts", body = PostsResponse),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Hosted backend unavailable", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "listPosts",
    security((), ("SessionCookie" = []))
)]
#[get("/blog")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<PostsResponse>> {
    let caller = session.caller()?;
    let posts = state.posts.list_posts(&caller).await?;
    Ok(web::Json(posts.into()))
}

/// Create a post owned by the caller, provisioning their profile first.
#[utoipa::path(
    post,
    path = "/api/blog",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created post", body = PostResponse),
        (status = 400, description = "Blank fields or foreign key violation", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Hosted backend unavailable", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/blog")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePostRequest>,
) -> ApiResult<HttpResponse> {
    let (caller, owner) = session.require_user()?;
    let CreatePostRequest { title, content } = payload.into_inner();
    let draft =
        PostDraft::try_from_parts(&title, &content).map_err(|err| post_validation_error(&err))?;
    let post = state.posts.create_post(&caller, &owner, draft).await?;
    Ok(HttpResponse::Created().json(PostResponse::from(post)))
}

/// List the caller's own posts, newest first.
#[utoipa::path(
    get,
    path = "/api/blog/mine",
    responses(
        (status = 200, description = "Caller's posts", body = PostsResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Hosted backend unavailable", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "listMyPosts"
)]
#[get("/blog/mine")]
pub async fn list_my_posts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<PostsResponse>> {
    let (caller, owner) = session.require_user()?;
    let posts = state.posts.list_posts_by_owner(&caller, &owner).await?;
    Ok(web::Json(posts.into()))
}

/// Create the fixed sample post used to verify a deployment.
///
/// Never provisions a profile; a missing one is `400 profile_required`.
#[utoipa::path(
    post,
    path = "/api/blog/test-post",
    request_body(content = SamplePostRequest, description = "Optional when signed in"),
    responses(
        (status = 200, description = "Sample post created", body = SamplePostResponse),
        (status = 400, description = "Missing profile or foreign key violation", body = ErrorSchema),
        (status = 401, description = "No user id available", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Hosted backend unavailable", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "createSamplePost",
    security((), ("SessionCookie" = []))
)]
#[post("/blog/test-post")]
pub async fn create_sample_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Option<web::Json<SamplePostRequest>>,
) -> ApiResult<web::Json<SamplePostResponse>> {
    let request = payload.map(web::Json::into_inner).unwrap_or_default();
    let (caller, owner) = session.resolve_owner(request.user_id.as_deref())?;
    let post = state.posts.create_sample_post(&caller, &owner).await?;
    Ok(web::Json(SamplePostResponse {
        success: true,
        message: "Test post created successfully".to_owned(),
        post: post.into(),
    }))
}

/// Read one post.
#[utoipa::path(
    get,
    path = "/api/blog/{id}",
    params(("id" = String, Path, description = "Post identifier (UUID)")),
    responses(
        (status = 200, description = "Post", body = PostResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Hosted backend unavailable", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "getPost",
    security((), ("SessionCookie" = []))
)]
#[get("/blog/{id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<PostResponse>> {
    let id = parse_post_id(&path)?;
    let caller = session.caller()?;
    let post = state.posts.get_post(&caller, &id).await?;
    Ok(web::Json(post.into()))
}

/// Update the title or content of one of the caller's posts.
#[utoipa::path(
    put,
    path = "/api/blog/{id}",
    params(("id" = String, Path, description = "Post identifier (UUID)")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated post", body = PostResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Hosted backend unavailable", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "updatePost"
)]
#[put("/blog/{id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdatePostRequest>,
) -> ApiResult<web::Json<PostResponse>> {
    let id = parse_post_id(&path)?;
    let caller = session.require_caller()?;
    let UpdatePostRequest { title, content } = payload.into_inner();
    let changes = PostChanges::try_from_parts(title.as_deref(), content.as_deref())
        .map_err(|err| post_validation_error(&err))?;
    let post = state.posts.update_post(&caller, &id, changes).await?;
    Ok(web::Json(post.into()))
}

/// Delete one of the caller's posts.
#[utoipa::path(
    delete,
    path = "/api/blog/{id}",
    params(("id" = String, Path, description = "Post identifier (UUID)")),
    responses(
        (status = 200, description = "Deleted", body = DeletePostResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Hosted backend unavailable", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/blog/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletePostResponse>> {
    let id = parse_post_id(&path)?;
    let caller = session.require_caller()?;
    state.posts.delete_post(&caller, &id).await?;
    Ok(web::Json(DeletePostResponse { deleted: true }))
}

#[cfg(test)]
#[path = "posts_tests.rs"]
mod tests;
