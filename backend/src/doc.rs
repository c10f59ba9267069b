//! OpenAPI document for the blog API.
//!
//! Domain types are described through the wrappers in
//! [`crate::inbound::http::schemas`] so the domain stays free of utoipa.
//! Swagger UI serves the document in debug builds.

use crate::inbound::http::auth::{AuthStatusResponse, LoginRequest, LogoutResponse, RefreshResponse};
use crate::inbound::http::posts::{
    CreatePostRequest, DeletePostResponse, PostResponse, PostsResponse, SamplePostRequest,
    SamplePostResponse, UpdatePostRequest,
};
use crate::inbound::http::profiles::{
    HasProfileResponse, ProfileUpdateRequest, ProvisionRequest, ProvisionResponse,
};
use crate::inbound::http::schemas::{AuthUserSchema, ErrorCodeSchema, ErrorSchema, ProfileSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by POST /api/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Blog backend API",
        description = "Session-authenticated blog posts and profiles backed by a hosted database."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::check,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::refresh,
        crate::inbound::http::auth::logout,
        crate::inbound::http::profiles::has_profile,
        crate::inbound::http::profiles::create_profile,
        crate::inbound::http::profiles::get_profile,
        crate::inbound::http::profiles::update_profile,
        crate::inbound::http::posts::list_posts,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::list_my_posts,
        crate::inbound::http::posts::create_sample_post,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::update_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        ProfileSchema,
        AuthUserSchema,
        LoginRequest,
        AuthStatusResponse,
        RefreshResponse,
        LogoutResponse,
        ProvisionRequest,
        ProvisionResponse,
        HasProfileResponse,
        ProfileUpdateRequest,
        PostResponse,
        PostsResponse,
        CreatePostRequest,
        UpdatePostRequest,
        SamplePostRequest,
        SamplePostResponse,
        DeletePostResponse,
    )),
    tags(
        (name = "auth", description = "Sign-in, refresh and sign-out"),
        (name = "profiles", description = "User profiles"),
        (name = "posts", description = "Blog posts"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;
