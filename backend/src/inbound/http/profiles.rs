//! Profile endpoints.
//!
//! ```text
//! GET  /api/user/has-profile
//! POST /api/profile/create {"userId":"...","email":"..."}
//! GET  /api/profile
//! PUT  /api/profile {"username":"ada","avatarUrl":"https://..."}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Caller, Profile, ProfileChanges, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, ProfileSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::profile_validation_error;

/// Optional identity hints for `POST /api/profile/create`.
///
/// Both fields are ignored when the request carries a session.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Result of `POST /api/profile/create`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionResponse {
    pub success: bool,
    pub message: String,
    #[schema(value_type = ProfileSchema)]
    pub profile: Profile,
}

/// Result of `GET /api/user/has-profile`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HasProfileResponse {
    pub has_profile: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<ProfileSchema>)]
    pub profile: Option<Profile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `PUT /api/profile`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Report whether the signed-in caller has a profile.
#[utoipa::path(
    get,
    path = "/api/user/has-profile",
    responses(
        (status = 200, description = "Profile status", body = HasProfileResponse),
        (status = 401, description = "No session", body = HasProfileResponse),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Hosted backend unavailable", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "hasProfile"
)]
#[get("/user/has-profile")]
pub async fn has_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let caller = session.caller()?;
    let Some(user_id) = caller.user_id() else {
        return Ok(HttpResponse::Unauthorized().json(HasProfileResponse {
            error: Some("You must be logged in to check profile status".to_owned()),
            ..HasProfileResponse::default()
        }));
    };

    let profile = state.profiles.get_profile(&caller, user_id).await?;
    Ok(HttpResponse::Ok().json(HasProfileResponse {
        has_profile: profile.is_some(),
        profile,
        error: None,
    }))
}

/// Provision a profile for the caller, returning the existing one if present.
///
/// The username comes from the email's local part (the session's email
/// first, then the body's) or falls back to `user_` and the id prefix.
#[utoipa::path(
    post,
    path = "/api/profile/create",
    request_body(content = ProvisionRequest, description = "Optional when signed in"),
    responses(
        (status = 200, description = "Profile created or already present", body = ProvisionResponse),
        (status = 400, description = "Duplicate profile or missing table", body = ErrorSchema),
        (status = 401, description = "No user id available", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Hosted backend unavailable", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "createProfile",
    security((), ("SessionCookie" = []))
)]
#[post("/profile/create")]
pub async fn create_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Option<web::Json<ProvisionRequest>>,
) -> ApiResult<web::Json<ProvisionResponse>> {
    let request = payload.map(web::Json::into_inner).unwrap_or_default();
    let (caller, user_id) = session.resolve_owner(request.user_id.as_deref())?;

    let email = match &caller {
        Caller::User { .. } => session.email()?.or(request.email),
        Caller::Anonymous => request.email,
    };
    let username = Username::derive(&user_id, email.as_deref());

    let provisioned = state
        .profiles
        .ensure_profile(&caller, &user_id, username)
        .await?;
    let message = if provisioned.created {
        "Profile created successfully"
    } else {
        "Profile already exists"
    };
    Ok(web::Json(ProvisionResponse {
        success: true,
        message: message.to_owned(),
        profile: provisioned.profile,
    }))
}

/// Fetch the caller's profile.
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No profile yet", body = ErrorSchema),
        (status = 503, description = "Hosted backend unavailable", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "getProfile"
)]
#[get("/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Profile>> {
    let (caller, user_id) = session.require_user()?;
    let profile = state.profiles.require_profile(&caller, &user_id).await?;
    Ok(web::Json(profile))
}

/// Create or update the caller's profile.
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Stored profile", body = ProfileSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Hosted backend unavailable", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "updateProfile"
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileUpdateRequest>,
) -> ApiResult<web::Json<Profile>> {
    let (caller, user_id) = session.require_user()?;
    let ProfileUpdateRequest {
        username,
        avatar_url,
    } = payload.into_inner();
    let changes = ProfileChanges::try_from_parts(username.as_deref(), avatar_url.as_deref())
        .map_err(|err| profile_validation_error(&err))?;
    let profile = state
        .profiles
        .upsert_profile(&caller, &user_id, changes)
        .await?;
    Ok(web::Json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::ports::{BackendError, MockProfileRepository};
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::test_session_middleware;
    use crate::test_support::{FixedClock, InMemoryBackend};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::{Value, json};

    const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).single().expect("timestamp"),
        ))
    }

    fn state_with(backend: &Arc<InMemoryBackend>) -> HttpState {
        HttpState::new(HttpStatePorts {
            auth: backend.clone(),
            profiles: backend.clone(),
            posts: backend.clone(),
            clock: clock(),
        })
    }

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .service(
                web::scope("/api")
                    .service(has_profile)
                    .service(create_profile)
                    .service(get_profile)
                    .service(update_profile),
            )
    }

    fn create_request(body: Value) -> actix_http::Request {
        actix_test::TestRequest::post()
            .uri("/api/profile/create")
            .set_json(body)
            .to_request()
    }

    #[actix_web::test]
    async fn has_profile_without_session_is_unauthorised() {
        let backend = Arc::new(InMemoryBackend::new());
        let app = actix_test::init_service(test_app(state_with(&backend))).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/user/has-profile").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["hasProfile"], false);
        assert!(body["error"].is_string());
    }

    #[rstest]
    #[case(json!({ "userId": USER_ID, "email": "ada@example.com" }), "ada")]
    #[case(json!({ "userId": USER_ID }), "user_3fa85f64")]
    #[actix_web::test]
    async fn anonymous_create_uses_body_identity(#[case] body: Value, #[case] username: &str) {
        let backend = Arc::new(InMemoryBackend::new());
        let app = actix_test::init_service(test_app(state_with(&backend))).await;

        let res = actix_test::call_service(&app, create_request(body)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let payload: Value = actix_test::read_body_json(res).await;
        assert_eq!(payload["success"], true);
        assert_eq!(payload["message"], "Profile created successfully");
        assert_eq!(payload["profile"]["username"], username);
        assert_eq!(backend.profile_count(), 1);
    }

    #[actix_web::test]
    async fn create_twice_returns_existing_profile() {
        let backend = Arc::new(InMemoryBackend::new());
        let app = actix_test::init_service(test_app(state_with(&backend))).await;

        let first = actix_test::call_service(&app, create_request(json!({ "userId": USER_ID, "email": "ada@example.com" }))).await;
        assert_eq!(first.status(), StatusCode::OK);
        let second = actix_test::call_service(&app, create_request(json!({ "userId": USER_ID, "email": "other@example.com" }))).await;
        let payload: Value = actix_test::read_body_json(second).await;
        assert_eq!(payload["message"], "Profile already exists");
        assert_eq!(payload["profile"]["username"], "ada");
        assert_eq!(backend.profile_count(), 1);
    }

    #[actix_web::test]
    async fn create_without_any_identity_is_unauthorised() {
        let backend = Arc::new(InMemoryBackend::new());
        let app = actix_test::init_service(test_app(state_with(&backend))).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post().uri("/api/profile/create").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], "user_id_required");
    }

    #[actix_web::test]
    async fn create_rejects_malformed_user_id() {
        let backend = Arc::new(InMemoryBackend::new());
        let app = actix_test::init_service(test_app(state_with(&backend))).await;
        let res = actix_test::call_service(&app, create_request(json!({ "userId": "nope" }))).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "userId");
    }

    #[rstest]
    #[case(BackendError::missing_table("relation \"profiles\" does not exist"), StatusCode::BAD_REQUEST, "missing_table")]
    #[case(BackendError::unique_violation("duplicate key"), StatusCode::BAD_REQUEST, "duplicate_profile")]
    #[case(BackendError::transport("connection reset"), StatusCode::SERVICE_UNAVAILABLE, "backend_unavailable")]
    #[actix_web::test]
    async fn create_maps_backend_failures(
        #[case] failure: BackendError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_insert_if_absent()
            .returning(move |_, _| Err(failure.clone()));
        let backend = Arc::new(InMemoryBackend::new());
        let state = HttpState::new(HttpStatePorts {
            auth: backend.clone(),
            profiles: Arc::new(profiles),
            posts: backend,
            clock: clock(),
        });
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(&app, create_request(json!({ "userId": USER_ID }))).await;
        assert_eq!(res.status(), status);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], code);
    }

    #[actix_web::test]
    async fn profile_routes_require_a_session() {
        let backend = Arc::new(InMemoryBackend::new());
        let app = actix_test::init_service(test_app(state_with(&backend))).await;
        let get = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/profile").to_request(),
        )
        .await;
        assert_eq!(get.status(), StatusCode::UNAUTHORIZED);
        let put = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri("/api/profile")
                .set_json(json!({ "username": "ada" }))
                .to_request(),
        )
        .await;
        assert_eq!(put.status(), StatusCode::UNAUTHORIZED);
    }
}
