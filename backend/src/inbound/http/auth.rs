//! Authentication endpoints backed by the hosted authentication service.
//!
//! ```text
//! GET  /api/auth/check
//! POST /api/auth/login {"email":"ada@example.com","password":"..."}
//! POST /api/auth/refresh
//! POST /api/auth/logout
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{AuthUser, Caller, Error, SignInCredentials};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{AuthUserSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::sign_in_validation_error;

/// Login request body for `POST /api/auth/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Session presence as reported by `GET /api/auth/check`.
///
/// Also returned by a successful login. `error` and `details` are only set
/// when the hosted backend could not be asked.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusResponse {
    pub is_logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<AuthUserSchema>)]
    pub user: Option<AuthUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AuthStatusResponse {
    fn logged_in(user: AuthUser) -> Self {
        Self {
            is_logged_in: true,
            user: Some(user),
            ..Self::default()
        }
    }

    fn logged_out(message: &str) -> Self {
        Self {
            message: Some(message.to_owned()),
            ..Self::default()
        }
    }
}

/// Body of `POST /api/auth/refresh`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub refreshed: bool,
}

/// Body of `POST /api/auth/logout`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub signed_out: bool,
}

/// Report whether the request carries a live session.
///
/// A missing or rejected session is `200 {isLoggedIn:false}`. Only a hosted
/// backend outage produces `500`, so clients can tell the two apart.
#[utoipa::path(
    get,
    path = "/api/auth/check",
    responses(
        (status = 200, description = "Session state", body = AuthStatusResponse),
        (status = 500, description = "Hosted backend unreachable", body = AuthStatusResponse)
    ),
    tags = ["auth"],
    operation_id = "checkAuth",
    security([])
)]
#[get("/auth/check")]
pub async fn check(state: web::Data<HttpState>, session: SessionContext) -> ApiResult<HttpResponse> {
    let caller = session.caller()?;
    if matches!(caller, Caller::Anonymous) {
        return Ok(HttpResponse::Ok().json(AuthStatusResponse::logged_out("No active session found")));
    }

    match state.sessions.current_user(&caller).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(AuthStatusResponse::logged_in(user))),
        Ok(None) => {
            session.clear();
            Ok(HttpResponse::Ok().json(AuthStatusResponse::logged_out("Session expired")))
        }
        Err(error) => {
            warn!(code = ?error.code(), message = %error.message(), "session check failed");
            Ok(HttpResponse::InternalServerError().json(AuthStatusResponse {
                error: Some("Failed to check authentication status".to_owned()),
                details: Some(error.message().to_owned()),
                ..AuthStatusResponse::default()
            }))
        }
    }
}

/// Exchange an email and password for a session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthStatusResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Hosted backend unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthStatusResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = SignInCredentials::try_from_parts(&email, &password)
        .map_err(|err| sign_in_validation_error(&err))?;
    let auth_session = state.sessions.sign_in(&credentials).await?;
    session.persist(&auth_session)?;
    Ok(web::Json(AuthStatusResponse::logged_in(auth_session.user)))
}

/// Mint fresh tokens from the stored refresh token.
///
/// A rejected refresh token drops the session and answers `401`.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Tokens refreshed", body = RefreshResponse),
        (status = 401, description = "No session or session expired", body = ErrorSchema),
        (status = 503, description = "Hosted backend unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "refreshSession"
)]
#[post("/auth/refresh")]
pub async fn refresh(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<RefreshResponse>> {
    let token = session
        .refresh_token()?
        .ok_or_else(|| Error::unauthorized("login required"))?;
    match state.sessions.refresh(&token).await? {
        Some(fresh) => {
            session.persist(&fresh)?;
            Ok(web::Json(RefreshResponse { refreshed: true }))
        }
        None => {
            session.clear();
            Err(Error::unauthorized("session expired"))
        }
    }
}

/// Revoke the hosted session and clear the cookie.
///
/// Always succeeds; revocation failures are logged by the session service.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = LogoutResponse)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(state: web::Data<HttpState>, session: SessionContext) -> web::Json<LogoutResponse> {
    match session.caller() {
        Ok(Caller::User { access_token, .. }) => state.sessions.sign_out(&access_token).await,
        Ok(Caller::Anonymous) => {}
        Err(error) => warn!(message = %error.message(), "unreadable session during logout"),
    }
    session.clear();
    web::Json(LogoutResponse { signed_out: true })
}
