//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The encrypted session cookie stores the hosted backend's tokens next to
//! the user id. Handlers only see a [`Caller`] built from those values.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde_json::json;
use tracing::warn;

use crate::domain::{AccessToken, AuthSession, Caller, Error, RefreshToken, UserId};
use crate::inbound::http::validation::{FieldName, parse_user_id};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ACCESS_TOKEN_KEY: &str = "access_token";
pub(crate) const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub(crate) const EMAIL_KEY: &str = "email";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        self.0
            .get::<String>(key)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Store the tokens and user id of a freshly issued hosted session.
    pub fn persist(&self, session: &AuthSession) -> Result<(), Error> {
        self.0.renew();
        self.write(USER_ID_KEY, session.user.id.as_ref())?;
        self.write(ACCESS_TOKEN_KEY, session.access_token.expose())?;
        self.write(REFRESH_TOKEN_KEY, session.refresh_token.expose())?;
        match session.user.email.as_deref() {
            Some(email) => self.write(EMAIL_KEY, email),
            None => {
                self.0.remove(EMAIL_KEY);
                Ok(())
            }
        }
    }

    /// Identity of the current request.
    ///
    /// A cookie missing either the user id or the access token is treated as
    /// anonymous, as is one whose user id no longer parses.
    pub fn caller(&self) -> Result<Caller, Error> {
        let (Some(raw_id), Some(token)) = (self.read(USER_ID_KEY)?, self.read(ACCESS_TOKEN_KEY)?)
        else {
            return Ok(Caller::Anonymous);
        };
        match UserId::new(raw_id) {
            Ok(user_id) => Ok(Caller::user(user_id, AccessToken::new(token))),
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                Ok(Caller::Anonymous)
            }
        }
    }

    /// Require a signed-in caller or return `401 Unauthorized`.
    pub fn require_caller(&self) -> Result<Caller, Error> {
        match self.caller()? {
            Caller::Anonymous => Err(Error::unauthorized("login required")),
            caller => Ok(caller),
        }
    }

    /// Like [`Self::require_caller`], also returning the user id.
    pub fn require_user(&self) -> Result<(Caller, UserId), Error> {
        let caller = self.require_caller()?;
        let user_id = caller
            .user_id()
            .cloned()
            .ok_or_else(|| Error::unauthorized("login required"))?;
        Ok((caller, user_id))
    }

    /// Resolve who a write acts for.
    ///
    /// The session user wins. Without a session, `fallback_user_id` (taken
    /// from the request body) is used and the call runs anonymously.
    pub fn resolve_owner(&self, fallback_user_id: Option<&str>) -> Result<(Caller, UserId), Error> {
        let caller = self.caller()?;
        if let Some(user_id) = caller.user_id() {
            let user_id = user_id.clone();
            return Ok((caller, user_id));
        }
        match fallback_user_id {
            Some(raw) => {
                let user_id = parse_user_id(raw, FieldName::new("userId"))?;
                Ok((Caller::Anonymous, user_id))
            }
            None => Err(Error::unauthorized("No user ID provided and no session found")
                .with_details(json!({
                    "code": "user_id_required",
                    "hint": "Sign in or provide a userId in the request body.",
                }))),
        }
    }

    /// Account email remembered at sign-in, if the provider reported one.
    pub fn email(&self) -> Result<Option<String>, Error> {
        self.read(EMAIL_KEY)
    }

    /// Stored refresh token, if any.
    pub fn refresh_token(&self) -> Result<Option<RefreshToken>, Error> {
        Ok(self.read(REFRESH_TOKEN_KEY)?.map(RefreshToken::new))
    }

    /// Drop every value and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AuthUser;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route(
                "/set",
                web::get().to(|session: SessionContext| async move {
                    let user = AuthUser::new(UserId::new(USER_ID).expect("fixture id"));
                    session.persist(&AuthSession {
                        access_token: AccessToken::new("access"),
                        refresh_token: RefreshToken::new("refresh"),
                        user,
                    })?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/set-invalid",
                web::get().to(|session: Session| async move {
                    session
                        .insert(USER_ID_KEY, "not-a-uuid")
                        .expect("set invalid user id");
                    session
                        .insert(ACCESS_TOKEN_KEY, "access")
                        .expect("set token");
                    HttpResponse::Ok()
                }),
            )
            .route(
                "/require",
                web::get().to(|session: SessionContext| async move {
                    let caller = session.require_caller()?;
                    let refresh = session.refresh_token()?.expect("refresh token stored");
                    let body = format!(
                        "{}|{}|{}",
                        caller.user_id().map(ToString::to_string).unwrap_or_default(),
                        caller.access_token().map(AccessToken::expose).unwrap_or_default(),
                        refresh.expose()
                    );
                    Ok::<_, Error>(HttpResponse::Ok().body(body))
                }),
            )
            .route(
                "/clear",
                web::get().to(|session: SessionContext| async move {
                    session.clear();
                    HttpResponse::Ok()
                }),
            )
    }

    #[actix_web::test]
    async fn round_trips_tokens_and_user_id() {
        let app = test::init_service(session_test_app()).await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = session_cookie(&set_res);

        let get_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/require")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = test::read_body(get_res).await;
        assert_eq!(body, format!("{USER_ID}|access|refresh"));
    }

    #[actix_web::test]
    async fn missing_session_is_unauthorised() {
        let app = test::init_service(session_test_app()).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/require").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn tampered_user_id_is_unauthorised() {
        let app = test::init_service(session_test_app()).await;
        let set_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = session_cookie(&set_res);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/require")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn resolve_owner_prefers_session_user() {
        let app = test::init_service(session_test_app().route(
            "/owner",
            web::get().to(|session: SessionContext| async move {
                let (caller, owner) =
                    session.resolve_owner(Some("11111111-1111-4111-8111-111111111111"))?;
                let kind = if matches!(caller, Caller::Anonymous) { "anon" } else { "user" };
                Ok::<_, Error>(HttpResponse::Ok().body(format!("{kind}|{owner}")))
            }),
        ))
        .await;

        let anonymous =
            test::call_service(&app, test::TestRequest::get().uri("/owner").to_request()).await;
        assert_eq!(
            test::read_body(anonymous).await,
            "anon|11111111-1111-4111-8111-111111111111"
        );

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let signed_in = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/owner")
                .cookie(session_cookie(&set_res))
                .to_request(),
        )
        .await;
        assert_eq!(test::read_body(signed_in).await, format!("user|{USER_ID}"));
    }

    #[actix_web::test]
    async fn clear_expires_the_cookie() {
        let app = test::init_service(session_test_app()).await;
        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set_res);

        let clear_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/clear")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let removal = clear_res
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("removal cookie sent");
        assert_eq!(removal.value(), "");
    }
}
