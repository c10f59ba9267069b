//! In-process blog application over the in-memory hosted backend.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use blog_backend::Trace;
use blog_backend::inbound::http::api_services;
use blog_backend::inbound::http::state::{HttpState, HttpStatePorts};
use blog_backend::test_support::{FixedClock, InMemoryBackend};
use chrono::{TimeZone, Utc};
use serde_json::Value;

pub fn backend() -> Arc<InMemoryBackend> {
    Arc::new(InMemoryBackend::new())
}

pub fn http_state(backend: &Arc<InMemoryBackend>) -> HttpState {
    HttpState::new(HttpStatePorts {
        auth: backend.clone(),
        profiles: backend.clone(),
        posts: backend.clone(),
        clock: Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0)
                .single()
                .expect("timestamp"),
        )),
    })
}

pub async fn init(
    backend: &Arc<InMemoryBackend>,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build();
    test::init_service(
        App::new()
            .app_data(web::Data::new(http_state(backend)))
            .wrap(Trace)
            .service(web::scope("/api").wrap(session).configure(api_services)),
    )
    .await
}

/// Latest session cookie set on `res`, if any.
pub fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

pub async fn login<S>(app: &S, email: &str, password: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({ "email": email, "password": password }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "login failed: {}", res.status());
    session_cookie(&res).expect("login sets a session cookie")
}

/// Send `req` and return the status plus decoded JSON body.
pub async fn send<S>(app: &S, req: Request) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, req).await;
    let status = res.status().as_u16();
    let body = test::read_body(res).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, json)
}
