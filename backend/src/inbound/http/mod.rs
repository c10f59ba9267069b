//! HTTP inbound adapter exposing the blog REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod posts;
pub mod profiles;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api` handler on `cfg`.
///
/// The caller owns the scope so it can wrap the session middleware around
/// it. `blog/mine` and `blog/test-post` are registered ahead of `blog/{id}`.
pub fn api_services(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::check)
        .service(auth::login)
        .service(auth::refresh)
        .service(auth::logout)
        .service(profiles::has_profile)
        .service(profiles::create_profile)
        .service(profiles::get_profile)
        .service(profiles::update_profile)
        .service(posts::list_posts)
        .service(posts::create_post)
        .service(posts::list_my_posts)
        .service(posts::create_sample_post)
        .service(posts::get_post)
        .service(posts::update_post)
        .service(posts::delete_post);
}
