//! Domain primitives, services, and ports.
//!
//! Purpose: define the strongly typed entities the HTTP adapter and the
//! hosted backend adapter exchange, plus the use-cases that sit between
//! them. Keep types immutable and document invariants and serialisation
//! contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Profile / Post: rows owned by the hosted database.
//! - SessionService / ProfileService / PostService: use-cases.

pub mod auth;
mod backend_failure;
pub mod date_format;
pub mod error;
pub mod ports;
pub mod post;
mod post_service;
pub mod profile;
mod profile_service;
mod session_service;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    AccessToken, AuthSession, Caller, RefreshToken, SignInCredentials, SignInValidationError,
};
pub use self::date_format::{format_date, format_timestamp};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::post::{
    NewPost, Post, PostChanges, PostDraft, PostId, PostUpdate, PostValidationError,
};
pub use self::post_service::{PostService, SAMPLE_POST_CONTENT, SAMPLE_POST_TITLE};
pub use self::profile::{
    NewProfile, Profile, ProfileChanges, ProfileUpsert, ProfileValidationError, Username,
};
pub use self::profile_service::{ProfileService, ProvisionedProfile};
pub use self::session_service::SessionService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{AuthUser, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use blog_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
