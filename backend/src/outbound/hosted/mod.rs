//! Hosted backend adapters: an authentication API plus a PostgREST-style
//! REST API over the `profiles` and `blog_posts` tables.
//!
//! This adapter owns transport details only: request building, timeout and
//! status mapping, and JSON decoding into domain types.

mod auth;
mod client;
mod dto;
mod error_mapping;
mod posts;
mod profiles;

pub use auth::HostedAuthGateway;
pub use client::{HostedClient, PublicKey};
pub use posts::HostedPostRepository;
pub use profiles::HostedProfileRepository;
