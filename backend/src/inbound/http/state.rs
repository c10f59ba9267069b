//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services wired to ports, and stay testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{AuthGateway, PostRepository, ProfileRepository};
use crate::domain::{PostService, ProfileService, SessionService};

/// Parameter object bundling the port implementations behind the services.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub auth: Arc<dyn AuthGateway>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub sessions: SessionService,
    pub profiles: ProfileService,
    pub posts: PostService,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Wire the domain services to a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use blog_backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// use blog_backend::test_support::InMemoryBackend;
    /// use mockable::DefaultClock;
    ///
    /// let backend = Arc::new(InMemoryBackend::new());
    /// let state = HttpState::new(HttpStatePorts {
    ///     auth: backend.clone(),
    ///     profiles: backend.clone(),
    ///     posts: backend,
    ///     clock: Arc::new(DefaultClock),
    /// });
    /// let _posts = state.posts.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            auth,
            profiles,
            posts,
            clock,
        } = ports;
        let profiles = ProfileService::new(profiles, Arc::clone(&clock));
        Self {
            sessions: SessionService::new(auth),
            posts: PostService::new(posts, profiles.clone(), clock),
            profiles,
        }
    }
}
