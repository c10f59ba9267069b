//! Wire the hosted backend adapters into HTTP state.

use std::sync::Arc;

use actix_web::web;
use blog_backend::inbound::http::state::{HttpState, HttpStatePorts};
use blog_backend::outbound::hosted::{
    HostedAuthGateway, HostedClient, HostedPostRepository, HostedProfileRepository,
};
use mockable::DefaultClock;

/// Build shared HTTP state over one pooled hosted backend client.
pub(super) fn build_http_state(client: &HostedClient) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(HttpStatePorts {
        auth: Arc::new(HostedAuthGateway::new(client.clone())),
        profiles: Arc::new(HostedProfileRepository::new(client.clone())),
        posts: Arc::new(HostedPostRepository::new(client.clone())),
        clock: Arc::new(DefaultClock),
    }))
}
