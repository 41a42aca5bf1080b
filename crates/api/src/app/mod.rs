//! HTTP application wiring.
//!
//! - `routes/`: public endpoints and the terminal handler
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;

use topoauth_auth::{ModelLookup, PolicyEngine, Resolver, VersionResolver};

use crate::config::ApiConfig;
use crate::middleware::{self, AuthorizeState};

pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: ApiConfig, lookup: Arc<dyn ModelLookup>, policy: Arc<dyn PolicyEngine>) -> Router {
    let resolver = Resolver::with_versions(lookup, vec![VersionResolver::with_prefix(&config.api_prefix)]);
    let state = AuthorizeState {
        resolver: Arc::new(resolver),
        policy,
        config: Arc::new(config),
    };

    // Everything outside the public routes goes through resolution and the policy engine.
    let protected = Router::new()
        .fallback(routes::system::authorized)
        .layer(axum::middleware::from_fn_with_state(state, middleware::authorize_middleware))
        .layer(axum::middleware::from_fn(middleware::trusted_header_auth));

    routes::public()
        .merge(protected)
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::request_id_middleware)))
}
