use axum::{Router, routing::get};

pub mod system;

/// Routes served without authorization.
pub fn public() -> Router {
    Router::new().route("/healthz", get(system::health))
}
