use axum::{Extension, Json, body::Bytes, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::context::{RequestId, ResolvedResources};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Terminal handler for authorized requests.
///
/// Echoes the decision inputs so a fronting proxy (or a test) can see what
/// the request was authorized against.
pub async fn authorized(
    Extension(request_id): Extension<RequestId>,
    Extension(ResolvedResources(resources)): Extension<ResolvedResources>,
    body: Bytes,
) -> impl IntoResponse {
    Json(json!({
        "request_id": request_id.to_string(),
        "resources": resources,
        "body_bytes": body.len(),
    }))
}
