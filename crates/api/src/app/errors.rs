use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use topoauth_auth::UnsupportedMethod;
use topoauth_core::ResolveError;

/// Every way the gateway refuses a request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthenticated,

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("no authorization rule for {method} {path}")]
    Unmatched { method: String, path: String },

    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error(transparent)]
    UnsupportedMethod(#[from] UnsupportedMethod),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Unauthenticated => json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "authentication required"),
            Self::Resolve(err) => resolve_error_to_response(err),
            Self::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
            err @ Self::Unmatched { .. } => json_error(StatusCode::FORBIDDEN, "unmatched_route", err.to_string()),
            err @ Self::PayloadTooLarge(_) => json_error(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", err.to_string()),
            err @ Self::BodyRead(_) => json_error(StatusCode::BAD_REQUEST, "invalid_body", err.to_string()),
            Self::UnsupportedMethod(err) => json_error(StatusCode::METHOD_NOT_ALLOWED, "unsupported_method", err.to_string()),
        }
    }
}

fn resolve_error_to_response(err: ResolveError) -> axum::response::Response {
    match &err {
        ResolveError::Parameter(_) | ResolveError::Scope(_) => {
            json_error(StatusCode::BAD_REQUEST, err.kind(), err.to_string())
        }
        // Backend detail stays in the logs.
        ResolveError::Lookup(detail) => {
            tracing::warn!(error = %detail, "resource lookup failed; denying request");
            json_error(StatusCode::FORBIDDEN, err.kind(), "resource lookup failed")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_errors_map_to_status_codes() {
        let cases = [
            (ResolveError::parameter("bad id"), StatusCode::BAD_REQUEST),
            (ResolveError::scope("no business"), StatusCode::BAD_REQUEST),
            (ResolveError::lookup("mongo: connection reset"), StatusCode::FORBIDDEN),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn refusals_map_to_status_codes() {
        assert_eq!(ApiError::Unauthenticated.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden("no".into()).into_response().status(), StatusCode::FORBIDDEN);
        let unmatched = ApiError::Unmatched {
            method: "POST".into(),
            path: "/api/v3/x".into(),
        };
        assert_eq!(unmatched.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::PayloadTooLarge(10).into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ApiError::BodyRead("reset".into()).into_response().status(), StatusCode::BAD_REQUEST);
    }
}
