use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use http_body_util::LengthLimitError;
use tracing::Instrument;

use topoauth_auth::{Decision, HttpMethod, PolicyEngine, Principal, RequestContext, Resolver, authorize};
use topoauth_core::{Metadata, ResolveError};

use crate::app::errors::ApiError;
use crate::config::{ApiConfig, UnmatchedPolicy};
use crate::context::{self, RequestId, ResolvedResources};

#[derive(Clone)]
pub struct AuthorizeState {
    pub resolver: Arc<Resolver>,
    pub policy: Arc<dyn PolicyEngine>,
    pub config: Arc<ApiConfig>,
}

/// Tag every request with a correlation id and a tracing span.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    req.extensions_mut().insert(request_id);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );
    let mut res = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        res.headers_mut().insert(context::REQUEST_ID_HEADER, value);
    }
    res
}

/// Attach the principal asserted by the fronting authentication proxy.
///
/// A principal already present in the extensions wins.
pub async fn trusted_header_auth(mut req: Request, next: Next) -> Response {
    if req.extensions().get::<Principal>().is_none() {
        if let Some(principal) = context::principal_from_headers(req.headers()) {
            req.extensions_mut().insert(principal);
        }
    }
    next.run(req).await
}

/// Resolve the request into resources and enforce the policy engine.
///
/// On success the body is restored and the resolved resources travel on as
/// a [`ResolvedResources`] extension.
pub async fn authorize_middleware(
    State(state): State<AuthorizeState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = req.into_parts();

    let principal = parts
        .extensions
        .get::<Principal>()
        .cloned()
        .ok_or(ApiError::Unauthenticated)?;
    let method: HttpMethod = parts.method.as_str().parse()?;

    let bytes = axum::body::to_bytes(body, state.config.body_limit)
        .await
        .map_err(|err| {
            if exceeds_limit(&err) {
                ApiError::PayloadTooLarge(state.config.body_limit)
            } else {
                ApiError::BodyRead(err.to_string())
            }
        })?;

    let supplier_account = context::supplier_account(&parts.headers).to_string();
    let ctx = RequestContext::new(method, parts.uri.path())
        .with_body(bytes.to_vec())
        .with_metadata(ambient_metadata(&parts.headers, &bytes)?)
        .with_supplier_account(supplier_account);

    let resolution = state.resolver.resolve(&ctx)?;
    if resolution.is_unmatched() {
        match state.config.unmatched_policy {
            UnmatchedPolicy::Deny => {
                return Err(ApiError::Unmatched {
                    method: method.to_string(),
                    path: ctx.path().to_string(),
                });
            }
            UnmatchedPolicy::Allow => {
                tracing::warn!("no authorization rule matched; allowed by unmatched policy");
            }
        }
    }
    let resources = resolution.into_descriptors();

    match authorize(state.policy.as_ref(), &principal, ctx.supplier_account(), &resources) {
        Decision::Allow => {
            tracing::debug!(user = %principal.user, resources = resources.len(), "request authorized");
        }
        Decision::Deny(reason) => {
            tracing::info!(user = %principal.user, kind = ?reason.kind, "request denied");
            return Err(ApiError::Forbidden(reason.message));
        }
    }

    parts.extensions.insert(ResolvedResources(resources));
    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

/// Caller scope from the metadata header, else from the body's `metadata` field.
fn ambient_metadata(headers: &HeaderMap, body: &Bytes) -> Result<Metadata, ResolveError> {
    if let Some(raw) = context::header_str(headers, context::METADATA_HEADER) {
        return serde_json::from_str(raw)
            .map_err(|e| ResolveError::parameter(format!("invalid metadata header: {e}")));
    }

    let Ok(serde_json::Value::Object(mut doc)) = serde_json::from_slice::<serde_json::Value>(body) else {
        return Ok(Metadata::default());
    };
    match doc.remove("metadata") {
        None | Some(serde_json::Value::Null) => Ok(Metadata::default()),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| ResolveError::parameter(format!("invalid body metadata: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use topoauth_core::BusinessId;

    use super::*;

    #[test]
    fn header_metadata_wins_over_body() {
        let mut headers = HeaderMap::new();
        headers.insert(context::METADATA_HEADER, HeaderValue::from_static(r#"{"label":{"bk_biz_id":"4"}}"#));
        let body = Bytes::from_static(br#"{"metadata":{"label":{"bk_biz_id":"9"}}}"#);

        let metadata = ambient_metadata(&headers, &body).unwrap();
        assert_eq!(metadata.business_id().unwrap(), BusinessId::new(4));

        let metadata = ambient_metadata(&HeaderMap::new(), &body).unwrap();
        assert_eq!(metadata.business_id().unwrap(), BusinessId::new(9));
    }

    #[test]
    fn non_json_body_has_no_metadata() {
        let metadata = ambient_metadata(&HeaderMap::new(), &Bytes::from_static(b"plain text")).unwrap();
        assert_eq!(metadata, Metadata::default());
    }

    #[test]
    fn malformed_metadata_is_a_parameter_error() {
        let mut headers = HeaderMap::new();
        headers.insert(context::METADATA_HEADER, HeaderValue::from_static("{not json"));
        assert!(matches!(ambient_metadata(&headers, &Bytes::new()), Err(ResolveError::Parameter(_))));

        let body = Bytes::from_static(br#"{"metadata": 3}"#);
        assert!(matches!(ambient_metadata(&HeaderMap::new(), &body), Err(ResolveError::Parameter(_))));
    }

    #[tokio::test]
    async fn only_the_length_limit_is_reported_as_too_large() {
        let err = axum::body::to_bytes(Body::from(vec![0u8; 64]), 16).await.unwrap_err();
        assert!(exceeds_limit(&err));

        let reset = axum::Error::new(std::io::Error::other("connection reset"));
        assert!(!exceeds_limit(&reset));
    }
}
