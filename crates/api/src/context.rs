use axum::http::HeaderMap;
use uuid::Uuid;

use topoauth_auth::{DEFAULT_SUPPLIER_ACCOUNT, Principal, Role};
use topoauth_core::ResourceDescriptor;

/// Caller's ambient scope, as a JSON `Metadata` document.
pub const METADATA_HEADER: &str = "x-bkcmdb-metadata";
/// Supplier (tenant) account the request acts within.
pub const SUPPLIER_ACCOUNT_HEADER: &str = "http_bk_supplier_account";
/// Authenticated user name, set by the fronting authentication proxy.
pub const USER_HEADER: &str = "bk_user";
/// Supplier account the authenticated user belongs to; defaults to the
/// request's supplier account when the proxy does not assert one.
pub const USER_SUPPLIER_ACCOUNT_HEADER: &str = "x-bkcmdb-user-supplier-account";
/// Comma-separated roles of the authenticated user.
pub const ROLES_HEADER: &str = "x-bkcmdb-roles";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id for a request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Resources the current request was authorized against.
///
/// Empty when the route was unmatched and the unmatched policy allowed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedResources(pub Vec<ResourceDescriptor>);

pub fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub fn supplier_account(headers: &HeaderMap) -> &str {
    header_str(headers, SUPPLIER_ACCOUNT_HEADER).unwrap_or(DEFAULT_SUPPLIER_ACCOUNT)
}

/// Principal asserted by the trusted authentication proxy, if any.
pub fn principal_from_headers(headers: &HeaderMap) -> Option<Principal> {
    let user = header_str(headers, USER_HEADER)?;
    let roles = header_str(headers, ROLES_HEADER)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(|r| Role::new(r.to_string()))
                .collect()
        })
        .unwrap_or_default();

    Some(Principal {
        user: user.to_string(),
        supplier_account: header_str(headers, USER_SUPPLIER_ACCOUNT_HEADER)
            .unwrap_or_else(|| supplier_account(headers))
            .to_string(),
        roles,
    })
}
