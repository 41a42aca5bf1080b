//! Immutable view of one inbound API call.

use std::sync::OnceLock;

use serde_json::Value as JsonValue;

use topoauth_core::{Metadata, ResolveError, ResolveResult};

use crate::HttpMethod;

/// Supplier account used when the caller does not declare one.
pub const DEFAULT_SUPPLIER_ACCOUNT: &str = "0";

/// The request being resolved.
///
/// Created fresh per call and never mutated by resolvers. The JSON body is
/// parsed lazily on the first field query and cached.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: HttpMethod,
    path: String,
    segments: Vec<String>,
    body: Vec<u8>,
    parsed_body: OnceLock<Result<JsonValue, String>>,
    metadata: Metadata,
    supplier_account: String,
}

impl RequestContext {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if let Some(idx) = path.find('?') {
            path.truncate(idx);
        }
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            method,
            path,
            segments,
            body: Vec::new(),
            parsed_body: OnceLock::new(),
            metadata: Metadata::default(),
            supplier_account: DEFAULT_SUPPLIER_ACCOUNT.to_string(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.parsed_body = OnceLock::new();
        self
    }

    pub fn with_json_body(self, body: &JsonValue) -> Self {
        self.with_body(body.to_string())
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_supplier_account(mut self, supplier_account: impl Into<String>) -> Self {
        self.supplier_account = supplier_account.into();
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Non-empty path components, in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Ambient scope declared by the caller outside path and body.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn supplier_account(&self) -> &str {
        &self.supplier_account
    }

    /// Parsed request body; an empty body reads as JSON `null`.
    pub fn body_json(&self) -> ResolveResult<&JsonValue> {
        let parsed = self.parsed_body.get_or_init(|| {
            if self.body.iter().all(u8::is_ascii_whitespace) {
                return Ok(JsonValue::Null);
            }
            serde_json::from_slice(&self.body).map_err(|e| e.to_string())
        });
        parsed
            .as_ref()
            .map_err(|e| ResolveError::parameter(format!("request body is not valid json: {e}")))
    }

    /// Look up a dotted field path (`delete.inst_ids`) in the body.
    ///
    /// Absent fields and explicit `null` both read as `None`.
    pub fn body_field(&self, path: &str) -> ResolveResult<Option<&JsonValue>> {
        let mut current = self.body_json()?;
        for key in path.split('.') {
            match current.get(key) {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok((!current.is_null()).then_some(current))
    }

    /// Required string field.
    pub fn body_str(&self, path: &str) -> ResolveResult<&str> {
        match self.body_field(path)? {
            Some(JsonValue::String(s)) if !s.is_empty() => Ok(s),
            Some(other) => Err(ResolveError::parameter(format!(
                "body field {path} must be a non-empty string, got {other}"
            ))),
            None => Err(ResolveError::parameter(format!("missing body field {path}"))),
        }
    }

    /// Required integer field; numeric strings are accepted.
    pub fn body_i64(&self, path: &str) -> ResolveResult<i64> {
        let value = self
            .body_field(path)?
            .ok_or_else(|| ResolveError::parameter(format!("missing body field {path}")))?;
        json_i64(value, path)
    }
}

/// Interpret a JSON value as an integer identifier.
pub fn json_i64(value: &JsonValue, what: &str) -> ResolveResult<i64> {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .ok_or_else(|| ResolveError::parameter(format!("{what} must be an integer, got {n}"))),
        JsonValue::String(s) => s
            .trim()
            .parse()
            .map_err(|_| ResolveError::parameter(format!("{what} must be an integer, got {s:?}"))),
        other => Err(ResolveError::parameter(format!(
            "{what} must be an integer, got {other}"
        ))),
    }
}
