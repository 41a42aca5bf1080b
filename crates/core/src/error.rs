//! Resolution error model.

use thiserror::Error;

/// Result type used across the resolution pipeline.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Terminal failure of a single resolution.
///
/// An unmatched route is *not* an error; it is reported as
/// `Resolution::Unmatched` by the resolver. Every variant here aborts the
/// resolution and must be turned into a denied request by the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A path or body parameter was malformed or missing.
    #[error("invalid parameter: {0}")]
    Parameter(String),

    /// The model lookup failed, or a required anchor record does not exist.
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// A business scope is required for this operation but was not supplied.
    #[error("missing business scope: {0}")]
    Scope(String),
}

impl ResolveError {
    pub fn parameter(msg: impl Into<String>) -> Self {
        Self::Parameter(msg.into())
    }

    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    pub fn scope(msg: impl Into<String>) -> Self {
        Self::Scope(msg.into())
    }

    /// Stable machine-readable kind, safe to expose to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parameter(_) => "parameter_error",
            Self::Lookup(_) => "lookup_error",
            Self::Scope(_) => "scope_error",
        }
    }
}

/// Failure reported by a model lookup backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The backend could not be reached.
    #[error("lookup backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with an error.
    #[error("lookup backend error: {0}")]
    Backend(String),
}

impl From<LookupError> for ResolveError {
    fn from(value: LookupError) -> Self {
        Self::Lookup(value.to_string())
    }
}
