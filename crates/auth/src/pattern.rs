//! Route patterns and the per-family route tables built from them.
//!
//! Patterns are matched against the path *relative to the API version
//! prefix*, already normalized to `/`-joined non-empty segments, so neither
//! a trailing slash nor doubled separators affect matching.

use regex::Regex;

use topoauth_core::{ResolveError, ResolveResult, ResourceDescriptor};

use crate::HttpMethod;
use crate::resolver::ResolveCtx;

/// Builds the descriptors for a matched route.
pub type Handler = fn(&ResolveCtx<'_>, &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>>;

/// A constant path or a parameterized matcher.
#[derive(Debug)]
pub enum Pattern {
    Exact(&'static str),
    Regex(Regex),
}

impl Pattern {
    pub fn exact(path: &'static str) -> Self {
        Self::Exact(path)
    }

    /// Compile a parameterized pattern.
    ///
    /// Only ever called with literals from the static route tables.
    pub fn regex(pattern: &str) -> Self {
        Self::Regex(Regex::new(pattern).expect("static route pattern must compile"))
    }

    pub fn captures<'p>(&self, path: &'p str) -> Option<RouteMatch<'p>> {
        match self {
            Self::Exact(exact) => (path == *exact).then(|| RouteMatch { captures: Vec::new() }),
            Self::Regex(re) => re.captures(path).map(|caps| RouteMatch {
                captures: caps
                    .iter()
                    .skip(1)
                    .map(|m| m.map_or("", |m| m.as_str()))
                    .collect(),
            }),
        }
    }
}

/// Captured path parameters of a matched route, in pattern order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'p> {
    captures: Vec<&'p str>,
}

impl<'p> RouteMatch<'p> {
    pub fn get(&self, idx: usize) -> ResolveResult<&'p str> {
        self.captures
            .get(idx)
            .copied()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ResolveError::parameter(format!("missing path parameter #{idx}")))
    }

    /// Parse a captured segment as a numeric identifier.
    pub fn id(&self, idx: usize, what: &str) -> ResolveResult<i64> {
        let raw = self.get(idx)?;
        raw.parse::<i64>()
            .map_err(|_| ResolveError::parameter(format!("invalid {what} {raw:?} in path")))
    }
}

/// One supported operation: a pattern bound to a single HTTP method.
pub struct Route {
    pub name: &'static str,
    pub method: HttpMethod,
    pub pattern: Pattern,
    pub handler: Handler,
}

impl Route {
    pub fn new(name: &'static str, method: HttpMethod, pattern: Pattern, handler: Handler) -> Self {
        Self {
            name,
            method,
            pattern,
            handler,
        }
    }

    /// Method mismatch is a plain no-match.
    pub fn matches<'p>(&self, method: HttpMethod, path: &'p str) -> Option<RouteMatch<'p>> {
        if self.method != method {
            return None;
        }
        self.pattern.captures(path)
    }
}

impl core::fmt::Debug for Route {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .finish()
    }
}
