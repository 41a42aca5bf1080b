//! Dispatcher: folds a request through the ordered family resolvers.

use std::sync::Arc;

use serde::Serialize;

use topoauth_core::{ResolveResult, ResourceDescriptor};

use crate::families;
use crate::lookup::{Lookups, ModelLookup};
use crate::pattern::Route;
use crate::request::RequestContext;

/// Prefix of the latest topology API version.
pub const LATEST_API_PREFIX: &str = "/api/v3";

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "resources", rename_all = "snake_case")]
pub enum Resolution {
    /// No route matched; the caller applies its default policy.
    Unmatched,
    /// A route matched and produced these descriptors.
    Resolved(Vec<ResourceDescriptor>),
}

impl Resolution {
    pub fn is_unmatched(&self) -> bool {
        matches!(self, Self::Unmatched)
    }

    pub fn descriptors(&self) -> &[ResourceDescriptor] {
        match self {
            Self::Unmatched => &[],
            Self::Resolved(d) => d,
        }
    }

    pub fn into_descriptors(self) -> Vec<ResourceDescriptor> {
        match self {
            Self::Unmatched => Vec::new(),
            Self::Resolved(d) => d,
        }
    }
}

/// Everything a route handler may read.
pub struct ResolveCtx<'a> {
    pub request: &'a RequestContext,
    pub lookups: Lookups<'a>,
    /// Request path relative to the version prefix, `/`-joined.
    pub path: &'a str,
}

/// One domain area's slice of the route table.
#[derive(Clone, Copy)]
pub struct Family {
    pub name: &'static str,
    routes: fn() -> &'static [Route],
}

impl Family {
    pub const fn new(name: &'static str, routes: fn() -> &'static [Route]) -> Self {
        Self { name, routes }
    }

    pub fn routes(&self) -> &'static [Route] {
        (self.routes)()
    }

    /// `Ok(None)` when none of this family's routes match.
    pub fn resolve(&self, ctx: &ResolveCtx<'_>) -> ResolveResult<Option<Vec<ResourceDescriptor>>> {
        let method = ctx.request.method();
        for route in self.routes() {
            if let Some(matched) = route.matches(method, ctx.path) {
                tracing::debug!(family = self.name, route = route.name, "route matched");
                return (route.handler)(ctx, &matched).map(Some);
            }
        }
        Ok(None)
    }
}

impl core::fmt::Debug for Family {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Family").field("name", &self.name).finish()
    }
}

/// Route families of one API version, in precedence order.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    prefix: Vec<String>,
    families: Vec<Family>,
}

impl VersionResolver {
    pub fn new(prefix: &str, families: Vec<Family>) -> Self {
        Self {
            prefix: prefix.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect(),
            families,
        }
    }

    /// Latest topology API (`/api/v3`).
    pub fn latest() -> Self {
        Self::with_prefix(LATEST_API_PREFIX)
    }

    /// Latest route families mounted under a different prefix.
    pub fn with_prefix(prefix: &str) -> Self {
        Self::new(prefix, families::latest())
    }

    pub fn families(&self) -> &[Family] {
        &self.families
    }

    /// Path below this version's prefix, or `None` if the request is for another version.
    fn relative_path(&self, request: &RequestContext) -> Option<String> {
        let rest = request.segments().strip_prefix(self.prefix.as_slice())?;
        Some(format!("/{}", rest.join("/")))
    }

    /// Stops at the first family that matches or fails; later families are
    /// never consulted.
    pub fn resolve(
        &self,
        request: &RequestContext,
        lookups: Lookups<'_>,
    ) -> ResolveResult<Option<Vec<ResourceDescriptor>>> {
        let Some(path) = self.relative_path(request) else {
            return Ok(None);
        };
        let ctx = ResolveCtx {
            request,
            lookups,
            path: &path,
        };

        self.families.iter().try_fold(None, |done, family| match done {
            Some(descriptors) => Ok(Some(descriptors)),
            None => family.resolve(&ctx),
        })
    }
}

/// Entry point: resolves a request into resource descriptors.
///
/// Holds no per-call state; share one instance behind an `Arc`.
#[derive(Clone)]
pub struct Resolver {
    lookup: Arc<dyn ModelLookup>,
    versions: Vec<VersionResolver>,
}

impl Resolver {
    /// Resolver for the latest API version.
    pub fn new(lookup: Arc<dyn ModelLookup>) -> Self {
        Self {
            lookup,
            versions: vec![VersionResolver::latest()],
        }
    }

    /// Resolver with an explicit set of API versions, tried in order.
    pub fn with_versions(lookup: Arc<dyn ModelLookup>, versions: Vec<VersionResolver>) -> Self {
        Self { lookup, versions }
    }

    /// Register another API version after the existing ones.
    pub fn with_version(mut self, version: VersionResolver) -> Self {
        self.versions.push(version);
        self
    }

    /// On `Err` no descriptor is returned; partial results never escape.
    #[tracing::instrument(skip_all, fields(method = %request.method(), path = %request.path()))]
    pub fn resolve(&self, request: &RequestContext) -> ResolveResult<Resolution> {
        let lookups = Lookups::new(self.lookup.as_ref(), request.supplier_account());

        for version in &self.versions {
            if let Some(descriptors) = version.resolve(request, lookups)? {
                tracing::debug!(count = descriptors.len(), "request resolved");
                return Ok(Resolution::Resolved(descriptors));
            }
        }

        tracing::debug!("no route matched");
        Ok(Resolution::Unmatched)
    }
}

impl core::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Resolver").field("versions", &self.versions).finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use topoauth_core::{Action, BusinessId, Layer, LookupError, Metadata, ResolveError, ResourceType};

    use super::*;
    use crate::HttpMethod;
    use crate::testing::{FixedLookup, model, request, resolve};

    fn lookup() -> FixedLookup {
        FixedLookup::default().with_model(model(7, "host", 0))
    }

    #[test]
    fn unknown_paths_and_versions_are_unmatched() {
        for (method, path) in [
            (HttpMethod::Post, "/api/v3/nope"),
            (HttpMethod::Post, "/api/v2/create/instance/object/host"),
            (HttpMethod::Post, "/api/v3"),
            (HttpMethod::Patch, "/api/v3/update/object/1"),
        ] {
            assert_eq!(resolve(&lookup(), &request(method, path)).unwrap(), Resolution::Unmatched, "{path}");
        }
    }

    #[test]
    fn separators_and_query_do_not_affect_matching() {
        let plain = resolve(&lookup(), &request(HttpMethod::Post, "/api/v3/create/instance/object/host")).unwrap();
        for path in [
            "/api/v3/create/instance/object/host/",
            "//api/v3//create/instance/object/host",
            "/api/v3/create/instance/object/host?debug=1",
        ] {
            assert_eq!(resolve(&lookup(), &request(HttpMethod::Post, path)).unwrap(), plain, "{path}");
        }
    }

    #[test]
    fn lookup_outage_fails_resolution() {
        let down = lookup().failing(LookupError::Unavailable("connection refused".into()));
        let err = resolve(&down, &request(HttpMethod::Post, "/api/v3/create/instance/object/host")).unwrap_err();
        assert_eq!(err.kind(), "lookup_error");

        // Routes that never consult the lookup still resolve.
        let out = resolve(&down, &request(HttpMethod::Post, "/api/v3/create/associationtype")).unwrap();
        assert_eq!(out.descriptors().len(), 1);
    }

    #[test]
    fn resolution_is_repeatable() {
        let req = request(HttpMethod::Put, "/api/v3/updatemany/instance/object/host")
            .with_json_body(&json!({"update": [{"inst_id": 1}, {"inst_id": 2}]}))
            .with_metadata(Metadata::for_business(BusinessId::new(3)));
        let first = resolve(&lookup(), &req).unwrap();
        assert_eq!(first, resolve(&lookup(), &req).unwrap());
        assert_eq!(first.descriptors().len(), 2);
    }

    #[test]
    fn failures_carry_no_partial_output() {
        let req = request(HttpMethod::Put, "/api/v3/updatemany/instance/object/host")
            .with_json_body(&json!({"update": [{"inst_id": 1}, {"inst_id": "x"}]}));
        assert!(matches!(resolve(&lookup(), &req), Err(ResolveError::Parameter(_))));
    }

    #[test]
    fn additional_versions_are_tried_in_order() {
        let resolver = Resolver::new(Arc::new(lookup())).with_version(VersionResolver::with_prefix("/api/v4"));
        let out = resolver
            .resolve(&request(HttpMethod::Post, "/api/v4/find/instance/object/host"))
            .unwrap();
        assert_eq!(
            out.descriptors(),
            [ResourceDescriptor::new(ResourceType::ModelInstance, Action::FindMany).layer(Layer::model(7))]
        );
    }

    #[test]
    fn latest_families_keep_precedence_order() {
        let names: Vec<_> = VersionResolver::latest().families().iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            [
                "object_unique",
                "association_type",
                "object_association",
                "instance_association",
                "instance",
                "object",
                "classification",
                "attribute_group",
                "attribute",
                "mainline",
            ]
        );
    }

    #[test]
    fn resolution_serializes_with_status_tag() {
        let out = Resolution::Resolved(vec![ResourceDescriptor::new(ResourceType::Model, Action::Create)]);
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["status"], "resolved");
        assert_eq!(value["resources"][0]["action"], "create");
        assert_eq!(serde_json::to_value(Resolution::Unmatched).unwrap(), json!({"status": "unmatched"}));
    }
}
