//! Mainline hierarchy: mainline schema management and business instance trees.

use std::sync::LazyLock;

use topoauth_core::{Action, BusinessId, ResolveResult, ResourceDescriptor, ResourceType};

use crate::HttpMethod;
use crate::pattern::{Pattern, Route, RouteMatch};
use crate::resolver::ResolveCtx;
use crate::scope;

static ROUTES: LazyLock<Vec<Route>> = LazyLock::new(|| {
    vec![
        Route::new(
            "create mainline object",
            HttpMethod::Post,
            Pattern::exact("/create/topomodelmainline"),
            create,
        ),
        Route::new(
            "delete mainline object",
            HttpMethod::Delete,
            Pattern::regex(r"^/delete/topomodelmainline/object/([^\s/]+)$"),
            delete,
        ),
        Route::new(
            "find mainline object topology",
            HttpMethod::Post,
            Pattern::exact("/find/topomodelmainline"),
            find_model_topology,
        ),
        Route::new(
            "find mainline instance topology",
            HttpMethod::Get,
            Pattern::regex(r"^/find/topoinst/biz/([0-9]+)$"),
            find_instance_topology,
        ),
        Route::new(
            "find mainline sub instance topology",
            HttpMethod::Get,
            Pattern::regex(r"^/topoinstchild/object/([^\s/]+)/biz/([0-9]+)/inst/([0-9]+)$"),
            find_sub_instance_topology,
        ),
        Route::new(
            "find mainline idle and fault modules",
            HttpMethod::Get,
            Pattern::regex(r"^/find/topointernal/biz/([0-9]+)$"),
            find_internal_modules,
        ),
    ]
});

pub(super) fn routes() -> &'static [Route] {
    ROUTES.as_slice()
}

fn advisory(ctx: &ResolveCtx<'_>, resource_type: ResourceType, action: Action, operation: &str) -> ResourceDescriptor {
    ResourceDescriptor::new(resource_type, action).business(scope::ambient_advisory(ctx.request, operation))
}

fn create(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![advisory(ctx, ResourceType::MainlineModel, Action::Create, "create mainline object")])
}

fn delete(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![advisory(ctx, ResourceType::MainlineModel, Action::Delete, "delete mainline object")])
}

fn find_model_topology(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![advisory(
        ctx,
        ResourceType::MainlineModelTopology,
        Action::SkipAction,
        "find mainline object topology",
    )])
}

// The business in the path is not consulted; scope follows caller metadata.
fn find_instance_topology(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![advisory(
        ctx,
        ResourceType::MainlineInstanceTopology,
        Action::Find,
        "find mainline instance topology",
    )])
}

fn find_sub_instance_topology(_: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let business_id = BusinessId::new(m.id(1, "business id")?);
    Ok(vec![
        ResourceDescriptor::new(ResourceType::MainlineInstanceTopology, Action::Find).business(business_id),
    ])
}

fn find_internal_modules(_: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let business_id = BusinessId::new(m.id(0, "business id")?);
    Ok(vec![ResourceDescriptor::new(ResourceType::MainlineModel, Action::Find).business(business_id)])
}

#[cfg(test)]
mod tests {
    use topoauth_core::{Metadata, ResolveError};

    use super::*;
    use crate::testing::{FixedLookup, request, resolve};

    #[test]
    fn internal_modules_take_scope_from_path() {
        let req = request(HttpMethod::Get, "/api/v3/find/topointernal/biz/3");
        let out = resolve(&FixedLookup::default(), &req).unwrap();
        assert_eq!(
            out.descriptors(),
            [ResourceDescriptor::new(ResourceType::MainlineModel, Action::Find).business(BusinessId::new(3))]
        );
    }

    #[test]
    fn sub_instance_topology_ignores_caller_scope() {
        let req = request(HttpMethod::Get, "/api/v3/topoinstchild/object/set/biz/4/inst/17")
            .with_metadata(Metadata::for_business(BusinessId::new(9)));
        let out = resolve(&FixedLookup::default(), &req).unwrap();
        assert_eq!(out.descriptors()[0].business_id, BusinessId::new(4));
        assert_eq!(out.descriptors()[0].instance_id, None);
    }

    #[test]
    fn instance_topology_scope_follows_metadata_by_method() {
        let metadata = Metadata::for_business(BusinessId::new(9));

        let get = request(HttpMethod::Get, "/api/v3/find/topoinst/biz/4").with_metadata(metadata.clone());
        let out = resolve(&FixedLookup::default(), &get).unwrap();
        assert_eq!(
            out.descriptors(),
            [ResourceDescriptor::new(ResourceType::MainlineInstanceTopology, Action::Find)
                .business(BusinessId::new(9))]
        );

        let post = request(HttpMethod::Post, "/api/v3/find/topoinst/biz/4").with_metadata(metadata);
        let out = resolve(&FixedLookup::default(), &post).unwrap();
        assert_eq!(out.descriptors()[0].resource_type, ResourceType::ModelInstanceTopology);
    }

    #[test]
    fn oversized_business_in_path_is_parameter_error() {
        let req = request(HttpMethod::Get, "/api/v3/find/topointernal/biz/99999999999999999999");
        assert!(matches!(resolve(&FixedLookup::default(), &req), Err(ResolveError::Parameter(_))));
    }

    #[test]
    fn model_topology_is_skipped() {
        let req = request(HttpMethod::Post, "/api/v3/find/topomodelmainline");
        let out = resolve(&FixedLookup::default(), &req).unwrap();
        assert_eq!(out.descriptors()[0].action, Action::SkipAction);
    }
}
