//! Schema definitions and the schema topology graph.

use std::sync::LazyLock;

use topoauth_core::{Action, ResolveResult, ResourceDescriptor, ResourceType};

use crate::HttpMethod;
use crate::pattern::{Pattern, Route, RouteMatch};
use crate::resolver::ResolveCtx;
use crate::scope;

static ROUTES: LazyLock<Vec<Route>> = LazyLock::new(|| {
    vec![
        Route::new("create object", HttpMethod::Post, Pattern::exact("/create/object"), create),
        Route::new(
            "delete object",
            HttpMethod::Delete,
            Pattern::regex(r"^/delete/object/([0-9]+)$"),
            delete,
        ),
        Route::new(
            "update object",
            HttpMethod::Put,
            Pattern::regex(r"^/update/object/([0-9]+)$"),
            update,
        ),
        Route::new("find objects", HttpMethod::Post, Pattern::exact("/find/object"), find_many),
        Route::new(
            "find object topology",
            HttpMethod::Post,
            Pattern::exact("/find/objecttopology"),
            find_topology,
        ),
        Route::new(
            "find object topology graphics",
            HttpMethod::Post,
            Pattern::regex(r"^/find/objecttopo/scope_type/([^\s/]+)/scope_id/([^\s/]+)$"),
            find_graphics,
        ),
        Route::new(
            "update object topology graphics",
            HttpMethod::Post,
            Pattern::regex(r"^/update/objecttopo/scope_type/([^\s/]+)/scope_id/([^\s/]+)$"),
            update_graphics,
        ),
    ]
});

pub(super) fn routes() -> &'static [Route] {
    ROUTES.as_slice()
}

fn model(ctx: &ResolveCtx<'_>, action: Action, operation: &str) -> ResourceDescriptor {
    ResourceDescriptor::new(ResourceType::Model, action)
        .business(scope::ambient_advisory(ctx.request, operation))
}

fn create(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![model(ctx, Action::Create, "create object")])
}

fn delete(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let object_id = m.id(0, "object id")?;
    Ok(vec![model(ctx, Action::Delete, "delete object").instance(object_id)])
}

fn update(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let object_id = m.id(0, "object id")?;
    Ok(vec![model(ctx, Action::Update, "update object").instance(object_id)])
}

fn find_many(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![model(ctx, Action::FindMany, "find objects")])
}

fn find_topology(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let business_id = scope::ambient_advisory(ctx.request, "find object topology");
    Ok(vec![
        ResourceDescriptor::new(ResourceType::ModelTopology, Action::Find).business(business_id),
    ])
}

// Graphics layout is not permission-checked; downstream skips these.
fn find_graphics(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let business_id = scope::ambient_advisory(ctx.request, "find object topology graphics");
    Ok(vec![
        ResourceDescriptor::new(ResourceType::ModelTopology, Action::SkipAction).business(business_id),
    ])
}

fn update_graphics(_: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![ResourceDescriptor::new(ResourceType::ModelTopology, Action::SkipAction)])
}

#[cfg(test)]
mod tests {
    use topoauth_core::{BusinessId, Metadata};

    use super::*;
    use crate::testing::{FixedLookup, request, resolve};

    #[test]
    fn delete_object_by_id() {
        let req = request(HttpMethod::Delete, "/api/v3/delete/object/12")
            .with_metadata(Metadata::for_business(BusinessId::new(6)));
        let out = resolve(&FixedLookup::default(), &req).unwrap();
        assert_eq!(
            out.descriptors(),
            [ResourceDescriptor::new(ResourceType::Model, Action::Delete)
                .instance(12)
                .business(BusinessId::new(6))]
        );
    }

    #[test]
    fn find_object_does_not_shadow_longer_paths() {
        let req = request(HttpMethod::Post, "/api/v3/find/object");
        let out = resolve(&FixedLookup::default(), &req).unwrap();
        assert_eq!(out.descriptors()[0].action, Action::FindMany);

        let req = request(HttpMethod::Post, "/api/v3/find/objecttopology");
        let out = resolve(&FixedLookup::default(), &req).unwrap();
        assert_eq!(out.descriptors()[0].resource_type, ResourceType::ModelTopology);
    }

    #[test]
    fn graphics_routes_are_skipped() {
        for (method, path) in [
            (HttpMethod::Post, "/api/v3/find/objecttopo/scope_type/global/scope_id/0"),
            (HttpMethod::Post, "/api/v3/update/objecttopo/scope_type/biz/scope_id/3"),
        ] {
            let out = resolve(&FixedLookup::default(), &request(method, path)).unwrap();
            assert_eq!(out.descriptors()[0].action, Action::SkipAction, "{path}");
        }
    }

    #[test]
    fn get_on_post_route_is_unmatched() {
        let req = request(HttpMethod::Get, "/api/v3/find/object");
        assert!(resolve(&FixedLookup::default(), &req).unwrap().is_unmatched());
    }
}
