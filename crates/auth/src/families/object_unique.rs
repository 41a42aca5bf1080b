//! Schema uniqueness rules (`objectunique`).
//!
//! Scope always comes from caller metadata; a malformed label is fatal here.

use std::sync::LazyLock;

use topoauth_core::{Action, Layer, ResolveResult, ResourceDescriptor, ResourceType};

use crate::HttpMethod;
use crate::pattern::{Pattern, Route, RouteMatch};
use crate::resolver::ResolveCtx;
use crate::scope;

static ROUTES: LazyLock<Vec<Route>> = LazyLock::new(|| {
    vec![
        Route::new(
            "create object unique",
            HttpMethod::Post,
            Pattern::regex(r"^/create/objectunique/object/([^\s/]+)$"),
            create,
        ),
        Route::new(
            "update object unique",
            HttpMethod::Put,
            Pattern::regex(r"^/update/objectunique/object/([^\s/]+)/unique/([0-9]+)$"),
            update,
        ),
        Route::new(
            "delete object unique",
            HttpMethod::Post,
            Pattern::regex(r"^/delete/objectunique/object/([^\s/]+)/unique/([0-9]+)$"),
            delete,
        ),
        Route::new(
            "find object unique",
            HttpMethod::Post,
            Pattern::regex(r"^/find/objectunique/object/([^\s/]+)$"),
            find,
        ),
    ]
});

pub(super) fn routes() -> &'static [Route] {
    ROUTES.as_slice()
}

fn unique(ctx: &ResolveCtx<'_>, object_id: &str, action: Action) -> ResolveResult<ResourceDescriptor> {
    let business_id = scope::ambient(ctx.request)?;
    let model = ctx.lookups.model(object_id)?;
    Ok(ResourceDescriptor::new(ResourceType::ModelUnique, action)
        .business(business_id)
        .layer(Layer::model(model.id)))
}

fn create(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![unique(ctx, m.get(0)?, Action::Create)?])
}

fn update(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let unique_id = m.id(1, "unique id")?;
    Ok(vec![unique(ctx, m.get(0)?, Action::Update)?.instance(unique_id)])
}

fn delete(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let unique_id = m.id(1, "unique id")?;
    Ok(vec![unique(ctx, m.get(0)?, Action::Delete)?.instance(unique_id)])
}

fn find(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![unique(ctx, m.get(0)?, Action::FindMany)?])
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use topoauth_core::{BusinessId, Metadata, ResolveError};

    use super::*;
    use crate::testing::{FixedLookup, model, request, resolve};

    fn lookup() -> FixedLookup {
        FixedLookup::default().with_model(model(7, "host", 0))
    }

    #[test]
    fn update_carries_unique_id_and_schema_layer() {
        let req = request(HttpMethod::Put, "/api/v3/update/objectunique/object/host/unique/15")
            .with_metadata(Metadata::for_business(BusinessId::new(2)));
        let out = resolve(&lookup(), &req).unwrap();

        assert_eq!(
            out.descriptors(),
            [ResourceDescriptor::new(ResourceType::ModelUnique, Action::Update)
                .instance(15)
                .business(BusinessId::new(2))
                .layer(Layer::model(7))]
        );
    }

    #[test]
    fn delete_is_bound_to_post() {
        let req = request(HttpMethod::Post, "/api/v3/delete/objectunique/object/host/unique/3");
        let out = resolve(&lookup(), &req).unwrap();
        assert_eq!(out.descriptors()[0].action, Action::Delete);

        let req = request(HttpMethod::Delete, "/api/v3/delete/objectunique/object/host/unique/3");
        assert!(resolve(&lookup(), &req).unwrap().is_unmatched());
    }

    #[test]
    fn malformed_scope_is_fatal() {
        let metadata: Metadata = serde_json::from_value(json!({"label": {"bk_biz_id": "x"}})).unwrap();
        let req = request(HttpMethod::Post, "/api/v3/find/objectunique/object/host").with_metadata(metadata);
        assert!(matches!(resolve(&lookup(), &req), Err(ResolveError::Parameter(_))));
    }

    #[test]
    fn unknown_schema_is_lookup_error() {
        let req = request(HttpMethod::Post, "/api/v3/create/objectunique/object/switch");
        assert!(matches!(resolve(&lookup(), &req), Err(ResolveError::Lookup(_))));
    }
}
