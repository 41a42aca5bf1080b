//! Schema classifications. Scope is advisory throughout.

use std::sync::LazyLock;

use topoauth_core::{Action, ResolveResult, ResourceDescriptor, ResourceType};

use crate::HttpMethod;
use crate::pattern::{Pattern, Route, RouteMatch};
use crate::resolver::ResolveCtx;
use crate::scope;

static ROUTES: LazyLock<Vec<Route>> = LazyLock::new(|| {
    vec![
        Route::new(
            "create classification",
            HttpMethod::Post,
            Pattern::exact("/create/objectclassification"),
            create,
        ),
        Route::new(
            "delete classification",
            HttpMethod::Delete,
            Pattern::regex(r"^/delete/objectclassification/([0-9]+)$"),
            delete,
        ),
        Route::new(
            "update classification",
            HttpMethod::Put,
            Pattern::regex(r"^/update/objectclassification/([0-9]+)$"),
            update,
        ),
        Route::new(
            "find classifications",
            HttpMethod::Post,
            Pattern::exact("/find/objectclassification"),
            find_many,
        ),
        Route::new(
            "find objects of classification",
            HttpMethod::Post,
            Pattern::exact("/find/classificationobject"),
            find_objects,
        ),
    ]
});

pub(super) fn routes() -> &'static [Route] {
    ROUTES.as_slice()
}

fn classification(ctx: &ResolveCtx<'_>, action: Action, operation: &str) -> ResourceDescriptor {
    ResourceDescriptor::new(ResourceType::ModelClassification, action)
        .business(scope::ambient_advisory(ctx.request, operation))
}

fn create(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![classification(ctx, Action::Create, "create classification")])
}

fn delete(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let class_id = m.id(0, "classification id")?;
    Ok(vec![classification(ctx, Action::Delete, "delete classification").instance(class_id)])
}

fn update(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let class_id = m.id(0, "classification id")?;
    Ok(vec![classification(ctx, Action::Update, "update classification").instance(class_id)])
}

fn find_many(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![classification(ctx, Action::FindMany, "find classifications")])
}

fn find_objects(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let business_id = scope::ambient_advisory(ctx.request, "find objects of classification");
    Ok(vec![
        ResourceDescriptor::new(ResourceType::Model, Action::FindMany).business(business_id),
    ])
}
