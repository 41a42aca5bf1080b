//! Association kind management. Platform-global: no business scope.

use std::sync::LazyLock;

use topoauth_core::{Action, ResolveResult, ResourceDescriptor, ResourceType};

use crate::HttpMethod;
use crate::pattern::{Pattern, Route, RouteMatch};
use crate::resolver::ResolveCtx;

static ROUTES: LazyLock<Vec<Route>> = LazyLock::new(|| {
    vec![
        Route::new(
            "find association kinds",
            HttpMethod::Post,
            Pattern::exact("/find/associationtype"),
            find_many,
        ),
        Route::new(
            "create association kind",
            HttpMethod::Post,
            Pattern::exact("/create/associationtype"),
            create,
        ),
        Route::new(
            "update association kind",
            HttpMethod::Put,
            Pattern::regex(r"^/update/associationtype/([0-9]+)$"),
            update,
        ),
        Route::new(
            "delete association kind",
            HttpMethod::Delete,
            Pattern::regex(r"^/delete/associationtype/([0-9]+)$"),
            delete,
        ),
    ]
});

pub(super) fn routes() -> &'static [Route] {
    ROUTES.as_slice()
}

fn find_many(_: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![ResourceDescriptor::new(ResourceType::AssociationType, Action::FindMany)])
}

fn create(_: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![ResourceDescriptor::new(ResourceType::AssociationType, Action::Create)])
}

fn update(_: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let kind_id = m.id(0, "association kind id")?;
    Ok(vec![
        ResourceDescriptor::new(ResourceType::AssociationType, Action::Update).instance(kind_id),
    ])
}

fn delete(_: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let kind_id = m.id(0, "association kind id")?;
    Ok(vec![
        ResourceDescriptor::new(ResourceType::AssociationType, Action::Delete).instance(kind_id),
    ])
}
