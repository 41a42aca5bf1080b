//! Schema-level associations.
//!
//! Changing an association edits both endpoint schemas, so every mutation
//! resolves to one `Model`/`Update` descriptor per implicated schema.

use std::sync::LazyLock;

use topoauth_core::{
    Action, BusinessId, ModelAssociationFilter, ModelFilter, ResolveError, ResolveResult,
    ResourceDescriptor, ResourceType,
};

use crate::HttpMethod;
use crate::pattern::{Pattern, Route, RouteMatch};
use crate::resolver::ResolveCtx;
use crate::scope;

static ROUTES: LazyLock<Vec<Route>> = LazyLock::new(|| {
    vec![
        Route::new(
            "find object associations",
            HttpMethod::Post,
            Pattern::exact("/find/objectassociation"),
            find_many,
        ),
        Route::new(
            "create object association",
            HttpMethod::Post,
            Pattern::exact("/create/objectassociation"),
            create,
        ),
        Route::new(
            "update object association",
            HttpMethod::Put,
            Pattern::regex(r"^/update/objectassociation/([0-9]+)$"),
            update,
        ),
        Route::new(
            "delete object association",
            HttpMethod::Delete,
            Pattern::regex(r"^/delete/objectassociation/([0-9]+)$"),
            delete,
        ),
        Route::new(
            "find object associations by kind",
            HttpMethod::Post,
            Pattern::exact("/find/topoassociationtype"),
            find_many,
        ),
    ]
});

pub(super) fn routes() -> &'static [Route] {
    ROUTES.as_slice()
}

fn find_many(_: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![ResourceDescriptor::new(ResourceType::ModelAssociation, Action::FindMany)])
}

/// One update per distinct endpoint schema; every endpoint must exist.
fn endpoint_updates(
    ctx: &ResolveCtx<'_>,
    mut object_ids: Vec<String>,
    business_id: BusinessId,
) -> ResolveResult<Vec<ResourceDescriptor>> {
    object_ids.dedup();
    let models = ctx.lookups.models(&ModelFilter::ObjectIds(object_ids.clone()))?;
    object_ids
        .iter()
        .map(|object_id| -> ResolveResult<ResourceDescriptor> {
            let model = models
                .iter()
                .find(|model| &model.object_id == object_id)
                .ok_or_else(|| ResolveError::lookup(format!("association endpoint schema {object_id} not found")))?;
            Ok(ResourceDescriptor::new(ResourceType::Model, Action::Update)
                .instance(model.id)
                .business(business_id))
        })
        .collect()
}

fn create(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let business_id = scope::ambient_advisory(ctx.request, "create object association");
    let object_id = ctx.request.body_str("bk_obj_id")?;
    let asst_object_id = ctx.request.body_str("bk_asst_obj_id")?;
    endpoint_updates(
        ctx,
        vec![object_id.to_string(), asst_object_id.to_string()],
        business_id,
    )
}

fn existing_association_updates(
    ctx: &ResolveCtx<'_>,
    m: &RouteMatch<'_>,
    operation: &str,
) -> ResolveResult<Vec<ResourceDescriptor>> {
    let business_id = scope::ambient_advisory(ctx.request, operation);
    let association_id = m.id(0, "association id")?;
    let asst = ctx
        .lookups
        .model_association(&ModelAssociationFilter::Id(association_id))?;
    endpoint_updates(ctx, vec![asst.object_id, asst.asst_object_id], business_id)
}

fn update(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    existing_association_updates(ctx, m, "update object association")
}

fn delete(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    existing_association_updates(ctx, m, "delete object association")
}
