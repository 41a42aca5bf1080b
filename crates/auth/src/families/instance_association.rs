//! Instance-level associations (data edges).
//!
//! Creating or deleting an edge is authorized as an update of both endpoint
//! instances, each scoped under its own schema.

use std::sync::LazyLock;

use topoauth_core::{
    Action, BusinessId, InstanceAssociationFilter, Layer, Model, ModelAssociationFilter,
    ModelFilter, ResolveError, ResolveResult, ResourceDescriptor, ResourceType,
};

use crate::HttpMethod;
use crate::pattern::{Pattern, Route, RouteMatch};
use crate::resolver::ResolveCtx;
use crate::scope;

static ROUTES: LazyLock<Vec<Route>> = LazyLock::new(|| {
    vec![
        Route::new(
            "find instance associations",
            HttpMethod::Post,
            Pattern::exact("/find/instassociation"),
            find_many,
        ),
        Route::new(
            "create instance association",
            HttpMethod::Post,
            Pattern::exact("/create/instassociation"),
            create,
        ),
        Route::new(
            "delete instance association",
            HttpMethod::Delete,
            Pattern::regex(r"^/delete/instassociation/([0-9]+)$"),
            delete,
        ),
    ]
});

pub(super) fn routes() -> &'static [Route] {
    ROUTES.as_slice()
}

fn find_many(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let business_id = scope::ambient(ctx.request)?;
    Ok(vec![
        ResourceDescriptor::new(ResourceType::ModelInstanceAssociation, Action::FindMany)
            .business(business_id),
    ])
}

/// One `(schema, instance)` pair per side of an edge, source first.
///
/// Sides are walked rather than the returned schemas so a self-association
/// (both sides on one schema) still yields both instances.
fn endpoint_updates(
    ctx: &ResolveCtx<'_>,
    sides: [(&str, i64); 2],
    business_id: BusinessId,
) -> ResolveResult<Vec<ResourceDescriptor>> {
    let models = ctx.lookups.models(&ModelFilter::ObjectIds(
        sides.iter().map(|(obj, _)| obj.to_string()).collect(),
    ))?;

    sides
        .iter()
        .map(|(object_id, inst_id)| -> ResolveResult<ResourceDescriptor> {
            let model = find_model(&models, object_id)?;
            Ok(ResourceDescriptor::new(ResourceType::ModelInstance, Action::Update)
                .instance(*inst_id)
                .business(business_id)
                .layer(Layer::model(model.id)))
        })
        .collect()
}

fn find_model<'m>(models: &'m [Model], object_id: &str) -> ResolveResult<&'m Model> {
    models
        .iter()
        .find(|m| m.object_id == object_id)
        .ok_or_else(|| ResolveError::lookup(format!("model [bk_obj_id={object_id}] not found")))
}

fn create(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let business_id = scope::ambient(ctx.request)?;
    let association_id = ctx.request.body_str("bk_obj_asst_id")?;
    let asst = ctx
        .lookups
        .model_association(&ModelAssociationFilter::AssociationId(association_id.to_string()))?;

    let inst_id = ctx.request.body_i64("bk_inst_id")?;
    let asst_inst_id = ctx.request.body_i64("bk_asst_inst_id")?;

    endpoint_updates(
        ctx,
        [(asst.object_id.as_str(), inst_id), (asst.asst_object_id.as_str(), asst_inst_id)],
        business_id,
    )
}

fn delete(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let association_id = m.id(0, "instance association id")?;
    let business_id = scope::ambient(ctx.request)?;
    let asst = ctx
        .lookups
        .instance_association(&InstanceAssociationFilter::Id(association_id))?;

    endpoint_updates(
        ctx,
        [(asst.object_id.as_str(), asst.inst_id), (asst.asst_object_id.as_str(), asst.asst_inst_id)],
        business_id,
    )
}
