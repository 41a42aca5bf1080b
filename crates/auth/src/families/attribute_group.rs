//! Attribute groups, layered under their owning schema.

use std::sync::LazyLock;

use topoauth_core::{
    Action, AttributeGroupFilter, Layer, ResolveError, ResolveResult, ResourceDescriptor, ResourceType,
};

use crate::HttpMethod;
use crate::pattern::{Pattern, Route, RouteMatch};
use crate::resolver::ResolveCtx;
use crate::scope;

static ROUTES: LazyLock<Vec<Route>> = LazyLock::new(|| {
    vec![
        Route::new(
            "create attribute group",
            HttpMethod::Post,
            Pattern::exact("/create/objectattgroup"),
            create,
        ),
        Route::new(
            "find attribute groups",
            HttpMethod::Post,
            Pattern::regex(r"^/find/objectattgroup/object/([^\s/]+)$"),
            find_many,
        ),
        Route::new(
            "update attribute groups",
            HttpMethod::Put,
            Pattern::exact("/update/objectattgroup"),
            update,
        ),
        Route::new(
            "delete attribute group",
            HttpMethod::Delete,
            Pattern::regex(r"^/delete/objectattgroup/([0-9]+)$"),
            delete,
        ),
        Route::new(
            "remove attribute from group",
            HttpMethod::Delete,
            Pattern::regex(r"^/delete/objectattgroupasst/object/([^\s/]+)/property/([^\s/]+)/group/([^\s/]+)$"),
            detach,
        ),
    ]
});

pub(super) fn routes() -> &'static [Route] {
    ROUTES.as_slice()
}

fn group_of(ctx: &ResolveCtx<'_>, object_id: &str, action: Action, operation: &str) -> ResolveResult<ResourceDescriptor> {
    let business_id = scope::ambient_advisory(ctx.request, operation);
    let model = ctx.lookups.model(object_id)?;
    Ok(ResourceDescriptor::new(ResourceType::ModelAttributeGroup, action)
        .business(business_id)
        .layer(Layer::model(model.id)))
}

fn create(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let object_id = ctx.request.body_str("bk_obj_id")?;
    Ok(vec![group_of(ctx, object_id, Action::Create, "create attribute group")?])
}

fn find_many(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![group_of(ctx, m.get(0)?, Action::FindMany, "find attribute groups")?])
}

/// One descriptor per group selected by the body's `condition`.
fn update(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let condition = ctx
        .request
        .body_field("condition")?
        .ok_or_else(|| ResolveError::parameter("update attribute groups: missing body field condition"))?;
    let filter = AttributeGroupFilter::from_condition(condition)?;
    if filter.is_empty() {
        return Err(ResolveError::parameter("update attribute groups: condition selects every group"));
    }

    let groups = ctx.lookups.attribute_groups(&filter)?;
    groups
        .iter()
        .map(|group| -> ResolveResult<ResourceDescriptor> {
            Ok(group_of(ctx, &group.object_id, Action::Update, "update attribute groups")?.instance(group.id))
        })
        .collect()
}

fn delete(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let group_id = m.id(0, "attribute group id")?;
    let groups = ctx.lookups.attribute_groups(&AttributeGroupFilter::by_id(group_id))?;
    Ok(vec![
        group_of(ctx, &groups[0].object_id, Action::Delete, "delete attribute group")?.instance(group_id),
    ])
}

fn detach(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let business_id = scope::ambient_advisory(ctx.request, "remove attribute from group");
    Ok(vec![
        ResourceDescriptor::new(ResourceType::ModelAttributeGroup, Action::Delete)
            .named(m.get(2)?)
            .business(business_id),
    ])
}
