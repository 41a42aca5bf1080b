//! Schema instances: single and batch mutations, lookups and instance topology.
//!
//! Mutations are scoped by the target schema, except for mainline schemas
//! which are scoped by the caller's business (see [`scope::instance_target`]).

use std::sync::LazyLock;

use serde_json::Value as JsonValue;

use topoauth_core::{Action, Layer, ResolveError, ResolveResult, ResourceDescriptor, ResourceType};

use crate::HttpMethod;
use crate::pattern::{Pattern, Route, RouteMatch};
use crate::request::json_i64;
use crate::resolver::ResolveCtx;
use crate::scope;

static ROUTES: LazyLock<Vec<Route>> = LazyLock::new(|| {
    vec![
        Route::new(
            "create instance",
            HttpMethod::Post,
            Pattern::regex(r"^/create/instance/object/([^\s/]+)$"),
            create,
        ),
        Route::new(
            "find instance associations of object",
            HttpMethod::Post,
            Pattern::regex(r"^/find/instassociation/object/([^\s/]+)$"),
            find_associations,
        ),
        Route::new(
            "update instance",
            HttpMethod::Put,
            Pattern::regex(r"^/update/instance/object/([^\s/]+)/inst/([0-9]+)$"),
            update,
        ),
        Route::new(
            "update instances in batch",
            HttpMethod::Put,
            Pattern::regex(r"^/updatemany/instance/object/([^\s/]+)$"),
            update_many,
        ),
        Route::new(
            "delete instances in batch",
            HttpMethod::Delete,
            Pattern::regex(r"^/deletemany/instance/object/([^\s/]+)$"),
            delete_many,
        ),
        Route::new(
            "delete instance",
            HttpMethod::Delete,
            Pattern::regex(r"^/delete/instance/object/([^\s/]+)/inst/([0-9]+)$"),
            delete,
        ),
        Route::new(
            "find instance sub topology",
            HttpMethod::Post,
            Pattern::regex(r"^/find/insttopo/object/([^\s/]+)/inst/([0-9]+)$"),
            find_sub_topology,
        ),
        Route::new(
            "find instance association topology",
            HttpMethod::Post,
            Pattern::regex(r"^/find/instassttopo/object/([^\s/]+)/inst/([0-9]+)$"),
            find_topology,
        ),
        Route::new(
            "find business instance topology",
            HttpMethod::Post,
            Pattern::regex(r"^/find/topoinst/biz/([0-9]+)$"),
            find_business_topology,
        ),
        Route::new(
            "find instances",
            HttpMethod::Post,
            Pattern::regex(r"^/find/instance/object/([^\s/]+)$"),
            find_many,
        ),
    ]
});

pub(super) fn routes() -> &'static [Route] {
    ROUTES.as_slice()
}

/// Descriptor template for a mutation of instances of `object_id`.
fn mutation(
    ctx: &ResolveCtx<'_>,
    object_id: &str,
    action: Action,
    operation: &str,
) -> ResolveResult<ResourceDescriptor> {
    let model = ctx.lookups.model(object_id)?;
    let (resource_type, business_id) = scope::instance_target(&ctx.lookups, ctx.request, &model, operation)?;
    Ok(ResourceDescriptor::new(resource_type, action)
        .business(business_id)
        .layer(Layer::model(model.id)))
}

fn create(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![mutation(ctx, m.get(0)?, Action::Create, "create instance")?])
}

fn update(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let inst_id = m.id(1, "instance id")?;
    Ok(vec![mutation(ctx, m.get(0)?, Action::Update, "update instance")?.instance(inst_id)])
}

fn delete(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let inst_id = m.id(1, "instance id")?;
    Ok(vec![mutation(ctx, m.get(0)?, Action::Delete, "delete instance")?.instance(inst_id)])
}

/// Fan a template out to one descriptor per id.
fn per_instance(template: ResourceDescriptor, ids: Vec<i64>) -> Vec<ResourceDescriptor> {
    ids.into_iter().map(|id| template.clone().instance(id)).collect()
}

fn id_list(items: &[JsonValue], field: &str, what: &str) -> ResolveResult<Vec<i64>> {
    if items.is_empty() {
        return Err(ResolveError::parameter(format!("{what} must list at least one instance")));
    }
    items
        .iter()
        .map(|item| {
            let value = if field.is_empty() {
                item
            } else {
                item.get(field)
                    .ok_or_else(|| ResolveError::parameter(format!("{what}: entry without {field}")))?
            };
            json_i64(value, what)
        })
        .collect()
}

fn update_many(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let object_id = m.get(0)?;
    let items = match ctx.request.body_field("update")? {
        Some(JsonValue::Array(items)) => items,
        Some(_) => return Err(ResolveError::parameter("batch update: update must be an array")),
        None => return Err(ResolveError::parameter("batch update: missing body field update")),
    };
    let ids = id_list(items, "inst_id", "batch update")?;

    let template = mutation(ctx, object_id, Action::UpdateMany, "update instances in batch")?;
    Ok(per_instance(template, ids))
}

/// Per-id descriptors when the body lists ids, one collection-level
/// descriptor otherwise.
fn delete_many(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let object_id = m.get(0)?;
    let ids = match ctx.request.body_field("delete.inst_ids")? {
        Some(JsonValue::Array(items)) => Some(id_list(items, "", "batch delete")?),
        Some(_) => return Err(ResolveError::parameter("batch delete: delete.inst_ids must be an array")),
        None => None,
    };

    let template = mutation(ctx, object_id, Action::DeleteMany, "delete instances in batch")?;
    Ok(match ids {
        Some(ids) => per_instance(template, ids),
        None => vec![template],
    })
}

fn find_associations(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let model = ctx.lookups.model(m.get(0)?)?;
    let resource_type = if ctx.lookups.is_mainline(&model.object_id)? {
        ResourceType::MainlineInstance
    } else {
        ResourceType::ModelInstance
    };
    let business_id = scope::schema(&model)?;
    Ok(vec![
        ResourceDescriptor::new(resource_type, Action::Find)
            .business(business_id)
            .layer(Layer::model(model.id)),
    ])
}

fn find_sub_topology(_: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let inst_id = m.id(1, "instance id")?;
    Ok(vec![
        ResourceDescriptor::new(ResourceType::ModelInstanceTopology, Action::Find)
            .instance(inst_id)
            .layer(Layer::with_name(ResourceType::Model, m.get(0)?)),
    ])
}

fn find_topology(_: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![ResourceDescriptor::new(ResourceType::ModelInstanceTopology, Action::Find)])
}

fn find_business_topology(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let business_id = scope::ambient_advisory(ctx.request, "find business instance topology");
    Ok(vec![
        ResourceDescriptor::new(ResourceType::ModelInstanceTopology, Action::Find).business(business_id),
    ])
}

fn find_many(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let model = ctx.lookups.model(m.get(0)?)?;
    Ok(vec![
        ResourceDescriptor::new(ResourceType::ModelInstance, Action::FindMany).layer(Layer::model(model.id)),
    ])
}
