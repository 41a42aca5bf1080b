//! Schema attributes, layered under their owning schema.

use std::sync::LazyLock;

use serde_json::Value as JsonValue;

use topoauth_core::{
    Action, AttributeFilter, Layer, ModelFilter, ResolveError, ResolveResult, ResourceDescriptor,
    ResourceType,
};

use crate::HttpMethod;
use crate::pattern::{Pattern, Route, RouteMatch};
use crate::resolver::ResolveCtx;
use crate::scope;

static ROUTES: LazyLock<Vec<Route>> = LazyLock::new(|| {
    vec![
        Route::new(
            "create attribute",
            HttpMethod::Post,
            Pattern::exact("/create/objectattr"),
            create,
        ),
        Route::new(
            "delete attribute",
            HttpMethod::Delete,
            Pattern::regex(r"^/delete/objectattr/([0-9]+)$"),
            delete,
        ),
        Route::new(
            "update attribute",
            HttpMethod::Put,
            Pattern::regex(r"^/update/objectattr/([0-9]+)$"),
            update,
        ),
        Route::new(
            "find attributes",
            HttpMethod::Post,
            Pattern::exact("/find/objectattr"),
            find_many,
        ),
    ]
});

pub(super) fn routes() -> &'static [Route] {
    ROUTES.as_slice()
}

fn create(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let business_id = scope::ambient_advisory(ctx.request, "create attribute");
    let model = ctx.lookups.model(ctx.request.body_str("bk_obj_id")?)?;
    Ok(vec![
        ResourceDescriptor::new(ResourceType::ModelAttribute, Action::Create)
            .business(business_id)
            .layer(Layer::model(model.id)),
    ])
}

/// Single attribute addressed by id, layered under the schema that owns it.
fn existing(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>, action: Action, operation: &str) -> ResolveResult<ResourceDescriptor> {
    let attr_id = m.id(0, "attribute id")?;
    let attr = ctx.lookups.attribute(&AttributeFilter::Id(attr_id))?;
    let model = ctx.lookups.model(&attr.object_id)?;
    let business_id = scope::ambient_advisory(ctx.request, operation);

    Ok(ResourceDescriptor::new(ResourceType::ModelAttribute, action)
        .instance(attr_id)
        .business(business_id)
        .layer(Layer::model(model.id)))
}

fn delete(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![existing(ctx, m, Action::Delete, "delete attribute")?])
}

fn update(ctx: &ResolveCtx<'_>, m: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    Ok(vec![existing(ctx, m, Action::Update, "update attribute")?])
}

/// Schema selector from the body: one object id or a list of them.
fn object_filter(value: Option<&JsonValue>) -> ResolveResult<ModelFilter> {
    match value {
        Some(JsonValue::String(id)) if !id.is_empty() => Ok(ModelFilter::ObjectId(id.clone())),
        Some(JsonValue::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ResolveError::parameter(format!("find attributes: invalid bk_obj_id {item}")))
            })
            .collect::<ResolveResult<Vec<_>>>()
            .map(ModelFilter::ObjectIds),
        Some(other) => Err(ResolveError::parameter(format!("find attributes: invalid bk_obj_id {other}"))),
        None => Err(ResolveError::parameter("find attributes: missing body field bk_obj_id")),
    }
}

fn find_many(ctx: &ResolveCtx<'_>, _: &RouteMatch<'_>) -> ResolveResult<Vec<ResourceDescriptor>> {
    let filter = object_filter(ctx.request.body_field("bk_obj_id")?)?;
    let models = ctx.lookups.models(&filter)?;
    let business_id = scope::ambient_advisory(ctx.request, "find attributes");

    Ok(models
        .iter()
        .map(|model| {
            ResourceDescriptor::new(ResourceType::ModelAttribute, Action::FindMany)
                .business(business_id)
                .layer(Layer::model(model.id))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use topoauth_core::{Attribute, BusinessId, Metadata};

    use super::*;
    use crate::testing::{FixedLookup, model, request, resolve};

    fn lookup() -> FixedLookup {
        FixedLookup::default()
            .with_model(model(7, "host", 0))
            .with_model(model(9, "switch", 0))
            .with_attribute(Attribute {
                id: 300,
                object_id: "switch".into(),
                property_id: "port_count".into(),
            })
    }

    #[test]
    fn update_is_layered_under_owning_model() {
        let req = request(HttpMethod::Put, "/api/v3/update/objectattr/300")
            .with_metadata(Metadata::for_business(BusinessId::new(5)));
        let out = resolve(&lookup(), &req).unwrap();
        assert_eq!(
            out.descriptors(),
            [ResourceDescriptor::new(ResourceType::ModelAttribute, Action::Update)
                .instance(300)
                .business(BusinessId::new(5))
                .layer(Layer::model(9))]
        );
    }

    #[test]
    fn delete_of_unknown_attribute_fails() {
        let req = request(HttpMethod::Delete, "/api/v3/delete/objectattr/301");
        assert!(matches!(resolve(&lookup(), &req), Err(ResolveError::Lookup(_))));
    }

    #[test]
    fn find_accepts_single_schema_or_list() {
        let single = request(HttpMethod::Post, "/api/v3/find/objectattr").with_json_body(&json!({"bk_obj_id": "host"}));
        assert_eq!(resolve(&lookup(), &single).unwrap().descriptors().len(), 1);

        let list = request(HttpMethod::Post, "/api/v3/find/objectattr")
            .with_json_body(&json!({"bk_obj_id": ["host", "switch"]}));
        let out = resolve(&lookup(), &list).unwrap();
        let layers: Vec<_> = out.descriptors().iter().map(|d| d.layers.clone()).collect();
        assert_eq!(layers, [vec![Layer::model(7)], vec![Layer::model(9)]]);
    }

    #[test]
    fn find_rejects_malformed_selector() {
        for body in [json!({}), json!({"bk_obj_id": 3}), json!({"bk_obj_id": []}), json!({"bk_obj_id": ["host", 1]})] {
            let req = request(HttpMethod::Post, "/api/v3/find/objectattr").with_json_body(&body);
            assert!(matches!(resolve(&lookup(), &req), Err(ResolveError::Parameter(_))), "{body}");
        }
    }

    #[test]
    fn create_for_unknown_schema_fails() {
        let req = request(HttpMethod::Post, "/api/v3/create/objectattr").with_json_body(&json!({"bk_obj_id": "rack"}));
        assert!(matches!(resolve(&lookup(), &req), Err(ResolveError::Lookup(_))));
    }
}
