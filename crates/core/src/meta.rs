//! Resource descriptors handed to the policy engine.

use serde::{Deserialize, Serialize};

use crate::id::BusinessId;

/// Kind of resource a descriptor refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Model,
    ModelAttribute,
    ModelAttributeGroup,
    ModelClassification,
    ModelAssociation,
    ModelUnique,
    ModelInstance,
    /// Instance of a schema that belongs to the business→set→module hierarchy.
    MainlineInstance,
    ModelInstanceAssociation,
    ModelTopology,
    ModelInstanceTopology,
    MainlineModel,
    MainlineModelTopology,
    MainlineInstanceTopology,
    AssociationType,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::ModelAttribute => "model_attribute",
            Self::ModelAttributeGroup => "model_attribute_group",
            Self::ModelClassification => "model_classification",
            Self::ModelAssociation => "model_association",
            Self::ModelUnique => "model_unique",
            Self::ModelInstance => "model_instance",
            Self::MainlineInstance => "mainline_instance",
            Self::ModelInstanceAssociation => "model_instance_association",
            Self::ModelTopology => "model_topology",
            Self::ModelInstanceTopology => "model_instance_topology",
            Self::MainlineModel => "mainline_model",
            Self::MainlineModelTopology => "mainline_model_topology",
            Self::MainlineInstanceTopology => "mainline_instance_topology",
            Self::AssociationType => "association_type",
        }
    }
}

impl core::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation performed on the resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Find,
    FindMany,
    Update,
    UpdateMany,
    Delete,
    DeleteMany,
    /// The route is recognised but not subject to a permission check.
    SkipAction,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Find => "find",
            Self::FindMany => "find_many",
            Self::Update => "update",
            Self::UpdateMany => "update_many",
            Self::Delete => "delete",
            Self::DeleteMany => "delete_many",
            Self::SkipAction => "skip",
        }
    }

    /// Whether the action only reads state.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Find | Self::FindMany | Self::SkipAction)
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ancestor scoping reference of a descriptor (e.g. an attribute's owning schema).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer {
    pub resource_type: ResourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Layer {
    pub fn with_id(resource_type: ResourceType, instance_id: i64) -> Self {
        Self {
            resource_type,
            instance_id: Some(instance_id),
            name: None,
        }
    }

    pub fn with_name(resource_type: ResourceType, name: impl Into<String>) -> Self {
        Self {
            resource_type,
            instance_id: None,
            name: Some(name.into()),
        }
    }

    /// Layer pointing at a schema by its numeric id.
    pub fn model(model_id: i64) -> Self {
        Self::with_id(ResourceType::Model, model_id)
    }
}

/// Typed, scoped reference to an entity (or a collection) that the policy
/// engine authorizes against.
///
/// `layers` run outermost to innermost and mirror real containment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub resource_type: ResourceType,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub business_id: BusinessId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<Layer>,
}

impl ResourceDescriptor {
    /// Collection-level, platform-global descriptor.
    pub fn new(resource_type: ResourceType, action: Action) -> Self {
        Self {
            resource_type,
            action,
            instance_id: None,
            name: None,
            business_id: BusinessId::GLOBAL,
            layers: Vec::new(),
        }
    }

    pub fn instance(mut self, instance_id: i64) -> Self {
        self.instance_id = Some(instance_id);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn business(mut self, business_id: BusinessId) -> Self {
        self.business_id = business_id;
        self
    }

    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let d = ResourceDescriptor::new(ResourceType::ModelAttribute, Action::Delete)
            .instance(12)
            .business(BusinessId::new(3))
            .layer(Layer::model(7));

        assert_eq!(d.instance_id, Some(12));
        assert_eq!(d.business_id.get(), 3);
        assert_eq!(d.layers, vec![Layer::model(7)]);
        assert!(d.name.is_none());
    }

    #[test]
    fn serializes_tags_in_snake_case() {
        let d = ResourceDescriptor::new(ResourceType::MainlineInstance, Action::UpdateMany).instance(1);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["resource_type"], "mainline_instance");
        assert_eq!(json["action"], "update_many");
        assert_eq!(json["business_id"], 0);
        assert!(json.get("layers").is_none());
    }

    #[test]
    fn read_only_actions() {
        assert!(Action::FindMany.is_read_only());
        assert!(Action::SkipAction.is_read_only());
        assert!(!Action::DeleteMany.is_read_only());
    }
}
