//! Records returned by the model lookup, and the typed filters used to query them.
//!
//! Field names on the wire follow the platform's storage naming (`bk_obj_id`,
//! `bk_asst_obj_id`, ...) so seed files and backend payloads deserialize as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ResolveError;
use crate::metadata::Metadata;

/// Association kind that links schemas of the business→set→module hierarchy.
pub const MAINLINE_ASSOCIATION_KIND: &str = "bk_mainline";

/// A schema ("model") definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: i64,
    #[serde(rename = "bk_obj_id")]
    pub object_id: String,
    #[serde(rename = "bk_obj_name", default)]
    pub name: String,
    #[serde(rename = "bk_classification_id", default)]
    pub classification_id: String,
    /// Stored business scope of the schema.
    #[serde(default)]
    pub metadata: Metadata,
}

/// Association definition between two schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAssociation {
    pub id: i64,
    #[serde(rename = "bk_obj_asst_id")]
    pub association_id: String,
    #[serde(rename = "bk_obj_id")]
    pub object_id: String,
    #[serde(rename = "bk_asst_obj_id")]
    pub asst_object_id: String,
    #[serde(rename = "bk_asst_id", default)]
    pub asst_kind_id: String,
}

impl ModelAssociation {
    pub fn involves(&self, object_id: &str) -> bool {
        self.object_id == object_id || self.asst_object_id == object_id
    }
}

/// A schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: i64,
    #[serde(rename = "bk_obj_id")]
    pub object_id: String,
    #[serde(rename = "bk_property_id", default)]
    pub property_id: String,
}

/// A named group of schema fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeGroup {
    pub id: i64,
    #[serde(rename = "bk_obj_id")]
    pub object_id: String,
    #[serde(rename = "bk_group_id", default)]
    pub group_id: String,
}

/// A data edge between two instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceAssociation {
    pub id: i64,
    #[serde(rename = "bk_obj_asst_id", default)]
    pub association_id: String,
    #[serde(rename = "bk_obj_id")]
    pub object_id: String,
    #[serde(rename = "bk_inst_id")]
    pub inst_id: i64,
    #[serde(rename = "bk_asst_obj_id")]
    pub asst_object_id: String,
    #[serde(rename = "bk_asst_inst_id")]
    pub asst_inst_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelFilter {
    ObjectId(String),
    ObjectIds(Vec<String>),
}

impl ModelFilter {
    pub fn matches(&self, model: &Model) -> bool {
        match self {
            Self::ObjectId(id) => model.object_id == *id,
            Self::ObjectIds(ids) => ids.iter().any(|id| model.object_id == *id),
        }
    }
}

impl core::fmt::Display for ModelFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ObjectId(id) => write!(f, "bk_obj_id={id}"),
            Self::ObjectIds(ids) => write!(f, "bk_obj_id in {ids:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelAssociationFilter {
    Id(i64),
    AssociationId(String),
    Kind(String),
}

impl ModelAssociationFilter {
    pub fn mainline() -> Self {
        Self::Kind(MAINLINE_ASSOCIATION_KIND.to_string())
    }

    pub fn matches(&self, asst: &ModelAssociation) -> bool {
        match self {
            Self::Id(id) => asst.id == *id,
            Self::AssociationId(id) => asst.association_id == *id,
            Self::Kind(kind) => asst.asst_kind_id == *kind,
        }
    }
}

impl core::fmt::Display for ModelAssociationFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id={id}"),
            Self::AssociationId(id) => write!(f, "bk_obj_asst_id={id}"),
            Self::Kind(kind) => write!(f, "bk_asst_id={kind}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeFilter {
    Id(i64),
}

impl AttributeFilter {
    pub fn matches(&self, attr: &Attribute) -> bool {
        match self {
            Self::Id(id) => attr.id == *id,
        }
    }
}

impl core::fmt::Display for AttributeFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id={id}"),
        }
    }
}

/// Conjunctive filter on attribute groups; unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeGroupFilter {
    pub id: Option<i64>,
    pub object_id: Option<String>,
    pub group_id: Option<String>,
}

impl AttributeGroupFilter {
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.object_id.is_none() && self.group_id.is_none()
    }

    pub fn matches(&self, group: &AttributeGroup) -> bool {
        self.id.is_none_or(|id| group.id == id)
            && self.object_id.as_ref().is_none_or(|o| group.object_id == *o)
            && self.group_id.as_ref().is_none_or(|g| group.group_id == *g)
    }

    /// Build a filter from a request's `condition` object.
    ///
    /// Recognised keys are `id`, `bk_obj_id` and `bk_group_id`; anything else
    /// is rejected so an unknown key never widens the match.
    pub fn from_condition(condition: &JsonValue) -> Result<Self, ResolveError> {
        let map = condition
            .as_object()
            .ok_or_else(|| ResolveError::parameter("attribute group condition must be an object"))?;

        let mut filter = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "id" => {
                    let id = value.as_i64().ok_or_else(|| {
                        ResolveError::parameter(format!("attribute group condition id {value} is not an integer"))
                    })?;
                    filter.id = Some(id);
                }
                "bk_obj_id" => filter.object_id = Some(condition_str(key, value)?),
                "bk_group_id" => filter.group_id = Some(condition_str(key, value)?),
                other => {
                    return Err(ResolveError::parameter(format!(
                        "unsupported attribute group condition field {other:?}"
                    )));
                }
            }
        }
        Ok(filter)
    }
}

fn condition_str(key: &str, value: &JsonValue) -> Result<String, ResolveError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ResolveError::parameter(format!("attribute group condition {key} must be a string")))
}

impl core::fmt::Display for AttributeGroupFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "id={:?} bk_obj_id={:?} bk_group_id={:?}",
            self.id, self.object_id, self.group_id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceAssociationFilter {
    Id(i64),
}

impl InstanceAssociationFilter {
    pub fn matches(&self, asst: &InstanceAssociation) -> bool {
        match self {
            Self::Id(id) => asst.id == *id,
        }
    }
}

impl core::fmt::Display for InstanceAssociationFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id={id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group(id: i64, obj: &str, group_id: &str) -> AttributeGroup {
        AttributeGroup {
            id,
            object_id: obj.to_string(),
            group_id: group_id.to_string(),
        }
    }

    #[test]
    fn group_condition_is_conjunctive() {
        let filter = AttributeGroupFilter::from_condition(&json!({"bk_obj_id": "host", "bk_group_id": "default"})).unwrap();
        assert!(filter.matches(&group(1, "host", "default")));
        assert!(!filter.matches(&group(2, "host", "network")));
        assert!(!filter.matches(&group(3, "switch", "default")));
    }

    #[test]
    fn group_condition_rejects_unknown_keys() {
        let err = AttributeGroupFilter::from_condition(&json!({"bk_group_name": "x"})).unwrap_err();
        assert!(matches!(err, ResolveError::Parameter(_)));
        assert!(AttributeGroupFilter::from_condition(&json!("host")).is_err());
        assert!(AttributeGroupFilter::from_condition(&json!({"id": "1"})).is_err());
    }

    #[test]
    fn model_records_use_storage_field_names() {
        let model: Model = serde_json::from_value(json!({
            "id": 7,
            "bk_obj_id": "host",
            "bk_obj_name": "Host",
            "metadata": {"label": {"bk_biz_id": "2"}}
        }))
        .unwrap();
        assert_eq!(model.object_id, "host");
        assert_eq!(model.metadata.business_id().unwrap().get(), 2);
        assert!(ModelFilter::ObjectIds(vec!["switch".into(), "host".into()]).matches(&model));
    }

    #[test]
    fn association_involvement() {
        let asst = ModelAssociation {
            id: 1,
            association_id: "set_bk_mainline_biz".into(),
            object_id: "set".into(),
            asst_object_id: "biz".into(),
            asst_kind_id: MAINLINE_ASSOCIATION_KIND.into(),
        };
        assert!(asst.involves("set"));
        assert!(asst.involves("biz"));
        assert!(!asst.involves("host"));
        assert!(ModelAssociationFilter::mainline().matches(&asst));
    }
}
