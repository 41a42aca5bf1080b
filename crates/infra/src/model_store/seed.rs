use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use topoauth_core::{Attribute, AttributeGroup, InstanceAssociation, Model, ModelAssociation};

/// All records held for one supplier account.
///
/// This is also the seed file format, keyed by supplier account:
///
/// ```json
/// { "0": { "models": [{"id": 7, "bk_obj_id": "host"}], "associations": [] } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierRecords {
    pub models: Vec<Model>,
    pub associations: Vec<ModelAssociation>,
    pub attributes: Vec<Attribute>,
    pub attribute_groups: Vec<AttributeGroup>,
    pub instance_associations: Vec<InstanceAssociation>,
}

impl SupplierRecords {
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
            && self.associations.is_empty()
            && self.attributes.is_empty()
            && self.attribute_groups.is_empty()
            && self.instance_associations.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed document: {0}")]
    Json(#[from] serde_json::Error),
}

pub(crate) fn parse(json: &str) -> Result<HashMap<String, SupplierRecords>, SeedError> {
    Ok(serde_json::from_str(json)?)
}

pub(crate) fn read(path: &Path) -> Result<String, SeedError> {
    std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.display().to_string(),
        source,
    })
}
