//! Test fixtures shared by the family resolver tests.

use std::sync::Arc;

use topoauth_core::{
    Attribute, AttributeFilter, AttributeGroup, AttributeGroupFilter, BusinessId, InstanceAssociation,
    InstanceAssociationFilter, LookupError, Metadata, Model, ModelAssociation, ModelAssociationFilter,
    ModelFilter, ResolveResult,
};

use crate::lookup::ModelLookup;
use crate::request::RequestContext;
use crate::resolver::{Resolution, Resolver};
use crate::HttpMethod;

/// Fixed-data lookup, ignoring the supplier account. Optionally fails every query.
#[derive(Debug, Clone, Default)]
pub struct FixedLookup {
    models: Vec<Model>,
    associations: Vec<ModelAssociation>,
    attributes: Vec<Attribute>,
    groups: Vec<AttributeGroup>,
    instance_associations: Vec<InstanceAssociation>,
    failure: Option<LookupError>,
}

impl FixedLookup {
    pub fn with_model(mut self, model: Model) -> Self {
        self.models.push(model);
        self
    }

    pub fn with_association(mut self, association: ModelAssociation) -> Self {
        self.associations.push(association);
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_group(mut self, group: AttributeGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_instance_association(mut self, association: InstanceAssociation) -> Self {
        self.instance_associations.push(association);
        self
    }

    pub fn failing(mut self, err: LookupError) -> Self {
        self.failure = Some(err);
        self
    }

    fn check(&self) -> Result<(), LookupError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl ModelLookup for FixedLookup {
    fn find_models(&self, _: &str, filter: &ModelFilter) -> Result<Vec<Model>, LookupError> {
        self.check()?;
        Ok(self.models.iter().filter(|m| filter.matches(m)).cloned().collect())
    }

    fn find_model_associations(
        &self,
        _: &str,
        filter: &ModelAssociationFilter,
    ) -> Result<Vec<ModelAssociation>, LookupError> {
        self.check()?;
        Ok(self.associations.iter().filter(|a| filter.matches(a)).cloned().collect())
    }

    fn find_attributes(&self, _: &str, filter: &AttributeFilter) -> Result<Vec<Attribute>, LookupError> {
        self.check()?;
        Ok(self.attributes.iter().filter(|a| filter.matches(a)).cloned().collect())
    }

    fn find_attribute_groups(
        &self,
        _: &str,
        filter: &AttributeGroupFilter,
    ) -> Result<Vec<AttributeGroup>, LookupError> {
        self.check()?;
        Ok(self.groups.iter().filter(|g| filter.matches(g)).cloned().collect())
    }

    fn find_instance_association(
        &self,
        _: &str,
        filter: &InstanceAssociationFilter,
    ) -> Result<Option<InstanceAssociation>, LookupError> {
        self.check()?;
        Ok(self.instance_associations.iter().find(|a| filter.matches(a)).cloned())
    }
}

pub fn model(id: i64, object_id: &str, business_id: i64) -> Model {
    let metadata = if business_id == 0 {
        Metadata::default()
    } else {
        Metadata::for_business(BusinessId::new(business_id))
    };
    Model {
        id,
        object_id: object_id.into(),
        name: object_id.into(),
        classification_id: "bk_uncategorized".into(),
        metadata,
    }
}

pub fn association(id: i64, association_id: &str, object_id: &str, asst_object_id: &str, kind: &str) -> ModelAssociation {
    ModelAssociation {
        id,
        association_id: association_id.into(),
        object_id: object_id.into(),
        asst_object_id: asst_object_id.into(),
        asst_kind_id: kind.into(),
    }
}

pub fn request(method: HttpMethod, path: &str) -> RequestContext {
    RequestContext::new(method, path)
}

pub fn resolve(lookup: &FixedLookup, request: &RequestContext) -> ResolveResult<Resolution> {
    Resolver::new(Arc::new(lookup.clone())).resolve(request)
}
