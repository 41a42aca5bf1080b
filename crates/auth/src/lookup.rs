//! Model lookup gateway contract.

use std::sync::Arc;

use topoauth_core::{
    Attribute, AttributeFilter, AttributeGroup, AttributeGroupFilter, InstanceAssociation,
    InstanceAssociationFilter, LookupError, Model, ModelAssociation, ModelAssociationFilter,
    ModelFilter, ResolveError, ResolveResult,
};

/// Read-only queries against schema, association and attribute records.
///
/// Implementations must be safe for concurrent reads. Any retry, timeout or
/// pooling policy belongs to the implementation; the resolver treats every
/// error as terminal for the current call.
pub trait ModelLookup: Send + Sync {
    fn find_models(&self, supplier_account: &str, filter: &ModelFilter) -> Result<Vec<Model>, LookupError>;

    fn find_model_associations(
        &self,
        supplier_account: &str,
        filter: &ModelAssociationFilter,
    ) -> Result<Vec<ModelAssociation>, LookupError>;

    fn find_attributes(
        &self,
        supplier_account: &str,
        filter: &AttributeFilter,
    ) -> Result<Vec<Attribute>, LookupError>;

    fn find_attribute_groups(
        &self,
        supplier_account: &str,
        filter: &AttributeGroupFilter,
    ) -> Result<Vec<AttributeGroup>, LookupError>;

    fn find_instance_association(
        &self,
        supplier_account: &str,
        filter: &InstanceAssociationFilter,
    ) -> Result<Option<InstanceAssociation>, LookupError>;
}

impl<S> ModelLookup for Arc<S>
where
    S: ModelLookup + ?Sized,
{
    fn find_models(&self, supplier_account: &str, filter: &ModelFilter) -> Result<Vec<Model>, LookupError> {
        (**self).find_models(supplier_account, filter)
    }

    fn find_model_associations(
        &self,
        supplier_account: &str,
        filter: &ModelAssociationFilter,
    ) -> Result<Vec<ModelAssociation>, LookupError> {
        (**self).find_model_associations(supplier_account, filter)
    }

    fn find_attributes(
        &self,
        supplier_account: &str,
        filter: &AttributeFilter,
    ) -> Result<Vec<Attribute>, LookupError> {
        (**self).find_attributes(supplier_account, filter)
    }

    fn find_attribute_groups(
        &self,
        supplier_account: &str,
        filter: &AttributeGroupFilter,
    ) -> Result<Vec<AttributeGroup>, LookupError> {
        (**self).find_attribute_groups(supplier_account, filter)
    }

    fn find_instance_association(
        &self,
        supplier_account: &str,
        filter: &InstanceAssociationFilter,
    ) -> Result<Option<InstanceAssociation>, LookupError> {
        (**self).find_instance_association(supplier_account, filter)
    }
}

/// Supplier-scoped view of a [`ModelLookup`] that treats an empty result on a
/// required anchor record as a lookup failure.
#[derive(Clone, Copy)]
pub struct Lookups<'a> {
    inner: &'a dyn ModelLookup,
    supplier_account: &'a str,
}

impl<'a> Lookups<'a> {
    pub fn new(inner: &'a dyn ModelLookup, supplier_account: &'a str) -> Self {
        Self {
            inner,
            supplier_account,
        }
    }

    /// Schemas matching `filter`; at least one must exist.
    pub fn models(&self, filter: &ModelFilter) -> ResolveResult<Vec<Model>> {
        let models = self.inner.find_models(self.supplier_account, filter)?;
        if models.is_empty() {
            return Err(ResolveError::lookup(format!("model [{filter}] not found")));
        }
        Ok(models)
    }

    /// The schema identified by `object_id`.
    pub fn model(&self, object_id: &str) -> ResolveResult<Model> {
        let mut models = self.models(&ModelFilter::ObjectId(object_id.to_string()))?;
        Ok(models.swap_remove(0))
    }

    pub fn model_associations(&self, filter: &ModelAssociationFilter) -> ResolveResult<Vec<ModelAssociation>> {
        let assts = self.inner.find_model_associations(self.supplier_account, filter)?;
        if assts.is_empty() {
            return Err(ResolveError::lookup(format!("model association [{filter}] not found")));
        }
        Ok(assts)
    }

    pub fn model_association(&self, filter: &ModelAssociationFilter) -> ResolveResult<ModelAssociation> {
        let mut assts = self.model_associations(filter)?;
        Ok(assts.swap_remove(0))
    }

    pub fn attribute(&self, filter: &AttributeFilter) -> ResolveResult<Attribute> {
        let mut attrs = self.inner.find_attributes(self.supplier_account, filter)?;
        if attrs.is_empty() {
            return Err(ResolveError::lookup(format!("model attribute [{filter}] not found")));
        }
        Ok(attrs.swap_remove(0))
    }

    pub fn attribute_groups(&self, filter: &AttributeGroupFilter) -> ResolveResult<Vec<AttributeGroup>> {
        let groups = self.inner.find_attribute_groups(self.supplier_account, filter)?;
        if groups.is_empty() {
            return Err(ResolveError::lookup(format!("attribute group [{filter}] not found")));
        }
        Ok(groups)
    }

    pub fn instance_association(&self, filter: &InstanceAssociationFilter) -> ResolveResult<InstanceAssociation> {
        self.inner
            .find_instance_association(self.supplier_account, filter)?
            .ok_or_else(|| ResolveError::lookup(format!("instance association [{filter}] not found")))
    }

    /// Whether the schema takes part in the mainline hierarchy.
    ///
    /// Having no mainline associations at all is a valid answer, not a failure.
    pub fn is_mainline(&self, object_id: &str) -> ResolveResult<bool> {
        let mainline = self
            .inner
            .find_model_associations(self.supplier_account, &ModelAssociationFilter::mainline())?;
        Ok(mainline.iter().any(|asst| asst.involves(object_id)))
    }
}
