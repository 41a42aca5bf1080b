use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard};

use topoauth_auth::ModelLookup;
use topoauth_core::{
    Attribute, AttributeFilter, AttributeGroup, AttributeGroupFilter, InstanceAssociation,
    InstanceAssociationFilter, LookupError, Model, ModelAssociation, ModelAssociationFilter,
    ModelFilter,
};

use super::seed::{self, SeedError, SupplierRecords};

/// In-memory, supplier-isolated model store for tests/dev.
///
/// Records are returned in insertion order. Inserting a record whose id is
/// already present for that supplier replaces it.
#[derive(Debug, Default)]
pub struct InMemoryModelStore {
    inner: RwLock<HashMap<String, SupplierRecords>>,
}

impl InMemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a seed document (see [`SupplierRecords`]).
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        let suppliers = seed::parse(json)?;
        tracing::info!(suppliers = suppliers.len(), "model store seeded");
        Ok(Self {
            inner: RwLock::new(suppliers),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        Self::from_json(&seed::read(path.as_ref())?)
    }

    pub fn insert_model(&self, supplier_account: &str, model: Model) {
        self.with_supplier(supplier_account, |r| upsert(&mut r.models, model, |m| m.id));
    }

    pub fn insert_association(&self, supplier_account: &str, association: ModelAssociation) {
        self.with_supplier(supplier_account, |r| upsert(&mut r.associations, association, |a| a.id));
    }

    pub fn insert_attribute(&self, supplier_account: &str, attribute: Attribute) {
        self.with_supplier(supplier_account, |r| upsert(&mut r.attributes, attribute, |a| a.id));
    }

    pub fn insert_attribute_group(&self, supplier_account: &str, group: AttributeGroup) {
        self.with_supplier(supplier_account, |r| upsert(&mut r.attribute_groups, group, |g| g.id));
    }

    pub fn insert_instance_association(&self, supplier_account: &str, association: InstanceAssociation) {
        self.with_supplier(supplier_account, |r| {
            upsert(&mut r.instance_associations, association, |a| a.id)
        });
    }

    /// Drop every record of a supplier account.
    pub fn clear_supplier(&self, supplier_account: &str) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(supplier_account);
        }
    }

    /// Snapshot of one supplier account's records.
    pub fn records(&self, supplier_account: &str) -> SupplierRecords {
        match self.inner.read() {
            Ok(map) => map.get(supplier_account).cloned().unwrap_or_default(),
            Err(_) => SupplierRecords::default(),
        }
    }

    fn with_supplier(&self, supplier_account: &str, f: impl FnOnce(&mut SupplierRecords)) {
        if let Ok(mut map) = self.inner.write() {
            f(map.entry(supplier_account.to_string()).or_default());
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, SupplierRecords>>, LookupError> {
        self.inner
            .read()
            .map_err(|_| LookupError::Backend("model store lock poisoned".to_string()))
    }

    fn query<T: Clone>(
        &self,
        supplier_account: &str,
        records: impl Fn(&SupplierRecords) -> &Vec<T>,
        keep: impl Fn(&T) -> bool,
    ) -> Result<Vec<T>, LookupError> {
        let map = self.read()?;
        Ok(map
            .get(supplier_account)
            .map(|r| records(r).iter().filter(|&t| keep(t)).cloned().collect())
            .unwrap_or_default())
    }
}

fn upsert<T>(records: &mut Vec<T>, record: T, id: impl Fn(&T) -> i64) {
    let key = id(&record);
    match records.iter().position(|r| id(r) == key) {
        Some(idx) => records[idx] = record,
        None => records.push(record),
    }
}

impl ModelLookup for InMemoryModelStore {
    fn find_models(&self, supplier_account: &str, filter: &ModelFilter) -> Result<Vec<Model>, LookupError> {
        self.query(supplier_account, |r| &r.models, |m| filter.matches(m))
    }

    fn find_model_associations(
        &self,
        supplier_account: &str,
        filter: &ModelAssociationFilter,
    ) -> Result<Vec<ModelAssociation>, LookupError> {
        self.query(supplier_account, |r| &r.associations, |a| filter.matches(a))
    }

    fn find_attributes(
        &self,
        supplier_account: &str,
        filter: &AttributeFilter,
    ) -> Result<Vec<Attribute>, LookupError> {
        self.query(supplier_account, |r| &r.attributes, |a| filter.matches(a))
    }

    fn find_attribute_groups(
        &self,
        supplier_account: &str,
        filter: &AttributeGroupFilter,
    ) -> Result<Vec<AttributeGroup>, LookupError> {
        self.query(supplier_account, |r| &r.attribute_groups, |g| filter.matches(g))
    }

    fn find_instance_association(
        &self,
        supplier_account: &str,
        filter: &InstanceAssociationFilter,
    ) -> Result<Option<InstanceAssociation>, LookupError> {
        let mut found = self.query(supplier_account, |r| &r.instance_associations, |a| filter.matches(a))?;
        Ok((!found.is_empty()).then(|| found.swap_remove(0)))
    }
}
