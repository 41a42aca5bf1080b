//! `topoauth-core` — resource descriptor vocabulary for topology API authorization.
//!
//! This crate contains **pure** types (no IO): the closed sets of resource and
//! action tags, descriptors and their layers, ambient scope metadata, the
//! records a model lookup returns, and the resolution error taxonomy.

pub mod error;
pub mod id;
pub mod meta;
pub mod metadata;
pub mod records;

pub use error::{LookupError, ResolveError, ResolveResult};
pub use id::BusinessId;
pub use meta::{Action, Layer, ResourceDescriptor, ResourceType};
pub use metadata::Metadata;
pub use records::{
    Attribute, AttributeFilter, AttributeGroup, AttributeGroupFilter, InstanceAssociation,
    InstanceAssociationFilter, Model, ModelAssociation, ModelAssociationFilter, ModelFilter,
};
