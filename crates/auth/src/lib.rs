//! `topoauth-auth` — resolves topology API calls into authorization resources.
//!
//! Given a method, a path, a body and ambient metadata, the [`Resolver`]
//! produces the [`ResourceDescriptor`](topoauth_core::ResourceDescriptor)s a
//! policy engine must approve. This crate is decoupled from HTTP and storage:
//! schema records are read through the [`ModelLookup`] trait.

pub mod families;
pub mod lookup;
pub mod method;
pub mod pattern;
pub mod policy;
pub mod request;
pub mod resolver;
pub mod scope;

#[cfg(test)]
mod testing;

pub use lookup::{Lookups, ModelLookup};
pub use method::{HttpMethod, UnsupportedMethod};
pub use pattern::{Pattern, Route, RouteMatch};
pub use policy::{Decision, DenialKind, DenialReason, PolicyEngine, Principal, Role, RolePolicy, authorize};
pub use request::{DEFAULT_SUPPLIER_ACCOUNT, RequestContext};
pub use resolver::{Family, LATEST_API_PREFIX, Resolution, ResolveCtx, Resolver, VersionResolver};
