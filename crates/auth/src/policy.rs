//! Policy boundary: who is calling, and whether the resolved resources are allowed.
//!
//! The resolver only describes *what* a call touches. Deciding is delegated
//! to a [`PolicyEngine`]; [`RolePolicy`] is the built-in role-based engine.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use topoauth_core::ResourceDescriptor;

/// Role granting every action.
pub const ADMIN_ROLE: &str = "admin";

/// Role identifier. Opaque at this layer; engines give it meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn admin() -> Self {
        Self::new(ADMIN_ROLE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authenticated caller, established by an upstream authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user: String,
    /// Supplier account the principal is authenticated for.
    pub supplier_account: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn new(user: impl Into<String>, supplier_account: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            supplier_account: supplier_account.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    SupplierMismatch,
    MissingPermission,
}

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    /// Index of the first refused descriptor, when one is to blame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny(DenialReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides whether `principal` may touch every one of `resources`.
pub trait PolicyEngine: Send + Sync {
    fn authorize(&self, principal: &Principal, resources: &[ResourceDescriptor]) -> Decision;
}

impl<P> PolicyEngine for std::sync::Arc<P>
where
    P: PolicyEngine + ?Sized,
{
    fn authorize(&self, principal: &Principal, resources: &[ResourceDescriptor]) -> Decision {
        (**self).authorize(principal, resources)
    }
}

/// Authorize within the supplier account the request targets.
///
/// A principal acting outside its own supplier account is always denied,
/// before the engine is consulted.
pub fn authorize(
    engine: &dyn PolicyEngine,
    principal: &Principal,
    supplier_account: &str,
    resources: &[ResourceDescriptor],
) -> Decision {
    if principal.supplier_account != supplier_account {
        return Decision::Deny(DenialReason {
            kind: DenialKind::SupplierMismatch,
            message: format!(
                "principal {} belongs to supplier account {} but the request targets {}",
                principal.user, principal.supplier_account, supplier_account
            ),
            resource: None,
        });
    }
    engine.authorize(principal, resources)
}

/// Admins may do anything; everyone else is limited to read-only actions.
#[derive(Debug, Clone, Default)]
pub struct RolePolicy;

impl PolicyEngine for RolePolicy {
    fn authorize(&self, principal: &Principal, resources: &[ResourceDescriptor]) -> Decision {
        if principal.has_role(ADMIN_ROLE) {
            return Decision::Allow;
        }

        match resources.iter().position(|r| !r.action.is_read_only()) {
            None => Decision::Allow,
            Some(idx) => {
                let refused = &resources[idx];
                Decision::Deny(DenialReason {
                    kind: DenialKind::MissingPermission,
                    message: format!(
                        "{} on {} requires role {ADMIN_ROLE}",
                        refused.action, refused.resource_type
                    ),
                    resource: Some(idx),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use topoauth_core::{Action, ResourceType};

    use super::*;

    fn find() -> ResourceDescriptor {
        ResourceDescriptor::new(ResourceType::Model, Action::FindMany)
    }

    fn delete() -> ResourceDescriptor {
        ResourceDescriptor::new(ResourceType::ModelInstance, Action::Delete).instance(3)
    }

    #[test]
    fn admin_is_allowed_everything() {
        let admin = Principal::new("alice", "0").with_role(Role::admin());
        assert!(RolePolicy.authorize(&admin, &[find(), delete()]).is_allowed());
    }

    #[test]
    fn other_roles_are_read_only() {
        let viewer = Principal::new("bob", "0").with_role(Role::new("viewer"));
        assert!(RolePolicy.authorize(&viewer, &[find()]).is_allowed());

        let Decision::Deny(reason) = RolePolicy.authorize(&viewer, &[find(), delete()]) else {
            panic!("mutation must be denied");
        };
        assert_eq!(reason.kind, DenialKind::MissingPermission);
        assert_eq!(reason.resource, Some(1));
    }

    #[test]
    fn skipped_resources_are_read_only() {
        let viewer = Principal::new("bob", "0");
        let skip = ResourceDescriptor::new(ResourceType::ModelTopology, Action::SkipAction);
        assert!(RolePolicy.authorize(&viewer, &[skip]).is_allowed());
    }

    #[test]
    fn supplier_mismatch_denies_before_engine() {
        let admin = Principal::new("alice", "0").with_role(Role::admin());
        let decision = authorize(&RolePolicy, &admin, "1", &[find()]);
        assert!(matches!(decision, Decision::Deny(DenialReason { kind: DenialKind::SupplierMismatch, .. })));
        assert!(authorize(&RolePolicy, &admin, "0", &[delete()]).is_allowed());
    }
}
