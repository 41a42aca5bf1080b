//! Business-scope derivation.
//!
//! Each route picks one of these sources:
//! - [`ambient`]: caller metadata, malformed label is a hard failure;
//! - [`ambient_advisory`]: caller metadata, malformed label falls back to global
//!   with a warning;
//! - [`schema`]: the schema's own stored scope;
//! - [`instance_target`]: schema scope, or caller scope for mainline schemas.

use topoauth_core::{BusinessId, Model, ResolveError, ResolveResult, ResourceType};

use crate::lookup::Lookups;
use crate::request::RequestContext;

pub fn ambient(request: &RequestContext) -> ResolveResult<BusinessId> {
    request.metadata().business_id()
}

/// Caller scope for routes where scope only narrows the check.
///
/// Only use this where the route documents scope as optional.
pub fn ambient_advisory(request: &RequestContext, operation: &str) -> BusinessId {
    match request.metadata().business_id() {
        Ok(id) => id,
        Err(err) => {
            tracing::warn!(operation, error = %err, "get business id in metadata failed, using global scope");
            BusinessId::GLOBAL
        }
    }
}

pub fn schema(model: &Model) -> ResolveResult<BusinessId> {
    model.metadata.business_id()
}

/// Resource type and scope for an instance of `model`.
///
/// Mainline schemas are authorized per business: the scope comes from the
/// caller and must be present.
pub fn instance_target(
    lookups: &Lookups<'_>,
    request: &RequestContext,
    model: &Model,
    operation: &str,
) -> ResolveResult<(ResourceType, BusinessId)> {
    if !lookups.is_mainline(&model.object_id)? {
        return Ok((ResourceType::ModelInstance, schema(model)?));
    }

    let business_id = ambient(request)?;
    if business_id.is_global() {
        return Err(ResolveError::scope(format!(
            "{operation} on mainline model {} requires metadata with a business id",
            model.object_id
        )));
    }
    Ok((ResourceType::MainlineInstance, business_id))
}
