//! Business (tenant sub-unit) scope identifier.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Owning business scope of a resource.
///
/// `0` means the resource is platform-global.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessId(i64);

impl BusinessId {
    /// Platform-global scope.
    pub const GLOBAL: BusinessId = BusinessId(0);

    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }

    pub fn is_global(&self) -> bool {
        self.0 == 0
    }
}

impl core::fmt::Display for BusinessId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for BusinessId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<BusinessId> for i64 {
    fn from(value: BusinessId) -> Self {
        value.0
    }
}

impl FromStr for BusinessId {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| ResolveError::parameter(format!("invalid business id {s:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_strings() {
        assert_eq!("42".parse::<BusinessId>().unwrap(), BusinessId::new(42));
        assert_eq!(" 7 ".parse::<BusinessId>().unwrap().get(), 7);
        assert!(BusinessId::default().is_global());
    }

    #[test]
    fn rejects_non_numeric() {
        let err = "biz-1".parse::<BusinessId>().unwrap_err();
        assert!(matches!(err, ResolveError::Parameter(_)));
    }
}
