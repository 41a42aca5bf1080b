//! Ambient scope metadata carried by requests and stored on schemas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ResolveError;
use crate::id::BusinessId;

/// Label key holding the business scope.
pub const LABEL_BUSINESS_ID: &str = "bk_biz_id";

/// Scope label set, e.g. `{"label": {"bk_biz_id": "3"}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub label: BTreeMap<String, JsonValue>,
}

impl Metadata {
    pub fn for_business(business_id: BusinessId) -> Self {
        let mut label = BTreeMap::new();
        label.insert(
            LABEL_BUSINESS_ID.to_string(),
            JsonValue::String(business_id.to_string()),
        );
        Self { label }
    }

    /// Business scope declared by this label set.
    ///
    /// A missing label yields the global scope; a label that is present but
    /// not an integer is a parameter error.
    pub fn business_id(&self) -> Result<BusinessId, ResolveError> {
        match self.label.get(LABEL_BUSINESS_ID) {
            None | Some(JsonValue::Null) => Ok(BusinessId::GLOBAL),
            Some(JsonValue::Number(n)) => n.as_i64().map(BusinessId::new).ok_or_else(|| {
                ResolveError::parameter(format!("business id label {n} is not an integer"))
            }),
            Some(JsonValue::String(s)) => s.parse(),
            Some(other) => Err(ResolveError::parameter(format!(
                "business id label has unsupported value {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn parse(v: JsonValue) -> Metadata {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn missing_label_is_global() {
        assert_eq!(Metadata::default().business_id().unwrap(), BusinessId::GLOBAL);
        assert_eq!(parse(json!({})).business_id().unwrap(), BusinessId::GLOBAL);
        assert_eq!(
            parse(json!({"label": {"other": "x"}})).business_id().unwrap(),
            BusinessId::GLOBAL
        );
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        assert_eq!(parse(json!({"label": {"bk_biz_id": 3}})).business_id().unwrap().get(), 3);
        assert_eq!(parse(json!({"label": {"bk_biz_id": "11"}})).business_id().unwrap().get(), 11);
        assert_eq!(Metadata::for_business(BusinessId::new(5)).business_id().unwrap().get(), 5);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(parse(json!({"label": {"bk_biz_id": "abc"}})).business_id().is_err());
        assert!(parse(json!({"label": {"bk_biz_id": 1.5}})).business_id().is_err());
        assert!(parse(json!({"label": {"bk_biz_id": [1]}})).business_id().is_err());
    }

    proptest! {
        #[test]
        fn number_and_string_labels_agree(id in 0i64..i64::MAX) {
            let from_number = parse(json!({"label": {"bk_biz_id": id}})).business_id().unwrap();
            let from_string = parse(json!({"label": {"bk_biz_id": id.to_string()}})).business_id().unwrap();
            prop_assert_eq!(from_number, from_string);
            prop_assert_eq!(from_number.get(), id);
        }
    }
}
