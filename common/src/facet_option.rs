//! Facet options and the value batches a facet query returns.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::facet_value::FacetValue;


/// Share of matching rows per value, in percent.
pub type DistributionMap = BTreeMap<FacetValue, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetOption {
    pub value: FacetValue,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_percent: Option<f64>,
}

impl FacetOption {
    pub fn new(value: impl Into<FacetValue>) -> Self {
        let value = value.into();
        Self { label: value.to_string(), value, distribution_percent: None }
    }
    pub fn with_label(value: impl Into<FacetValue>, label: impl Into<String>) -> Self {
        Self { value: value.into(), label: label.into(), distribution_percent: None }
    }
}

/// Values returned for one field key, in backend order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FacetKeyValues {
    pub key: String,
    pub values: Vec<FacetValue>,
}

impl FacetKeyValues {
    pub fn new(key: impl Into<String>, values: Vec<FacetValue>) -> Self {
        Self { key: key.into(), values }
    }

    /// Build from raw JSON values, dropping duplicates and anything that is not a scalar.
    pub fn from_json(key: impl Into<String>, raw: &[serde_json::Value]) -> Self {
        let mut present_values = BTreeSet::new();
        let mut values = Vec::with_capacity(raw.len());
        for value in raw.iter().filter_map(FacetValue::from_json) {
            if present_values.insert(value.clone()) {
                values.push(value);
            }
        }
        Self { key: key.into(), values }
    }
}

/// One facet query response covering several field keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FacetValues {
    pub facets: Vec<FacetKeyValues>,
    pub is_loading: bool,
    pub is_fetching: bool,
}

impl FacetValues {
    pub fn get(&self, key: &str) -> Option<&FacetKeyValues> {
        self.facets.iter().find(|f| f.key == key)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn label_defaults_to_value() {
        let option = FacetOption::new(false);
        assert_eq!(option.label, "false");
        assert_eq!(option.distribution_percent, None);
    }

    #[test]
    fn from_json_dedupes_and_skips_non_scalars() {
        let raw = vec![json!("api"), json!(null), json!("web"), json!("api"), json!({"a": 1})];
        let facet = FacetKeyValues::from_json("ServiceName", &raw);
        assert_eq!(facet.values, vec![FacetValue::from("api"), FacetValue::from("web")]);
    }
}
