//! Scalar facet values.

use std::fmt::Display;

use serde::{Deserialize, Serialize};


/// A single value a facet field can take. Backends hand out strings for most
/// columns and booleans for flag columns; both share one set per field.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, PartialOrd, Ord, PartialEq, Eq)]
#[serde(untagged)]
pub enum FacetValue {
    String(String),
    Bool(bool),
}

impl FacetValue {
    /// Convert a raw JSON value coming back from a facet query.
    /// Numbers are kept in their textual form; nulls and containers are not facet values.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(FacetValue::String(s.clone())),
            serde_json::Value::Bool(b) => Some(FacetValue::Bool(*b)),
            serde_json::Value::Number(n) => Some(FacetValue::String(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FacetValue::String(s) => Some(s),
            FacetValue::Bool(_) => None,
        }
    }
}

impl Display for FacetValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacetValue::String(s) => write!(f, "{}", s),
            FacetValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for FacetValue {
    fn from(value: &str) -> Self {
        FacetValue::String(value.to_string())
    }
}

impl From<String> for FacetValue {
    fn from(value: String) -> Self {
        FacetValue::String(value)
    }
}

impl From<bool> for FacetValue {
    fn from(value: bool) -> Self {
        FacetValue::Bool(value)
    }
}
