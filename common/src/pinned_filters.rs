//! Pinned fields and pinned field values for one source.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::facet_value::FacetValue;


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PinnedFilters {
    pub fields: BTreeSet<String>,
    pub values: BTreeMap<String, BTreeSet<FacetValue>>,
}

impl PinnedFilters {
    pub fn is_pinned(&self, field: &str, value: &FacetValue) -> bool {
        self.values.get(field).is_some_and(|values| values.contains(value))
    }

    pub fn is_field_pinned(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    /// Flip the pin on a value. Returns whether it is pinned afterwards.
    pub fn toggle_value(&mut self, field: &str, value: FacetValue) -> bool {
        let entry = self.values.entry(field.to_string()).or_default();
        let pinned = if entry.remove(&value) {
            false
        } else {
            entry.insert(value);
            true
        };
        if entry.is_empty() {
            self.values.remove(field);
        }
        pinned
    }

    /// Flip the pin on a whole field. Returns whether it is pinned afterwards.
    pub fn toggle_field(&mut self, field: &str) -> bool {
        if self.fields.remove(field) {
            false
        } else {
            self.fields.insert(field.to_string());
            true
        }
    }

    pub fn pinned_values(&self, field: &str) -> impl Iterator<Item = &FacetValue> {
        self.values.get(field).into_iter().flatten()
    }

    /// Field keys that carry at least one pinned value.
    pub fn fields_with_pinned_values(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }
}
