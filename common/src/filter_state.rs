//! Per-field include/exclude filter state and its mutation API.
//!
//! The sets are only reachable through the five operations below and through
//! decoding, both of which keep `included` and `excluded` disjoint for every
//! field.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::facet_value::FacetValue;


static EMPTY_FIELD: FilterFieldState = FilterFieldState { included: BTreeSet::new(), excluded: BTreeSet::new() };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    Included,
    Excluded,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "RawFieldState")]
pub struct FilterFieldState {
    included: BTreeSet<FacetValue>,
    excluded: BTreeSet<FacetValue>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawFieldState {
    included: BTreeSet<FacetValue>,
    excluded: BTreeSet<FacetValue>,
}

/// A value decoded into both sets stays included.
impl From<RawFieldState> for FilterFieldState {
    fn from(raw: RawFieldState) -> Self {
        let RawFieldState { included, mut excluded } = raw;
        excluded.retain(|value| !included.contains(value));
        Self { included, excluded }
    }
}

impl FilterFieldState {
    pub fn included(&self) -> &BTreeSet<FacetValue> {
        &self.included
    }

    pub fn excluded(&self) -> &BTreeSet<FacetValue> {
        &self.excluded
    }

    pub fn selection(&self, value: &FacetValue) -> Selection {
        if self.included.contains(value) {
            Selection::Included
        } else if self.excluded.contains(value) {
            Selection::Excluded
        } else {
            Selection::Neutral
        }
    }

    pub fn selected_count(&self) -> usize {
        self.included.len() + self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.included.is_empty() && self.excluded.is_empty()
    }

    /// Every selected value, included ones first.
    pub fn selected_values(&self) -> impl Iterator<Item = &FacetValue> {
        self.included.iter().chain(self.excluded.iter())
    }

    fn toggle(&mut self, value: FacetValue) {
        if !self.included.remove(&value) {
            self.excluded.remove(&value);
            self.included.insert(value);
        }
    }

    fn only(&mut self, value: FacetValue) {
        self.excluded.clear();
        self.included.clear();
        self.included.insert(value);
    }

    fn exclude(&mut self, value: FacetValue) {
        self.included.remove(&value);
        self.excluded.insert(value);
    }
}

/// A single mutation intent. `FilterState::apply` is the pure form of the
/// in-place operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FilterAction {
    Toggle { field: String, value: FacetValue },
    Only { field: String, value: FacetValue },
    Exclude { field: String, value: FacetValue },
    Clear { field: String },
    ClearAll,
}

/// Filter selections for one search session, keyed by raw column key.
/// A missing key means the field is unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "RawFilterState")]
pub struct FilterState {
    fields: BTreeMap<String, FilterFieldState>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawFilterState {
    fields: BTreeMap<String, FilterFieldState>,
}

impl From<RawFilterState> for FilterState {
    fn from(raw: RawFilterState) -> Self {
        let mut fields = raw.fields;
        fields.retain(|_, state| !state.is_empty());
        Self { fields }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, field: &str) -> &FilterFieldState {
        self.fields.get(field).unwrap_or(&EMPTY_FIELD)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &FilterFieldState)> {
        self.fields.iter()
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn toggle(&mut self, field: &str, value: FacetValue) {
        self.mutate(field, |state| state.toggle(value));
    }

    pub fn only(&mut self, field: &str, value: FacetValue) {
        self.mutate(field, |state| state.only(value));
    }

    pub fn exclude(&mut self, field: &str, value: FacetValue) {
        self.mutate(field, |state| state.exclude(value));
    }

    pub fn clear(&mut self, field: &str) {
        self.fields.remove(field);
    }

    pub fn clear_all(&mut self) {
        self.fields.clear();
    }

    pub fn apply_mut(&mut self, action: &FilterAction) {
        match action {
            FilterAction::Toggle { field, value } => self.toggle(field, value.clone()),
            FilterAction::Only { field, value } => self.only(field, value.clone()),
            FilterAction::Exclude { field, value } => self.exclude(field, value.clone()),
            FilterAction::Clear { field } => self.clear(field),
            FilterAction::ClearAll => self.clear_all(),
        }
    }

    pub fn apply(&self, action: &FilterAction) -> Self {
        let mut next = self.clone();
        next.apply_mut(action);
        next
    }

    /// Any field has at least one included or excluded value.
    pub fn has_selection(&self) -> bool {
        self.fields.values().any(|state| !state.is_empty())
    }

    /// The field has at least one included value.
    pub fn is_checked(&self, field: &str) -> bool {
        !self.field(field).included.is_empty()
    }

    pub fn selected_count(&self, field: &str) -> usize {
        self.field(field).selected_count()
    }

    fn mutate(&mut self, field: &str, f: impl FnOnce(&mut FilterFieldState)) {
        let entry = self.fields.entry(field.to_string()).or_default();
        f(entry);
        if entry.is_empty() {
            self.fields.remove(field);
        }
    }
}
