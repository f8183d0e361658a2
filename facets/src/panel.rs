//! The filter sidebar of one search view: which fields to fetch, which
//! groups to show and in what order, and the display state that has to
//! survive a fresh facet query.

use std::collections::{BTreeMap, BTreeSet};

use common::{
    facet_option::FacetValues,
    facet_value::FacetValue,
    filter_state::FilterState,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::FacetConfig,
    group::FacetGroup,
    nested::NestedFacetGroup,
    normalize::{STRING_WRAPPER, cleaned_facet_name},
    pins::PinStore,
};


/// A column as described by the table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub path: String,
    pub type_name: String,
    pub is_string: bool,
}

impl FieldDescriptor {
    pub fn new(path: impl Into<String>, type_name: impl Into<String>, is_string: bool) -> Self {
        Self { path: path.into(), type_name: type_name.into(), is_string }
    }

    pub fn is_low_cardinality(&self) -> bool {
        self.type_name.contains("LowCardinality")
    }
}

#[derive(Debug, Clone)]
pub enum PanelEntry {
    Field(FacetGroup),
    Nested(NestedFacetGroup),
}

impl PanelEntry {
    pub fn key(&self) -> &str {
        match self {
            PanelEntry::Field(group) => group.key(),
            PanelEntry::Nested(nested) => nested.parent_key(),
        }
    }
}

/// A field's values after pins, extra values and selections were merged in.
struct MergedFacet {
    key: String,
    values: Vec<FacetValue>,
}

fn raw_key(state_key: &str) -> &str {
    state_key
        .strip_prefix(STRING_WRAPPER)
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(state_key)
}

fn push_missing(values: &mut Vec<FacetValue>, extra: impl IntoIterator<Item = FacetValue>) {
    for value in extra {
        if !values.contains(&value) {
            values.push(value);
        }
    }
}

#[derive(Debug, Clone)]
pub struct FacetPanel {
    config: FacetConfig,
    json_columns: Vec<String>,
    primary_key: BTreeSet<String>,
    entries: Vec<PanelEntry>,
    more_values: BTreeMap<String, Vec<FacetValue>>,
    is_loading: bool,
    is_fetching: bool,
}

impl FacetPanel {
    pub fn new(config: FacetConfig, json_columns: Vec<String>, primary_key: impl IntoIterator<Item = String>) -> Self {
        Self {
            config,
            json_columns,
            primary_key: primary_key.into_iter().collect(),
            entries: Vec::new(),
            more_values: BTreeMap::new(),
            is_loading: false,
            is_fetching: false,
        }
    }

    pub fn config(&self) -> &FacetConfig {
        &self.config
    }

    /// The JSON column a raw key lives under, if it is a path inside one.
    fn parent_column(&self, raw_key: &str) -> Option<&str> {
        self.json_columns
            .iter()
            .find(|column| raw_key.strip_prefix(column.as_str()).is_some_and(|rest| rest.starts_with('.')))
            .map(String::as_str)
    }

    /// Filter state key for a raw backend key: paths under a JSON column are
    /// compared as strings, so they get wrapped.
    pub fn state_key(&self, raw_key: &str) -> String {
        if self.parent_column(raw_key).is_some() {
            format!("{STRING_WRAPPER}{raw_key})")
        } else {
            raw_key.to_string()
        }
    }

    /// Human label for a field key.
    pub fn display_name(&self, key: &str) -> String {
        cleaned_facet_name(key)
    }

    pub fn is_primary_key(&self, key: &str) -> bool {
        self.primary_key.contains(key)
    }

    /// Keys worth querying values for. Low-cardinality string columns always,
    /// everything else only when asked for more fields or when the field is
    /// selected or pinned.
    pub fn select_fetch_keys(
        &self,
        fields: &[FieldDescriptor],
        show_more_fields: bool,
        state: &FilterState,
        pins: &dyn PinStore,
    ) -> Vec<String> {
        let mut fields: Vec<&FieldDescriptor> = fields.iter().filter(|field| field.is_string).collect();
        fields.sort_by_key(|field| !field.is_low_cardinality());
        fields
            .into_iter()
            .filter(|field| {
                let key = self.state_key(&field.path);
                show_more_fields
                    || field.is_low_cardinality()
                    || state.contains_field(&key)
                    || pins.is_field_pinned(&key)
            })
            .filter(|field| !self.config.is_hidden_field(&field.path))
            .map(|field| field.path.clone())
            .collect()
    }

    fn merge(&self, batch: &FacetValues, state: &FilterState, pins: &dyn PinStore) -> Vec<MergedFacet> {
        let mut merged: Vec<MergedFacet> = Vec::new();
        let mut add = |key: String, values: Vec<FacetValue>| match merged.iter_mut().find(|facet| facet.key == key) {
            Some(facet) => push_missing(&mut facet.values, values),
            None => merged.push(MergedFacet { key, values }),
        };

        for facet in &batch.facets {
            add(self.state_key(&facet.key), facet.values.clone());
        }
        for key in pins.fields_with_pinned_values() {
            let values = pins.pinned_values(&key);
            add(key, values);
        }

        let mut shown: Vec<MergedFacet> = merged
            .into_iter()
            .map(|mut facet| {
                if let Some(extra) = self.more_values.get(&facet.key) {
                    push_missing(&mut facet.values, extra.iter().cloned());
                }
                facet
            })
            .filter(|facet| !facet.values.is_empty() || state.selected_count(&facet.key) > 0)
            .collect();

        for (key, _) in state.fields() {
            if !shown.iter().any(|facet| &facet.key == key) {
                shown.push(MergedFacet { key: key.clone(), values: Vec::new() });
            }
        }

        shown.sort_by_key(|facet| {
            (
                !state.is_checked(&facet.key),
                !pins.is_field_pinned(&facet.key),
                !self.is_primary_key(&facet.key),
            )
        });
        shown
    }

    /// Rebuild the entries from a facet query result. Groups that already
    /// existed keep their search text, expansion and distribution state.
    pub fn refresh(&mut self, batch: &FacetValues, state: &FilterState, pins: &dyn PinStore) {
        self.is_loading = batch.is_loading;
        self.is_fetching = batch.is_fetching;
        let merged = self.merge(batch, state, pins);

        let mut old_groups: BTreeMap<String, FacetGroup> = BTreeMap::new();
        let mut old_nested: BTreeMap<String, NestedFacetGroup> = BTreeMap::new();
        for entry in std::mem::take(&mut self.entries) {
            match entry {
                PanelEntry::Field(group) => {
                    old_groups.insert(group.key().to_string(), group);
                }
                PanelEntry::Nested(mut nested) => {
                    for child in nested.take_children() {
                        old_groups.insert(child.key().to_string(), child);
                    }
                    old_nested.insert(nested.parent_key().to_string(), nested);
                }
            }
        }

        // parent column -> children, in the order parents first appear
        let mut layout: Vec<(Option<String>, Vec<FacetGroup>)> = Vec::new();
        for facet in merged {
            let default_open = self.is_primary_key(&facet.key)
                || pins.is_field_pinned(&facet.key)
                || state.selected_count(&facet.key) > 0;
            let mut group = match old_groups.remove(&facet.key) {
                Some(mut group) => {
                    group.reopen_if(default_open);
                    group
                }
                None => {
                    let mut group = FacetGroup::new(facet.key.clone(), &self.config);
                    group.set_open(default_open);
                    group
                }
            };
            if group.options().iter().map(|option| &option.value).ne(facet.values.iter()) {
                group.set_values(facet.values);
            }
            group.set_loading(batch.is_loading);

            let parent = self.parent_column(raw_key(&facet.key)).map(str::to_string);
            match parent {
                Some(parent) => match layout.iter_mut().find(|(p, _)| p.as_deref() == Some(parent.as_str())) {
                    Some((_, children)) => children.push(group),
                    None => layout.push((Some(parent), vec![group])),
                },
                None => layout.push((None, vec![group])),
            }
        }

        for (parent, mut children) in layout {
            let entry = match parent {
                None => match children.pop() {
                    Some(group) => PanelEntry::Field(group),
                    None => continue,
                },
                Some(parent) => match old_nested.remove(&parent) {
                    Some(mut nested) => {
                        nested.replace_children(children);
                        PanelEntry::Nested(nested)
                    }
                    None => PanelEntry::Nested(NestedFacetGroup::new(parent, children, state, None)),
                },
            };
            self.entries.push(entry);
        }

        tracing::debug!(
            entries = self.entries.len(),
            is_loading = self.is_loading,
            is_fetching = self.is_fetching,
            "refreshed facet panel"
        );
    }

    pub fn entries(&self) -> &[PanelEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [PanelEntry] {
        &mut self.entries
    }

    pub fn group(&self, key: &str) -> Option<&FacetGroup> {
        self.entries.iter().find_map(|entry| match entry {
            PanelEntry::Field(group) => (group.key() == key).then_some(group),
            PanelEntry::Nested(nested) => nested.child(key),
        })
    }

    pub fn group_mut(&mut self, key: &str) -> Option<&mut FacetGroup> {
        self.entries.iter_mut().find_map(|entry| match entry {
            PanelEntry::Field(group) => (group.key() == key).then_some(group),
            PanelEntry::Nested(nested) => nested.child_mut(key),
        })
    }

    pub fn nested(&self, parent_key: &str) -> Option<&NestedFacetGroup> {
        self.entries.iter().find_map(|entry| match entry {
            PanelEntry::Nested(nested) if nested.parent_key() == parent_key => Some(nested),
            _ => None,
        })
    }

    pub fn nested_mut(&mut self, parent_key: &str) -> Option<&mut NestedFacetGroup> {
        self.entries.iter_mut().find_map(|entry| match entry {
            PanelEntry::Nested(nested) if nested.parent_key() == parent_key => Some(nested),
            _ => None,
        })
    }

    /// Record values from a "load more" query for `key` and show them right away.
    pub fn add_more_values(&mut self, key: &str, values: Vec<FacetValue>) {
        if values.is_empty() {
            return;
        }
        if let Some(group) = self.group_mut(key) {
            group.append_values(values.iter().cloned());
        }
        push_missing(self.more_values.entry(key.to_string()).or_default(), values);
    }

    pub fn has_loaded_more(&self, key: &str) -> bool {
        self.more_values.contains_key(key)
    }

    /// Forget extra values, e.g. once the time range changed.
    pub fn reset_more_values(&mut self) {
        self.more_values.clear();
    }

    pub fn has_selection(&self, state: &FilterState) -> bool {
        state.has_selection()
    }

    pub fn clear_all(&self, state: &mut FilterState) {
        tracing::debug!("clear all field filters");
        state.clear_all();
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    /// Nothing to show, and nothing on the way.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && !self.is_loading
    }
}


#[cfg(test)]
mod tests {
    use common::{facet_option::FacetKeyValues, pinned_filters::PinnedFilters};
    use pretty_assertions::assert_eq;

    use super::*;

    fn panel() -> FacetPanel {
        FacetPanel::new(FacetConfig::default(), vec!["LogAttributes".to_string()], vec!["ServiceName".to_string()])
    }

    fn values(values: &[&str]) -> Vec<FacetValue> {
        values.iter().map(|v| FacetValue::from(*v)).collect()
    }

    fn keys(panel: &FacetPanel) -> Vec<String> {
        panel.entries().iter().map(|entry| entry.key().to_string()).collect()
    }

    #[test]
    fn fetch_keys_prefer_low_cardinality_and_skip_hidden() {
        let panel = panel();
        let fields = vec![
            FieldDescriptor::new("Body", "String", true),
            FieldDescriptor::new("TraceId", "String", true),
            FieldDescriptor::new("ServiceName", "LowCardinality(String)", true),
            FieldDescriptor::new("Duration", "UInt64", false),
            FieldDescriptor::new("SeverityText", "LowCardinality(String)", true),
        ];
        let mut state = FilterState::new();
        let mut pins = PinnedFilters::default();

        assert_eq!(panel.select_fetch_keys(&fields, false, &state, &pins), vec!["ServiceName", "SeverityText"]);
        assert_eq!(panel.select_fetch_keys(&fields, true, &state, &pins), vec!["ServiceName", "SeverityText", "TraceId"]);

        state.toggle("TraceId", "abc".into());
        assert_eq!(panel.select_fetch_keys(&fields, false, &state, &pins), vec!["ServiceName", "SeverityText", "TraceId"]);

        state.clear("TraceId");
        pins.toggle_field("TraceId");
        assert_eq!(panel.select_fetch_keys(&fields, false, &state, &pins).len(), 3);
    }

    #[test]
    fn json_paths_are_wrapped_and_nested() {
        let mut panel = panel();
        let state = FilterState::new();
        let pins = PinnedFilters::default();
        let batch = FacetValues {
            facets: vec![
                FacetKeyValues::new("SeverityText", values(&["info"])),
                FacetKeyValues::new("LogAttributes.`http`.`method`", values(&["GET"])),
                FacetKeyValues::new("LogAttributes.`http`.`status`", values(&["200"])),
            ],
            ..Default::default()
        };
        panel.refresh(&batch, &state, &pins);

        assert_eq!(keys(&panel), vec!["SeverityText", "LogAttributes"]);
        let nested = panel.nested("LogAttributes").unwrap();
        let names: Vec<&str> = nested.children().iter().map(|child| child.name()).collect();
        assert_eq!(names, vec!["LogAttributes.http.method", "LogAttributes.http.status"]);
        assert!(panel.group("toString(LogAttributes.`http`.`status`)").is_some());
        assert!(!nested.is_expanded());
    }

    #[test]
    fn empty_facets_hidden_unless_selected() {
        let mut panel = panel();
        let mut state = FilterState::new();
        let pins = PinnedFilters::default();
        state.exclude("HostName", "db-1".into());
        let batch = FacetValues {
            facets: vec![
                FacetKeyValues::new("SeverityText", Vec::new()),
                FacetKeyValues::new("ServiceName", values(&["api"])),
            ],
            ..Default::default()
        };
        panel.refresh(&batch, &state, &pins);

        assert_eq!(keys(&panel), vec!["ServiceName", "HostName"]);
        let host = panel.group_mut("HostName").unwrap();
        assert!(host.is_open());
        let visible: Vec<String> = host.visible_options(&state, &pins).iter().map(|o| o.label.clone()).collect();
        assert_eq!(visible, vec!["db-1"]);
    }

    #[test]
    fn ordering_checked_then_pinned_then_primary_key() {
        let mut panel = panel();
        let mut state = FilterState::new();
        let mut pins = PinnedFilters::default();
        state.toggle("SeverityText", "error".into());
        pins.toggle_field("HostName");
        let batch = FacetValues {
            facets: vec![
                FacetKeyValues::new("Region", values(&["eu"])),
                FacetKeyValues::new("ServiceName", values(&["api"])),
                FacetKeyValues::new("HostName", values(&["db-1"])),
                FacetKeyValues::new("SeverityText", values(&["error", "info"])),
            ],
            ..Default::default()
        };
        panel.refresh(&batch, &state, &pins);

        assert_eq!(keys(&panel), vec!["SeverityText", "HostName", "ServiceName", "Region"]);
        assert!(panel.group("ServiceName").unwrap().is_open());
        assert!(!panel.group("Region").unwrap().is_open());
    }

    #[test]
    fn pinned_values_join_fetched_values() {
        let mut panel = panel();
        let state = FilterState::new();
        let mut pins = PinnedFilters::default();
        pins.toggle_value("SeverityText", "fatal".into());
        pins.toggle_value("Team", "core".into());
        let batch = FacetValues {
            facets: vec![FacetKeyValues::new("SeverityText", values(&["info"]))],
            ..Default::default()
        };
        panel.refresh(&batch, &state, &pins);

        let options: Vec<String> = panel.group("SeverityText").unwrap().options().iter().map(|o| o.label.clone()).collect();
        assert_eq!(options, vec!["info", "fatal"]);
        assert!(panel.group("Team").is_some());
    }

    #[test]
    fn display_state_survives_refresh() {
        let mut panel = panel();
        let state = FilterState::new();
        let pins = PinnedFilters::default();
        let batch = FacetValues {
            facets: vec![
                FacetKeyValues::new("SeverityText", values(&["info", "warn"])),
                FacetKeyValues::new("LogAttributes.`k`", values(&["v"])),
            ],
            ..Default::default()
        };
        panel.refresh(&batch, &state, &pins);
        panel.group_mut("SeverityText").unwrap().set_search_text("in");
        panel.nested_mut("LogAttributes").unwrap().set_expanded(true);

        let fresher = FacetValues {
            facets: vec![
                FacetKeyValues::new("SeverityText", values(&["info", "warn", "error"])),
                FacetKeyValues::new("LogAttributes.`k`", values(&["v", "w"])),
            ],
            is_fetching: true,
            ..Default::default()
        };
        panel.refresh(&fresher, &state, &pins);

        let group = panel.group_mut("SeverityText").unwrap();
        assert_eq!(group.search_text(), "in");
        assert_eq!(group.options().len(), 3);
        assert!(panel.nested("LogAttributes").unwrap().is_expanded());
        assert_eq!(panel.nested("LogAttributes").unwrap().children()[0].options().len(), 2);
        assert!(panel.is_fetching());
    }

    #[test]
    fn more_values_are_merged_until_reset() {
        let mut panel = panel();
        let state = FilterState::new();
        let pins = PinnedFilters::default();
        let batch = FacetValues { facets: vec![FacetKeyValues::new("ServiceName", values(&["api"]))], ..Default::default() };
        panel.refresh(&batch, &state, &pins);

        panel.add_more_values("ServiceName", values(&["api", "web"]));
        assert!(panel.has_loaded_more("ServiceName"));
        assert_eq!(panel.group("ServiceName").unwrap().options().len(), 2);

        panel.refresh(&batch, &state, &pins);
        assert_eq!(panel.group("ServiceName").unwrap().options().len(), 2);

        panel.reset_more_values();
        panel.refresh(&batch, &state, &pins);
        assert!(!panel.has_loaded_more("ServiceName"));
        assert_eq!(panel.group("ServiceName").unwrap().options().len(), 1);
    }

    #[test]
    fn empty_panel_while_loading_is_not_empty() {
        let mut panel = panel();
        let mut state = FilterState::new();
        let pins = PinnedFilters::default();
        panel.refresh(&FacetValues { is_loading: true, ..Default::default() }, &state, &pins);
        assert!(!panel.is_empty());
        panel.refresh(&FacetValues::default(), &state, &pins);
        assert!(panel.is_empty());

        state.toggle("ServiceName", "api".into());
        assert!(panel.has_selection(&state));
        panel.clear_all(&mut state);
        assert!(!panel.has_selection(&state));
    }
}
