//! One facet field: its options, the display state around them, and the
//! intents that write back into `FilterState` and the pin store.

use std::collections::BTreeSet;

use common::{
    facet_option::{DistributionMap, FacetOption},
    facet_value::FacetValue,
    filter_state::{FilterFieldState, FilterState},
};

use crate::{
    config::{FacetConfig, SearchCase},
    normalize::cleaned_facet_name,
    pins::PinStore,
    ranker::{RankRequest, augment_options, rank_options},
};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    Loading,
    /// Loaded, and the backend had no values for the field.
    Empty,
    Ready,
}

#[derive(Debug, Clone, PartialEq)]
struct RankKey {
    options_revision: u64,
    selected: FilterFieldState,
    pinned: BTreeSet<FacetValue>,
    distribution_revision: u64,
    search_text: String,
    expanded: bool,
    show_distribution: bool,
}

#[derive(Debug, Clone)]
pub struct FacetGroup {
    key: String,
    name: String,
    options: Vec<FacetOption>,
    options_revision: u64,
    distribution: Option<DistributionMap>,
    distribution_revision: u64,
    loading: bool,

    search_text: String,
    expanded: bool,
    open: bool,
    show_distribution: bool,

    max_visible: usize,
    search_case: SearchCase,
    cache: Option<(RankKey, Vec<FacetOption>)>,
}

impl FacetGroup {
    /// A group for raw column `key`, titled with its cleaned name.
    pub fn new(key: impl Into<String>, config: &FacetConfig) -> Self {
        let key = key.into();
        let name = cleaned_facet_name(&key);
        Self::with_name(key, name, config)
    }

    pub fn with_name(key: impl Into<String>, name: impl Into<String>, config: &FacetConfig) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            options: Vec::new(),
            options_revision: 0,
            distribution: None,
            distribution_revision: 0,
            loading: false,
            search_text: String::new(),
            expanded: false,
            open: false,
            show_distribution: false,
            max_visible: config.max_visible,
            search_case: config.search_case,
            cache: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &[FacetOption] {
        &self.options
    }

    /// Replace the options with a fresher list. Selections live in `FilterState`
    /// and survive even if the new list no longer contains them.
    pub fn set_options(&mut self, options: Vec<FacetOption>) {
        self.options = options;
        self.options_revision += 1;
    }

    pub fn set_values(&mut self, values: impl IntoIterator<Item = FacetValue>) {
        self.set_options(values.into_iter().map(FacetOption::new).collect());
    }

    /// Add values from a "load more" fetch, skipping ones already listed.
    pub fn append_values(&mut self, values: impl IntoIterator<Item = FacetValue>) {
        let mut changed = false;
        for value in values {
            if !self.options.iter().any(|option| option.value == value) {
                self.options.push(FacetOption::new(value));
                changed = true;
            }
        }
        if changed {
            self.options_revision += 1;
        }
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn status(&self) -> GroupStatus {
        if self.loading {
            GroupStatus::Loading
        } else if self.options.is_empty() {
            GroupStatus::Empty
        } else {
            GroupStatus::Ready
        }
    }

    pub fn set_distribution(&mut self, distribution: Option<DistributionMap>) {
        self.distribution = distribution;
        self.distribution_revision += 1;
    }

    pub fn show_distribution(&self) -> bool {
        self.show_distribution
    }

    /// Returns whether distributions are now shown; the caller fetches them when true.
    pub fn toggle_distribution(&mut self) -> bool {
        self.show_distribution = !self.show_distribution;
        if self.show_distribution {
            self.open = true;
        }
        self.show_distribution
    }

    pub fn distribution_failed(&mut self, reason: &str) {
        tracing::warn!(field = %self.key, reason, "failed to load value distribution");
        self.show_distribution = false;
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Returns whether the list is now expanded; the caller also loads more
    /// values when true.
    pub fn toggle_expanded(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Open when the default turns true. Never closes.
    pub fn reopen_if(&mut self, default_open: bool) {
        if default_open {
            self.open = true;
        }
    }

    pub fn selected_count(&self, state: &FilterState) -> usize {
        state.selected_count(&self.key)
    }

    /// Ranked and possibly truncated options. Recomputed only when one of the
    /// ranking inputs changed since the previous call.
    pub fn visible_options(&mut self, state: &FilterState, pins: &dyn PinStore) -> &[FacetOption] {
        let selected = state.field(&self.key);
        let augmented = augment_options(&self.options, selected);
        let pinned: BTreeSet<FacetValue> = augmented
            .iter()
            .filter(|option| pins.is_pinned(&self.key, &option.value))
            .map(|option| option.value.clone())
            .collect();
        let key = RankKey {
            options_revision: self.options_revision,
            selected: selected.clone(),
            pinned,
            distribution_revision: self.distribution_revision,
            search_text: self.search_text.clone(),
            expanded: self.expanded,
            show_distribution: self.show_distribution,
        };

        let hit = matches!(&self.cache, Some((cached, _)) if *cached == key);
        if !hit {
            let is_pinned = |value: &FacetValue| key.pinned.contains(value);
            let ranked = rank_options(&augmented, &RankRequest {
                selected,
                is_pinned: &is_pinned,
                distribution: if self.show_distribution { self.distribution.as_ref() } else { None },
                search_text: &self.search_text,
                search_case: self.search_case,
                expanded: self.expanded,
                max_visible: self.max_visible,
            });
            self.cache = Some((key, ranked));
        }
        match &self.cache {
            Some((_, ranked)) => ranked.as_slice(),
            None => &[],
        }
    }

    /// "Show more" is offered while not searching and some options are cut.
    pub fn can_show_more(&self, state: &FilterState) -> bool {
        let selected = state.field(&self.key);
        let total = augment_options(&self.options, selected).len();
        self.search_text.is_empty() && total > self.max_visible && selected.selected_count() < total
    }

    /// "Load more" is offered when everything fetched fits and nothing extra was loaded yet.
    pub fn can_load_more(&self, state: &FilterState, has_loaded_more: bool) -> bool {
        !self.can_show_more(state) && !self.expanded && !has_loaded_more
    }

    pub fn toggle(&self, state: &mut FilterState, value: FacetValue) {
        tracing::debug!(field = %self.key, %value, "toggle filter value");
        state.toggle(&self.key, value);
    }

    pub fn only(&self, state: &mut FilterState, value: FacetValue) {
        tracing::debug!(field = %self.key, %value, "filter only value");
        state.only(&self.key, value);
    }

    pub fn exclude(&self, state: &mut FilterState, value: FacetValue) {
        tracing::debug!(field = %self.key, %value, "exclude filter value");
        state.exclude(&self.key, value);
    }

    pub fn clear(&self, state: &mut FilterState) {
        tracing::debug!(field = %self.key, "clear field filter");
        state.clear(&self.key);
    }

    pub fn toggle_pin(&self, pins: &mut dyn PinStore, value: FacetValue) {
        pins.toggle_pin(&self.key, value);
    }

    pub fn toggle_field_pin(&self, pins: &mut dyn PinStore) {
        pins.toggle_field_pin(&self.key);
    }
}

/// Short label for a distribution share.
pub fn format_percentage(percent: f64) -> String {
    if percent < 1.0 {
        "<1%".to_string()
    } else if percent >= 99.5 {
        ">99%".to_string()
    } else {
        format!("~{}%", percent.round() as i64)
    }
}
