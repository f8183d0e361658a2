//! Option ordering and progressive disclosure for one facet field.
//!
//! Without search text options are ordered by, in turn: pinned first, then
//! included, excluded, neutral; then by distribution share (descending, when
//! enabled); then naturally by value. A collapsed list is cut to
//! `max_visible` but never below the number of selected values, so nothing the
//! user picked can disappear. With search text the substring matches are
//! returned in list order and never cut.

use std::cmp::Ordering;

use common::{
    facet_option::{DistributionMap, FacetOption},
    facet_value::FacetValue,
    filter_state::{FilterFieldState, Selection},
};

use crate::{compare::natural_cmp, config::SearchCase};


pub struct RankRequest<'a> {
    pub selected: &'a FilterFieldState,
    pub is_pinned: &'a dyn Fn(&FacetValue) -> bool,
    /// Only passed when the caller has distributions switched on for the field.
    pub distribution: Option<&'a DistributionMap>,
    pub search_text: &'a str,
    pub search_case: SearchCase,
    pub expanded: bool,
    pub max_visible: usize,
}

/// Selected values the backend did not return go first, labelled by their value.
pub fn augment_options(options: &[FacetOption], selected: &FilterFieldState) -> Vec<FacetOption> {
    let mut augmented: Vec<FacetOption> = selected
        .selected_values()
        .filter(|value| !options.iter().any(|option| &option.value == *value))
        .map(|value| FacetOption::new(value.clone()))
        .collect();
    augmented.extend_from_slice(options);
    augmented
}

struct SortKey {
    pinned: bool,
    selection: u8,
    percent: Option<f64>,
    text: String,
}

fn selection_rank(selection: Selection) -> u8 {
    match selection {
        Selection::Included => 0,
        Selection::Excluded => 1,
        Selection::Neutral => 2,
    }
}

fn cmp_percent(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn rank_options(options: &[FacetOption], request: &RankRequest<'_>) -> Vec<FacetOption> {
    let with_percent = |option: &FacetOption| {
        let mut option = option.clone();
        if let Some(distribution) = request.distribution {
            option.distribution_percent = Some(distribution.get(&option.value).copied().unwrap_or(0.0));
        }
        option
    };

    if !request.search_text.is_empty() {
        return options
            .iter()
            .filter(|option| request.search_case.matches(&option.value.to_string(), request.search_text))
            .map(with_percent)
            .collect();
    }

    let mut keyed: Vec<(SortKey, &FacetOption)> = options
        .iter()
        .map(|option| {
            let key = SortKey {
                pinned: (request.is_pinned)(&option.value),
                selection: selection_rank(request.selected.selection(&option.value)),
                percent: request.distribution.and_then(|d| d.get(&option.value).copied()),
                text: option.value.to_string(),
            };
            (key, option)
        })
        .collect();

    keyed.sort_by(|(a, a_option), (b, b_option)| {
        b.pinned
            .cmp(&a.pinned)
            .then(a.selection.cmp(&b.selection))
            .then_with(|| cmp_percent(a.percent, b.percent))
            .then_with(|| natural_cmp(&a.text, &b.text))
            .then_with(|| a_option.value.cmp(&b_option.value))
    });

    let mut ranked: Vec<FacetOption> = keyed.into_iter().map(|(_, option)| with_percent(option)).collect();
    if !request.expanded && ranked.len() > request.max_visible {
        ranked.truncate(request.max_visible.max(request.selected.selected_count()));
    }
    ranked
}
