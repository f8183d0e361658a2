//! Facet groups that share a parent column, such as every path under one JSON
//! attribute map, shown behind one expand/collapse with a combined badge.

use common::{facet_option::FacetOption, facet_value::FacetValue, filter_state::FilterState};

use crate::{group::FacetGroup, pins::PinStore};


#[derive(Debug, Clone)]
pub struct NestedFacetGroup {
    parent_key: String,
    children: Vec<FacetGroup>,
    expanded: bool,
    user_set: bool,
}

impl NestedFacetGroup {
    /// Starts expanded per `explicit_default`, or when any child has a selection.
    pub fn new(
        parent_key: impl Into<String>,
        children: Vec<FacetGroup>,
        state: &FilterState,
        explicit_default: Option<bool>,
    ) -> Self {
        let selected: usize = children.iter().map(|child| child.selected_count(state)).sum();
        Self {
            parent_key: parent_key.into(),
            children,
            expanded: explicit_default.unwrap_or(selected > 0),
            user_set: false,
        }
    }

    pub fn parent_key(&self) -> &str {
        &self.parent_key
    }

    pub fn children(&self) -> &[FacetGroup] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [FacetGroup] {
        &mut self.children
    }

    pub fn child(&self, key: &str) -> Option<&FacetGroup> {
        self.children.iter().find(|child| child.key() == key)
    }

    pub fn child_mut(&mut self, key: &str) -> Option<&mut FacetGroup> {
        self.children.iter_mut().find(|child| child.key() == key)
    }

    /// Swap in a new child list. Expansion is kept.
    pub(crate) fn replace_children(&mut self, children: Vec<FacetGroup>) {
        self.children = children;
    }

    pub(crate) fn take_children(&mut self) -> Vec<FacetGroup> {
        std::mem::take(&mut self.children)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Included plus excluded values across every child.
    pub fn selected_count(&self, state: &FilterState) -> usize {
        self.children.iter().map(|child| child.selected_count(state)).sum()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_user_set(&self) -> bool {
        self.user_set
    }

    pub fn toggle_expanded(&mut self) {
        self.set_expanded(!self.expanded);
    }

    pub fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
        self.user_set = true;
    }

    pub fn visible_options(&mut self, key: &str, state: &FilterState, pins: &dyn PinStore) -> Option<&[FacetOption]> {
        Some(self.child_mut(key)?.visible_options(state, pins))
    }

    /// The intents below return false when `key` is not a child of this group.
    pub fn toggle(&self, state: &mut FilterState, key: &str, value: FacetValue) -> bool {
        self.child(key).map(|child| child.toggle(state, value)).is_some()
    }

    pub fn only(&self, state: &mut FilterState, key: &str, value: FacetValue) -> bool {
        self.child(key).map(|child| child.only(state, value)).is_some()
    }

    pub fn exclude(&self, state: &mut FilterState, key: &str, value: FacetValue) -> bool {
        self.child(key).map(|child| child.exclude(state, value)).is_some()
    }

    pub fn clear(&self, state: &mut FilterState, key: &str) -> bool {
        self.child(key).map(|child| child.clear(state)).is_some()
    }

    pub fn toggle_pin(&self, pins: &mut dyn PinStore, key: &str, value: FacetValue) -> bool {
        self.child(key).map(|child| child.toggle_pin(pins, value)).is_some()
    }
}
