//! Pinned values and fields, as seen by the ranking and panel code.

use common::{facet_value::FacetValue, pinned_filters::PinnedFilters};


/// Membership queries and toggle requests against whatever stores pins.
pub trait PinStore {
    fn is_pinned(&self, field: &str, value: &FacetValue) -> bool;
    fn toggle_pin(&mut self, field: &str, value: FacetValue);
    fn is_field_pinned(&self, field: &str) -> bool;
    fn toggle_field_pin(&mut self, field: &str);
    /// Pinned values of `field`, so they can be offered even when a query did not return them.
    fn pinned_values(&self, field: &str) -> Vec<FacetValue>;
    fn fields_with_pinned_values(&self) -> Vec<String>;
}

impl PinStore for PinnedFilters {
    fn is_pinned(&self, field: &str, value: &FacetValue) -> bool {
        PinnedFilters::is_pinned(self, field, value)
    }
    fn toggle_pin(&mut self, field: &str, value: FacetValue) {
        self.toggle_value(field, value);
    }
    fn is_field_pinned(&self, field: &str) -> bool {
        PinnedFilters::is_field_pinned(self, field)
    }
    fn toggle_field_pin(&mut self, field: &str) {
        self.toggle_field(field);
    }
    fn pinned_values(&self, field: &str) -> Vec<FacetValue> {
        PinnedFilters::pinned_values(self, field).cloned().collect()
    }
    fn fields_with_pinned_values(&self) -> Vec<String> {
        PinnedFilters::fields_with_pinned_values(self).cloned().collect()
    }
}

/// Pins of one source. Storage belongs to the caller, which loads a snapshot in
/// and writes `snapshot()` back whenever `is_dirty()` reports a change.
#[derive(Debug, Clone, Default)]
pub struct PinRegistry {
    context_id: String,
    pins: PinnedFilters,
    dirty: bool,
}

impl PinRegistry {
    pub fn new(context_id: impl Into<String>) -> Self {
        Self { context_id: context_id.into(), pins: PinnedFilters::default(), dirty: false }
    }

    pub fn from_snapshot(context_id: impl Into<String>, pins: PinnedFilters) -> Self {
        Self { context_id: context_id.into(), pins, dirty: false }
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn snapshot(&self) -> &PinnedFilters {
        &self.pins
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }
}

impl PinStore for PinRegistry {
    fn is_pinned(&self, field: &str, value: &FacetValue) -> bool {
        self.pins.is_pinned(field, value)
    }
    fn toggle_pin(&mut self, field: &str, value: FacetValue) {
        let pinned = self.pins.toggle_value(field, value);
        tracing::debug!(context_id = %self.context_id, field, pinned, "toggled value pin");
        self.dirty = true;
    }
    fn is_field_pinned(&self, field: &str) -> bool {
        self.pins.is_field_pinned(field)
    }
    fn toggle_field_pin(&mut self, field: &str) {
        let pinned = self.pins.toggle_field(field);
        tracing::debug!(context_id = %self.context_id, field, pinned, "toggled field pin");
        self.dirty = true;
    }
    fn pinned_values(&self, field: &str) -> Vec<FacetValue> {
        self.pins.pinned_values(field).cloned().collect()
    }
    fn fields_with_pinned_values(&self) -> Vec<String> {
        self.pins.fields_with_pinned_values().cloned().collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_tracks_unsaved_changes() {
        let mut registry = PinRegistry::new("source-logs");
        assert!(!registry.is_dirty());

        registry.toggle_pin("level", FacetValue::from("error"));
        assert!(registry.is_dirty());
        assert!(registry.is_pinned("level", &FacetValue::from("error")));
        assert_eq!(registry.pinned_values("level"), vec![FacetValue::from("error")]);

        registry.mark_saved();
        let restored = PinRegistry::from_snapshot(registry.context_id(), registry.snapshot().clone());
        assert!(restored.is_pinned("level", &FacetValue::from("error")));
        assert!(!restored.is_dirty());
    }

    #[test]
    fn field_pins_round_through_trait() {
        let mut pins = PinnedFilters::default();
        PinStore::toggle_field_pin(&mut pins, "ServiceName");
        assert!(PinStore::is_field_pinned(&pins, "ServiceName"));
    }
}
