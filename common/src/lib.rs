//! Common facet models shared between the filter engine and its consumers.

extern crate serde;


pub mod facet_value;
pub mod facet_option;
pub mod filter_state;
pub mod pinned_filters;
