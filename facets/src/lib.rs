//! Facet filter engine: expression cleanup, option ranking, and the
//! per-field and per-panel state behind a faceted search sidebar.

pub mod compare;
pub mod config;
pub mod error;
pub mod group;
pub mod nested;
pub mod normalize;
pub mod panel;
pub mod pins;
pub mod ranker;
pub mod state_token;

pub use config::{FacetConfig, SearchCase};
pub use error::FacetError;
pub use group::{FacetGroup, GroupStatus};
pub use nested::NestedFacetGroup;
pub use normalize::cleaned_facet_name;
pub use panel::{FacetPanel, FieldDescriptor, PanelEntry};
pub use pins::{PinRegistry, PinStore};
pub use ranker::{RankRequest, rank_options};
pub use state_token::StateToken;
