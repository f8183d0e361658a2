//! Engine configuration, with defaults and environment overrides.

use serde::{Deserialize, Serialize};

use crate::error::{FacetError, Result};


pub const DEFAULT_MAX_VISIBLE: usize = 10;

pub const ENV_MAX_VISIBLE: &str = "FACETS_MAX_VISIBLE";
pub const ENV_SEARCH_CASE: &str = "FACETS_SEARCH_CASE";
pub const ENV_HIDDEN_FIELDS: &str = "FACETS_HIDDEN_FIELDS";

/// How option search text is matched against values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchCase {
    /// Values are compared exactly as the backend returned them.
    #[default]
    Sensitive,
    Insensitive,
}

impl SearchCase {
    pub fn matches(self, haystack: &str, needle: &str) -> bool {
        match self {
            SearchCase::Sensitive => haystack.contains(needle),
            SearchCase::Insensitive => haystack.to_lowercase().contains(&needle.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacetConfig {
    /// Options shown per field before "show more".
    pub max_visible: usize,
    pub search_case: SearchCase,
    /// Fields never offered as facets, compared case-insensitively.
    pub hidden_fields: Vec<String>,
}

impl Default for FacetConfig {
    fn default() -> Self {
        Self {
            max_visible: DEFAULT_MAX_VISIBLE,
            search_case: SearchCase::default(),
            hidden_fields: vec!["body".to_string(), "timestamp".to_string(), "_hdx_body".to_string()],
        }
    }
}

impl FacetConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let read = |name: &str| lookup(name).map(|raw| raw.trim().to_string()).filter(|raw| !raw.is_empty());

        if let Some(raw) = read(ENV_MAX_VISIBLE) {
            config.max_visible = raw
                .parse::<usize>()
                .ok()
                .filter(|value| *value >= 1)
                .ok_or(FacetError::InvalidConfig { name: ENV_MAX_VISIBLE, value: raw })?;
        }
        if let Some(raw) = read(ENV_SEARCH_CASE) {
            config.search_case = match raw.to_ascii_lowercase().as_str() {
                "sensitive" => SearchCase::Sensitive,
                "insensitive" => SearchCase::Insensitive,
                _ => return Err(FacetError::InvalidConfig { name: ENV_SEARCH_CASE, value: raw }),
            };
        }
        if let Some(raw) = read(ENV_HIDDEN_FIELDS) {
            config.hidden_fields = raw
                .split(',')
                .map(|field| field.trim().to_string())
                .filter(|field| !field.is_empty())
                .collect();
        }
        Ok(config)
    }

    pub fn is_hidden_field(&self, path: &str) -> bool {
        self.hidden_fields.iter().any(|hidden| hidden.eq_ignore_ascii_case(path))
    }
}
