use serde::{Deserialize, Serialize};

/// Background used for rows whose source has no configured color.
pub const DEFAULT_COLOR: &str = "#ffffff";

/// A configured news origin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Source {
    pub name: String,
    /// Feed URL handed to the gateway
    pub url: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl Source {
    pub fn new(name: &str, url: &str, color: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            color: color.map(|c| c.to_string()),
        }
    }
}

/// Ordered, immutable set of sources. Order is significant: it decides
/// which source contributes to the top of the board first.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    sources: Vec<Source>,
}

impl Registry {
    pub fn new(sources: Vec<Source>) -> Self {
        Self { sources }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.name == name)
    }

    pub fn color_for(&self, name: &str) -> &str {
        self.get(name)
            .and_then(|s| s.color.as_deref())
            .unwrap_or(DEFAULT_COLOR)
    }
}
