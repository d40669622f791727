mod ordered_map;

pub use ordered_map::OrderedMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The full document served by `GET <API_URL>` and sent back on `POST <API_URL>`.
///
/// Unknown fields are kept in `extra` so a mutated payload is posted back
/// with everything the server sent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct RawPayload {
    #[serde(default)]
    pub tabs: Vec<String>,
    #[serde(rename = "tabData")]
    pub tab_data: OrderedMap<TabRecord>,
    pub plugins: OrderedMap<PluginRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TabRecord {
    pub title: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub active: Vec<String>,
    #[serde(default)]
    pub disabled: Vec<String>,
    #[serde(default)]
    pub inactive: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TabRecord {
    pub fn new(title: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon: icon.into(),
            ..Self::default()
        }
    }

    pub fn with_active<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_inactive<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inactive = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_disabled<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Every id the tab references, in list order, duplicates included.
    pub fn referenced_ids(&self) -> impl Iterator<Item = &str> {
        self.active
            .iter()
            .chain(self.disabled.iter())
            .chain(self.inactive.iter())
            .map(String::as_str)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PluginRecord {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub status: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PluginRecord {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}
