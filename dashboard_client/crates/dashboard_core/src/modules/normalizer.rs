use crate::modules::protocol::{OrderedMap, PluginRecord, RawPayload, TabRecord};
use crate::modules::slug::slugify;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub slug: String,
    pub active: Vec<String>,
    pub disabled: Vec<String>,
    pub inactive: Vec<String>,
}

/// A plugin as rendered inside one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plugin {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Slug of the owning tab.
    pub category: String,
    pub disabled: bool,
    /// `true` when the id sits in the tab's active list.
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("tabs {first_tab:?} and {second_tab:?} both map to slug {slug:?}")]
    SlugCollision {
        slug: String,
        first_tab: String,
        second_tab: String,
    },
}

/// Flat projection of a [`RawPayload`]. Never authoritative: it is rebuilt
/// from the raw payload after every fetch or confirmed mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub tabs: Vec<Tab>,
    pub plugins: Vec<Plugin>,
    pub default_tab: Option<String>,
    pub all_disabled: bool,
}

impl DashboardView {
    pub fn derive(raw: &RawPayload) -> Result<Self, NormalizeError> {
        let tabs = normalize_tabs(&raw.tab_data)?;
        let plugins = normalize_plugins(&tabs, &raw.plugins);
        let all_disabled = all_disabled(&plugins);
        Ok(Self {
            default_tab: tabs.first().map(|t| t.slug.clone()),
            tabs,
            plugins,
            all_disabled,
        })
    }

    pub fn tab(&self, slug: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.slug == slug)
    }

    pub fn plugins_in<'a>(&'a self, slug: &'a str) -> impl Iterator<Item = &'a Plugin> + 'a {
        self.plugins.iter().filter(move |p| p.category == slug)
    }
}

pub fn normalize_tabs(raw: &OrderedMap<TabRecord>) -> Result<Vec<Tab>, NormalizeError> {
    let mut out: Vec<Tab> = Vec::with_capacity(raw.len());
    for (id, record) in raw.iter() {
        let slug = slugify(&record.title);
        if let Some(existing) = out.iter().find(|t| t.slug == slug) {
            return Err(NormalizeError::SlugCollision {
                slug,
                first_tab: existing.id.clone(),
                second_tab: id.to_string(),
            });
        }
        out.push(Tab {
            id: id.to_string(),
            title: record.title.clone(),
            icon: record.icon.clone(),
            slug,
            active: record.active.clone(),
            disabled: record.disabled.clone(),
            inactive: record.inactive.clone(),
        });
    }
    Ok(out)
}

pub fn normalize_plugins(tabs: &[Tab], plugins: &OrderedMap<PluginRecord>) -> Vec<Plugin> {
    let mut out = Vec::new();
    for tab in tabs {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut ids: Vec<&str> = tab
            .active
            .iter()
            .chain(tab.disabled.iter())
            .chain(tab.inactive.iter())
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect();
        ids.sort_by(|a, b| locale_cmp(a, b));

        for id in ids {
            let Some(record) = plugins.get(id) else {
                tracing::debug!(tab = %tab.id, plugin = %id, "skipping dangling plugin reference");
                continue;
            };
            out.push(Plugin {
                id: id.to_string(),
                title: record.title.clone(),
                description: record.description.clone(),
                category: tab.slug.clone(),
                disabled: tab.disabled.iter().any(|d| d == id),
                status: tab.active.iter().any(|a| a == id),
            });
        }
    }
    out
}

/// `true` when every plugin is disabled, including the empty case.
pub fn all_disabled(plugins: &[Plugin]) -> bool {
    plugins.iter().all(|p| p.disabled)
}

/// Punctuation in the order a root-locale collator sorts it.
const PUNCTUATION_ORDER: &str = " _-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Root-locale style ordering: punctuation, then digits, then letters, with
/// letters compared case-insensitively. On a tie lowercase sorts before
/// uppercase, then plain code point order decides.
///
/// Accented letters are not folded onto their base letter, so `"é"` sorts
/// after `"z"` here while a full collator would place it beside `"e"`.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let primary = a.chars().map(sort_key).cmp(b.chars().map(sort_key));
    if primary != Ordering::Equal {
        return primary;
    }
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca == cb {
            continue;
        }
        match (ca.is_lowercase(), cb.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => return ca.cmp(&cb),
        }
    }
    a.cmp(b)
}

fn sort_key(c: char) -> (u8, u32) {
    if c.is_alphabetic() {
        let folded = c.to_lowercase().next().unwrap_or(c);
        return (3, u32::from(folded));
    }
    if c.is_numeric() {
        return (2, u32::from(c));
    }
    match PUNCTUATION_ORDER.chars().position(|p| p == c) {
        Some(rank) => (0, rank as u32),
        None => (1, u32::from(c)),
    }
}
