//! Mutations of the raw payload's membership lists.
//!
//! Every function here works on a copy: the caller persists the staged
//! payload and only commits it once the server has accepted it.

use crate::modules::protocol::RawPayload;
use crate::modules::slug::normalize_key;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToggleError {
    #[error("plugin not found: {0}")]
    PluginNotFound(String),
    #[error("plugin {0} is neither active nor inactive in any tab")]
    NotToggleable(String),
}

/// How the caller names the plugin to toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginRef {
    Id(String),
    Title(String),
}

/// Maps a reference to a plugin id in `raw`.
///
/// Titles match exactly first, then by their whitespace-free lowercase form.
pub fn resolve_plugin(raw: &RawPayload, plugin: &PluginRef) -> Result<String, ToggleError> {
    match plugin {
        PluginRef::Id(id) => {
            let referenced = raw
                .tab_data
                .values()
                .any(|t| t.referenced_ids().any(|r| r == id));
            if raw.plugins.contains_key(id) || referenced {
                Ok(id.clone())
            } else {
                Err(ToggleError::PluginNotFound(id.clone()))
            }
        }
        PluginRef::Title(title) => {
            if let Some((id, _)) = raw.plugins.iter().find(|(_, p)| p.title == *title) {
                return Ok(id.to_string());
            }
            let wanted = normalize_key(title);
            raw.plugins
                .iter()
                .find(|(_, p)| normalize_key(&p.title) == wanted)
                .map(|(id, _)| id.to_string())
                .ok_or_else(|| ToggleError::PluginNotFound(title.clone()))
        }
    }
}

/// Moves `plugin_id` between `active` and `inactive` in every tab that lists it.
///
/// Applying it twice restores the original membership, though the id ends
/// up at the end of its list.
pub fn stage_toggle_one(raw: &RawPayload, plugin_id: &str) -> Result<RawPayload, ToggleError> {
    resolve_plugin(raw, &PluginRef::Id(plugin_id.to_string()))?;

    let mut staged = raw.clone();
    let mut touched = false;
    for tab in staged.tab_data.values_mut() {
        if let Some(pos) = tab.active.iter().position(|id| id == plugin_id) {
            let id = tab.active.remove(pos);
            tab.inactive.push(id);
            touched = true;
        } else if let Some(pos) = tab.inactive.iter().position(|id| id == plugin_id) {
            let id = tab.inactive.remove(pos);
            tab.active.push(id);
            touched = true;
        }
    }

    if !touched {
        return Err(ToggleError::NotToggleable(plugin_id.to_string()));
    }
    Ok(staged)
}

/// Rewrites every tab's `disabled` list in one sweep.
///
/// When `all_disabled` is set the lists are emptied, otherwise each becomes
/// `active ∪ inactive`. Whatever subset was disabled before is discarded.
pub fn stage_toggle_all(raw: &RawPayload, all_disabled: bool) -> RawPayload {
    let mut staged = raw.clone();
    for tab in staged.tab_data.values_mut() {
        if all_disabled {
            tab.disabled.clear();
            continue;
        }
        let mut union: Vec<String> = Vec::with_capacity(tab.active.len() + tab.inactive.len());
        for id in tab.active.iter().chain(tab.inactive.iter()) {
            if !union.contains(id) {
                union.push(id.clone());
            }
        }
        tab.disabled = union;
    }
    staged
}
