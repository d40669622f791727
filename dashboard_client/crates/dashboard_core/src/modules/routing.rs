use crate::modules::normalizer::{DashboardView, Plugin};
use crate::modules::slug::slug_to_title;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Route {
    /// The root path forwards to the first tab.
    Redirect { slug: String },
    Page {
        slug: String,
        heading: String,
        plugins: Vec<Plugin>,
    },
    NotFound,
}

/// Accepts `/`, `/<slug>` and `/<slug>/`. Anything with more slashes is not a tab.
pub fn resolve_route(view: &DashboardView, path: &str) -> Route {
    let path = path.trim();
    if path.is_empty() || path == "/" {
        return match view.default_tab.as_deref() {
            Some(slug) => Route::Redirect {
                slug: slug.to_string(),
            },
            None => Route::NotFound,
        };
    }

    let segment = path.strip_prefix('/').unwrap_or(path);
    let segment = segment.strip_suffix('/').unwrap_or(segment);
    if segment.is_empty() || segment.contains('/') || view.tab(segment).is_none() {
        return Route::NotFound;
    }

    Route::Page {
        slug: segment.to_string(),
        heading: format!("{} Plugins", slug_to_title(segment)),
        plugins: view.plugins_in(segment).cloned().collect(),
    }
}
