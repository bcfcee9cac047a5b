//! Paths in the asset tree and the breadcrumbs derived from them.

use std::fmt;

use crate::upstream::AssetLocation;

/// Label of the first breadcrumb (the repository root).
pub const ROOT_LABEL: &str = "Assets";

/// A slash-separated path relative to the API root. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AssetPath(String);

impl AssetPath {
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Create a path, trimming leading and trailing slashes.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(path.as_ref().trim_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of a direct child.
    pub fn child(&self, name: &str) -> Self {
        if self.is_root() {
            Self::new(name)
        } else {
            Self(format!("{}/{}", self.0, name.trim_matches('/')))
        }
    }

    /// Path of the enclosing folder, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rsplit_once('/') {
            Some((parent, _)) => Self(parent.to_string()),
            None => Self::root(),
        })
    }

    /// Last segment, or `None` at the root.
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.0.rsplit('/').next()
        }
    }

    /// Breadcrumb trail from the root down to this path.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        let mut crumbs = vec![Breadcrumb {
            name: ROOT_LABEL.to_string(),
            path: Self::root(),
        }];

        let mut partial: Vec<&str> = Vec::new();
        for segment in self.0.split('/').filter(|s| !s.is_empty()) {
            partial.push(segment);
            crumbs.push(Breadcrumb {
                name: segment.to_string(),
                path: Self(partial.join("/")),
            });
        }
        crumbs
    }

    /// Recover a path from an entity link such as
    /// `https://host/api/assets/wknd/en.json?x=1`.
    ///
    /// Returns `None` when the link does not point below `location`'s API root.
    pub fn from_entity_href(href: &str, location: &AssetLocation) -> Option<Self> {
        let without_query = href.split(['?', '#']).next().unwrap_or(href);
        let base = location.base();
        let rest = without_query.strip_prefix(base.as_str())?;
        if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('.')) {
            return None;
        }
        let rest = rest.strip_suffix(".json").unwrap_or(rest);
        Some(Self::new(rest))
    }

    /// Link to `name` inside this folder in the repository's own asset console.
    pub fn console_url(&self, instance: &str, name: &str) -> String {
        let instance = instance.trim_end_matches('/');
        let child = self.child(name);
        let encoded: Vec<_> = child.as_str().split('/').map(urlencoding::encode).collect();
        format!("{}/assets.html/content/dam/{}", instance, encoded.join("/"))
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for AssetPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// One element of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub name: String,
    pub path: AssetPath,
}

/// Derive a node name from a title: every character outside `[A-Za-z0-9]`
/// becomes `-`.
pub fn slugify_name(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}
