//! Payloads for the create and update actions.

use serde_json::{json, Value};

use crate::error::BrowseError;
use crate::upstream::{Element, Entity};

use super::path::{slugify_name, AssetPath};

/// Content fragment model used when none is configured.
pub const DEFAULT_FRAGMENT_MODEL: &str =
    "/conf/e-on/settings/dam/cfm/models/e-on-content-fragments-model";

/// Siren class sent when creating a folder.
const FOLDER_CREATE_CLASS: &str = "assetFolder";

const STRING_TYPE: &str = "string";
const HTML_TYPE: &str = "text/html";

/// Target path and request body of a create or update action.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub path: AssetPath,
    pub data: Value,
}

impl Draft {
    /// Action parameters `{path, data}`.
    pub fn to_params(&self) -> Value {
        json!({
            "path": self.path.as_str(),
            "data": self.data,
        })
    }
}

fn named_child(parent: &AssetPath, name: &str) -> Result<AssetPath, BrowseError> {
    if name.is_empty() {
        return Err(BrowseError::InvalidName(name.to_string()));
    }
    Ok(parent.child(name))
}

/// A new folder. The node name is derived from the title.
#[derive(Debug, Clone)]
pub struct FolderDraft {
    pub title: String,
    pub name: String,
}

impl FolderDraft {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let name = slugify_name(&title);
        Self { title, name }
    }

    pub fn into_draft(self, parent: &AssetPath) -> Result<Draft, BrowseError> {
        let path = named_child(parent, &self.name)?;
        Ok(Draft {
            path,
            data: json!({
                "class": FOLDER_CREATE_CLASS,
                "properties": { "title": self.title },
            }),
        })
    }
}

/// A new, empty content fragment based on a model.
#[derive(Debug, Clone)]
pub struct FragmentDraft {
    pub model: String,
    pub title: String,
    pub name: String,
}

impl FragmentDraft {
    pub fn new(model: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        let name = slugify_name(&title);
        Self {
            model: model.into(),
            title,
            name,
        }
    }

    pub fn into_draft(self, parent: &AssetPath) -> Result<Draft, BrowseError> {
        let path = named_child(parent, &self.name)?;
        Ok(Draft {
            path,
            data: json!({
                "properties": {
                    "cq:model": self.model,
                    "title": self.title,
                    "elements": elements("", ""),
                }
            }),
        })
    }
}

/// New title and text of an existing content fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentEdit {
    pub title: String,
    pub text: String,
}

impl FragmentEdit {
    /// Start editing from the fragment's current element values.
    pub fn from_entity(entity: &Entity) -> Self {
        let elements = entity.properties.elements.as_ref();
        let value = |element: Option<&Element>| {
            element
                .and_then(Element::text)
                .map(str::to_string)
                .unwrap_or_default()
        };
        Self {
            title: value(elements.and_then(|e| e.title.as_ref())),
            text: value(elements.and_then(|e| e.text.as_ref())),
        }
    }

    pub fn into_draft(self, parent: &AssetPath, name: &str) -> Result<Draft, BrowseError> {
        let path = named_child(parent, name)?;
        Ok(Draft {
            path,
            data: json!({
                "properties": { "elements": elements(&self.title, &self.text) }
            }),
        })
    }
}

fn elements(title: &str, text: &str) -> Value {
    json!({
        "title": { "value": title, ":type": STRING_TYPE },
        "text": { "value": text, ":type": HTML_TYPE },
    })
}
