//! Siren documents returned by the Assets API.
//!
//! Only the fields the console relies on are typed. Everything else is kept
//! in `extra` maps so nothing is lost when an entity is re-serialized.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Siren class of folder entities.
pub const FOLDER_CLASS: &str = "assets/folder";

/// Link relation of an entity's thumbnail rendition.
pub const THUMBNAIL_REL: &str = "thumbnail";

/// A page of a folder listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityPage {
    #[serde(default)]
    pub properties: Option<PageProperties>,

    #[serde(default)]
    pub entities: Vec<Entity>,

    #[serde(default)]
    pub links: Vec<Link>,
}

impl EntityPage {
    /// Total number of children reported by the upstream, if present.
    pub fn total(&self) -> Option<u64> {
        self.properties
            .as_ref()
            .and_then(|p| p.paging.as_ref())
            .map(|p| p.total)
    }
}

/// Folder-level properties of a listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageProperties {
    #[serde(rename = "srn:paging", default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Paging window reported by the upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub offset: u64,

    #[serde(default)]
    pub limit: u64,

    #[serde(default)]
    pub total: u64,
}

/// A child node in the asset tree: folder, file or content fragment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub class: Vec<String>,

    #[serde(default)]
    pub properties: EntityProperties,

    #[serde(default)]
    pub links: Vec<Link>,
}

impl Entity {
    /// Whether the entity is a folder.
    pub fn is_folder(&self) -> bool {
        self.class.first().map(String::as_str) == Some(FOLDER_CLASS)
    }

    /// Whether the entity is a content fragment.
    pub fn is_content_fragment(&self) -> bool {
        self.properties.content_fragment
    }

    /// Display label: title when it has text, name otherwise.
    pub fn label(&self) -> &str {
        self.properties
            .title
            .as_ref()
            .and_then(first_text)
            .unwrap_or(&self.properties.name)
    }

    /// Short kind shown under a card.
    pub fn kind(&self) -> &'static str {
        if self.is_folder() {
            "folder"
        } else {
            "file"
        }
    }

    /// The thumbnail rendition link, matched on the first relation.
    pub fn thumbnail_link(&self) -> Option<&Link> {
        find_thumbnail(&self.links)
    }

    /// The entity's own link (first link of the entity).
    pub fn self_link(&self) -> Option<&Link> {
        self.links.first()
    }
}

/// Properties of a single entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityProperties {
    #[serde(default)]
    pub name: String,

    /// Usually a string, but multi-valued metadata arrives as an array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,

    #[serde(rename = "contentFragment", default)]
    pub content_fragment: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Elements>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Content fragment elements edited by the console.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Elements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Element>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Element>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single typed content fragment element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Element {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(rename = ":type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Element {
    /// Text of the element. Multi-value elements yield their first string.
    pub fn text(&self) -> Option<&str> {
        self.value.as_ref().and_then(first_text)
    }
}

/// Links of an entity, without its properties.
///
/// Enough to locate renditions of assets whose properties do not match
/// [`EntityProperties`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityLinks {
    #[serde(default)]
    pub links: Vec<Link>,
}

impl EntityLinks {
    pub fn thumbnail_link(&self) -> Option<&Link> {
        find_thumbnail(&self.links)
    }
}

/// The thumbnail rendition link, matched on the first relation.
fn find_thumbnail(links: &[Link]) -> Option<&Link> {
    links
        .iter()
        .find(|link| link.rel.first().map(String::as_str) == Some(THUMBNAIL_REL))
}

/// A string value, or the first string of an array.
fn first_text(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Array(items) => items.iter().find_map(Value::as_str),
        _ => None,
    }
}

/// A Siren link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub rel: Vec<String>,

    #[serde(default)]
    pub href: String,
}

/// A downloaded thumbnail rendition.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Bytes,
    pub mime_type: &'static str,
}

impl Thumbnail {
    /// Wrap rendition bytes, sniffing the image type.
    ///
    /// Unrecognized data is reported as PNG.
    pub fn from_bytes(data: Bytes) -> Self {
        let mime_type = image::guess_format(&data)
            .map(|format| format.to_mime_type())
            .unwrap_or("image/png");
        Self { data, mime_type }
    }
}
