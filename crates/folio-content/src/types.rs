//! Content API wire types.
//!
//! Decoding is deliberately lenient: every field has a default and unknown
//! fields are kept, so a single odd node never fails a whole batch. Deciding
//! whether a node is usable is left to the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// One page of a node's children.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChildrenPage {
    /// Child nodes in source order.
    #[serde(default)]
    pub results: Vec<RawNode>,
    /// Whether more children follow this page.
    #[serde(default)]
    pub has_more: bool,
    /// Cursor to request the next page with.
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A child node as returned by the children endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawNode {
    /// Source-assigned identifier.
    #[serde(default)]
    pub id: String,
    /// Resource kind (`"block"` or `"page"`).
    #[serde(default)]
    pub object: String,
    /// Type tag (e.g. `"paragraph"`, `"child_page"`).
    #[serde(rename = "type", default)]
    pub node_type: String,
    /// Whether the node has children of its own.
    #[serde(default)]
    pub has_children: bool,
    /// Remaining fields, including the type-specific payload keyed by the type tag.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RawNode {
    /// Create a block node with its type-specific payload.
    #[must_use]
    pub fn block(id: impl Into<String>, node_type: impl Into<String>, payload: Value) -> Self {
        let node_type = node_type.into();
        let mut fields = Map::new();
        fields.insert(node_type.clone(), payload);
        Self {
            id: id.into(),
            object: "block".to_owned(),
            node_type,
            has_children: false,
            fields,
        }
    }

    /// Create a child page reference.
    #[must_use]
    pub fn child_page(id: impl Into<String>, title: impl Into<String>) -> Self {
        let title: String = title.into();
        Self::block(id, "child_page", json!({ "title": title })).with_children(true)
    }

    /// Set the `has_children` flag.
    #[must_use]
    pub fn with_children(mut self, has_children: bool) -> Self {
        self.has_children = has_children;
        self
    }

    /// True if the node stands for a page rather than a content block.
    pub fn is_page(&self) -> bool {
        self.object == "page" || self.node_type == "child_page"
    }

    /// Type-specific payload, stored under the type tag.
    pub fn payload(&self) -> Option<&Value> {
        self.fields.get(&self.node_type)
    }

    /// Title embedded in a `child_page` payload.
    pub fn child_page_title(&self) -> Option<&str> {
        self.fields
            .get("child_page")
            .and_then(|info| info.get("title"))
            .and_then(Value::as_str)
            .filter(|title| !title.trim().is_empty())
    }

    /// Names of required fields this node is missing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.id.is_empty() {
            missing.push("id");
        }
        if self.node_type.is_empty() && !self.is_page() {
            missing.push("type");
        }
        missing
    }
}

/// Child page summary embedded in a `child_page` block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ChildPageInfo {
    /// Page title.
    #[serde(default)]
    pub title: String,
}

/// Page metadata as returned by the "get node" endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawPage {
    /// Page ID.
    #[serde(default)]
    pub id: String,
    /// Page properties keyed by property name.
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// Present when the node was fetched through a `child_page` block.
    #[serde(default)]
    pub child_page: Option<ChildPageInfo>,
}

impl RawPage {
    /// Create page metadata without properties.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Add a `title` property.
    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.properties.insert(
            "title".to_owned(),
            json!({ "type": "title", "title": [text_span(title)] }),
        );
        self
    }

    /// Add a `rich_text` property.
    #[must_use]
    pub fn with_text_property(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(
            name.to_owned(),
            json!({ "type": "rich_text", "rich_text": [text_span(value)] }),
        );
        self
    }

    /// Page title: the property of type `title`, falling back to the
    /// embedded `child_page` title.
    pub fn title(&self) -> Option<String> {
        self.properties
            .values()
            .find(|prop| prop.get("type").and_then(Value::as_str) == Some("title"))
            .map(property_text)
            .or_else(|| self.child_page.as_ref().map(|info| info.title.clone()))
            .filter(|title| !title.trim().is_empty())
    }

    /// Plain-text value of a named property.
    ///
    /// Understands `title`, `rich_text`, `url` and string `formula` properties.
    pub fn text_property(&self, name: &str) -> Option<String> {
        self.properties
            .get(name)
            .map(property_text)
            .filter(|text| !text.trim().is_empty())
    }
}

/// Extract plain text from a property value.
fn property_text(prop: &Value) -> String {
    match prop.get("type").and_then(Value::as_str) {
        Some(kind @ ("title" | "rich_text")) => prop.get(kind).map(plain_text).unwrap_or_default(),
        Some("url") => prop
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        Some("formula") => prop
            .pointer("/formula/string")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        _ => String::new(),
    }
}

/// Concatenate the plain text of a rich text array.
pub fn plain_text(spans: &Value) -> String {
    spans
        .as_array()
        .map(|spans| {
            spans
                .iter()
                .filter_map(|span| {
                    span.get("plain_text")
                        .or_else(|| span.pointer("/text/content"))
                        .and_then(Value::as_str)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Build a plain rich text span.
pub fn text_span(text: &str) -> Value {
    json!({
        "type": "text",
        "text": { "content": text, "link": null },
        "plain_text": text,
        "href": null,
    })
}
