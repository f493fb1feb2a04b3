//! Document model for content blocks.
//!
//! [`BlockKind::from_payload`] is the only place where source type tags are
//! mapped onto block variants. Adding a block type means adding a variant
//! and an arm here, and a render arm in the registry.

use std::ops::{BitAnd, BitOr};

use serde_json::Value;

/// Widest table kept; wider `table_width` values are clamped.
pub const MAX_TABLE_COLUMNS: usize = 256;

/// Text formatting flags of a rich text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Annotations(u8);

impl Annotations {
    pub const BOLD: Self = Self(1);
    pub const ITALIC: Self = Self(1 << 1);
    pub const STRIKETHROUGH: Self = Self(1 << 2);
    pub const UNDERLINE: Self = Self(1 << 3);
    pub const CODE: Self = Self(1 << 4);

    /// No formatting.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every flag of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set or clear the flags of `other`.
    #[must_use]
    pub const fn set(self, other: Self, on: bool) -> Self {
        if on {
            Self(self.0 | other.0)
        } else {
            Self(self.0 & !other.0)
        }
    }

    /// Decode from a wire `annotations` object. Missing flags are false.
    fn from_wire(value: Option<&Value>) -> Self {
        let flag = |name: &str| {
            value
                .and_then(|v| v.get(name))
                .and_then(Value::as_bool)
                .unwrap_or(false)
        };
        Self::empty()
            .set(Self::BOLD, flag("bold"))
            .set(Self::ITALIC, flag("italic"))
            .set(Self::STRIKETHROUGH, flag("strikethrough"))
            .set(Self::UNDERLINE, flag("underline"))
            .set(Self::CODE, flag("code"))
    }
}

impl BitOr for Annotations {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for Annotations {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Text or background colour of a span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "snake_case")
)]
pub enum Color {
    #[default]
    Default,
    Gray,
    Brown,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Red,
    GrayBackground,
    BrownBackground,
    OrangeBackground,
    YellowBackground,
    GreenBackground,
    BlueBackground,
    PurpleBackground,
    PinkBackground,
    RedBackground,
}

impl Color {
    /// Parse a source colour tag. Unknown tags map to [`Color::Default`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "gray" => Self::Gray,
            "brown" => Self::Brown,
            "orange" => Self::Orange,
            "yellow" => Self::Yellow,
            "green" => Self::Green,
            "blue" => Self::Blue,
            "purple" => Self::Purple,
            "pink" => Self::Pink,
            "red" => Self::Red,
            "gray_background" => Self::GrayBackground,
            "brown_background" => Self::BrownBackground,
            "orange_background" => Self::OrangeBackground,
            "yellow_background" => Self::YellowBackground,
            "green_background" => Self::GreenBackground,
            "blue_background" => Self::BlueBackground,
            "purple_background" => Self::PurpleBackground,
            "pink_background" => Self::PinkBackground,
            "red_background" => Self::RedBackground,
            _ => Self::Default,
        }
    }

    /// Source colour tag.
    #[must_use]
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Gray => "gray",
            Self::Brown => "brown",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Pink => "pink",
            Self::Red => "red",
            Self::GrayBackground => "gray_background",
            Self::BrownBackground => "brown_background",
            Self::OrangeBackground => "orange_background",
            Self::YellowBackground => "yellow_background",
            Self::GreenBackground => "green_background",
            Self::BlueBackground => "blue_background",
            Self::PurpleBackground => "purple_background",
            Self::PinkBackground => "pink_background",
            Self::RedBackground => "red_background",
        }
    }
}

/// A run of text with uniform formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RichTextSpan {
    pub text: String,
    pub annotations: Annotations,
    pub color: Color,
    pub link: Option<String>,
}

impl RichTextSpan {
    /// Unformatted span.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Decode one wire rich text object.
    ///
    /// Text comes from `plain_text`, falling back to `text.content`; the link
    /// from `href`, falling back to `text.link.url`.
    #[must_use]
    pub fn from_wire(value: &Value) -> Self {
        let text = value
            .get("plain_text")
            .or_else(|| value.pointer("/text/content"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let link = value
            .get("href")
            .and_then(Value::as_str)
            .or_else(|| value.pointer("/text/link/url").and_then(Value::as_str))
            .map(str::to_owned);
        let annotations = value.get("annotations");
        let color = annotations
            .and_then(|a| a.get("color"))
            .and_then(Value::as_str)
            .map_or(Color::Default, Color::from_tag);

        Self {
            text,
            annotations: Annotations::from_wire(annotations),
            color,
            link,
        }
    }
}

/// Decode a wire rich text array. Anything that is not an array is empty.
#[must_use]
pub fn spans_from_wire(value: Option<&Value>) -> Vec<RichTextSpan> {
    value
        .and_then(Value::as_array)
        .map(|spans| spans.iter().map(RichTextSpan::from_wire).collect())
        .unwrap_or_default()
}

/// A known block type whose payload could not be decoded.
#[derive(Debug, thiserror::Error)]
#[error("invalid {tag} payload: {reason}")]
pub struct DecodeError {
    /// Source type tag.
    pub tag: String,
    /// What was wrong.
    pub reason: String,
}

impl DecodeError {
    fn new(tag: &str, reason: impl Into<String>) -> Self {
        Self {
            tag: tag.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Type-specific content of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum BlockKind {
    Paragraph {
        rich_text: Vec<RichTextSpan>,
    },
    Heading1 {
        rich_text: Vec<RichTextSpan>,
    },
    Heading2 {
        rich_text: Vec<RichTextSpan>,
    },
    Heading3 {
        rich_text: Vec<RichTextSpan>,
    },
    BulletedListItem {
        rich_text: Vec<RichTextSpan>,
    },
    NumberedListItem {
        rich_text: Vec<RichTextSpan>,
    },
    ToDo {
        rich_text: Vec<RichTextSpan>,
        checked: bool,
    },
    Quote {
        rich_text: Vec<RichTextSpan>,
    },
    Code {
        language: String,
        rich_text: Vec<RichTextSpan>,
        caption: Vec<RichTextSpan>,
    },
    Image {
        url: String,
        caption: Vec<RichTextSpan>,
    },
    Divider,
    Table {
        column_count: usize,
        has_column_header: bool,
        has_row_header: bool,
    },
    TableRow {
        cells: Vec<Vec<RichTextSpan>>,
    },
    /// Any type this model does not know. Never fails to render.
    Unsupported {
        tag: String,
    },
}

impl BlockKind {
    /// Map a source type tag and its payload onto a variant.
    ///
    /// Unknown tags yield [`BlockKind::Unsupported`]. A known tag with a
    /// missing or malformed payload is an error.
    pub fn from_payload(tag: &str, payload: Option<&Value>) -> Result<Self, DecodeError> {
        let Some(payload) = payload.filter(|p| p.is_object()) else {
            return match tag {
                "divider" => Ok(Self::Divider),
                _ if is_known_tag(tag) => Err(DecodeError::new(tag, "payload missing")),
                _ => Ok(Self::unsupported(tag)),
            };
        };
        let rich_text = || spans_from_wire(payload.get("rich_text"));

        let kind = match tag {
            "paragraph" => Self::Paragraph {
                rich_text: rich_text(),
            },
            "heading_1" => Self::Heading1 {
                rich_text: rich_text(),
            },
            "heading_2" => Self::Heading2 {
                rich_text: rich_text(),
            },
            "heading_3" => Self::Heading3 {
                rich_text: rich_text(),
            },
            "bulleted_list_item" => Self::BulletedListItem {
                rich_text: rich_text(),
            },
            "numbered_list_item" => Self::NumberedListItem {
                rich_text: rich_text(),
            },
            "to_do" => Self::ToDo {
                rich_text: rich_text(),
                checked: payload
                    .get("checked")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            "quote" => Self::Quote {
                rich_text: rich_text(),
            },
            "code" => Self::Code {
                language: payload
                    .get("language")
                    .and_then(Value::as_str)
                    .unwrap_or("plain text")
                    .to_owned(),
                rich_text: rich_text(),
                caption: spans_from_wire(payload.get("caption")),
            },
            "image" => Self::Image {
                url: payload
                    .pointer("/external/url")
                    .or_else(|| payload.pointer("/file/url"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| DecodeError::new(tag, "no external or file url"))?
                    .to_owned(),
                caption: spans_from_wire(payload.get("caption")),
            },
            "divider" => Self::Divider,
            "table" => Self::Table {
                column_count: payload
                    .get("table_width")
                    .and_then(Value::as_u64)
                    .map(|width| {
                        usize::try_from(width)
                            .unwrap_or(usize::MAX)
                            .min(MAX_TABLE_COLUMNS)
                    })
                    .ok_or_else(|| DecodeError::new(tag, "table_width missing"))?,
                has_column_header: payload
                    .get("has_column_header")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                has_row_header: payload
                    .get("has_row_header")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            "table_row" => Self::TableRow {
                cells: payload
                    .get("cells")
                    .and_then(Value::as_array)
                    .ok_or_else(|| DecodeError::new(tag, "cells missing"))?
                    .iter()
                    .map(|cell| spans_from_wire(Some(cell)))
                    .collect(),
            },
            _ => Self::unsupported(tag),
        };
        Ok(kind)
    }

    /// Catch-all variant for `tag`.
    #[must_use]
    pub fn unsupported(tag: &str) -> Self {
        Self::Unsupported {
            tag: tag.to_owned(),
        }
    }
}

fn is_known_tag(tag: &str) -> bool {
    matches!(
        tag,
        "paragraph"
            | "heading_1"
            | "heading_2"
            | "heading_3"
            | "bulleted_list_item"
            | "numbered_list_item"
            | "to_do"
            | "quote"
            | "code"
            | "image"
            | "table"
            | "table_row"
    )
}

/// A content block with its nested children.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Block {
    pub id: String,
    pub has_children: bool,
    pub children: Vec<Block>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: BlockKind,
}

impl Block {
    /// Block without children.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            has_children: false,
            children: Vec::new(),
            kind,
        }
    }

    /// Attach nested children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.has_children = self.has_children || !children.is_empty();
        self.children = children;
        self
    }

    /// Number of rows of a table block (0 for anything else).
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self.kind {
            BlockKind::Table { .. } => self
                .children
                .iter()
                .filter(|child| matches!(child.kind, BlockKind::TableRow { .. }))
                .count(),
            _ => 0,
        }
    }
}
