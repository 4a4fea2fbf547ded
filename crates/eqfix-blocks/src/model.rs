//! Block and rich-text model.
//!
//! Mirrors the JSON shape of Notion blocks closely enough to round-trip the
//! fields this workspace cares about:
//!
//! ```text
//! { "id": "...", "type": "paragraph", "has_children": false,
//!   "paragraph": { "rich_text": [ ... ], "children": [ ... ] } }
//! ```
//!
//! The "payload key equals the type tag" convention is resolved once, at
//! deserialization time, into [`BlockBody`] variants.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::Error;

/// Type tags of the block kinds that carry rich text.
pub const TEXT_KINDS: [&str; 7] = [
    "paragraph",
    "heading_1",
    "heading_2",
    "heading_3",
    "quote",
    "bulleted_list_item",
    "numbered_list_item",
];

/// Non-text block kinds. These are never inspected for equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    File,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::File => "file",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            "audio" => Some(MediaKind::Audio),
            "file" => Some(MediaKind::File),
            _ => None,
        }
    }
}

/// The typed payload of a block, one variant per text-bearing kind.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockBody {
    Paragraph(TextPayload),
    Heading1(TextPayload),
    Heading2(TextPayload),
    Heading3(TextPayload),
    Quote(TextPayload),
    BulletedListItem(TextPayload),
    NumberedListItem(TextPayload),
    /// Image, video, audio or file block.
    Media(MediaKind),
    /// Any other block type. The tag is kept so the block can be reported.
    Unsupported(String),
}

impl BlockBody {
    /// Build a text-bearing body from its type tag, or `None` if the tag is
    /// not one of the text-bearing kinds.
    pub fn text(tag: &str, payload: TextPayload) -> Option<Self> {
        let body = match tag {
            "paragraph" => BlockBody::Paragraph(payload),
            "heading_1" => BlockBody::Heading1(payload),
            "heading_2" => BlockBody::Heading2(payload),
            "heading_3" => BlockBody::Heading3(payload),
            "quote" => BlockBody::Quote(payload),
            "bulleted_list_item" => BlockBody::BulletedListItem(payload),
            "numbered_list_item" => BlockBody::NumberedListItem(payload),
            _ => return None,
        };
        Some(body)
    }

    /// The wire type tag of this body.
    pub fn tag(&self) -> &str {
        match self {
            BlockBody::Paragraph(_) => "paragraph",
            BlockBody::Heading1(_) => "heading_1",
            BlockBody::Heading2(_) => "heading_2",
            BlockBody::Heading3(_) => "heading_3",
            BlockBody::Quote(_) => "quote",
            BlockBody::BulletedListItem(_) => "bulleted_list_item",
            BlockBody::NumberedListItem(_) => "numbered_list_item",
            BlockBody::Media(kind) => kind.as_str(),
            BlockBody::Unsupported(tag) => tag,
        }
    }

    /// The rich-text payload, for text-bearing kinds only.
    pub fn text_payload(&self) -> Option<&TextPayload> {
        match self {
            BlockBody::Paragraph(p)
            | BlockBody::Heading1(p)
            | BlockBody::Heading2(p)
            | BlockBody::Heading3(p)
            | BlockBody::Quote(p)
            | BlockBody::BulletedListItem(p)
            | BlockBody::NumberedListItem(p) => Some(p),
            BlockBody::Media(_) | BlockBody::Unsupported(_) => None,
        }
    }

    pub fn is_media(&self) -> bool {
        matches!(self, BlockBody::Media(_))
    }
}

/// Payload shared by all text-bearing block kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextPayload {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    /// Nested children, carried through a rewrite untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Value>,
}

impl TextPayload {
    pub fn new(rich_text: Vec<RichText>) -> Self {
        Self {
            rich_text,
            children: None,
        }
    }
}

/// A node in the document tree.
///
/// Blocks are only ever read from listings; writes go through
/// [`BlockUpdate`], so there is no `Serialize` impl.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawBlock")]
pub struct Block {
    pub id: String,
    pub has_children: bool,
    pub body: BlockBody,
}

impl Block {
    pub fn new(id: impl Into<String>, body: BlockBody) -> Self {
        Self {
            id: id.into(),
            has_children: false,
            body,
        }
    }

    pub fn with_children(mut self, has_children: bool) -> Self {
        self.has_children = has_children;
        self
    }

    pub fn kind(&self) -> &str {
        self.body.tag()
    }
}

/// Wire form of a block: the payload lives under a key named by `type`.
#[derive(Deserialize)]
struct RawBlock {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    has_children: bool,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl TryFrom<RawBlock> for Block {
    type Error = Error;

    fn try_from(mut raw: RawBlock) -> Result<Self, Self::Error> {
        let body = if let Some(media) = MediaKind::from_tag(&raw.kind) {
            BlockBody::Media(media)
        } else if TEXT_KINDS.contains(&raw.kind.as_str()) {
            let value = raw.rest.remove(&raw.kind).ok_or_else(|| Error::MissingPayload {
                id: raw.id.clone(),
                kind: raw.kind.clone(),
            })?;
            let payload: TextPayload =
                serde_json::from_value(value).map_err(|source| Error::Payload {
                    kind: raw.kind.clone(),
                    source,
                })?;
            BlockBody::text(&raw.kind, payload)
                .unwrap_or_else(|| BlockBody::Unsupported(raw.kind.clone()))
        } else {
            BlockBody::Unsupported(raw.kind.clone())
        };

        Ok(Block {
            id: raw.id,
            has_children: raw.has_children,
            body,
        })
    }
}

/// Style flags on a text run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: String,
}

impl Default for Annotations {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            strikethrough: false,
            underline: false,
            code: false,
            color: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquationContent {
    pub expression: String,
}

/// One fragment of a block's rich text, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichText {
    Text {
        text: TextContent,
        #[serde(default)]
        annotations: Annotations,
    },
    Equation {
        equation: EquationContent,
    },
    /// Mentions and any other run type. Skipped by extraction.
    #[serde(other)]
    Unsupported,
}

impl RichText {
    /// A text run with every style flag off and the default color.
    pub fn plain(content: impl Into<String>) -> Self {
        RichText::Text {
            text: TextContent {
                content: content.into(),
            },
            annotations: Annotations::default(),
        }
    }

    pub fn equation(expression: impl Into<String>) -> Self {
        RichText::Equation {
            equation: EquationContent {
                expression: expression.into(),
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RichText::Text { text, .. } => Some(&text.content),
            _ => None,
        }
    }

    pub fn as_equation(&self) -> Option<&str> {
        match self {
            RichText::Equation { equation } => Some(&equation.expression),
            _ => None,
        }
    }
}

/// One page of a "list children" response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BlockPage {
    #[serde(default)]
    pub results: Vec<Block>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Full replacement payload for one block.
///
/// Serializes as `{ "type": <kind>, <kind>: { "rich_text": [...], "children": ... } }`.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockUpdate {
    pub kind: String,
    pub payload: TextPayload,
}

impl Serialize for BlockUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", &self.kind)?;
        map.serialize_entry(&self.kind, &self.payload)?;
        map.end()
    }
}
