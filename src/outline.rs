//! Content outline: the input contract for deck generation.
//!
//! Outlines arrive as JSON from an external text-generation service. Parsing
//! is lenient about shape (bare strings for bullets, unknown layout names)
//! and strict about structure (a slide list must be present).

use crate::common::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Maximum bullet indentation level.
pub const MAX_LEVEL: u8 = 4;

/// A whole deck outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub slides: Vec<OutlineSlide>,
}

/// One slide of an outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineSlide {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "bodyBlocks", alias = "body_text")]
    pub body_blocks: Vec<ContentBlock>,
    #[serde(
        default,
        alias = "speaker_notes",
        alias = "speakerNotes",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty"
    )]
    pub notes: Option<String>,
    #[serde(default, alias = "contentShape", alias = "layout_type")]
    pub content_shape: ContentShape,
}

impl OutlineSlide {
    pub fn new(title: impl Into<String>, content_shape: ContentShape) -> Self {
        Self {
            title: title.into(),
            body_blocks: Vec::new(),
            notes: None,
            content_shape,
        }
    }

    pub fn with_blocks<I, B>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<ContentBlock>,
    {
        self.body_blocks.extend(blocks.into_iter().map(Into::into));
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// True when the slide carries no visible text at all.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.body_blocks.iter().all(|b| b.text.trim().is_empty())
    }
}

/// Requested arrangement of a slide's content.
///
/// Unrecognized names deserialize to [`ContentShape::Unknown`] and are laid
/// out with the generic single-column template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentShape {
    #[serde(alias = "title-only", alias = "section_header")]
    TitleOnly,
    #[default]
    #[serde(alias = "title_content")]
    Bullets,
    #[serde(alias = "image-and-text", alias = "visual_heavy")]
    ImageAndText,
    #[serde(alias = "two-column", alias = "comparison")]
    TwoColumn,
    #[serde(other)]
    Unknown,
}

/// How a block of body text is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    #[default]
    Bullet,
    Paragraph,
}

/// A unit of body text.
///
/// Deserializes from a bare string (a top-level bullet) or from
/// `{ "text": ..., "kind": "bullet" | "paragraph", "level": 0..=4 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BlockRepr")]
pub struct ContentBlock {
    pub text: String,
    pub kind: BlockKind,
    pub level: u8,
}

impl ContentBlock {
    pub fn bullet(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: BlockKind::Bullet,
            level: 0,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: BlockKind::Paragraph,
            level: 0,
        }
    }

    /// Set the indentation level, clamped to [`MAX_LEVEL`].
    pub fn at_level(mut self, level: u8) -> Self {
        self.level = level.min(MAX_LEVEL);
        self
    }
}

impl From<&str> for ContentBlock {
    fn from(text: &str) -> Self {
        ContentBlock::bullet(text)
    }
}

impl From<String> for ContentBlock {
    fn from(text: String) -> Self {
        ContentBlock::bullet(text)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BlockRepr {
    Text(String),
    Full {
        text: String,
        #[serde(default)]
        kind: BlockKind,
        #[serde(default)]
        level: u8,
    },
}

impl From<BlockRepr> for ContentBlock {
    fn from(repr: BlockRepr) -> Self {
        match repr {
            BlockRepr::Text(text) => ContentBlock::bullet(text),
            BlockRepr::Full { text, kind, level } => ContentBlock {
                text,
                kind,
                level: level.min(MAX_LEVEL),
            },
        }
    }
}

fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

impl Outline {
    pub fn new(slides: Vec<OutlineSlide>) -> Self {
        Self {
            title: None,
            slides,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Parse an outline from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_slice(json: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject outlines that cannot produce a deck.
    pub fn validate(&self, max_slides: usize) -> Result<()> {
        if self.slides.is_empty() {
            return Err(Error::Validation("outline has no slides".to_string()));
        }
        if self.slides.len() > max_slides {
            return Err(Error::Validation(format!(
                "outline has {} slides, the limit is {}",
                self.slides.len(),
                max_slides
            )));
        }
        Ok(())
    }

    /// Deck title: the explicit title, else the first slide's title.
    pub fn deck_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or_else(|| self.slides.first().map(|s| s.title.as_str()))
            .filter(|t| !t.trim().is_empty())
    }
}
