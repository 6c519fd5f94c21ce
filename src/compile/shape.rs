//! Compiled slide object trees.
//!
//! These are the low-level objects the package writer serializes: text
//! shapes made of paragraphs and runs, pictures bound to image assets, and
//! filled decorations. Geometry stays in relative slide units until the
//! writer maps it onto EMUs.

use crate::common::error::Warning;
use crate::common::style::RGBColor;
use crate::layout::{BBox, LayoutTemplate, PlaceholderRole};
use crate::style::Palette;
use serde::Serialize;

/// A run of uniformly formatted text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub font: String,
    /// Size in 1/100 pt
    pub size: u32,
    pub color: RGBColor,
    pub bold: bool,
}

/// One paragraph of a text shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    pub bullet: bool,
    pub level: u8,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }
}

/// Preset geometry of a filled shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Geometry {
    Rect,
    /// `roundRect` with its `adj` guide value
    RoundRect(u32),
    Ellipse,
}

impl Geometry {
    /// DrawingML `prstGeom` name.
    pub fn preset(&self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::RoundRect(_) => "roundRect",
            Self::Ellipse => "ellipse",
        }
    }
}

/// A shape on a compiled slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompiledShape {
    Text {
        role: PlaceholderRole,
        bbox: BBox,
        paragraphs: Vec<Paragraph>,
    },
    Picture {
        role: PlaceholderRole,
        bbox: BBox,
        asset_id: String,
    },
    /// A filled shape: a stand-in for missing content (with the role it
    /// replaces) or a motif element (no role).
    Decoration {
        role: Option<PlaceholderRole>,
        bbox: BBox,
        fill: RGBColor,
        geometry: Geometry,
    },
}

impl CompiledShape {
    pub fn bbox(&self) -> BBox {
        match self {
            Self::Text { bbox, .. } | Self::Picture { bbox, .. } | Self::Decoration { bbox, .. } => {
                *bbox
            },
        }
    }

    pub fn role(&self) -> Option<PlaceholderRole> {
        match self {
            Self::Text { role, .. } | Self::Picture { role, .. } => Some(*role),
            Self::Decoration { role, .. } => *role,
        }
    }

    /// Carries content: text, a picture, or a decoration standing in for a
    /// placeholder.
    pub fn is_filled_placeholder(&self) -> bool {
        match self {
            Self::Text { paragraphs, .. } => paragraphs.iter().any(|p| !p.is_empty()),
            Self::Picture { .. } => true,
            Self::Decoration { role, .. } => role.is_some(),
        }
    }
}

/// One compiled slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledSlide {
    /// Zero-based position in the deck
    pub index: usize,
    pub layout: LayoutTemplate,
    pub shapes: Vec<CompiledShape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CompiledSlide {
    pub fn text_shapes(&self) -> impl Iterator<Item = (&PlaceholderRole, &[Paragraph])> {
        self.shapes.iter().filter_map(|shape| match shape {
            CompiledShape::Text {
                role, paragraphs, ..
            } => Some((role, paragraphs.as_slice())),
            _ => None,
        })
    }

    pub fn asset_ids(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|shape| match shape {
            CompiledShape::Picture { asset_id, .. } => Some(asset_id.as_str()),
            _ => None,
        })
    }
}

/// Deck-wide appearance written once on the slide master and theme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterTheme {
    pub name: String,
    pub palette: Palette,
    pub heading_font: String,
    pub body_font: String,
    /// Default title size in 1/100 pt
    pub title_size: u32,
    /// Default body size in 1/100 pt
    pub body_size: u32,
}

impl MasterTheme {
    #[inline]
    pub fn background(&self) -> RGBColor {
        self.palette.background
    }
}

/// A fully compiled deck, ready for packaging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledDeck {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub style_id: String,
    /// `(cx, cy)` in EMUs
    pub slide_size: (i64, i64),
    pub master: MasterTheme,
    pub slides: Vec<CompiledSlide>,
    pub warnings: Vec<Warning>,
}

impl CompiledDeck {
    #[inline]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn has_notes(&self) -> bool {
        self.slides.iter().any(|s| s.notes.is_some())
    }
}
