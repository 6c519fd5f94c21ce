/// Style genome types.
///
/// A [`StyleGenome`] is a complete, self-contained visual theme: a five-role
/// palette, typography and layout preferences. Genomes are immutable once
/// built; breeding and extraction always produce new values.
use crate::common::error::{Error, Result};
use crate::common::style::{LabColor, RGBColor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad thematic category of a genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Business,
    Creative,
    Technology,
    Minimal,
    Education,
    Marketing,
}

/// The fixed, ordered set of palette roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRole {
    Primary,
    Secondary,
    Accent,
    Background,
    Text,
}

impl ColorRole {
    /// All roles in palette order.
    pub const ALL: [ColorRole; 5] = [
        ColorRole::Primary,
        ColorRole::Secondary,
        ColorRole::Accent,
        ColorRole::Background,
        ColorRole::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Accent => "accent",
            Self::Background => "background",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ColorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Five-role color palette. Every role is always populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Palette {
    pub primary: RGBColor,
    pub secondary: RGBColor,
    pub accent: RGBColor,
    pub background: RGBColor,
    pub text: RGBColor,
}

impl Palette {
    /// Color for a role.
    #[inline]
    pub fn get(&self, role: ColorRole) -> RGBColor {
        match role {
            ColorRole::Primary => self.primary,
            ColorRole::Secondary => self.secondary,
            ColorRole::Accent => self.accent,
            ColorRole::Background => self.background,
            ColorRole::Text => self.text,
        }
    }

    /// Build a palette by evaluating `f` for each role in order.
    pub fn from_fn(mut f: impl FnMut(ColorRole) -> RGBColor) -> Self {
        Self {
            primary: f(ColorRole::Primary),
            secondary: f(ColorRole::Secondary),
            accent: f(ColorRole::Accent),
            background: f(ColorRole::Background),
            text: f(ColorRole::Text),
        }
    }

    /// Iterate `(role, color)` pairs in palette order.
    pub fn iter(&self) -> impl Iterator<Item = (ColorRole, RGBColor)> + '_ {
        ColorRole::ALL.into_iter().map(|role| (role, self.get(role)))
    }

    /// Sum of per-role CIE76 distances in Lab space.
    pub fn distance(&self, other: &Palette) -> f64 {
        ColorRole::ALL
            .iter()
            .map(|&role| {
                LabColor::from_rgb(self.get(role)).delta_e(&LabColor::from_rgb(other.get(role)))
            })
            .sum()
    }
}

/// Typography parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typography {
    pub heading_font: String,
    pub body_font: String,
    /// Multiplier applied to every base font size; always > 0
    pub scale: f64,
}

/// Corner treatment of filled shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerRadius {
    Square,
    Soft,
    Rounded,
    Pill,
}

impl CornerRadius {
    /// `adj` guide value for the DrawingML `roundRect` preset
    /// (fraction of the shorter side × 100000), or `None` for a plain rectangle.
    pub fn round_rect_adj(&self) -> Option<u32> {
        match self {
            Self::Square => None,
            Self::Soft => Some(6_000),
            Self::Rounded => Some(16_667),
            Self::Pill => Some(50_000),
        }
    }
}

/// Decorative element repeated on every slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motif {
    None,
    AccentBar,
    Underline,
    CornerBlock,
    Circles,
}

/// Layout preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPrefs {
    /// Multiplier of the base slide margin; always > 0
    pub spacing_unit: f64,
    pub corner_radius: CornerRadius,
    pub motif: Motif,
}

/// Where a genome came from. Recorded for traceability only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    #[default]
    Builtin,
    Bred {
        parent_a: String,
        parent_b: String,
        ratio: f64,
    },
    Extracted,
}

/// A complete, immutable visual theme.
///
/// Construct through [`StyleGenome::builder`]. Equality compares the visual
/// definition only (category, palette, typography, layout preferences); the
/// id, display name and provenance are labels and do not take part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GenomeRecord")]
pub struct StyleGenome {
    id: String,
    name: String,
    category: Category,
    palette: Palette,
    typography: Typography,
    layout_prefs: LayoutPrefs,
    provenance: Provenance,
}

impl StyleGenome {
    pub fn builder() -> StyleGenomeBuilder {
        StyleGenomeBuilder::default()
    }

    /// Assemble from parts that already satisfy every invariant (derived
    /// from valid genomes).
    pub(crate) fn assemble(
        id: String,
        name: String,
        category: Category,
        palette: Palette,
        typography: Typography,
        layout_prefs: LayoutPrefs,
        provenance: Provenance,
    ) -> Self {
        Self {
            id,
            name,
            category,
            palette,
            typography,
            layout_prefs,
            provenance,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.category
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    pub fn color(&self, role: ColorRole) -> RGBColor {
        self.palette.get(role)
    }

    #[inline]
    pub fn typography(&self) -> &Typography {
        &self.typography
    }

    #[inline]
    pub fn layout_prefs(&self) -> &LayoutPrefs {
        &self.layout_prefs
    }

    #[inline]
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Serialize to YAML (the same shape the builtin presets use).
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self)
            .map_err(|e| Error::Validation(format!("failed to serialize genome: {}", e)))
    }
}

impl PartialEq for StyleGenome {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category
            && self.palette == other.palette
            && self.typography == other.typography
            && self.layout_prefs == other.layout_prefs
    }
}

/// Collects genome attributes and validates them on [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct StyleGenomeBuilder {
    id: Option<String>,
    name: Option<String>,
    category: Option<Category>,
    colors: [Option<RGBColor>; 5],
    heading_font: Option<String>,
    body_font: Option<String>,
    scale: Option<f64>,
    spacing_unit: Option<f64>,
    corner_radius: Option<CornerRadius>,
    motif: Option<Motif>,
    provenance: Provenance,
}

impl StyleGenomeBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn color(mut self, role: ColorRole, color: RGBColor) -> Self {
        self.colors[role as usize] = Some(color);
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        for (role, color) in palette.iter() {
            self.colors[role as usize] = Some(color);
        }
        self
    }

    pub fn fonts(mut self, heading: impl Into<String>, body: impl Into<String>) -> Self {
        self.heading_font = Some(heading.into());
        self.body_font = Some(body.into());
        self
    }

    pub fn typography(mut self, typography: Typography) -> Self {
        self.heading_font = Some(typography.heading_font);
        self.body_font = Some(typography.body_font);
        self.scale = Some(typography.scale);
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn spacing_unit(mut self, spacing_unit: f64) -> Self {
        self.spacing_unit = Some(spacing_unit);
        self
    }

    pub fn corner_radius(mut self, corner_radius: CornerRadius) -> Self {
        self.corner_radius = Some(corner_radius);
        self
    }

    pub fn motif(mut self, motif: Motif) -> Self {
        self.motif = Some(motif);
        self
    }

    pub fn layout_prefs(self, prefs: LayoutPrefs) -> Self {
        self.spacing_unit(prefs.spacing_unit)
            .corner_radius(prefs.corner_radius)
            .motif(prefs.motif)
    }

    pub fn provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Validate and produce the genome.
    ///
    /// Fails when any palette role is unset, a font family is blank, or a
    /// scalar is not a positive finite number.
    pub fn build(self) -> Result<StyleGenome> {
        let id = required(self.id, "id")?;
        if id.trim().is_empty() {
            return Err(Error::Validation("genome id must not be blank".into()));
        }
        let name = self.name.unwrap_or_else(|| id.clone());

        let mut colors = [RGBColor::BLACK; 5];
        for role in ColorRole::ALL {
            colors[role as usize] = self.colors[role as usize].ok_or_else(|| {
                Error::Validation(format!("genome '{}' is missing palette role '{}'", id, role))
            })?;
        }
        let palette = Palette::from_fn(|role| colors[role as usize]);

        let heading_font = required(self.heading_font, "heading font")?;
        let body_font = required(self.body_font, "body font")?;
        if heading_font.trim().is_empty() || body_font.trim().is_empty() {
            return Err(Error::Validation(format!(
                "genome '{}' has a blank font family",
                id
            )));
        }

        let scale = positive(self.scale.unwrap_or(1.0), "scale")?;
        let spacing_unit = positive(self.spacing_unit.unwrap_or(1.0), "spacing unit")?;

        Ok(StyleGenome {
            id,
            name,
            category: self.category.unwrap_or(Category::Business),
            palette,
            typography: Typography {
                heading_font,
                body_font,
                scale,
            },
            layout_prefs: LayoutPrefs {
                spacing_unit,
                corner_radius: self.corner_radius.unwrap_or(CornerRadius::Soft),
                motif: self.motif.unwrap_or(Motif::None),
            },
            provenance: self.provenance,
        })
    }
}

fn required<T>(value: Option<T>, what: &str) -> Result<T> {
    value.ok_or_else(|| Error::Validation(format!("genome {} is required", what)))
}

fn positive(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::Validation(format!(
            "genome {} must be a positive number, got {}",
            what, value
        )))
    }
}

/// Serialized form of a genome; validated through the builder on load.
#[derive(Deserialize)]
struct GenomeRecord {
    id: String,
    #[serde(default)]
    name: Option<String>,
    category: Category,
    palette: Palette,
    typography: Typography,
    layout_prefs: LayoutPrefs,
    #[serde(default)]
    provenance: Provenance,
}

impl TryFrom<GenomeRecord> for StyleGenome {
    type Error = Error;

    fn try_from(record: GenomeRecord) -> Result<Self> {
        let mut builder = StyleGenome::builder()
            .id(record.id)
            .category(record.category)
            .palette(record.palette)
            .typography(record.typography)
            .layout_prefs(record.layout_prefs)
            .provenance(record.provenance);
        if let Some(name) = record.name {
            builder = builder.name(name);
        }
        builder.build()
    }
}
