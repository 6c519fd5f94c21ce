//! Style extraction from an existing presentation.
//!
//! The extractor reads a `.pptx`, tallies the colors, fonts, sizes and
//! geometry it observes (weighted by area or character count) and turns the
//! strongest signals into a [`StyleGenome`]. Tallies keep insertion order, so
//! the same bytes always give the same genome.

use super::genome::{
    Category, CornerRadius, LayoutPrefs, Motif, Palette, Provenance, StyleGenome, Typography,
};
use super::presets::PresetRegistry;
use super::tally::WeightedTally;
use crate::common::error::{Error, Result};
use crate::common::style::{LabColor, RGBColor};
use crate::compile::contrast::readable_on;
use crate::ooxml::pptx::reader::{ColorRef, FontRef, PresentationReader, SlideContent, Theme};
use phf::phf_set;

/// Colors too common to characterize a theme; never chosen as primary
/// while another candidate exists.
static NEUTRALS: phf::Set<&'static str> = phf_set! {
    "FFFFFF",
    "000000",
    "F0F0F0",
    "333333",
};

/// Runs at or above this size (1/100 pt) count as heading text.
const HEADING_SIZE: u32 = 2_400;
/// Shape fills covering at least this share of the slide are surfaces.
const SURFACE_SHARE: f64 = 0.25;
/// Body size that maps to a scale factor of 1.0, in points.
const REFERENCE_BODY_PT: f64 = 18.0;
const BASE_MARGIN: f64 = 0.05;
const FALLBACK_FONT: &str = "Calibri";

fn is_neutral(color: &RGBColor) -> bool {
    NEUTRALS.contains(color.to_hex().as_str())
}

/// Derives a genome from reference-deck bytes.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceStyleExtractor<'r> {
    registry: &'r PresetRegistry,
}

impl Default for ReferenceStyleExtractor<'static> {
    fn default() -> Self {
        Self::new(PresetRegistry::builtin())
    }
}

impl<'r> ReferenceStyleExtractor<'r> {
    /// The registry supplies the category of the extracted genome (that of
    /// the nearest preset).
    pub fn new(registry: &'r PresetRegistry) -> Self {
        Self { registry }
    }

    /// Extract a genome from `.pptx` bytes.
    ///
    /// Every failure is an [`Error::Extraction`]. When slides were already
    /// scanned before the failure, the error carries the palette observed so
    /// far.
    pub fn extract(&self, bytes: &[u8]) -> Result<StyleGenome> {
        let mut reader =
            PresentationReader::open(bytes).map_err(|e| Error::from(e).into_extraction())?;
        let theme = reader
            .theme()
            .map_err(|e| Error::from(e).into_extraction())?
            .unwrap_or_default();

        let (cx, cy) = reader.slide_size();
        let mut obs = Observations::new(theme, cx, cy);

        let master = reader
            .master_content()
            .map_err(|e| Error::from(e).into_extraction())?;
        if let Some(master) = master {
            obs.observe_background(&master);
        }

        for index in 0..reader.slide_count() {
            match reader.slide_content(index) {
                Ok(content) => obs.observe_slide(&content),
                Err(e) => {
                    return Err(Error::Extraction {
                        message: format!("slide {}: {}", index + 1, e),
                        observed: obs.partial_palette().map(Box::new),
                    });
                },
            }
        }

        if obs.colors_seen() == 0 {
            return Err(Error::extraction("reference deck has no resolvable colors"));
        }

        let palette = obs.palette();
        let typography = obs.typography();
        let layout_prefs = obs.layout_prefs();
        let category = self
            .registry
            .nearest(&palette)
            .map_or(Category::Business, |g| g.category());
        let name = if obs.theme.name.trim().is_empty() {
            "Extracted Style".to_string()
        } else {
            obs.theme.name.clone()
        };

        let genome = StyleGenome::builder()
            .id(format!("extracted_{:016x}", fnv1a(bytes)))
            .name(name)
            .category(category)
            .palette(palette)
            .typography(typography)
            .layout_prefs(layout_prefs)
            .provenance(Provenance::Extracted)
            .build()?;

        tracing::debug!(
            id = genome.id(),
            slides = reader.slide_count(),
            primary = %genome.palette().primary,
            heading_font = %genome.typography().heading_font,
            "extracted style genome"
        );
        Ok(genome)
    }
}

/// 64-bit FNV-1a.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, &b| (hash ^ b as u64).wrapping_mul(PRIME))
}

/// Everything tallied across the deck.
struct Observations {
    theme: Theme,
    slide_w: f64,
    slide_h: f64,
    area: WeightedTally<RGBColor>,
    accent: WeightedTally<RGBColor>,
    heading_text: WeightedTally<RGBColor>,
    body_text: WeightedTally<RGBColor>,
    heading_fonts: WeightedTally<String>,
    body_fonts: WeightedTally<String>,
    body_size_sum: f64,
    body_size_count: usize,
    left_offset_sum: f64,
    left_offset_count: usize,
    round_rects: usize,
    rects: usize,
    ellipses: usize,
    thin_bars: usize,
}

impl Observations {
    fn new(theme: Theme, cx: i64, cy: i64) -> Self {
        Self {
            theme,
            slide_w: cx.max(1) as f64,
            slide_h: cy.max(1) as f64,
            area: WeightedTally::new(),
            accent: WeightedTally::new(),
            heading_text: WeightedTally::new(),
            body_text: WeightedTally::new(),
            heading_fonts: WeightedTally::new(),
            body_fonts: WeightedTally::new(),
            body_size_sum: 0.0,
            body_size_count: 0,
            left_offset_sum: 0.0,
            left_offset_count: 0,
            round_rects: 0,
            rects: 0,
            ellipses: 0,
            thin_bars: 0,
        }
    }

    fn resolve(&self, color: &ColorRef) -> Option<RGBColor> {
        match color {
            ColorRef::Rgb(c) => Some(*c),
            ColorRef::Scheme(name) => self.theme.resolve_scheme_color(name),
        }
    }

    /// The family a run renders in. Runs without a typeface inherit the
    /// theme's heading font in headings and its body font elsewhere.
    fn resolve_font(&self, font: Option<&FontRef>, heading: bool) -> Option<String> {
        match font {
            Some(FontRef::Named(name)) => Some(name.clone()),
            Some(FontRef::Major) => self.theme.major_font.clone(),
            Some(FontRef::Minor) => self.theme.minor_font.clone(),
            None if heading => self.theme.major_font.clone(),
            None => self.theme.minor_font.clone(),
        }
    }

    fn observe_background(&mut self, content: &SlideContent) {
        if let Some(bg) = content.background.as_ref().and_then(|c| self.resolve(c)) {
            self.area.add(bg, 1.0);
        }
    }

    fn observe_slide(&mut self, content: &SlideContent) {
        self.observe_background(content);
        let slide_area = self.slide_w * self.slide_h;

        for shape in &content.shapes {
            match shape.geometry.as_deref() {
                Some("roundRect") => self.round_rects += 1,
                Some("rect") => self.rects += 1,
                Some("ellipse") => self.ellipses += 1,
                _ => {},
            }
            if let Some((cx, cy)) = shape.extent {
                if cx as f64 >= self.slide_w * 0.9 && (cy as f64) <= self.slide_h * 0.03 {
                    self.thin_bars += 1;
                }
            }

            if let Some(fill) = shape.fill.as_ref().and_then(|c| self.resolve(c)) {
                let share = shape.area() / slide_area;
                if share >= SURFACE_SHARE {
                    self.area.add(fill, share);
                } else {
                    self.accent.add(fill, share);
                }
            }

            if shape.runs.is_empty() {
                continue;
            }
            if let Some((x, _)) = shape.offset {
                self.left_offset_sum += x.max(0) as f64 / self.slide_w;
                self.left_offset_count += 1;
            }

            for run in &shape.runs {
                let heading = shape.is_title() || run.size.is_some_and(|s| s >= HEADING_SIZE);
                let weight = run.chars as f64;
                let color = run.color.as_ref().and_then(|c| self.resolve(c));
                let font = self.resolve_font(run.font.as_ref(), heading);
                if heading {
                    if let Some(color) = color {
                        self.heading_text.add(color, weight);
                    }
                    if let Some(font) = font {
                        self.heading_fonts.add(font, weight);
                    }
                } else {
                    if let Some(color) = color {
                        self.body_text.add(color, weight);
                    }
                    if let Some(font) = font {
                        self.body_fonts.add(font, weight);
                    }
                    if let Some(size) = run.size {
                        self.body_size_sum += size as f64 / 100.0;
                        self.body_size_count += 1;
                    }
                }
            }
        }
    }

    fn colors_seen(&self) -> usize {
        self.area.len() + self.accent.len() + self.heading_text.len() + self.body_text.len()
    }

    fn partial_palette(&self) -> Option<Palette> {
        (self.colors_seen() > 0).then(|| self.palette())
    }

    /// All colors by cumulative weight across tallies.
    fn overall(&self) -> WeightedTally<RGBColor> {
        let mut all = WeightedTally::new();
        all.merge(&self.area);
        all.merge(&self.heading_text);
        all.merge(&self.accent);
        all.merge(&self.body_text);
        all
    }

    fn palette(&self) -> Palette {
        let background = self.area.top().copied().unwrap_or(RGBColor::WHITE);
        let text = self
            .body_text
            .top_where(|c| *c != background)
            .copied()
            .unwrap_or_else(|| readable_on(background));

        let mut used = vec![background, text];
        let mut candidates = self.heading_text.clone();
        candidates.merge(&self.accent);
        let overall = self.overall();

        let primary = candidates
            .top_where(|c| !used.contains(c) && !is_neutral(c))
            .or_else(|| overall.top_where(|c| !used.contains(c) && !is_neutral(c)))
            .or_else(|| overall.top_where(|c| !used.contains(c)))
            .copied()
            .unwrap_or(text);
        used.push(primary);

        let secondary = overall.top_where(|c| !used.contains(c)).copied();
        if let Some(secondary) = secondary {
            used.push(secondary);
        }
        let accent = overall.top_where(|c| !used.contains(c)).copied();

        let primary_lab = LabColor::from_rgb(primary);
        let background_lab = LabColor::from_rgb(background);
        let secondary = secondary.unwrap_or_else(|| primary_lab.lerp(&background_lab, 0.35).to_rgb());
        let accent = accent.unwrap_or_else(|| {
            let shift = if background_lab.l > 50.0 { -25.0 } else { 25.0 };
            primary_lab.with_lightness(primary_lab.l + shift).to_rgb()
        });

        Palette {
            primary,
            secondary,
            accent,
            background,
            text,
        }
    }

    fn typography(&self) -> Typography {
        let heading = self
            .heading_fonts
            .top()
            .or(self.theme.major_font.as_ref())
            .or(self.body_fonts.top())
            .cloned();
        let body = self
            .body_fonts
            .top()
            .or(self.theme.minor_font.as_ref())
            .or(self.heading_fonts.top())
            .cloned();
        let scale = if self.body_size_count == 0 {
            1.0
        } else {
            let mean = self.body_size_sum / self.body_size_count as f64;
            (mean / REFERENCE_BODY_PT).clamp(0.5, 2.0)
        };

        Typography {
            heading_font: heading.unwrap_or_else(|| FALLBACK_FONT.to_string()),
            body_font: body.unwrap_or_else(|| FALLBACK_FONT.to_string()),
            scale,
        }
    }

    fn layout_prefs(&self) -> LayoutPrefs {
        let spacing_unit = if self.left_offset_count == 0 {
            1.0
        } else {
            let mean = self.left_offset_sum / self.left_offset_count as f64;
            (mean / BASE_MARGIN).clamp(0.25, 4.0)
        };
        let corner_radius = if self.round_rects > self.rects {
            CornerRadius::Rounded
        } else {
            CornerRadius::Square
        };
        let motif = if self.ellipses > 0 {
            Motif::Circles
        } else if self.thin_bars > 0 {
            Motif::AccentBar
        } else {
            Motif::None
        };

        LayoutPrefs {
            spacing_unit,
            corner_radius,
            motif,
        }
    }
}
