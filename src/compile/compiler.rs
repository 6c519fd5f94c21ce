//! Outline + genome → compiled slide trees.

use super::assets::ImageAssets;
use super::contrast::{Contrast, ensure_contrast};
use super::fit::{Capacity, fit_blocks, fit_text};
use super::shape::{
    CompiledDeck, CompiledShape, CompiledSlide, Geometry, MasterTheme, Paragraph, TextRun,
};
use crate::common::error::{ErrorKind, Warning};
use crate::common::style::RGBColor;
use crate::common::unit::pt_to_centipoints;
use crate::config::GeneratorConfig;
use crate::layout::{BBox, LayoutResolver, Placeholder, PlaceholderRole, ResolvedSlide};
use crate::outline::{BlockKind, ContentBlock, Outline, OutlineSlide};
use crate::style::{ColorRole, CornerRadius, Motif, StyleGenome};
use rayon::prelude::*;

/// Text in the two columns is set slightly smaller than full-width body text.
const COLUMN_SIZE_FACTOR: f64 = 0.9;

/// Text colors after the contrast check, shared by every slide.
#[derive(Debug, Clone, Copy)]
struct TextColors {
    title: RGBColor,
    subtitle: RGBColor,
    body: RGBColor,
}

/// Compiles outlines into [`CompiledDeck`]s.
///
/// Compilation never fails. Overflow, contrast substitutions and empty
/// slides are repaired and recorded as warnings on the deck.
#[derive(Debug, Clone)]
pub struct DocumentCompiler<'c> {
    config: &'c GeneratorConfig,
    resolver: LayoutResolver,
}

impl<'c> DocumentCompiler<'c> {
    pub fn new(config: &'c GeneratorConfig) -> Self {
        Self {
            config,
            resolver: LayoutResolver::new(),
        }
    }

    pub fn compile(
        &self,
        outline: &Outline,
        genome: &StyleGenome,
        assets: &ImageAssets,
    ) -> CompiledDeck {
        let slide_size = self.config.aspect_ratio.slide_size();
        let colors = self.text_colors(genome);

        let compiled: Vec<(CompiledSlide, Vec<Warning>)> = outline
            .slides
            .par_iter()
            .enumerate()
            .map(|(index, slide)| {
                let resolved = self.resolver.resolve(slide, genome);
                SlideCompiler {
                    config: self.config,
                    genome,
                    colors,
                    slide_size,
                    index,
                }
                .compile(slide, &resolved, assets)
            })
            .collect();

        let mut slides = Vec::with_capacity(compiled.len());
        let mut slide_warnings = Vec::new();
        for (slide, warnings) in compiled {
            slide_warnings.extend(warnings);
            slides.push(slide);
        }
        let mut warnings = self.contrast_warnings(genome, DrawnColors::of(&slides));
        warnings.extend(slide_warnings);
        for warning in &warnings {
            tracing::warn!(kind = %warning.kind, slide = ?warning.slide, "{}", warning.message);
        }

        let typography = genome.typography();
        let sizes = &self.config.font_sizes;
        CompiledDeck {
            title: outline.deck_title().map(str::to_string),
            style_id: genome.id().to_string(),
            slide_size,
            master: MasterTheme {
                name: genome.name().to_string(),
                palette: *genome.palette(),
                heading_font: typography.heading_font.clone(),
                body_font: typography.body_font.clone(),
                title_size: pt_to_centipoints(sizes.title * typography.scale),
                body_size: pt_to_centipoints(sizes.body * typography.scale),
            },
            slides,
            warnings,
        }
    }

    /// Text colors after contrast repair, shared by every slide.
    fn text_colors(&self, genome: &StyleGenome) -> TextColors {
        let background = genome.color(ColorRole::Background);
        let fixed = |role: ColorRole| {
            let color = genome.color(role);
            ensure_contrast(color, background, self.config.min_contrast).color(color)
        };
        TextColors {
            title: fixed(ColorRole::Primary),
            subtitle: fixed(ColorRole::Accent),
            body: fixed(ColorRole::Text),
        }
    }

    /// One warning per repaired color that some slide actually draws text in.
    fn contrast_warnings(&self, genome: &StyleGenome, drawn: DrawnColors) -> Vec<Warning> {
        let background = genome.color(ColorRole::Background);
        let checks = [
            ("title", ColorRole::Primary, drawn.title),
            ("subtitle", ColorRole::Accent, drawn.subtitle),
            ("body", ColorRole::Text, drawn.body),
        ];

        let mut warnings = Vec::new();
        for (what, role, _) in checks.into_iter().filter(|(_, _, drawn)| *drawn) {
            let color = genome.color(role);
            let outcome = ensure_contrast(color, background, self.config.min_contrast);
            let fixed = outcome.color(color);
            match outcome {
                Contrast::Passes => {},
                Contrast::Adjusted(_) => warnings.push(Warning::new(
                    ErrorKind::Compilation,
                    format!(
                        "{} color {} ({}) has contrast {:.2}:1 on {}; using {}",
                        what,
                        color,
                        role,
                        color.contrast_ratio(background),
                        background,
                        fixed
                    ),
                )),
                Contrast::Unresolvable(_) => warnings.push(Warning::new(
                    ErrorKind::Compilation,
                    format!(
                        "unresolvable contrast for {} on {}: no color reaches {}:1; using {}",
                        what, background, self.config.min_contrast, fixed
                    ),
                )),
            }
        }
        warnings
    }
}

/// Which [`TextColors`] slots the compiled slides draw text in.
#[derive(Debug, Default, Clone, Copy)]
struct DrawnColors {
    title: bool,
    subtitle: bool,
    body: bool,
}

impl DrawnColors {
    fn of(slides: &[CompiledSlide]) -> Self {
        let mut drawn = Self::default();
        for shape in slides.iter().flat_map(|s| &s.shapes) {
            match shape {
                CompiledShape::Text { role, paragraphs, .. } if !paragraphs.is_empty() => {
                    match role {
                        PlaceholderRole::Title => drawn.title = true,
                        PlaceholderRole::Subtitle => drawn.subtitle = true,
                        _ => drawn.body = true,
                    }
                },
                _ => {},
            }
        }
        drawn
    }
}

/// Per-slide compilation state.
struct SlideCompiler<'a> {
    config: &'a GeneratorConfig,
    genome: &'a StyleGenome,
    colors: TextColors,
    slide_size: (i64, i64),
    index: usize,
}

impl SlideCompiler<'_> {
    fn compile(
        &self,
        slide: &OutlineSlide,
        resolved: &ResolvedSlide,
        assets: &ImageAssets,
    ) -> (CompiledSlide, Vec<Warning>) {
        let mut warnings = Vec::new();
        let (left, right) = split_columns(&slide.body_blocks);

        let mut shapes: Vec<CompiledShape> = resolved
            .placeholders
            .iter()
            .map(|ph| match ph.role {
                PlaceholderRole::Title => self.title(ph, &slide.title, &mut warnings),
                PlaceholderRole::Subtitle | PlaceholderRole::Body => {
                    self.blocks(ph, &slide.body_blocks, &mut warnings)
                },
                PlaceholderRole::LeftColumn => self.blocks(ph, left, &mut warnings),
                PlaceholderRole::RightColumn => self.blocks(ph, right, &mut warnings),
                PlaceholderRole::Image => self.picture(ph, assets),
            })
            .collect();

        if !shapes.iter().any(CompiledShape::is_filled_placeholder) {
            if let Some(first) = resolved.placeholders.first() {
                shapes[0] = self.decoration(first);
                warnings.push(Warning::on_slide(
                    ErrorKind::Compilation,
                    self.index,
                    "slide has no content; placed an accent decoration",
                ));
            }
        }

        shapes.extend(self.motif(resolved));

        let compiled = CompiledSlide {
            index: self.index,
            layout: resolved.template,
            shapes,
            notes: slide.notes.clone(),
        };
        (compiled, warnings)
    }

    fn size_pt(&self, role: PlaceholderRole) -> f64 {
        let sizes = &self.config.font_sizes;
        let base = match role {
            PlaceholderRole::Title => sizes.title,
            PlaceholderRole::Subtitle => sizes.subtitle,
            PlaceholderRole::LeftColumn | PlaceholderRole::RightColumn => {
                sizes.body * COLUMN_SIZE_FACTOR
            },
            PlaceholderRole::Body | PlaceholderRole::Image => sizes.body,
        };
        base * self.genome.typography().scale
    }

    fn run(&self, role: PlaceholderRole, text: String) -> TextRun {
        let typography = self.genome.typography();
        let (font, color) = match role {
            PlaceholderRole::Title => (&typography.heading_font, self.colors.title),
            PlaceholderRole::Subtitle => (&typography.heading_font, self.colors.subtitle),
            _ => (&typography.body_font, self.colors.body),
        };
        TextRun {
            text,
            font: font.clone(),
            size: pt_to_centipoints(self.size_pt(role)),
            color,
            bold: role == PlaceholderRole::Title,
        }
    }

    fn title(&self, ph: &Placeholder, title: &str, warnings: &mut Vec<Warning>) -> CompiledShape {
        let title = title.trim();
        let mut paragraphs = Vec::new();
        if !title.is_empty() {
            let capacity = Capacity::of(ph.bbox, self.slide_size, self.size_pt(ph.role));
            match fit_text(title, capacity) {
                Some((text, truncated)) => {
                    if truncated {
                        warnings.push(Warning::on_slide(
                            ErrorKind::Compilation,
                            self.index,
                            format!("title truncated to fit: \"{}\"", text),
                        ));
                    }
                    paragraphs.push(Paragraph {
                        runs: vec![self.run(ph.role, text)],
                        bullet: false,
                        level: 0,
                    });
                },
                None => warnings.push(Warning::on_slide(
                    ErrorKind::Compilation,
                    self.index,
                    "title does not fit its placeholder and was dropped",
                )),
            }
        }
        CompiledShape::Text {
            role: ph.role,
            bbox: ph.bbox,
            paragraphs,
        }
    }

    fn blocks(
        &self,
        ph: &Placeholder,
        blocks: &[ContentBlock],
        warnings: &mut Vec<Warning>,
    ) -> CompiledShape {
        let capacity = Capacity::of(ph.bbox, self.slide_size, self.size_pt(ph.role));
        let fitted = fit_blocks(blocks, capacity);
        if fitted.overflowed() {
            warnings.push(Warning::on_slide(
                ErrorKind::Compilation,
                self.index,
                format!(
                    "{} overflow: {} of {} blocks dropped{}",
                    ph.role,
                    fitted.dropped,
                    blocks.len(),
                    if fitted.truncated { ", last block truncated" } else { "" }
                ),
            ));
        }

        let bulleted = ph.role.is_body();
        let paragraphs = fitted
            .blocks
            .into_iter()
            .map(|block| Paragraph {
                bullet: bulleted && block.kind == BlockKind::Bullet,
                level: block.level,
                runs: vec![self.run(ph.role, block.text)],
            })
            .collect();
        CompiledShape::Text {
            role: ph.role,
            bbox: ph.bbox,
            paragraphs,
        }
    }

    fn picture(&self, ph: &Placeholder, assets: &ImageAssets) -> CompiledShape {
        match assets.for_slide(self.index) {
            Some(asset) => {
                let (cx, cy) = self.slide_size;
                let bbox = match asset.aspect() {
                    // Pixel aspect → relative-unit aspect
                    Some(aspect) => ph.bbox.fit_aspect(aspect * cy as f64 / cx as f64),
                    None => ph.bbox,
                };
                CompiledShape::Picture {
                    role: ph.role,
                    bbox,
                    asset_id: asset.id.clone(),
                }
            },
            None => self.decoration(ph),
        }
    }

    fn decoration(&self, ph: &Placeholder) -> CompiledShape {
        CompiledShape::Decoration {
            role: Some(ph.role),
            bbox: ph.bbox,
            fill: self.genome.color(ColorRole::Accent),
            geometry: corner_geometry(self.genome.layout_prefs().corner_radius),
        }
    }

    fn motif(&self, resolved: &ResolvedSlide) -> Vec<CompiledShape> {
        let fill = self.genome.color(ColorRole::Accent);
        let (cx, cy) = self.slide_size;
        let aspect = cx as f64 / cy as f64;
        let shape = |bbox: BBox, geometry: Geometry| CompiledShape::Decoration {
            role: None,
            bbox,
            fill,
            geometry,
        };

        match self.genome.layout_prefs().motif {
            Motif::None => Vec::new(),
            Motif::AccentBar => vec![shape(BBox::new(0.0, 0.0, 1.0, 0.012), Geometry::Rect)],
            Motif::Underline => match resolved.placeholder(PlaceholderRole::Title) {
                Some(title) => {
                    let y = title.bbox.bottom().min(1.0 - 0.006);
                    let w = (title.bbox.w * 0.15).max(0.02);
                    vec![shape(BBox::new(title.bbox.x, y, w, 0.006), Geometry::Rect)]
                },
                None => Vec::new(),
            },
            Motif::CornerBlock => {
                let w = 0.04;
                vec![shape(BBox::new(1.0 - w, 0.0, w, w * aspect), Geometry::Rect)]
            },
            Motif::Circles => {
                // Equal width and height in EMUs
                let (big, small) = (0.06, 0.035);
                vec![
                    shape(
                        BBox::new(1.0 - big - 0.02, 1.0 - big * aspect - 0.03, big, big * aspect),
                        Geometry::Ellipse,
                    ),
                    shape(
                        BBox::new(
                            1.0 - big - small - 0.03,
                            1.0 - small * aspect - 0.02,
                            small,
                            small * aspect,
                        ),
                        Geometry::Ellipse,
                    ),
                ]
            },
        }
    }
}

/// Geometry of filled stand-ins for a corner class.
pub fn corner_geometry(corner: CornerRadius) -> Geometry {
    match corner.round_rect_adj() {
        Some(adj) => Geometry::RoundRect(adj),
        None => Geometry::Rect,
    }
}

/// Split blocks in order; the left column takes the extra block.
pub fn split_columns(blocks: &[ContentBlock]) -> (&[ContentBlock], &[ContentBlock]) {
    blocks.split_at(blocks.len().div_ceil(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::assets::ImageAsset;
    use crate::layout::LayoutTemplate;
    use crate::outline::ContentShape;
    use crate::style::PresetRegistry;
    use bytes::Bytes;

    fn preset(id: &str) -> StyleGenome {
        PresetRegistry::builtin().require(id).unwrap().clone()
    }

    fn five_slides() -> Outline {
        Outline::new(vec![
            OutlineSlide::new("Launch Plan", ContentShape::TitleOnly).with_blocks(["Q3 kickoff"]),
            OutlineSlide::new("Goals", ContentShape::Bullets)
                .with_blocks(["Ship the beta", "Grow signups", "Hire two engineers"])
                .with_notes("Keep this under two minutes"),
            OutlineSlide::new("Product", ContentShape::ImageAndText)
                .with_blocks(["New onboarding flow"]),
            OutlineSlide::new("Timeline", ContentShape::Bullets).with_blocks(["July", "August"]),
            OutlineSlide::new("Thank You", ContentShape::TitleOnly),
        ])
    }

    fn text_colors(slide: &CompiledSlide) -> Vec<RGBColor> {
        slide
            .text_shapes()
            .flat_map(|(_, paragraphs)| paragraphs.iter())
            .flat_map(|p| p.runs.iter().map(|r| r.color))
            .collect()
    }

    #[test]
    fn test_five_slide_tech_startup() {
        let config = GeneratorConfig::default();
        let genome = preset("tech_startup");
        let deck = DocumentCompiler::new(&config).compile(&five_slides(), &genome, &ImageAssets::new());

        assert_eq!(deck.slide_count(), 5);
        let layouts: Vec<_> = deck.slides.iter().map(|s| s.layout).collect();
        assert_eq!(
            layouts,
            [
                LayoutTemplate::TitleOnly,
                LayoutTemplate::TitleAndBody,
                LayoutTemplate::ImageAndText,
                LayoutTemplate::TitleAndBody,
                LayoutTemplate::TitleOnly,
            ]
        );

        let background = genome.color(ColorRole::Background);
        for slide in &deck.slides {
            assert!(slide.shapes.iter().any(CompiledShape::is_filled_placeholder));
            for color in text_colors(slide) {
                assert!(color.contrast_ratio(background) >= config.min_contrast);
            }
        }

        // 6366F1 on white falls just short of 4.5:1
        assert!(deck.warnings.iter().any(|w| w.message.contains("title color")));
        assert_eq!(deck.slides[1].notes.as_deref(), Some("Keep this under two minutes"));

        // No image: the picture slot is an accent decoration
        assert!(deck.slides[2].shapes.iter().any(|s| matches!(
            s,
            CompiledShape::Decoration { role: Some(PlaceholderRole::Image), fill, .. }
                if *fill == genome.color(ColorRole::Accent)
        )));
        // Circles motif on every slide
        for slide in &deck.slides {
            let circles = slide
                .shapes
                .iter()
                .filter(|s| matches!(s, CompiledShape::Decoration { geometry: Geometry::Ellipse, .. }))
                .count();
            assert_eq!(circles, 2);
        }
    }

    #[test]
    fn test_roles_and_fonts() {
        let config = GeneratorConfig::default();
        let genome = preset("corporate_classic");
        let outline = Outline::new(vec![
            OutlineSlide::new("Cover", ContentShape::TitleOnly).with_blocks(["Subtitle"]),
        ]);
        let deck = DocumentCompiler::new(&config).compile(&outline, &genome, &ImageAssets::new());
        let shapes: Vec<_> = deck.slides[0].text_shapes().collect();

        let title = &shapes[0].1[0].runs[0];
        assert_eq!(*shapes[0].0, PlaceholderRole::Title);
        assert_eq!(title.font, "Georgia");
        assert_eq!(title.size, 4000);
        assert_eq!(title.color, genome.color(ColorRole::Primary));

        let subtitle = &shapes[1].1[0].runs[0];
        assert_eq!(subtitle.font, "Georgia");
        assert_eq!(subtitle.size, 2400);
        assert!(!shapes[1].1[0].bullet);
        assert_eq!(deck.master.background(), RGBColor::WHITE);
    }

    #[test]
    fn test_two_column_split() {
        let config = GeneratorConfig::default();
        let genome = preset("modern_minimal");
        let outline = Outline::new(vec![
            OutlineSlide::new("Compare", ContentShape::TwoColumn)
                .with_blocks(["a", "b", "c", "d", "e"]),
        ]);
        let deck = DocumentCompiler::new(&config).compile(&outline, &genome, &ImageAssets::new());
        let columns: Vec<Vec<String>> = deck.slides[0]
            .text_shapes()
            .filter(|(role, _)| **role != PlaceholderRole::Title)
            .map(|(_, ps)| ps.iter().map(Paragraph::text).collect())
            .collect();
        assert_eq!(columns, vec![vec!["a", "b", "c"], vec!["d", "e"]]);
    }

    #[test]
    fn test_overflow_is_truncated_with_warning() {
        let config = GeneratorConfig::default();
        let genome = preset("corporate_classic");
        let long = "word ".repeat(60);
        let outline = Outline::new(vec![
            OutlineSlide::new("Dense", ContentShape::Bullets)
                .with_blocks((0..40).map(|_| long.clone())),
        ]);
        let deck = DocumentCompiler::new(&config).compile(&outline, &genome, &ImageAssets::new());
        let body = deck.slides[0]
            .text_shapes()
            .find(|(role, _)| **role == PlaceholderRole::Body)
            .map(|(_, ps)| ps.to_vec())
            .unwrap();
        assert!(body.len() < 40);
        assert!(body.last().unwrap().text().ends_with('…'));
        assert!(
            deck.warnings
                .iter()
                .any(|w| w.slide == Some(0) && w.message.contains("overflow"))
        );
    }

    #[test]
    fn test_empty_slide_gets_decoration() {
        let config = GeneratorConfig::default();
        let genome = preset("creative_bold");
        let outline = Outline::new(vec![OutlineSlide::new("", ContentShape::Bullets)]);
        let deck = DocumentCompiler::new(&config).compile(&outline, &genome, &ImageAssets::new());
        let slide = &deck.slides[0];
        assert!(matches!(
            slide.shapes[0],
            CompiledShape::Decoration {
                role: Some(PlaceholderRole::Title),
                geometry: Geometry::Rect,
                ..
            }
        ));
        assert!(deck.warnings.iter().any(|w| w.message.contains("no content")));
    }

    #[test]
    fn test_contrast_warnings_only_for_drawn_text() {
        let config = GeneratorConfig::default();
        let genome = preset("tech_startup");
        let compiler = DocumentCompiler::new(&config);

        // Body text only: the low-contrast title color is never drawn
        let outline = Outline::new(vec![
            OutlineSlide::new("", ContentShape::Bullets).with_blocks(["Only body"]),
        ]);
        let deck = compiler.compile(&outline, &genome, &ImageAssets::new());
        assert!(!deck.warnings.iter().any(|w| w.message.contains("title color")));
        // The slot still carries the repaired color
        let title = compiler.text_colors(&genome).title;
        assert!(title.contrast_ratio(genome.color(ColorRole::Background)) >= config.min_contrast);

        let blank = Outline::new(vec![OutlineSlide::new(" ", ContentShape::Bullets)]);
        assert!(blank.slides[0].is_blank());
        let deck = compiler.compile(&blank, &genome, &ImageAssets::new());
        assert!(!deck.warnings.iter().any(|w| w.message.contains("contrast")));
    }

    #[test]
    fn test_picture_bound_to_asset() {
        const PNG_HEADER: &[u8] = &[
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00,
        ];
        let mut assets = ImageAssets::new();
        assets.insert(
            0,
            ImageAsset::from_bytes("slide1_image", Bytes::from_static(PNG_HEADER)).unwrap(),
        );
        let config = GeneratorConfig::default();
        let genome = preset("tech_startup");
        let outline = Outline::new(vec![
            OutlineSlide::new("Screens", ContentShape::ImageAndText).with_blocks(["Caption"]),
        ]);
        let deck = DocumentCompiler::new(&config).compile(&outline, &genome, &assets);
        let slide = &deck.slides[0];
        assert_eq!(slide.asset_ids().collect::<Vec<_>>(), ["slide1_image"]);

        let bbox = slide
            .shapes
            .iter()
            .find(|s| matches!(s, CompiledShape::Picture { .. }))
            .unwrap()
            .bbox();
        // 512×256 pixels keeps a 2:1 shape on the slide
        let (cx, cy) = config.aspect_ratio.slide_size();
        let ratio = (bbox.w * cx as f64) / (bbox.h * cy as f64);
        assert!((ratio - 2.0).abs() < 1e-9);
        assert!(bbox.is_valid());
    }

    #[test]
    fn test_compile_is_deterministic() {
        let config = GeneratorConfig::default();
        let genome = preset("dark_cyber");
        let compiler = DocumentCompiler::new(&config);
        let a = compiler.compile(&five_slides(), &genome, &ImageAssets::new());
        let b = compiler.compile(&five_slides(), &genome, &ImageAssets::new());
        assert_eq!(a, b);
    }
}
