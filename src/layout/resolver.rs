//! Content shape → template lookup.

use super::template::{LayoutTemplate, ResolvedSlide, geometry};
use crate::outline::{ContentShape, OutlineSlide};
use crate::style::StyleGenome;

/// Base slide margin before the genome's spacing unit is applied.
pub const BASE_MARGIN: f64 = 0.05;
pub const MIN_MARGIN: f64 = 0.01;
pub const MAX_MARGIN: f64 = 0.15;

/// Assigns a template and placeholder geometry to outline slides.
///
/// Resolution is a pure table lookup: unknown content shapes fall back to
/// [`LayoutTemplate::SingleColumn`] and no input can fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutResolver;

impl LayoutResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, slide: &OutlineSlide, genome: &StyleGenome) -> ResolvedSlide {
        let template = Self::template_for(slide.content_shape);
        let margin = Self::margin(genome.layout_prefs().spacing_unit);
        ResolvedSlide {
            template,
            placeholders: geometry(template, margin),
        }
    }

    pub fn template_for(shape: ContentShape) -> LayoutTemplate {
        match shape {
            ContentShape::TitleOnly => LayoutTemplate::TitleOnly,
            ContentShape::Bullets => LayoutTemplate::TitleAndBody,
            ContentShape::ImageAndText => LayoutTemplate::ImageAndText,
            ContentShape::TwoColumn => LayoutTemplate::TwoColumn,
            ContentShape::Unknown => LayoutTemplate::SingleColumn,
        }
    }

    /// Uniform edge and gutter margin for a spacing unit.
    pub fn margin(spacing_unit: f64) -> f64 {
        let margin = BASE_MARGIN * spacing_unit;
        if margin.is_nan() {
            return BASE_MARGIN;
        }
        margin.clamp(MIN_MARGIN, MAX_MARGIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PlaceholderRole;
    use crate::style::presets::PresetRegistry;
    use proptest::prelude::*;

    #[test]
    fn test_lookup_table() {
        let genome = PresetRegistry::builtin().get("modern_minimal").unwrap().clone();
        let resolver = LayoutResolver::new();
        let cases = [
            (ContentShape::TitleOnly, LayoutTemplate::TitleOnly),
            (ContentShape::Bullets, LayoutTemplate::TitleAndBody),
            (ContentShape::ImageAndText, LayoutTemplate::ImageAndText),
            (ContentShape::TwoColumn, LayoutTemplate::TwoColumn),
            (ContentShape::Unknown, LayoutTemplate::SingleColumn),
        ];
        for (shape, expected) in cases {
            let resolved = resolver.resolve(&OutlineSlide::new("t", shape), &genome);
            assert_eq!(resolved.template, expected);
        }

        let resolved = resolver.resolve(
            &OutlineSlide::new("t", ContentShape::ImageAndText),
            &genome,
        );
        let roles: Vec<_> = resolved.placeholders.iter().map(|p| p.role).collect();
        assert_eq!(
            roles,
            [PlaceholderRole::Title, PlaceholderRole::Body, PlaceholderRole::Image]
        );
    }

    #[test]
    fn test_margin_clamp() {
        assert_eq!(LayoutResolver::margin(1.0), 0.05);
        assert_eq!(LayoutResolver::margin(0.01), MIN_MARGIN);
        assert_eq!(LayoutResolver::margin(100.0), MAX_MARGIN);
        assert_eq!(LayoutResolver::margin(f64::NAN), BASE_MARGIN);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_boxes_inside_slide(spacing in 0.0f64..50.0, shape in 0usize..5) {
            let template = LayoutTemplate::ALL[shape];
            let placeholders = geometry(template, LayoutResolver::margin(spacing));
            for p in &placeholders {
                prop_assert!(p.bbox.is_valid(), "{:?} {:?}", template, p);
            }
        }
    }
}
