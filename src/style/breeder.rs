//! Genome breeding.
//!
//! Colors are interpolated in CIE Lab, scalars linearly, and discrete
//! attributes are inherited from the dominant parent. Breeding is a pure
//! function of its inputs: there is no random mutation.

use super::genome::{ColorRole, LayoutPrefs, Palette, Provenance, StyleGenome, Typography};
use crate::common::style::{LabColor, RGBColor};
use crate::common::style::lab::lerp;

/// Combines two parent genomes into a child.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleBreeder;

impl StyleBreeder {
    pub fn new() -> Self {
        Self
    }

    /// Breed `a` and `b`. `ratio` is the share of `b` in the child: 0 yields
    /// `a`, 1 yields `b`. Values outside [0, 1] are clamped and NaN counts as 0.
    ///
    /// Discrete attributes (category, fonts, corner radius, motif) come from
    /// `a` when `ratio <= 0.5` and from `b` otherwise.
    pub fn breed(&self, a: &StyleGenome, b: &StyleGenome, ratio: f64) -> StyleGenome {
        let t = normalize_ratio(ratio);
        let dominant = if t > 0.5 { b } else { a };

        let palette = Palette::from_fn(|role: ColorRole| blend_color(a.color(role), b.color(role), t));

        let typography = Typography {
            heading_font: dominant.typography().heading_font.clone(),
            body_font: dominant.typography().body_font.clone(),
            scale: blend_scalar(a.typography().scale, b.typography().scale, t),
        };

        let layout_prefs = LayoutPrefs {
            spacing_unit: blend_scalar(
                a.layout_prefs().spacing_unit,
                b.layout_prefs().spacing_unit,
                t,
            ),
            corner_radius: dominant.layout_prefs().corner_radius,
            motif: dominant.layout_prefs().motif,
        };

        let percent = (t * 100.0).round() as u32;
        let child = StyleGenome::assemble(
            format!("{}_x_{}_{}", a.id(), b.id(), percent),
            format!("{} × {}", a.name(), b.name()),
            dominant.category(),
            palette,
            typography,
            layout_prefs,
            Provenance::Bred {
                parent_a: a.id().to_string(),
                parent_b: b.id().to_string(),
                ratio: t,
            },
        );

        tracing::debug!(
            parent_a = a.id(),
            parent_b = b.id(),
            ratio = t,
            child = child.id(),
            "bred style genome"
        );
        child
    }
}

/// Clamp to [0, 1]; NaN becomes 0.
#[inline]
pub fn normalize_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Lab interpolation, exact at the endpoints and kept between the parents
/// channel by channel.
pub fn blend_color(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    if t <= 0.0 || a == b {
        return a;
    }
    if t >= 1.0 {
        return b;
    }

    let mixed = LabColor::from_rgb(a).lerp(&LabColor::from_rgb(b), t).to_rgb();
    let between = |m: u8, x: u8, y: u8| m.clamp(x.min(y), x.max(y));
    RGBColor::new(
        between(mixed.r, a.r, b.r),
        between(mixed.g, a.g, b.g),
        between(mixed.b, a.b, b.b),
    )
}

#[inline]
fn blend_scalar(a: f64, b: f64, t: f64) -> f64 {
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else {
        lerp(a, b, t)
    }
}
