//! Text contrast enforcement.

use crate::common::style::{LabColor, RGBColor};

/// Lightness change per adjustment step, in Lab L units.
const STEP: f64 = 5.0;

/// Outcome of a contrast check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contrast {
    /// The color already meets the threshold
    Passes,
    /// Replaced by a color that meets the threshold
    Adjusted(RGBColor),
    /// Nothing meets the threshold; the best of black and white
    Unresolvable(RGBColor),
}

impl Contrast {
    /// The color to use in place of `original`.
    pub fn color(&self, original: RGBColor) -> RGBColor {
        match self {
            Self::Passes => original,
            Self::Adjusted(c) | Self::Unresolvable(c) => *c,
        }
    }
}

/// Check `fg` against `bg` and find a replacement when the WCAG ratio is
/// below `min_ratio`.
///
/// The replacement keeps the hue of `fg` and moves its Lab lightness away
/// from the background in fixed steps. When no step passes, pure black or
/// white is tried.
pub fn ensure_contrast(fg: RGBColor, bg: RGBColor, min_ratio: f64) -> Contrast {
    if fg.contrast_ratio(bg) >= min_ratio {
        return Contrast::Passes;
    }

    let toward_dark = readable_on(bg) == RGBColor::BLACK;
    let lab = LabColor::from_rgb(fg);
    let mut l = lab.l;
    loop {
        l = if toward_dark { l - STEP } else { l + STEP };
        if !(0.0..=100.0).contains(&l) {
            break;
        }
        let candidate = lab.with_lightness(l).to_rgb();
        if candidate.contrast_ratio(bg) >= min_ratio {
            return Contrast::Adjusted(candidate);
        }
    }

    let extreme = readable_on(bg);
    if extreme.contrast_ratio(bg) >= min_ratio {
        Contrast::Adjusted(extreme)
    } else {
        Contrast::Unresolvable(extreme)
    }
}

/// Black or white, whichever contrasts more with `background`.
pub fn readable_on(background: RGBColor) -> RGBColor {
    if background.contrast_ratio(RGBColor::BLACK) >= background.contrast_ratio(RGBColor::WHITE) {
        RGBColor::BLACK
    } else {
        RGBColor::WHITE
    }
}
