//! CIE L\*a\*b\* color space conversion.
//!
//! Lab is perceptually uniform: equal distances correspond to roughly equal
//! perceived differences, so interpolating in Lab yields visually smooth blends
//! where channel-wise RGB averaging produces muddy midpoints.
//!
//! Conversions go through CIE XYZ with the D65 reference white.

use super::color::{RGBColor, linear_to_srgb, srgb_to_linear};
use serde::{Deserialize, Serialize};

/// D65 reference white (2° observer), Y normalized to 1.
const WHITE_X: f64 = 0.950_47;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.088_83;

/// CIE constants in their exact rational form.
const EPSILON: f64 = 216.0 / 24_389.0;
const KAPPA: f64 = 24_389.0 / 27.0;

/// A color in CIE L\*a\*b\*.
///
/// `l` is lightness in [0, 100]; `a` (green–red) and `b` (blue–yellow) are
/// unbounded but stay within about ±128 for colors inside the sRGB gamut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabColor {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl LabColor {
    #[inline]
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    /// Convert an sRGB color to Lab.
    pub fn from_rgb(color: RGBColor) -> Self {
        let [r, g, b] = color.channels().map(|c| srgb_to_linear(c as f64 / 255.0));

        let x = r * 0.412_456_4 + g * 0.357_576_1 + b * 0.180_437_5;
        let y = r * 0.212_672_9 + g * 0.715_152_2 + b * 0.072_175_0;
        let z = r * 0.019_333_9 + g * 0.119_192_0 + b * 0.950_304_1;

        let fx = lab_f(x / WHITE_X);
        let fy = lab_f(y / WHITE_Y);
        let fz = lab_f(z / WHITE_Z);

        Self {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }

    /// Convert back to sRGB.
    ///
    /// Colors outside the sRGB gamut are clamped per channel; this never fails.
    pub fn to_rgb(&self) -> RGBColor {
        let fy = (self.l + 16.0) / 116.0;
        let fx = fy + self.a / 500.0;
        let fz = fy - self.b / 200.0;

        let x = WHITE_X * lab_f_inv(fx);
        let y = WHITE_Y
            * if self.l > KAPPA * EPSILON {
                fy * fy * fy
            } else {
                self.l / KAPPA
            };
        let z = WHITE_Z * lab_f_inv(fz);

        let r = x * 3.240_454_2 - y * 1.537_138_5 - z * 0.498_531_4;
        let g = -x * 0.969_266_0 + y * 1.876_010_8 + z * 0.041_556_0;
        let b = x * 0.055_643_4 - y * 0.204_025_9 + z * 1.057_225_2;

        RGBColor::new(to_channel(r), to_channel(g), to_channel(b))
    }

    /// Linear interpolation of each component; `t = 0` yields `self`, `t = 1` yields `other`.
    #[inline]
    pub fn lerp(&self, other: &LabColor, t: f64) -> LabColor {
        LabColor {
            l: lerp(self.l, other.l, t),
            a: lerp(self.a, other.a, t),
            b: lerp(self.b, other.b, t),
        }
    }

    /// CIE76 color difference (Euclidean distance in Lab).
    #[inline]
    pub fn delta_e(&self, other: &LabColor) -> f64 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        (dl * dl + da * da + db * db).sqrt()
    }

    /// Same chroma, different lightness (clamped to [0, 100]).
    #[inline]
    pub fn with_lightness(&self, l: f64) -> LabColor {
        LabColor {
            l: l.clamp(0.0, 100.0),
            ..*self
        }
    }
}

impl From<RGBColor> for LabColor {
    fn from(color: RGBColor) -> Self {
        Self::from_rgb(color)
    }
}

/// Convert sRGB to Lab.
#[inline]
pub fn to_lab(color: RGBColor) -> LabColor {
    LabColor::from_rgb(color)
}

/// Convert Lab to sRGB, clamping out-of-gamut channels.
#[inline]
pub fn to_srgb(lab: LabColor) -> RGBColor {
    lab.to_rgb()
}

#[inline]
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
fn lab_f(t: f64) -> f64 {
    if t > EPSILON {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

#[inline]
fn lab_f_inv(f: f64) -> f64 {
    let cube = f * f * f;
    if cube > EPSILON {
        cube
    } else {
        (116.0 * f - 16.0) / KAPPA
    }
}

/// Linear channel to an 8-bit sRGB channel; NaN maps to 0.
#[inline]
fn to_channel(linear: f64) -> u8 {
    if linear.is_nan() {
        return 0;
    }
    let encoded = linear_to_srgb(linear.clamp(0.0, 1.0));
    (encoded * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn within_one(a: RGBColor, b: RGBColor) -> bool {
        a.channels()
            .iter()
            .zip(b.channels().iter())
            .all(|(x, y)| x.abs_diff(*y) <= 1)
    }

    #[test]
    fn test_reference_values() {
        let white = to_lab(RGBColor::WHITE);
        assert!((white.l - 100.0).abs() < 0.01);
        assert!(white.a.abs() < 0.01 && white.b.abs() < 0.01);

        let black = to_lab(RGBColor::BLACK);
        assert!(black.l.abs() < 1e-9);

        // sRGB red is L=53.24, a=80.09, b=67.20
        let red = to_lab(RGBColor::new(255, 0, 0));
        assert!((red.l - 53.24).abs() < 0.05);
        assert!((red.a - 80.09).abs() < 0.1);
        assert!((red.b - 67.20).abs() < 0.1);
    }

    #[test]
    fn test_round_trip_grid() {
        for r in (0..=255u16).step_by(5) {
            for g in (0..=255u16).step_by(5) {
                for b in (0..=255u16).step_by(5) {
                    let c = RGBColor::new(r as u8, g as u8, b as u8);
                    let back = to_srgb(to_lab(c));
                    assert!(within_one(c, back), "{} -> {}", c, back);
                }
            }
        }
    }

    #[test]
    fn test_out_of_gamut_is_clamped() {
        let saturated = LabColor::new(50.0, 200.0, -200.0).to_rgb();
        assert_eq!(saturated.g, 0);

        assert_eq!(LabColor::new(150.0, 0.0, 0.0).to_rgb(), RGBColor::WHITE);
        assert_eq!(LabColor::new(-20.0, 0.0, 0.0).to_rgb(), RGBColor::BLACK);
        assert_eq!(LabColor::new(f64::NAN, 0.0, 0.0).to_rgb(), RGBColor::BLACK);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = to_lab(RGBColor::new(10, 20, 30));
        let b = to_lab(RGBColor::new(200, 100, 50));
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0).to_rgb(), RGBColor::new(200, 100, 50));
        assert!((a.delta_e(&b) - b.delta_e(&a)).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_round_trip_within_one_unit(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let c = RGBColor::new(r, g, b);
            let back = to_srgb(to_lab(c));
            prop_assert!(within_one(c, back), "{} -> {}", c, back);
        }

        #[test]
        fn prop_lightness_in_range(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let lab = to_lab(RGBColor::new(r, g, b));
            prop_assert!((-0.01..=100.01).contains(&lab.l));
        }
    }
}
