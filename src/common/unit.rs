//! Unit conversion utilities.
//!
//! PresentationML measures geometry in EMUs (English Metric Units) and font
//! sizes in hundredths of a point. Layout works in relative slide units
//! (0.0–1.0), which are mapped onto EMUs here.

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_PT: i64 = 12_700;

/// Font sizes in `<a:rPr sz="..."/>` are stored in 1/100 pt.
pub const CENTIPOINTS_PER_PT: f64 = 100.0;

#[inline]
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMUS_PER_INCH as f64).round() as i64
}

#[inline]
pub fn emu_to_pt_f64(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_PT as f64
}

#[inline]
pub fn pt_to_centipoints(pt: f64) -> u32 {
    (pt * CENTIPOINTS_PER_PT).round().max(100.0) as u32
}

#[inline]
pub fn centipoints_to_pt(centipoints: i64) -> f64 {
    centipoints as f64 / CENTIPOINTS_PER_PT
}

/// Map a relative coordinate (0.0–1.0) onto an EMU extent.
#[inline]
pub fn relative_to_emu(fraction: f64, extent: i64) -> i64 {
    (fraction.clamp(0.0, 1.0) * extent as f64).round() as i64
}
