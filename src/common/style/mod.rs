//! Color types and color-space conversion.

// Submodule declarations
pub mod color;
pub mod lab;

// Re-exports
pub use color::RGBColor;
pub use lab::{LabColor, to_lab, to_srgb};
