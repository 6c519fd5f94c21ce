//! Common types, traits, and utilities shared across the crate.
//!
//! Colors, unit conversion, XML text helpers and the unified error type live
//! here so both the style engine and the package writer can use them.

// Submodule declarations
pub mod error;
pub mod style;
pub mod unit;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, ErrorKind, ErrorReport, Result, Warning};
pub use style::{LabColor, RGBColor};
