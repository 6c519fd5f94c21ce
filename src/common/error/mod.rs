//! Unified error types for deckgene.
//!
//! This module provides a unified error type that encompasses errors from the
//! style engine, the compiler and the OOXML layer, presenting a consistent API.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, ErrorKind, ErrorReport, Result, Warning};
