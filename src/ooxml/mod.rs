//! Office Open XML (OOXML) support for presentations.
//!
//! The module is organized in two layers:
//!
//! 1. **OPC layer** (`opc`): package handling (ZIP container, part names,
//!    relationships, content types)
//! 2. **PresentationML** (`pptx`): reading reference decks and writing
//!    compiled ones
//!
//! # Example: reopening a generated deck
//!
//! ```rust,no_run
//! use deckgene::ooxml::pptx::PresentationReader;
//!
//! let bytes = std::fs::read("deck.pptx")?;
//! let mut reader = PresentationReader::open(&bytes)?;
//! for index in 0..reader.slide_count() {
//!     println!("{:?}", reader.slide_text(index)?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod error;
pub mod opc;
pub mod pptx;

// Re-export commonly used types from OPC layer
pub use opc::{PackURI, PackageBuilder};

// Re-export error types
pub use error::{OoxmlError, Result};
