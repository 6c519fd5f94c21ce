//! Deckgene - style-genome breeding and `.pptx` compilation
//!
//! Deckgene turns a structured outline into a PresentationML package whose
//! look comes from a *style genome*: a palette, a type pairing and a few
//! layout preferences. Genomes come from builtin presets, from crossing two
//! presets, or from an existing `.pptx` used as a reference.
//!
//! # Features
//!
//! - **Presets**: six builtin genomes, extensible from YAML
//! - **Breeding**: perceptual (CIELAB) palette blending between two genomes
//! - **Extraction**: recover a genome from a reference deck's theme and slides
//! - **Compilation**: layout templates, contrast repair and text fitting
//! - **Packaging**: deterministic OPC output readable by PowerPoint, Keynote
//!   and LibreOffice
//!
//! # Example - Generating a deck
//!
//! ```no_run
//! use deckgene::{ContentShape, Generator, GeneratorConfig, Outline, OutlineSlide, StyleReference};
//! use std::collections::BTreeMap;
//!
//! # async fn run() -> deckgene::Result<()> {
//! let generator = Generator::new(GeneratorConfig::default())?;
//! let outline = Outline::new(vec![
//!     OutlineSlide::new("Launch Plan", ContentShape::TitleOnly),
//!     OutlineSlide::new("Goals", ContentShape::Bullets)
//!         .with_blocks(["Ship the beta", "Grow signups"]),
//! ]);
//!
//! let style = StyleReference::breed("modern_minimal", "tech_startup", 0.3);
//! let deck = generator.generate(&outline, &style, &BTreeMap::new()).await?;
//! println!("{} slides in {}", deck.metadata.slide_count, deck.metadata.style_id_used);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Breeding without generating
//!
//! ```
//! use deckgene::{PresetRegistry, StyleBreeder};
//!
//! let registry = PresetRegistry::builtin();
//! let a = registry.require("corporate_classic").unwrap();
//! let b = registry.require("creative_bold").unwrap();
//! let child = StyleBreeder::new().breed(a, b, 0.5);
//! assert_eq!(child.typography().heading_font, a.typography().heading_font);
//! ```

/// Shared utilities: colors, units, XML text helpers and the error type
pub mod common;

/// Generator configuration
pub mod config;

/// Outline input model
pub mod outline;

/// Style genomes, presets, breeding and reference extraction
pub mod style;

/// Layout templates and placeholder geometry
pub mod layout;

/// Outline + genome → compiled slide trees
pub mod compile;

/// OPC packaging and PresentationML reading/writing
pub mod ooxml;

/// End-to-end generation pipeline
pub mod pipeline;

// Re-export commonly used types for convenience
pub use common::{Error, ErrorKind, ErrorReport, Result, Warning};
pub use compile::{DefaultFetcher, ImageFetcher, ImageRef};
pub use config::{AspectRatio, FontSizes, GeneratorConfig};
pub use outline::{BlockKind, ContentBlock, ContentShape, Outline, OutlineSlide};
pub use pipeline::{CancellationFlag, DeckMetadata, GeneratedDeck, Generator, StyleReference};
pub use style::{PresetRegistry, StyleBreeder, StyleGenome};
