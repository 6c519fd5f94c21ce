//! Style synthesis: genomes, builtin presets, breeding and extraction.

// Submodule declarations
pub mod breeder;
pub mod extract;
pub mod genome;
pub mod presets;
pub mod tally;

// Re-exports
pub use breeder::StyleBreeder;
pub use extract::ReferenceStyleExtractor;
pub use genome::{
    Category, ColorRole, CornerRadius, LayoutPrefs, Motif, Palette, Provenance, StyleGenome,
    StyleGenomeBuilder, Typography,
};
pub use presets::PresetRegistry;
pub use tally::WeightedTally;
