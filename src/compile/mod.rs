//! Document compilation: outline + genome + images → slide object trees.
//!
//! The compiler is pure and synchronous; slides compile in parallel and come
//! back in outline order. Image fetching lives here too because its only
//! consumer is the compiler's picture placeholders.

// Submodule declarations
pub mod assets;
pub mod compiler;
pub mod contrast;
pub mod fit;
pub mod shape;

// Re-exports
pub use assets::{AssetResolver, DefaultFetcher, ImageAsset, ImageAssets, ImageFetcher, ImageRef};
pub use compiler::DocumentCompiler;
pub use contrast::{Contrast, ensure_contrast};
pub use shape::{
    CompiledDeck, CompiledShape, CompiledSlide, Geometry, MasterTheme, Paragraph, TextRun,
};
