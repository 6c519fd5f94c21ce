//! PowerPoint (.pptx) presentation support.
//!
//! - [`PresentationReader`]: opens existing packages for style analysis and
//!   verification
//! - [`PackageWriter`]: serializes compiled decks
//! - [`ImageFormat`]: media formats accepted on slides

pub mod format;
pub mod reader;
pub mod writer;

pub use format::ImageFormat;
pub use reader::PresentationReader;
pub use writer::PackageWriter;
