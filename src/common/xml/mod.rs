//! XML text helpers shared by the package writer.

mod escape;

pub use escape::{escape_xml, sanitize_text};
