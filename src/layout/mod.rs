//! Slide layout: template selection and placeholder geometry.
//!
//! Every outline slide maps to one of a closed set of templates. Geometry is
//! expressed in relative slide units so the same layout serves every aspect
//! ratio; the genome's spacing unit scales the uniform margin.

pub mod resolver;
pub mod template;

pub use resolver::LayoutResolver;
pub use template::{BBox, LayoutTemplate, Placeholder, PlaceholderRole, ResolvedSlide};
