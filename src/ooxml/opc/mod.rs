/// Open Packaging Conventions (OPC) support.
///
/// A presentation is an OPC package: a ZIP archive of XML and media parts,
/// linked by relationship parts and typed by `[Content_Types].xml`.
///
/// - [`PackURI`]: part names
/// - [`Relationships`]: `.rels` parts, read and written
/// - [`PhysPkgReader`] / [`PhysPkgWriter`]: the ZIP container
/// - [`PackageBuilder`]: assembles a complete package from parts
pub mod constants;
pub mod error;
pub mod packuri;
pub mod phys_pkg;
pub mod pkgwriter;
pub mod rel;

pub use error::OpcError;
pub use packuri::PackURI;
pub use phys_pkg::{PhysPkgReader, PhysPkgWriter};
pub use pkgwriter::{ContentTypes, PackageBuilder};
pub use rel::{Relationship, Relationships};
