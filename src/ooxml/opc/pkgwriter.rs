//! Assembly of an OPC package from serialized parts.
//!
//! [`PackageBuilder`] collects parts with their content types and
//! relationships, then writes `[Content_Types].xml`, `_rels/.rels` and every
//! part (followed by its `.rels`) in insertion order.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::{content_type as ct, namespace};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgWriter;
use crate::ooxml::opc::rel::Relationships;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

struct PackagePart {
    partname: PackURI,
    blob: Vec<u8>,
    rels: Option<Relationships>,
    /// Stored without compression (media that is already compressed)
    stored: bool,
}

/// In-memory package under construction.
pub struct PackageBuilder {
    rels: Relationships,
    parts: Vec<PackagePart>,
    names: HashSet<PackURI>,
    content_types: ContentTypes,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self {
            rels: Relationships::for_source(&PackURI::package()),
            parts: Vec::new(),
            names: HashSet::new(),
            content_types: ContentTypes::new(),
        }
    }

    /// Package-level relationships (`_rels/.rels`).
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Add an XML part, registered under an `Override` content type.
    pub fn add_xml_part(
        &mut self,
        partname: PackURI,
        content_type: &str,
        xml: String,
        rels: Option<Relationships>,
    ) -> Result<()> {
        self.content_types.add_override(&partname, content_type);
        self.push(partname, xml.into_bytes(), rels, false)
    }

    /// Add a binary media part, registered under a `Default` for its extension.
    pub fn add_media_part(&mut self, partname: PackURI, content_type: &str, blob: Vec<u8>) -> Result<()> {
        self.content_types.add_default(partname.ext(), content_type);
        self.push(partname, blob, None, true)
    }

    fn push(
        &mut self,
        partname: PackURI,
        blob: Vec<u8>,
        rels: Option<Relationships>,
        stored: bool,
    ) -> Result<()> {
        if !self.names.insert(partname.clone()) {
            return Err(OpcError::DuplicatePart(partname.to_string()));
        }
        self.parts.push(PackagePart {
            partname,
            blob,
            rels: rels.filter(|r| !r.is_empty()),
            stored,
        });
        Ok(())
    }

    pub fn contains(&self, partname: &PackURI) -> bool {
        self.names.contains(partname)
    }

    /// Every internal relationship target must be a part of this package.
    fn check_targets(&self) -> Result<()> {
        let all_rels = std::iter::once(&self.rels).chain(self.parts.iter().filter_map(|p| p.rels.as_ref()));
        for rels in all_rels {
            for rel in rels.iter().filter(|rel| !rel.is_external()) {
                let target = rel.target_partname()?;
                if !self.names.contains(&target) {
                    return Err(OpcError::PartNotFound(format!(
                        "relationship {} targets missing part {}",
                        rel.r_id(),
                        target
                    )));
                }
            }
        }
        Ok(())
    }

    /// Serialize the package to ZIP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.check_targets()?;

        let mut writer = PhysPkgWriter::new();
        writer.write(
            &PackURI::new(CONTENT_TYPES_URI)?,
            self.content_types.to_xml().as_bytes(),
        )?;
        writer.write(&PackURI::package().rels_uri()?, self.rels.to_xml().as_bytes())?;

        for part in &self.parts {
            if part.stored {
                writer.write_stored(&part.partname, &part.blob)?;
            } else {
                writer.write(&part.partname, &part.blob)?;
            }
            if let Some(rels) = &part.rels {
                writer.write(&part.partname.rels_uri()?, rels.to_xml().as_bytes())?;
            }
        }

        writer.finish()
    }
}

impl Default for PackageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `[Content_Types].xml` content: `Default` entries by extension and
/// `Override` entries by partname, both written in sorted order.
#[derive(Debug, Clone)]
pub struct ContentTypes {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl ContentTypes {
    pub fn new() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());
        Self {
            defaults,
            overrides: BTreeMap::new(),
        }
    }

    pub fn add_default(&mut self, ext: &str, content_type: &str) {
        self.defaults
            .insert(ext.to_ascii_lowercase(), content_type.to_string());
    }

    pub fn add_override(&mut self, partname: &PackURI, content_type: &str) {
        self.overrides
            .insert(partname.to_string(), content_type.to_string());
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(512 + self.overrides.len() * 160);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        let _ = write!(xml, r#"<Types xmlns="{}">"#, namespace::OPC_CONTENT_TYPES);

        for (ext, content_type) in &self.defaults {
            let _ = write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(content_type)
            );
        }
        for (partname, content_type) in &self.overrides {
            let _ = write!(
                xml,
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                escape_xml(content_type)
            );
        }

        xml.push_str("</Types>");
        xml
    }
}

impl Default for ContentTypes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::relationship_type as rt;
    use crate::ooxml::opc::phys_pkg::PhysPkgReader;

    #[test]
    fn test_content_types_xml() {
        let mut cti = ContentTypes::new();
        cti.add_default("PNG", ct::PNG);
        cti.add_override(
            &PackURI::new("/ppt/presentation.xml").unwrap(),
            ct::PML_PRESENTATION_MAIN,
        );
        let xml = cti.to_xml();
        assert!(xml.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
        assert!(xml.contains(r#"<Default Extension="rels""#));
        assert!(xml.contains(r#"<Override PartName="/ppt/presentation.xml""#));
    }

    #[test]
    fn test_builder_writes_parts_and_rels() {
        let mut pkg = PackageBuilder::new();
        let pres = PackURI::new("/ppt/presentation.xml").unwrap();
        pkg.rels_mut().get_or_add(rt::OFFICE_DOCUMENT, &pres);
        pkg.add_xml_part(pres.clone(), ct::PML_PRESENTATION_MAIN, "<p/>".into(), None)
            .unwrap();
        let bytes = pkg.to_bytes().unwrap();

        let mut reader = PhysPkgReader::new(&bytes).unwrap();
        assert!(reader.contains(&PackURI::new("/_rels/.rels").unwrap()));
        let ct_xml = String::from_utf8(reader.content_types_xml().unwrap()).unwrap();
        assert!(ct_xml.contains(ct::PML_PRESENTATION_MAIN));
        assert_eq!(reader.blob_for(&pres).unwrap(), b"<p/>");
    }

    #[test]
    fn test_duplicate_and_dangling_parts_rejected() {
        let mut pkg = PackageBuilder::new();
        let part = PackURI::new("/a.xml").unwrap();
        pkg.add_xml_part(part.clone(), ct::XML, "<a/>".into(), None)
            .unwrap();
        assert!(matches!(
            pkg.add_xml_part(part, ct::XML, "<a/>".into(), None),
            Err(OpcError::DuplicatePart(_))
        ));

        pkg.rels_mut()
            .get_or_add(rt::IMAGE, &PackURI::new("/media/missing.png").unwrap());
        assert!(matches!(pkg.to_bytes(), Err(OpcError::PartNotFound(_))));
    }
}
