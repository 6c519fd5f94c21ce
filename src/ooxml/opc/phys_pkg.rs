//! Physical (ZIP) container of an OPC package.
//!
//! [`PhysPkgReader`] gives random access to the members of an existing archive;
//! [`PhysPkgWriter`] appends parts to a new in-memory archive. Both address
//! members by [`PackURI`].

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use std::io::{Cursor, Read, Write};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Read access to the members of a ZIP-based package held in memory.
pub struct PhysPkgReader<'data> {
    archive: ZipArchive<Cursor<&'data [u8]>>,
}

impl<'data> PhysPkgReader<'data> {
    /// Open an archive; fails if `data` is not a ZIP file.
    pub fn new(data: &'data [u8]) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))?;
        Ok(Self { archive })
    }

    /// Decompressed content of a part.
    pub fn blob_for(&mut self, pack_uri: &PackURI) -> Result<Vec<u8>> {
        let mut file = match self.archive.by_name(pack_uri.membername()) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => {
                return Err(OpcError::PartNotFound(pack_uri.to_string()));
            },
            Err(e) => return Err(e.into()),
        };
        let mut blob = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut blob)?;
        Ok(blob)
    }

    /// The `[Content_Types].xml` part every package carries.
    pub fn content_types_xml(&mut self) -> Result<Vec<u8>> {
        self.blob_for(&PackURI::new(CONTENT_TYPES_URI)?)
    }

    /// The `.rels` part of `source_uri`, or `None` when it has no relationships.
    pub fn rels_xml_for(&mut self, source_uri: &PackURI) -> Result<Option<Vec<u8>>> {
        match self.blob_for(&source_uri.rels_uri()?) {
            Ok(blob) => Ok(Some(blob)),
            Err(OpcError::PartNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Number of members, directories included.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    pub fn member_names(&self) -> Vec<String> {
        self.archive.file_names().map(String::from).collect()
    }

    pub fn contains(&self, pack_uri: &PackURI) -> bool {
        self.archive.index_for_name(pack_uri.membername()).is_some()
    }
}

/// Writes parts into a new in-memory ZIP archive.
///
/// Member timestamps are fixed, so identical parts written in the same order
/// always produce identical archive bytes.
pub struct PhysPkgWriter {
    archive: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl PhysPkgWriter {
    pub fn new() -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());
        Self {
            archive: ZipWriter::new(Cursor::new(Vec::new())),
            options,
        }
    }

    /// Write a part with Deflate compression.
    pub fn write(&mut self, pack_uri: &PackURI, blob: &[u8]) -> Result<()> {
        self.start(pack_uri, self.options)?;
        self.archive.write_all(blob)?;
        Ok(())
    }

    /// Write a part without compression, for already-compressed media.
    pub fn write_stored(&mut self, pack_uri: &PackURI, blob: &[u8]) -> Result<()> {
        let options = self.options.compression_method(CompressionMethod::Stored);
        self.start(pack_uri, options)?;
        self.archive.write_all(blob)?;
        Ok(())
    }

    fn start(&mut self, pack_uri: &PackURI, options: SimpleFileOptions) -> Result<()> {
        match self.archive.start_file(pack_uri.membername(), options) {
            Ok(()) => Ok(()),
            Err(ZipError::InvalidArchive(_)) => Err(OpcError::DuplicatePart(pack_uri.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Finish the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        Ok(self.archive.finish()?.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}
