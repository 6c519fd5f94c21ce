//! Read access to existing presentation packages.
//!
//! [`PresentationReader`] opens `.pptx` bytes, locates the main presentation
//! part through the package relationships and exposes slides in `sldIdLst`
//! order. It is used to analyse reference decks and to verify generated ones.

mod content;
mod theme;

pub use content::{ColorRef, FontRef, RunInfo, ShapeInfo, SlideContent};
pub use theme::Theme;

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::{PackURI, PhysPkgReader, Relationships};
use quick_xml::Reader;
use quick_xml::events::Event;
use theme::attr;

/// An opened presentation package.
pub struct PresentationReader<'data> {
    pkg: PhysPkgReader<'data>,
    pres_rels: Relationships,
    slides: Vec<PackURI>,
    slide_size: (i64, i64),
}

impl<'data> PresentationReader<'data> {
    /// Open a package held in memory.
    ///
    /// Fails when the bytes are not a ZIP archive, the package has no main
    /// presentation part, or `presentation.xml` is malformed.
    pub fn open(data: &'data [u8]) -> Result<Self> {
        let mut pkg = PhysPkgReader::new(data)?;

        let root = PackURI::package();
        let pkg_rels_xml = pkg
            .rels_xml_for(&root)?
            .ok_or_else(|| OoxmlError::InvalidFormat("package has no _rels/.rels".to_string()))?;
        let pkg_rels = Relationships::from_xml(root.base_uri(), &pkg_rels_xml)?;
        let presentation = pkg_rels
            .part_with_reltype(rt::OFFICE_DOCUMENT)?
            .target_partname()?;
        if !pkg.contains(&presentation) {
            return Err(OoxmlError::PartNotFound(presentation.to_string()));
        }

        let pres_xml = pkg.blob_for(&presentation)?;
        let pres_rels = load_rels(&mut pkg, &presentation)?;
        let (slide_r_ids, slide_size) = parse_presentation(&pres_xml)?;

        let slides = slide_r_ids
            .iter()
            .map(|r_id| {
                pres_rels
                    .get(r_id)
                    .ok_or_else(|| {
                        OoxmlError::InvalidFormat(format!("sldId references unknown {}", r_id))
                    })
                    .and_then(|rel| rel.target_partname().map_err(OoxmlError::from))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            pkg,
            pres_rels,
            slides,
            slide_size,
        })
    }

    /// Number of slides listed in `sldIdLst`.
    #[inline]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slide size `(cx, cy)` in EMUs; 10" × 7.5" when `sldSz` is absent.
    #[inline]
    pub fn slide_size(&self) -> (i64, i64) {
        self.slide_size
    }

    /// Raw bytes of any part.
    pub fn part(&mut self, partname: &PackURI) -> Result<Vec<u8>> {
        Ok(self.pkg.blob_for(partname)?)
    }

    /// Relationships owned by a part (empty when it has none).
    pub fn rels_for(&mut self, partname: &PackURI) -> Result<Relationships> {
        load_rels(&mut self.pkg, partname)
    }

    /// The first slide master, if the presentation declares one.
    pub fn master_partname(&self) -> Option<PackURI> {
        self.pres_rels
            .all_with_reltype(rt::SLIDE_MASTER)
            .first()
            .and_then(|rel| rel.target_partname().ok())
    }

    /// The theme used by the slide master (or the presentation).
    pub fn theme(&mut self) -> Result<Option<Theme>> {
        let from_master = match self.master_partname() {
            Some(master) => self
                .rels_for(&master)?
                .all_with_reltype(rt::THEME)
                .first()
                .and_then(|rel| rel.target_partname().ok()),
            None => None,
        };
        let theme_uri = from_master.or_else(|| {
            self.pres_rels
                .all_with_reltype(rt::THEME)
                .first()
                .and_then(|rel| rel.target_partname().ok())
        });

        match theme_uri {
            Some(uri) => Ok(Some(Theme::parse(&self.part(&uri)?)?)),
            None => Ok(None),
        }
    }

    /// Formatting facts of the slide at `index`.
    pub fn slide_content(&mut self, index: usize) -> Result<SlideContent> {
        let uri = self.slide_uri(index)?;
        SlideContent::parse(&self.part(&uri)?)
    }

    /// Formatting facts of the slide master.
    pub fn master_content(&mut self) -> Result<Option<SlideContent>> {
        match self.master_partname() {
            Some(master) => Ok(Some(SlideContent::parse(&self.part(&master)?)?)),
            None => Ok(None),
        }
    }

    /// Paragraph texts of the slide at `index`, in document order.
    pub fn slide_text(&mut self, index: usize) -> Result<Vec<String>> {
        let uri = self.slide_uri(index)?;
        paragraph_texts(&self.part(&uri)?, false)
    }

    /// Speaker notes of the slide at `index`, if it has a notes slide.
    pub fn notes_text(&mut self, index: usize) -> Result<Option<String>> {
        let uri = self.slide_uri(index)?;
        let notes = self
            .rels_for(&uri)?
            .all_with_reltype(rt::NOTES_SLIDE)
            .first()
            .map(|rel| rel.target_partname())
            .transpose()?;
        match notes {
            Some(notes) => {
                let paragraphs = paragraph_texts(&self.part(&notes)?, true)?;
                Ok(Some(paragraphs.join("\n")))
            },
            None => Ok(None),
        }
    }

    fn slide_uri(&self, index: usize) -> Result<PackURI> {
        self.slides.get(index).cloned().ok_or_else(|| {
            OoxmlError::PartNotFound(format!(
                "slide {} of {}",
                index + 1,
                self.slides.len()
            ))
        })
    }
}

fn load_rels(pkg: &mut PhysPkgReader<'_>, partname: &PackURI) -> Result<Relationships> {
    match pkg.rels_xml_for(partname)? {
        Some(xml) => Ok(Relationships::from_xml(partname.base_uri(), &xml)?),
        None => Ok(Relationships::for_source(partname)),
    }
}

/// Slide relationship ids in `sldIdLst` order and the slide size.
fn parse_presentation(xml: &[u8]) -> Result<(Vec<String>, (i64, i64))> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut r_ids = Vec::new();
    let mut size = (9_144_000, 6_858_000);
    let mut saw_root = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"presentation" => saw_root = true,
                b"sldId" => {
                    let r_id = e.attributes().flatten().find(|a| {
                        a.key.prefix().is_some() && a.key.local_name().as_ref() == b"id"
                    });
                    if let Some(r_id) = r_id {
                        r_ids.push(String::from_utf8_lossy(&r_id.value).into_owned());
                    }
                },
                b"sldSz" => {
                    let cx = attr(e, b"cx").and_then(|v| v.parse::<i64>().ok());
                    let cy = attr(e, b"cy").and_then(|v| v.parse::<i64>().ok());
                    if let (Some(cx), Some(cy)) = (cx, cy) {
                        size = (cx, cy);
                    }
                },
                _ => {},
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    if !saw_root {
        return Err(OoxmlError::InvalidFormat(
            "main part is not a PresentationML presentation".to_string(),
        ));
    }
    Ok((r_ids, size))
}

/// Concatenated run text per paragraph. With `body_only`, only paragraphs in
/// body placeholders are returned (the notes text of a notes slide).
fn paragraph_texts(xml: &[u8], body_only: bool) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);

    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut shape_is_body = false;
    let mut in_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"sp" => shape_is_body = false,
                b"ph" => shape_is_body = attr(e, b"type").is_none_or(|t| t == "body"),
                b"p" if e.name().prefix().is_some_and(|p| p.as_ref() == b"a") => {
                    current = Some(String::new())
                },
                b"t" => in_text = true,
                _ => {},
            },
            Event::Text(ref t) if in_text => {
                if let Some(current) = current.as_mut() {
                    current.push_str(&String::from_utf8_lossy(t));
                }
            },
            Event::GeneralRef(ref r) if in_text => {
                if let Some(current) = current.as_mut() {
                    let decoded = match &**r {
                        b"amp" => "&",
                        b"lt" => "<",
                        b"gt" => ">",
                        b"quot" => "\"",
                        b"apos" => "'",
                        _ => "",
                    };
                    current.push_str(decoded);
                }
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" if e.name().prefix().is_some_and(|p| p.as_ref() == b"a") => {
                    if let Some(done) = current.take() {
                        if !body_only || shape_is_body {
                            paragraphs.push(done);
                        }
                    }
                },
                _ => {},
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    Ok(paragraphs)
}
