/// The main `presentation.xml` part.
use super::master::MASTER_ID;
use super::notes::NOTES_SIZE;
use super::{NS_A, NS_P, NS_R};
use crate::ooxml::error::Result;
use std::fmt::Write as FmtWrite;

/// First `sldId`; PowerPoint reserves lower values.
const FIRST_SLIDE_ID: u32 = 256;

/// Relationship ids the presentation part refers to.
#[derive(Debug)]
pub(crate) struct PresentationRels<'a> {
    pub master: &'a str,
    pub notes_master: Option<&'a str>,
    /// One per slide, in deck order
    pub slides: &'a [String],
}

/// Generate `presentation.xml`.
pub(crate) fn presentation_xml(rels: &PresentationRels<'_>, slide_size: (i64, i64)) -> Result<String> {
    let mut xml = String::with_capacity(1024 + rels.slides.len() * 48);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        NS_A, NS_R, NS_P
    )?;

    // Write slide master ID list
    xml.push_str("<p:sldMasterIdLst>");
    write!(
        xml,
        r#"<p:sldMasterId id="{}" r:id="{}"/>"#,
        MASTER_ID, rels.master
    )?;
    xml.push_str("</p:sldMasterIdLst>");

    if let Some(notes_master) = rels.notes_master {
        write!(
            xml,
            r#"<p:notesMasterIdLst><p:notesMasterId r:id="{}"/></p:notesMasterIdLst>"#,
            notes_master
        )?;
    }

    // Write slide ID list
    if !rels.slides.is_empty() {
        xml.push_str("<p:sldIdLst>");
        for (slide_id, r_id) in (FIRST_SLIDE_ID..).zip(rels.slides) {
            write!(xml, r#"<p:sldId id="{}" r:id="{}"/>"#, slide_id, r_id)?;
        }
        xml.push_str("</p:sldIdLst>");
    }

    write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}"/>"#,
        slide_size.0, slide_size.1
    )?;
    write!(
        xml,
        r#"<p:notesSz cx="{}" cy="{}"/>"#,
        NOTES_SIZE.0, NOTES_SIZE.1
    )?;
    xml.push_str(r#"<p:defaultTextStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr></p:defaultTextStyle>"#);
    xml.push_str("</p:presentation>");

    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_and_sizes() {
        let slides = vec!["rId2".to_string(), "rId3".to_string()];
        let xml = presentation_xml(
            &PresentationRels {
                master: "rId1",
                notes_master: Some("rId4"),
                slides: &slides,
            },
            (12_192_000, 6_858_000),
        )
        .unwrap();

        assert!(xml.contains(r#"<p:sldMasterId id="2147483648" r:id="rId1"/>"#));
        assert!(xml.contains(r#"<p:notesMasterId r:id="rId4"/>"#));
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/>"#));
        assert!(xml.contains(r#"<p:sldSz cx="12192000" cy="6858000"/>"#));
        assert!(xml.contains(r#"<p:notesSz cx="6858000" cy="9144000"/>"#));

        // Masters precede notes masters, which precede slides
        let master = xml.find("sldMasterIdLst").unwrap();
        let notes = xml.find("notesMasterIdLst").unwrap();
        let slides = xml.find("sldIdLst").unwrap();
        assert!(master < notes && notes < slides);
    }

    #[test]
    fn test_no_notes_master() {
        let xml = presentation_xml(
            &PresentationRels {
                master: "rId1",
                notes_master: None,
                slides: &[],
            },
            (9_144_000, 6_858_000),
        )
        .unwrap();
        assert!(!xml.contains("notesMasterIdLst"));
        assert!(!xml.contains("<p:sldIdLst>"));
    }
}
