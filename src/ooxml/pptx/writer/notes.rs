/// Notes master and notes-slide parts.
///
/// Written only when at least one slide carries speaker notes.
use super::shape::{EmuRect, write_tree_header, write_xfrm};
use super::{NS_A, NS_P, NS_R};
use crate::common::xml::{escape_xml, sanitize_text};
use crate::layout::BBox;
use crate::ooxml::error::Result;
use std::fmt::Write as FmtWrite;

/// Notes page size `(cx, cy)`: portrait 7.5" × 10".
pub(crate) const NOTES_SIZE: (i64, i64) = (6_858_000, 9_144_000);

/// Generate `notesMaster1.xml`.
pub(crate) fn notes_master_xml() -> Result<String> {
    let mut xml = String::with_capacity(2048);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<p:notesMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        NS_A, NS_R, NS_P
    )?;
    xml.push_str("<p:cSld>");
    xml.push_str(r#"<p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#);
    xml.push_str("<p:spTree>");
    write_tree_header(&mut xml);

    let image = BBox::new(0.125, 0.075, 0.75, 0.375);
    let body = BBox::new(0.1, 0.475, 0.8, 0.375);
    for (id, name, ph, bbox) in [
        (2, "Slide Image Placeholder 1", r#"<p:ph type="sldImg" idx="2"/>"#, image),
        (3, "Notes Placeholder 2", r#"<p:ph type="body" sz="quarter" idx="3"/>"#, body),
    ] {
        xml.push_str("<p:sp>");
        xml.push_str("<p:nvSpPr>");
        write!(xml, r#"<p:cNvPr id="{}" name="{}"/>"#, id, name)?;
        xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
        write!(xml, "<p:nvPr>{}</p:nvPr>", ph)?;
        xml.push_str("</p:nvSpPr>");
        xml.push_str("<p:spPr>");
        write_xfrm(&mut xml, EmuRect::from_bbox(bbox, NOTES_SIZE))?;
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
        xml.push_str("</p:spPr>");
        if id == 3 {
            xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
            xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
            xml.push_str("</p:txBody>");
        }
        xml.push_str("</p:sp>");
    }

    xml.push_str("</p:spTree>");
    xml.push_str("</p:cSld>");
    xml.push_str(r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#);
    xml.push_str("<p:notesStyle>");
    xml.push_str(r#"<a:lvl1pPr marL="0" algn="l" defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1"><a:defRPr sz="1200" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/></a:defRPr></a:lvl1pPr>"#);
    xml.push_str("</p:notesStyle>");
    xml.push_str("</p:notesMaster>");
    Ok(xml)
}

/// Generate `notesSlideN.xml`: a slide image placeholder and a body
/// placeholder holding one paragraph per line of `notes`.
pub(crate) fn notes_slide_xml(notes: &str) -> Result<String> {
    let mut xml = String::with_capacity(1024 + notes.len());

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<p:notes xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        NS_A, NS_R, NS_P
    )?;
    xml.push_str("<p:cSld>");
    xml.push_str("<p:spTree>");
    write_tree_header(&mut xml);

    xml.push_str("<p:sp>");
    xml.push_str("<p:nvSpPr>");
    xml.push_str(r#"<p:cNvPr id="2" name="Slide Image Placeholder 1"/>"#);
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1" noRot="1" noChangeAspect="1"/></p:cNvSpPr>"#);
    xml.push_str(r#"<p:nvPr><p:ph type="sldImg"/></p:nvPr>"#);
    xml.push_str("</p:nvSpPr>");
    xml.push_str("<p:spPr/>");
    xml.push_str("</p:sp>");

    xml.push_str("<p:sp>");
    xml.push_str("<p:nvSpPr>");
    xml.push_str(r#"<p:cNvPr id="3" name="Notes Placeholder 2"/>"#);
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
    xml.push_str(r#"<p:nvPr><p:ph type="body" idx="1"/></p:nvPr>"#);
    xml.push_str("</p:nvSpPr>");
    xml.push_str("<p:spPr/>");
    xml.push_str("<p:txBody>");
    xml.push_str("<a:bodyPr/>");
    xml.push_str("<a:lstStyle/>");
    for line in notes.lines() {
        xml.push_str("<a:p>");
        if line.is_empty() {
            xml.push_str(r#"<a:endParaRPr lang="en-US" dirty="0"/>"#);
        } else {
            write!(
                xml,
                r#"<a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r>"#,
                escape_xml(&sanitize_text(line))
            )?;
        }
        xml.push_str("</a:p>");
    }
    if notes.lines().next().is_none() {
        xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
    }
    xml.push_str("</p:txBody>");
    xml.push_str("</p:sp>");

    xml.push_str("</p:spTree>");
    xml.push_str("</p:cSld>");
    xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
    xml.push_str("</p:notes>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_master_placeholders() {
        let xml = notes_master_xml().unwrap();
        assert!(xml.contains(r#"<p:ph type="sldImg" idx="2"/>"#));
        assert!(xml.contains(r#"<p:ph type="body" sz="quarter" idx="3"/>"#));
        assert!(xml.ends_with("</p:notesMaster>"));
    }

    #[test]
    fn test_notes_lines_become_paragraphs() {
        let xml = notes_slide_xml("Open with the demo\nThen <pricing> & Q&A").unwrap();
        assert_eq!(xml.matches("<a:p>").count(), 2);
        assert!(xml.contains("Then &lt;pricing&gt; &amp; Q&amp;A"));
        assert!(xml.contains(r#"<p:ph type="body" idx="1"/>"#));
    }

    #[test]
    fn test_empty_notes_still_valid() {
        let xml = notes_slide_xml("").unwrap();
        assert_eq!(xml.matches("<a:p>").count(), 1);
        assert!(xml.ends_with("</p:notes>"));
    }
}
