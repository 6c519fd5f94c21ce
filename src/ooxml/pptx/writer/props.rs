/// Document properties and the small presentation-level settings parts.
use super::{NS_A, NS_P, NS_R};
use crate::common::xml::{escape_xml, sanitize_text};
use crate::config::{AspectRatio, GeneratorConfig};
use crate::ooxml::error::Result;
use chrono::SecondsFormat;
use std::fmt::Write as FmtWrite;

const NS_CORE: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
const NS_EXTENDED: &str = "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
const NS_VTYPES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes";

/// Default table style GUID ("Medium Style 2 - Accent 1").
const DEFAULT_TABLE_STYLE: &str = "{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}";

/// Generate `docProps/core.xml`.
///
/// Timestamps are written only when `config.created` is set, so identical
/// input packages to identical bytes by default.
pub(crate) fn core_xml(title: Option<&str>, config: &GeneratorConfig) -> Result<String> {
    let mut xml = String::with_capacity(768);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<cp:coreProperties xmlns:cp="{}" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
        NS_CORE
    )?;
    if let Some(title) = title {
        write!(xml, "<dc:title>{}</dc:title>", escape_xml(&sanitize_text(title)))?;
    }
    if let Some(author) = &config.author {
        let author = escape_xml(&sanitize_text(author));
        write!(xml, "<dc:creator>{}</dc:creator>", author)?;
        write!(xml, "<cp:lastModifiedBy>{}</cp:lastModifiedBy>", author)?;
    }
    xml.push_str("<cp:revision>1</cp:revision>");
    if let Some(created) = config.created {
        let stamp = created.to_rfc3339_opts(SecondsFormat::Secs, true);
        write!(
            xml,
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            stamp
        )?;
        write!(
            xml,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
            stamp
        )?;
    }
    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

/// Generate `docProps/app.xml`.
pub(crate) fn app_xml(slides: usize, notes: usize, aspect_ratio: AspectRatio) -> Result<String> {
    let mut xml = String::with_capacity(512);
    let format = match aspect_ratio {
        AspectRatio::Widescreen => "Widescreen",
        AspectRatio::Standard => "On-screen Show (4:3)",
    };

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(xml, r#"<Properties xmlns="{}" xmlns:vt="{}">"#, NS_EXTENDED, NS_VTYPES)?;
    write!(xml, "<Application>{}</Application>", env!("CARGO_PKG_NAME"))?;
    write!(xml, "<PresentationFormat>{}</PresentationFormat>", format)?;
    write!(xml, "<Slides>{}</Slides>", slides)?;
    write!(xml, "<Notes>{}</Notes>", notes)?;
    xml.push_str("<HiddenSlides>0</HiddenSlides>");
    xml.push_str("</Properties>");
    Ok(xml)
}

pub(crate) fn pres_props_xml() -> Result<String> {
    let mut xml = String::with_capacity(256);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"/>"#,
        NS_A, NS_R, NS_P
    )?;
    Ok(xml)
}

pub(crate) fn view_props_xml() -> Result<String> {
    let mut xml = String::with_capacity(512);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<p:viewPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        NS_A, NS_R, NS_P
    )?;
    xml.push_str(r#"<p:normalViewPr><p:restoredLeft sz="15620"/><p:restoredTop sz="94660"/></p:normalViewPr>"#);
    xml.push_str(r#"<p:gridSpacing cx="76200" cy="76200"/>"#);
    xml.push_str("</p:viewPr>");
    Ok(xml)
}

pub(crate) fn table_styles_xml() -> Result<String> {
    let mut xml = String::with_capacity(256);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<a:tblStyleLst xmlns:a="{}" def="{}"/>"#,
        NS_A, DEFAULT_TABLE_STYLE
    )?;
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_core_without_timestamps() {
        let xml = core_xml(Some("Q3 & beyond"), &GeneratorConfig::default()).unwrap();
        assert!(xml.contains("<dc:title>Q3 &amp; beyond</dc:title>"));
        assert!(!xml.contains("dcterms:created"));
        assert!(!xml.contains("dc:creator"));
    }

    #[test]
    fn test_core_with_timestamp_and_author() {
        let created = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let config = GeneratorConfig::default()
            .with_created(Some(created))
            .with_author(Some("Dana"));
        let xml = core_xml(None, &config).unwrap();
        assert!(xml.contains(
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">2025-03-14T09:26:53Z</dcterms:created>"#
        ));
        assert!(xml.contains("<dc:creator>Dana</dc:creator>"));
    }

    #[test]
    fn test_app_counts() {
        let xml = app_xml(5, 1, AspectRatio::Standard).unwrap();
        assert!(xml.contains("<Slides>5</Slides>"));
        assert!(xml.contains("<Notes>1</Notes>"));
        assert!(xml.contains("On-screen Show (4:3)"));
        assert!(xml.contains("<Application>deckgene</Application>"));
    }
}
