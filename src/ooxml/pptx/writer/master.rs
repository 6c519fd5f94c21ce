/// Slide master and slide layout parts.
///
/// The master carries the deck background, the color map and the default
/// title/body text styles (theme fonts, scaled sizes). There is one layout
/// per [`LayoutTemplate`], its placeholders positioned with the base margin;
/// slides override the geometry with their own transforms.
use super::shape::{EmuRect, write_placeholder, write_solid_fill, write_tree_header, write_xfrm};
use super::{NS_A, NS_P, NS_R};
use crate::common::xml::escape_xml;
use crate::compile::MasterTheme;
use crate::layout::resolver::BASE_MARGIN;
use crate::layout::template::geometry;
use crate::layout::{LayoutTemplate, PlaceholderRole};
use crate::ooxml::error::Result;
use std::fmt::Write as FmtWrite;

/// `sldMasterId` of the only master.
pub(crate) const MASTER_ID: u32 = 2_147_483_648;

const COLOR_MAP: &str = r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#;

/// Generate `slideMaster1.xml`. `layout_r_ids` are the master's relationship
/// ids of the layouts, in [`LayoutTemplate::ALL`] order.
pub(crate) fn master_xml(
    master: &MasterTheme,
    layout_r_ids: &[String],
    slide_size: (i64, i64),
) -> Result<String> {
    let mut xml = String::with_capacity(4096);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        NS_A, NS_R, NS_P
    )?;
    xml.push_str("<p:cSld>");
    xml.push_str("<p:bg><p:bgPr>");
    write_solid_fill(&mut xml, master.background())?;
    xml.push_str("<a:effectLst/></p:bgPr></p:bg>");
    xml.push_str("<p:spTree>");
    write_tree_header(&mut xml);

    let placeholders = geometry(LayoutTemplate::TitleAndBody, BASE_MARGIN);
    for (id, placeholder) in (2u32..).zip(placeholders.iter()) {
        let (ph, name) = match placeholder.role {
            PlaceholderRole::Title => (r#"<p:ph type="title"/>"#, "Title Placeholder"),
            _ => (r#"<p:ph type="body" idx="1"/>"#, "Text Placeholder"),
        };
        xml.push_str("<p:sp>");
        xml.push_str("<p:nvSpPr>");
        write!(xml, r#"<p:cNvPr id="{}" name="{} {}"/>"#, id, name, id - 1)?;
        xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
        write!(xml, "<p:nvPr>{}</p:nvPr>", ph)?;
        xml.push_str("</p:nvSpPr>");
        xml.push_str("<p:spPr>");
        write_xfrm(&mut xml, EmuRect::from_bbox(placeholder.bbox, slide_size))?;
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
        xml.push_str("</p:spPr>");
        xml.push_str("<p:txBody>");
        xml.push_str(r#"<a:bodyPr vert="horz" wrap="square" rtlCol="0"><a:normAutofit/></a:bodyPr>"#);
        xml.push_str("<a:lstStyle/>");
        xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
        xml.push_str("</p:txBody>");
        xml.push_str("</p:sp>");
    }

    xml.push_str("</p:spTree>");
    xml.push_str("</p:cSld>");
    xml.push_str(COLOR_MAP);

    xml.push_str("<p:sldLayoutIdLst>");
    for (offset, r_id) in (1u32..).zip(layout_r_ids) {
        write!(
            xml,
            r#"<p:sldLayoutId id="{}" r:id="{}"/>"#,
            MASTER_ID + offset,
            r_id
        )?;
    }
    xml.push_str("</p:sldLayoutIdLst>");

    xml.push_str("<p:txStyles>");
    xml.push_str("<p:titleStyle>");
    write!(
        xml,
        r#"<a:lvl1pPr algn="l" defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1"><a:lnSpc><a:spcPct val="90000"/></a:lnSpc><a:spcBef><a:spcPct val="0"/></a:spcBef><a:buNone/><a:defRPr sz="{}" b="1" kern="1200"><a:solidFill><a:schemeClr val="tx2"/></a:solidFill><a:latin typeface="+mj-lt"/><a:ea typeface="+mj-ea"/><a:cs typeface="+mj-cs"/></a:defRPr></a:lvl1pPr>"#,
        master.title_size
    )?;
    xml.push_str("</p:titleStyle>");
    xml.push_str("<p:bodyStyle>");
    for level in 1..=3u32 {
        let indent = 285_750 * level;
        let size = match level {
            1 => master.body_size,
            _ => master.body_size.saturating_sub(200 * (level - 1)).max(100),
        };
        write!(
            xml,
            r#"<a:lvl{lvl}pPr marL="{marl}" indent="-285750" algn="l" defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1"><a:lnSpc><a:spcPct val="100000"/></a:lnSpc><a:spcBef><a:spcPts val="600"/></a:spcBef><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/><a:defRPr sz="{sz}" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/></a:defRPr></a:lvl{lvl}pPr>"#,
            lvl = level,
            marl = indent,
            sz = size
        )?;
    }
    xml.push_str("</p:bodyStyle>");
    xml.push_str(r#"<p:otherStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr></p:otherStyle>"#);
    xml.push_str("</p:txStyles>");
    xml.push_str("</p:sldMaster>");
    Ok(xml)
}

/// Generate `slideLayoutN.xml` for a template.
pub(crate) fn layout_xml(template: LayoutTemplate, slide_size: (i64, i64)) -> Result<String> {
    let mut xml = String::with_capacity(2048);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="{}" preserve="1">"#,
        NS_A,
        NS_R,
        NS_P,
        template.ooxml_type()
    )?;
    write!(xml, r#"<p:cSld name="{}">"#, escape_xml(template.name()))?;
    xml.push_str("<p:spTree>");
    write_tree_header(&mut xml);

    for (id, placeholder) in (2u32..).zip(geometry(template, BASE_MARGIN).iter()) {
        xml.push_str("<p:sp>");
        xml.push_str("<p:nvSpPr>");
        write!(
            xml,
            r#"<p:cNvPr id="{}" name="{} Placeholder {}"/>"#,
            id,
            placeholder.role,
            id - 1
        )?;
        xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
        xml.push_str("<p:nvPr>");
        write_placeholder(&mut xml, placeholder.role, template)?;
        xml.push_str("</p:nvPr>");
        xml.push_str("</p:nvSpPr>");
        xml.push_str("<p:spPr>");
        write_xfrm(&mut xml, EmuRect::from_bbox(placeholder.bbox, slide_size))?;
        xml.push_str("</p:spPr>");
        xml.push_str("<p:txBody>");
        xml.push_str("<a:bodyPr/>");
        xml.push_str("<a:lstStyle/>");
        xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
        xml.push_str("</p:txBody>");
        xml.push_str("</p:sp>");
    }

    xml.push_str("</p:spTree>");
    xml.push_str("</p:cSld>");
    xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
    xml.push_str("</p:sldLayout>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::PresetRegistry;

    fn master() -> MasterTheme {
        let genome = PresetRegistry::builtin().require("dark_cyber").unwrap();
        MasterTheme {
            name: genome.name().to_string(),
            palette: *genome.palette(),
            heading_font: genome.typography().heading_font.clone(),
            body_font: genome.typography().body_font.clone(),
            title_size: 4400,
            body_size: 2200,
        }
    }

    #[test]
    fn test_master_background_and_layout_ids() {
        let master = master();
        let r_ids: Vec<String> = (1..=5).map(|n| format!("rId{}", n)).collect();
        let xml = master_xml(&master, &r_ids, (12_192_000, 6_858_000)).unwrap();

        let bg = format!(r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/>"#, master.background().to_hex());
        assert!(xml.contains(&bg));
        assert!(xml.contains(r#"<p:sldLayoutId id="2147483649" r:id="rId1"/>"#));
        assert!(xml.contains(r#"<p:sldLayoutId id="2147483653" r:id="rId5"/>"#));
        assert!(xml.contains(r#"<a:defRPr sz="4400" b="1""#));
        assert!(xml.contains(r#"<a:lvl3pPr marL="857250""#));
    }

    #[test]
    fn test_layout_placeholders() {
        let xml = layout_xml(LayoutTemplate::TwoColumn, (9_144_000, 6_858_000)).unwrap();
        assert!(xml.contains(r#"type="twoObj""#));
        assert!(xml.contains(r#"<p:cSld name="Two Content">"#));
        assert!(xml.contains(r#"<p:ph type="title"/>"#));
        assert!(xml.contains(r#"<p:ph idx="1"/>"#));
        assert!(xml.contains(r#"<p:ph idx="2"/>"#));

        let cover = layout_xml(LayoutTemplate::TitleOnly, (9_144_000, 6_858_000)).unwrap();
        assert!(cover.contains(r#"<p:ph type="ctrTitle"/>"#));
        assert!(cover.contains(r#"<p:ph type="subTitle" idx="1"/>"#));
    }
}
