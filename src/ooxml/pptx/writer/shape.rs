/// DrawingML serialization of compiled shapes.
use super::relmap::SlideRels;
use crate::common::style::RGBColor;
use crate::common::unit::relative_to_emu;
use crate::common::xml::{escape_xml, sanitize_text};
use crate::compile::{CompiledShape, Geometry, Paragraph, TextRun};
use crate::layout::{BBox, LayoutTemplate, PlaceholderRole};
use crate::ooxml::error::Result;
use std::fmt::Write as FmtWrite;

/// Left margin of one bullet level, in EMUs.
const BULLET_INDENT: i64 = 285_750;

/// A rectangle in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EmuRect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl EmuRect {
    /// Map a relative box onto a slide of `(cx, cy)` EMUs.
    pub fn from_bbox(bbox: BBox, (slide_cx, slide_cy): (i64, i64)) -> Self {
        let x = relative_to_emu(bbox.x, slide_cx);
        let y = relative_to_emu(bbox.y, slide_cy);
        // Extents are derived from the far edge so adjacent boxes stay flush
        let cx = relative_to_emu(bbox.right(), slide_cx) - x;
        let cy = relative_to_emu(bbox.bottom(), slide_cy) - y;
        Self {
            x,
            y,
            cx: cx.max(0),
            cy: cy.max(0),
        }
    }
}

/// `p:nvGrpSpPr` and `p:grpSpPr` that open every shape tree.
pub(crate) fn write_tree_header(xml: &mut String) {
    xml.push_str("<p:nvGrpSpPr>");
    xml.push_str(r#"<p:cNvPr id="1" name=""/>"#);
    xml.push_str("<p:cNvGrpSpPr/>");
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvGrpSpPr>");
    xml.push_str("<p:grpSpPr>");
    xml.push_str("<a:xfrm>");
    xml.push_str(r#"<a:off x="0" y="0"/>"#);
    xml.push_str(r#"<a:ext cx="0" cy="0"/>"#);
    xml.push_str(r#"<a:chOff x="0" y="0"/>"#);
    xml.push_str(r#"<a:chExt cx="0" cy="0"/>"#);
    xml.push_str("</a:xfrm>");
    xml.push_str("</p:grpSpPr>");
}

pub(crate) fn write_xfrm(xml: &mut String, rect: EmuRect) -> Result<()> {
    xml.push_str("<a:xfrm>");
    write!(xml, r#"<a:off x="{}" y="{}"/>"#, rect.x, rect.y)?;
    write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, rect.cx, rect.cy)?;
    xml.push_str("</a:xfrm>");
    Ok(())
}

pub(crate) fn write_solid_fill(xml: &mut String, color: RGBColor) -> Result<()> {
    write!(
        xml,
        r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
        color.to_hex()
    )?;
    Ok(())
}

fn write_geometry(xml: &mut String, geometry: Geometry) -> Result<()> {
    write!(xml, r#"<a:prstGeom prst="{}">"#, geometry.preset())?;
    match geometry {
        Geometry::RoundRect(adj) => {
            write!(xml, r#"<a:avLst><a:gd name="adj" fmla="val {}"/></a:avLst>"#, adj)?
        },
        Geometry::Rect | Geometry::Ellipse => xml.push_str("<a:avLst/>"),
    }
    xml.push_str("</a:prstGeom>");
    Ok(())
}

/// `<p:ph .../>` for a role on a given layout.
pub(crate) fn write_placeholder(
    xml: &mut String,
    role: PlaceholderRole,
    layout: LayoutTemplate,
) -> Result<()> {
    xml.push_str("<p:ph");
    if let Some(ph_type) = role.ph_type(layout) {
        write!(xml, r#" type="{}""#, ph_type)?;
    }
    if let Some(idx) = role.ph_idx() {
        write!(xml, r#" idx="{}""#, idx)?;
    }
    xml.push_str("/>");
    Ok(())
}

fn write_run(xml: &mut String, run: &TextRun) -> Result<()> {
    xml.push_str("<a:r>");
    write!(xml, r#"<a:rPr lang="en-US" sz="{}""#, run.size)?;
    if run.bold {
        xml.push_str(r#" b="1""#);
    }
    xml.push_str(r#" dirty="0">"#);
    write_solid_fill(xml, run.color)?;
    let font = escape_xml(&run.font);
    write!(xml, r#"<a:latin typeface="{}"/><a:cs typeface="{}"/>"#, font, font)?;
    xml.push_str("</a:rPr>");
    write!(xml, "<a:t>{}</a:t>", escape_xml(&sanitize_text(&run.text)))?;
    xml.push_str("</a:r>");
    Ok(())
}

pub(crate) fn write_paragraph(xml: &mut String, paragraph: &Paragraph) -> Result<()> {
    xml.push_str("<a:p>");
    if paragraph.bullet {
        let level = paragraph.level as i64;
        write!(
            xml,
            r#"<a:pPr marL="{}" lvl="{}" indent="{}"><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/></a:pPr>"#,
            BULLET_INDENT * (level + 1),
            level,
            -BULLET_INDENT
        )?;
    } else {
        xml.push_str(r#"<a:pPr marL="0" indent="0"><a:buNone/></a:pPr>"#);
    }
    for run in &paragraph.runs {
        write_run(xml, run)?;
    }
    match paragraph.runs.last() {
        Some(run) => write!(xml, r#"<a:endParaRPr lang="en-US" sz="{}" dirty="0"/>"#, run.size)?,
        None => xml.push_str(r#"<a:endParaRPr lang="en-US" dirty="0"/>"#),
    }
    xml.push_str("</a:p>");
    Ok(())
}

/// Serialize one compiled shape with the drawing id `id`.
pub(crate) fn write_shape(
    xml: &mut String,
    shape: &CompiledShape,
    id: u32,
    layout: LayoutTemplate,
    slide_size: (i64, i64),
    rels: &SlideRels,
) -> Result<()> {
    let rect = EmuRect::from_bbox(shape.bbox(), slide_size);
    match shape {
        CompiledShape::Text {
            role, paragraphs, ..
        } => {
            xml.push_str("<p:sp>");
            xml.push_str("<p:nvSpPr>");
            write!(xml, r#"<p:cNvPr id="{}" name="{} {}"/>"#, id, role, id)?;
            xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
            xml.push_str("<p:nvPr>");
            write_placeholder(xml, *role, layout)?;
            xml.push_str("</p:nvPr>");
            xml.push_str("</p:nvSpPr>");

            xml.push_str("<p:spPr>");
            write_xfrm(xml, rect)?;
            xml.push_str("</p:spPr>");

            xml.push_str("<p:txBody>");
            let anchor = if role.is_heading() { "ctr" } else { "t" };
            write!(
                xml,
                r#"<a:bodyPr wrap="square" rtlCol="0" anchor="{}"><a:normAutofit/></a:bodyPr>"#,
                anchor
            )?;
            xml.push_str("<a:lstStyle/>");
            if paragraphs.is_empty() {
                xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
            }
            for paragraph in paragraphs {
                write_paragraph(xml, paragraph)?;
            }
            xml.push_str("</p:txBody>");
            xml.push_str("</p:sp>");
        },
        CompiledShape::Picture { role, asset_id, .. } => {
            let r_id = rels.image_id(asset_id)?;
            xml.push_str("<p:pic>");
            xml.push_str("<p:nvPicPr>");
            write!(
                xml,
                r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
                id,
                id,
                escape_xml(asset_id)
            )?;
            xml.push_str(r#"<p:cNvPicPr><a:picLocks noGrp="1" noChangeAspect="1"/></p:cNvPicPr>"#);
            xml.push_str("<p:nvPr>");
            write_placeholder(xml, *role, layout)?;
            xml.push_str("</p:nvPr>");
            xml.push_str("</p:nvPicPr>");

            xml.push_str("<p:blipFill>");
            write!(xml, r#"<a:blip r:embed="{}"/>"#, r_id)?;
            xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
            xml.push_str("</p:blipFill>");

            xml.push_str("<p:spPr>");
            write_xfrm(xml, rect)?;
            write_geometry(xml, Geometry::Rect)?;
            xml.push_str("</p:spPr>");
            xml.push_str("</p:pic>");
        },
        CompiledShape::Decoration {
            role,
            fill,
            geometry,
            ..
        } => {
            xml.push_str("<p:sp>");
            xml.push_str("<p:nvSpPr>");
            match role {
                Some(role) => write!(xml, r#"<p:cNvPr id="{}" name="{} {}"/>"#, id, role, id)?,
                None => write!(xml, r#"<p:cNvPr id="{}" name="Decoration {}"/>"#, id, id)?,
            }
            xml.push_str("<p:cNvSpPr/>");
            xml.push_str("<p:nvPr/>");
            xml.push_str("</p:nvSpPr>");

            xml.push_str("<p:spPr>");
            write_xfrm(xml, rect)?;
            write_geometry(xml, *geometry)?;
            write_solid_fill(xml, *fill)?;
            xml.push_str("<a:ln><a:noFill/></a:ln>");
            xml.push_str("</p:spPr>");
            xml.push_str("</p:sp>");
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, bold: bool) -> TextRun {
        TextRun {
            text: text.to_string(),
            font: "Inter".to_string(),
            size: 2000,
            color: RGBColor::new(0x1A, 0x1A, 0x2E),
            bold,
        }
    }

    #[test]
    fn test_emu_rect() {
        let rect = EmuRect::from_bbox(BBox::new(0.5, 0.0, 0.5, 1.0), (12_192_000, 6_858_000));
        assert_eq!(
            rect,
            EmuRect {
                x: 6_096_000,
                y: 0,
                cx: 6_096_000,
                cy: 6_858_000
            }
        );
    }

    #[test]
    fn test_run_property_order() {
        let mut xml = String::new();
        write_paragraph(
            &mut xml,
            &Paragraph {
                runs: vec![run("R&D <2025>", true)],
                bullet: false,
                level: 0,
            },
        )
        .unwrap();
        assert!(xml.contains(r#"<a:rPr lang="en-US" sz="2000" b="1" dirty="0">"#));
        let fill = xml.find("<a:solidFill>").unwrap();
        let latin = xml.find("<a:latin").unwrap();
        assert!(fill < latin);
        assert!(xml.contains("<a:t>R&amp;D &lt;2025&gt;</a:t>"));
        assert!(xml.contains("<a:buNone/>"));
    }

    #[test]
    fn test_bullet_levels() {
        let mut xml = String::new();
        write_paragraph(
            &mut xml,
            &Paragraph {
                runs: vec![run("Nested", false)],
                bullet: true,
                level: 1,
            },
        )
        .unwrap();
        assert!(xml.contains(r#"marL="571500" lvl="1" indent="-285750""#));
        assert!(xml.contains("<a:buChar"));
    }

    #[test]
    fn test_round_rect_geometry() {
        let mut xml = String::new();
        write_geometry(&mut xml, Geometry::RoundRect(16_667)).unwrap();
        assert_eq!(
            xml,
            r#"<a:prstGeom prst="roundRect"><a:avLst><a:gd name="adj" fmla="val 16667"/></a:avLst></a:prstGeom>"#
        );
    }

    #[test]
    fn test_placeholder_attributes() {
        let mut xml = String::new();
        write_placeholder(&mut xml, PlaceholderRole::Title, LayoutTemplate::TitleOnly).unwrap();
        write_placeholder(&mut xml, PlaceholderRole::Body, LayoutTemplate::TitleAndBody).unwrap();
        assert_eq!(xml, r#"<p:ph type="ctrTitle"/><p:ph idx="1"/>"#);
    }
}
