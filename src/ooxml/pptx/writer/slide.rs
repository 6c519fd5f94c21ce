/// Slide parts.
use super::relmap::SlideRels;
use super::shape::{write_shape, write_tree_header};
use super::{NS_A, NS_P, NS_R};
use crate::compile::CompiledSlide;
use crate::ooxml::error::Result;
use std::fmt::Write as FmtWrite;

/// First drawing id available to content shapes; id 1 is the shape tree.
const FIRST_SHAPE_ID: u32 = 2;

/// Generate `slideN.xml` for a compiled slide.
pub(crate) fn slide_xml(
    slide: &CompiledSlide,
    rels: &SlideRels,
    slide_size: (i64, i64),
) -> Result<String> {
    let mut xml = String::with_capacity(1024 + slide.shapes.len() * 1024);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        NS_A, NS_R, NS_P
    )?;
    xml.push_str("<p:cSld>");
    xml.push_str("<p:spTree>");
    write_tree_header(&mut xml);

    for (id, shape) in (FIRST_SHAPE_ID..).zip(&slide.shapes) {
        write_shape(&mut xml, shape, id, slide.layout, slide_size, rels)?;
    }

    xml.push_str("</p:spTree>");
    xml.push_str("</p:cSld>");
    xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
    xml.push_str("</p:sld>");
    Ok(xml)
}

