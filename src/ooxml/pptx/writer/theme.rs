/// Theme part: the genome's palette as a color scheme and its fonts as the
/// major/minor font scheme.
///
/// Role mapping: `dk1` text, `lt1` background, `dk2` primary, `lt2` a tint
/// of the background toward the secondary color, `accent1` accent,
/// `accent2` secondary, `accent3` primary, and three Lab blends for
/// `accent4`..`accent6`.
use super::NS_A;
use crate::common::style::{LabColor, RGBColor};
use crate::common::xml::escape_xml;
use crate::compile::MasterTheme;
use crate::ooxml::error::Result;
use crate::style::Palette;
use std::fmt::Write as FmtWrite;

/// Scheme slot → color, in `clrScheme` order.
fn scheme_colors(palette: &Palette) -> [(&'static str, RGBColor); 12] {
    let blend = |a: RGBColor, b: RGBColor, t: f64| {
        LabColor::from_rgb(a).lerp(&LabColor::from_rgb(b), t).to_rgb()
    };
    [
        ("dk1", palette.text),
        ("lt1", palette.background),
        ("dk2", palette.primary),
        ("lt2", blend(palette.background, palette.secondary, 0.12)),
        ("accent1", palette.accent),
        ("accent2", palette.secondary),
        ("accent3", palette.primary),
        ("accent4", blend(palette.accent, palette.background, 0.4)),
        ("accent5", blend(palette.secondary, palette.background, 0.4)),
        ("accent6", blend(palette.primary, palette.accent, 0.5)),
        ("hlink", palette.accent),
        ("folHlink", palette.secondary),
    ]
}

/// Fill, line, effect and background style lists; all reference `phClr`.
const FORMAT_SCHEME: &str = concat!(
    r#"<a:fmtScheme name="deckgene">"#,
    "<a:fillStyleLst>",
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="50000"/></a:schemeClr></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="80000"/></a:schemeClr></a:solidFill>"#,
    "</a:fillStyleLst>",
    "<a:lnStyleLst>",
    r#"<a:ln w="6350" cap="flat" cmpd="sng" algn="ctr"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/></a:ln>"#,
    r#"<a:ln w="12700" cap="flat" cmpd="sng" algn="ctr"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/></a:ln>"#,
    r#"<a:ln w="19050" cap="flat" cmpd="sng" algn="ctr"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/></a:ln>"#,
    "</a:lnStyleLst>",
    "<a:effectStyleLst>",
    "<a:effectStyle><a:effectLst/></a:effectStyle>",
    "<a:effectStyle><a:effectLst/></a:effectStyle>",
    "<a:effectStyle><a:effectLst/></a:effectStyle>",
    "</a:effectStyleLst>",
    "<a:bgFillStyleLst>",
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="95000"/></a:schemeClr></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="90000"/></a:schemeClr></a:solidFill>"#,
    "</a:bgFillStyleLst>",
    "</a:fmtScheme>",
);

/// Generate a theme part named `name`.
pub(crate) fn theme_xml(master: &MasterTheme, name: &str) -> Result<String> {
    let mut xml = String::with_capacity(4096);
    let name = escape_xml(name);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(xml, r#"<a:theme xmlns:a="{}" name="{}">"#, NS_A, name)?;
    xml.push_str("<a:themeElements>");

    write!(xml, r#"<a:clrScheme name="{}">"#, name)?;
    for (slot, color) in scheme_colors(&master.palette) {
        write!(
            xml,
            r#"<a:{slot}><a:srgbClr val="{hex}"/></a:{slot}>"#,
            slot = slot,
            hex = color.to_hex()
        )?;
    }
    xml.push_str("</a:clrScheme>");

    write!(xml, r#"<a:fontScheme name="{}">"#, name)?;
    for (element, font) in [("majorFont", &master.heading_font), ("minorFont", &master.body_font)] {
        write!(
            xml,
            r#"<a:{el}><a:latin typeface="{font}"/><a:ea typeface=""/><a:cs typeface=""/></a:{el}>"#,
            el = element,
            font = escape_xml(font)
        )?;
    }
    xml.push_str("</a:fontScheme>");

    xml.push_str(FORMAT_SCHEME);
    xml.push_str("</a:themeElements>");
    xml.push_str("<a:objectDefaults/>");
    xml.push_str("<a:extraClrSchemeLst/>");
    xml.push_str("</a:theme>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::reader::Theme;
    use crate::style::PresetRegistry;

    #[test]
    fn test_theme_reads_back() {
        let genome = PresetRegistry::builtin().require("corporate_classic").unwrap();
        let master = MasterTheme {
            name: genome.name().to_string(),
            palette: *genome.palette(),
            heading_font: genome.typography().heading_font.clone(),
            body_font: genome.typography().body_font.clone(),
            title_size: 4000,
            body_size: 2000,
        };
        let xml = theme_xml(&master, &master.name).unwrap();
        let theme = Theme::parse(xml.as_bytes()).unwrap();

        assert_eq!(theme.name, master.name);
        assert_eq!(theme.colors.len(), 12);
        assert_eq!(theme.resolve_scheme_color("tx1"), Some(master.palette.text));
        assert_eq!(theme.resolve_scheme_color("bg1"), Some(master.palette.background));
        assert_eq!(theme.resolve_scheme_color("tx2"), Some(master.palette.primary));
        assert_eq!(theme.color("accent1"), Some(master.palette.accent));
        assert_eq!(theme.major_font.as_deref(), Some(master.heading_font.as_str()));
        assert_eq!(theme.minor_font.as_deref(), Some(master.body_font.as_str()));
    }
}
