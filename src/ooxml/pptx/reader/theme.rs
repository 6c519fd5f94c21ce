/// Theme part parsing: color scheme and font scheme.
use crate::common::style::RGBColor;
use crate::ooxml::error::Result;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Color and font schemes read from `/ppt/theme/themeN.xml`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Theme {
    pub name: String,
    /// Scheme colors in document order (`dk1`, `lt1`, `dk2`, `lt2`, `accent1`..)
    pub colors: Vec<(String, RGBColor)>,
    /// Major (heading) latin typeface
    pub major_font: Option<String>,
    /// Minor (body) latin typeface
    pub minor_font: Option<String>,
}

impl Theme {
    /// Parse a theme part.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut theme = Theme::default();
        let mut in_color_scheme = false;
        let mut in_major_font = false;
        let mut in_minor_font = false;
        let mut current_color: Option<String> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                    b"theme" => {
                        if let Some(name) = attr(e, b"name") {
                            theme.name = name;
                        }
                    },
                    b"clrScheme" => in_color_scheme = true,
                    b"majorFont" => in_major_font = true,
                    b"minorFont" => in_minor_font = true,
                    b"latin" if in_major_font || in_minor_font => {
                        let typeface = attr(e, b"typeface").filter(|t| !t.is_empty());
                        if in_major_font {
                            theme.major_font = theme.major_font.take().or(typeface);
                        } else {
                            theme.minor_font = theme.minor_font.take().or(typeface);
                        }
                    },
                    name @ (b"dk1" | b"lt1" | b"dk2" | b"lt2" | b"accent1" | b"accent2"
                    | b"accent3" | b"accent4" | b"accent5" | b"accent6" | b"hlink"
                    | b"folHlink")
                        if in_color_scheme =>
                    {
                        current_color = Some(String::from_utf8_lossy(name).into_owned());
                    },
                    b"srgbClr" | b"sysClr" if in_color_scheme => {
                        // sysClr carries the resolved value in lastClr
                        let key: &[u8] = if e.local_name().as_ref() == b"srgbClr" {
                            b"val"
                        } else {
                            b"lastClr"
                        };
                        if let (Some(name), Some(color)) = (
                            current_color.take(),
                            attr(e, key).and_then(|v| RGBColor::from_hex(&v)),
                        ) {
                            theme.colors.push((name, color));
                        }
                    },
                    _ => {},
                },
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"clrScheme" => in_color_scheme = false,
                    b"majorFont" => in_major_font = false,
                    b"minorFont" => in_minor_font = false,
                    _ => {},
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Ok(theme)
    }

    /// Look up a scheme color by its `clrScheme` name (`dk1`, `accent2`, ...).
    pub fn color(&self, name: &str) -> Option<RGBColor> {
        self.colors
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, color)| *color)
    }

    /// Resolve a `schemeClr val` as used inside slides, honoring the default
    /// color map (`tx1`→`dk1`, `bg1`→`lt1`, `tx2`→`dk2`, `bg2`→`lt2`).
    pub fn resolve_scheme_color(&self, val: &str) -> Option<RGBColor> {
        let name = match val {
            "tx1" => "dk1",
            "bg1" => "lt1",
            "tx2" => "dk2",
            "bg2" => "lt2",
            other => other,
        };
        self.color(name)
    }
}

/// Value of an unprefixed attribute.
pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const THEME: &str = r#"<?xml version="1.0"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office">
  <a:themeElements>
    <a:clrScheme name="Office">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="1F497D"/></a:dk2>
      <a:lt2><a:srgbClr val="EEECE1"/></a:lt2>
      <a:accent1><a:srgbClr val="4F81BD"/></a:accent1>
    </a:clrScheme>
    <a:fontScheme name="Office">
      <a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/></a:majorFont>
      <a:minorFont><a:latin typeface="Calibri"/></a:minorFont>
    </a:fontScheme>
  </a:themeElements>
</a:theme>"#;

    #[test]
    fn test_parse_theme() {
        let theme = Theme::parse(THEME.as_bytes()).unwrap();
        assert_eq!(theme.name, "Office");
        assert_eq!(theme.colors.len(), 5);
        assert_eq!(theme.color("dk2"), RGBColor::from_hex("1F497D"));
        assert_eq!(theme.major_font.as_deref(), Some("Calibri Light"));
        assert_eq!(theme.minor_font.as_deref(), Some("Calibri"));
    }

    #[test]
    fn test_scheme_color_mapping() {
        let theme = Theme::parse(THEME.as_bytes()).unwrap();
        assert_eq!(theme.resolve_scheme_color("tx1"), Some(RGBColor::BLACK));
        assert_eq!(theme.resolve_scheme_color("bg1"), Some(RGBColor::WHITE));
        assert_eq!(
            theme.resolve_scheme_color("accent1"),
            RGBColor::from_hex("4F81BD")
        );
        assert_eq!(theme.resolve_scheme_color("phClr"), None);
    }
}
