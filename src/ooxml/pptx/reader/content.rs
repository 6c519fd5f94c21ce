/// Formatting facts gathered from slide and master parts.
///
/// The scan does not build a document model. It records the colors, fonts,
/// sizes and geometry a style analysis needs and skips everything else.
use super::theme::attr;
use crate::common::style::RGBColor;
use crate::ooxml::error::Result;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// A color as written in DrawingML: literal, or a reference into the theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorRef {
    Rgb(RGBColor),
    Scheme(String),
}

/// A run typeface: a literal family, or the theme's heading or body font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontRef {
    Named(String),
    /// `+mj-*`
    Major,
    /// `+mn-*`
    Minor,
}

impl FontRef {
    fn parse(typeface: &str) -> Option<Self> {
        if typeface.starts_with("+mj-") {
            Some(FontRef::Major)
        } else if typeface.starts_with("+mn-") {
            Some(FontRef::Minor)
        } else if typeface.is_empty() || typeface.starts_with('+') {
            None
        } else {
            Some(FontRef::Named(typeface.to_string()))
        }
    }
}

/// One text run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunInfo {
    pub chars: usize,
    /// Size in 1/100 pt
    pub size: Option<u32>,
    pub color: Option<ColorRef>,
    pub font: Option<FontRef>,
}

/// One `p:sp` shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeInfo {
    /// Placeholder type (`title`, `ctrTitle`, `body`, ...) if the shape is one
    pub placeholder: Option<String>,
    /// Preset geometry name (`rect`, `roundRect`, `ellipse`, ...)
    pub geometry: Option<String>,
    pub offset: Option<(i64, i64)>,
    pub extent: Option<(i64, i64)>,
    pub fill: Option<ColorRef>,
    pub runs: Vec<RunInfo>,
}

impl ShapeInfo {
    pub fn is_title(&self) -> bool {
        matches!(self.placeholder.as_deref(), Some("title" | "ctrTitle"))
    }

    /// Area in EMU², zero when the shape has no explicit extent.
    pub fn area(&self) -> f64 {
        self.extent
            .map(|(cx, cy)| cx.max(0) as f64 * cy.max(0) as f64)
            .unwrap_or(0.0)
    }
}

/// Everything observed in one slide (or master) part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideContent {
    pub background: Option<ColorRef>,
    pub shapes: Vec<ShapeInfo>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FillTarget {
    Background,
    Shape,
    Run,
}

impl SlideContent {
    /// Scan a slide, layout or master part.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        // Whitespace inside runs counts toward run length
        let mut reader = Reader::from_reader(xml);

        let mut content = SlideContent::default();
        let mut shape: Option<ShapeInfo> = None;
        let mut run: Option<RunInfo> = None;

        let mut in_bg = false;
        let mut in_sp_pr = false;
        let mut in_ln = false;
        let mut in_text = false;
        let mut fill: Option<FillTarget> = None;
        let mut buf = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf)?;
            let is_empty = matches!(event, Event::Empty(_));
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    match e.local_name().as_ref() {
                        b"bg" => in_bg = !is_empty,
                        b"sp" => shape = Some(ShapeInfo::default()),
                        b"ph" => {
                            if let Some(shape) = shape.as_mut() {
                                // A placeholder without a type is a body placeholder
                                shape.placeholder =
                                    Some(attr(e, b"type").unwrap_or_else(|| "body".to_string()));
                            }
                        },
                        b"spPr" => in_sp_pr = !is_empty,
                        b"ln" => in_ln = !is_empty,
                        b"off" if in_sp_pr => {
                            if let Some(shape) = shape.as_mut() {
                                shape.offset = pair(e, b"x", b"y");
                            }
                        },
                        b"ext" if in_sp_pr => {
                            if let Some(shape) = shape.as_mut() {
                                shape.extent = pair(e, b"cx", b"cy");
                            }
                        },
                        b"prstGeom" if in_sp_pr => {
                            if let Some(shape) = shape.as_mut() {
                                shape.geometry = attr(e, b"prst");
                            }
                        },
                        b"r" if shape.is_some() => run = Some(RunInfo::default()),
                        b"rPr" => {
                            if let Some(run) = run.as_mut() {
                                run.size = attr(e, b"sz")
                                    .and_then(|s| atoi_simd::parse::<u32, false, false>(s.as_bytes()).ok());
                            }
                        },
                        b"latin" => {
                            if let Some(run) = run.as_mut() {
                                run.font = attr(e, b"typeface").and_then(|t| FontRef::parse(&t));
                            }
                        },
                        b"t" if run.is_some() => in_text = !is_empty,
                        b"solidFill" if !is_empty => {
                            fill = if in_bg {
                                Some(FillTarget::Background)
                            } else if run.is_some() {
                                Some(FillTarget::Run)
                            } else if in_sp_pr && !in_ln && shape.is_some() {
                                Some(FillTarget::Shape)
                            } else {
                                None
                            };
                        },
                        b"bgRef" if !is_empty => fill = Some(FillTarget::Background),
                        b"srgbClr" | b"schemeClr" | b"sysClr" => {
                            if let (Some(target), Some(color)) = (fill, color_ref(e)) {
                                match target {
                                    FillTarget::Background => {
                                        content.background.get_or_insert(color);
                                    },
                                    FillTarget::Shape => {
                                        if let Some(shape) = shape.as_mut() {
                                            shape.fill.get_or_insert(color);
                                        }
                                    },
                                    FillTarget::Run => {
                                        if let Some(run) = run.as_mut() {
                                            run.color.get_or_insert(color);
                                        }
                                    },
                                }
                            }
                        },
                        _ => {},
                    }
                },
                Event::Text(ref t) if in_text => {
                    if let Some(run) = run.as_mut() {
                        run.chars += String::from_utf8_lossy(t).chars().count();
                    }
                },
                Event::GeneralRef(_) if in_text => {
                    if let Some(run) = run.as_mut() {
                        run.chars += 1;
                    }
                },
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"bg" => in_bg = false,
                    b"spPr" => in_sp_pr = false,
                    b"ln" => in_ln = false,
                    b"t" => in_text = false,
                    b"solidFill" | b"bgRef" => fill = None,
                    b"r" => {
                        if let (Some(done), Some(shape)) = (run.take(), shape.as_mut()) {
                            if done.chars > 0 {
                                shape.runs.push(done);
                            }
                        }
                    },
                    b"sp" => {
                        if let Some(done) = shape.take() {
                            content.shapes.push(done);
                        }
                    },
                    _ => {},
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Ok(content)
    }
}

fn pair(e: &BytesStart<'_>, a: &[u8], b: &[u8]) -> Option<(i64, i64)> {
    let a = attr(e, a)?.parse::<i64>().ok()?;
    let b = attr(e, b)?.parse::<i64>().ok()?;
    Some((a, b))
}

fn color_ref(e: &BytesStart<'_>) -> Option<ColorRef> {
    match e.local_name().as_ref() {
        b"srgbClr" => attr(e, b"val")
            .and_then(|v| RGBColor::from_hex(&v))
            .map(ColorRef::Rgb),
        b"sysClr" => attr(e, b"lastClr")
            .and_then(|v| RGBColor::from_hex(&v))
            .map(ColorRef::Rgb),
        b"schemeClr" => attr(e, b"val").map(ColorRef::Scheme),
        _ => None,
    }
}
