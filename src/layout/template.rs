//! The fixed set of slide templates and their placeholder geometry.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Closed set of slide layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutTemplate {
    TitleOnly,
    TitleAndBody,
    ImageAndText,
    TwoColumn,
    SingleColumn,
}

impl LayoutTemplate {
    /// All templates, in slide-layout part order.
    pub const ALL: [LayoutTemplate; 5] = [
        LayoutTemplate::TitleOnly,
        LayoutTemplate::TitleAndBody,
        LayoutTemplate::ImageAndText,
        LayoutTemplate::TwoColumn,
        LayoutTemplate::SingleColumn,
    ];

    /// Placeholder roles in emission order.
    pub fn roles(&self) -> &'static [PlaceholderRole] {
        use PlaceholderRole::*;
        match self {
            Self::TitleOnly => &[Title, Subtitle],
            Self::TitleAndBody | Self::SingleColumn => &[Title, Body],
            Self::ImageAndText => &[Title, Body, Image],
            Self::TwoColumn => &[Title, LeftColumn, RightColumn],
        }
    }

    /// Display name written on the slide layout part.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TitleOnly => "Title Slide",
            Self::TitleAndBody => "Title and Content",
            Self::ImageAndText => "Picture with Caption",
            Self::TwoColumn => "Two Content",
            Self::SingleColumn => "Title and Text",
        }
    }

    /// `ST_SlideLayoutType` value for `<p:sldLayout type="..."/>`.
    pub fn ooxml_type(&self) -> &'static str {
        match self {
            Self::TitleOnly => "title",
            Self::TitleAndBody => "obj",
            Self::ImageAndText => "picTx",
            Self::TwoColumn => "twoObj",
            Self::SingleColumn => "tx",
        }
    }

    /// One-based index of the `slideLayoutN.xml` part for this template.
    pub fn part_index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|t| t == self)
            .map_or(1, |i| i + 1)
    }
}

impl fmt::Display for LayoutTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic role of a placeholder region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderRole {
    Title,
    Subtitle,
    Body,
    Image,
    LeftColumn,
    RightColumn,
}

impl PlaceholderRole {
    /// Roles drawn with the heading font.
    pub fn is_heading(&self) -> bool {
        matches!(self, Self::Title | Self::Subtitle)
    }

    /// Roles that hold body blocks.
    pub fn is_body(&self) -> bool {
        matches!(self, Self::Body | Self::LeftColumn | Self::RightColumn)
    }

    /// `p:ph` type; `None` means the default (body/object) placeholder.
    pub fn ph_type(&self, template: LayoutTemplate) -> Option<&'static str> {
        match self {
            Self::Title if template == LayoutTemplate::TitleOnly => Some("ctrTitle"),
            Self::Title => Some("title"),
            Self::Subtitle => Some("subTitle"),
            Self::Image => Some("pic"),
            Self::Body | Self::LeftColumn | Self::RightColumn => None,
        }
    }

    /// `p:ph idx`, unique per layout; the title placeholder has none.
    pub fn ph_idx(&self) -> Option<u32> {
        match self {
            Self::Title => None,
            Self::Subtitle | Self::Body | Self::LeftColumn => Some(1),
            Self::RightColumn | Self::Image => Some(2),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Subtitle => "Subtitle",
            Self::Body => "Body",
            Self::Image => "Image",
            Self::LeftColumn => "Left Column",
            Self::RightColumn => "Right Column",
        }
    }
}

impl fmt::Display for PlaceholderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rectangle in relative slide units: origin top-left, slide is `[0,1]²`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BBox {
    #[inline]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Inside the slide with a positive size.
    pub fn is_valid(&self) -> bool {
        const EPS: f64 = 1e-9;
        self.w > 0.0
            && self.h > 0.0
            && self.x >= -EPS
            && self.y >= -EPS
            && self.right() <= 1.0 + EPS
            && self.bottom() <= 1.0 + EPS
    }

    /// Largest box with the given aspect ratio (width / height, in slide
    /// units) centered inside this one.
    pub fn fit_aspect(&self, aspect: f64) -> BBox {
        if !(aspect.is_finite() && aspect > 0.0) {
            return *self;
        }
        if self.w / self.h > aspect {
            let w = self.h * aspect;
            BBox::new(self.x + (self.w - w) / 2.0, self.y, w, self.h)
        } else {
            let h = self.w / aspect;
            BBox::new(self.x, self.y + (self.h - h) / 2.0, self.w, h)
        }
    }
}

/// A placeholder region assigned to a role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    pub role: PlaceholderRole,
    pub bbox: BBox,
}

/// Layout decision for one slide.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSlide {
    pub template: LayoutTemplate,
    pub placeholders: SmallVec<[Placeholder; 3]>,
}

impl ResolvedSlide {
    pub fn placeholder(&self, role: PlaceholderRole) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| p.role == role)
    }
}

/// Title band height shared by every content template.
const HEADER_HEIGHT: f64 = 0.15;
/// Title slide: heading band.
const COVER_TITLE_Y: f64 = 0.28;
const COVER_TITLE_H: f64 = 0.24;
const COVER_SUBTITLE_H: f64 = 0.16;

/// Placeholder boxes of `template` for a uniform margin `m`.
pub(crate) fn geometry(template: LayoutTemplate, m: f64) -> SmallVec<[Placeholder; 3]> {
    use PlaceholderRole::*;

    let full_w = 1.0 - 2.0 * m;
    let content_y = 2.0 * m + HEADER_HEIGHT;
    let content_h = 1.0 - content_y - m;
    let column_w = (1.0 - 3.0 * m) / 2.0;
    let right_x = 2.0 * m + column_w;

    let title = Placeholder {
        role: Title,
        bbox: BBox::new(m, m, full_w, HEADER_HEIGHT),
    };
    let left = |role| Placeholder {
        role,
        bbox: BBox::new(m, content_y, column_w, content_h),
    };
    let right = |role| Placeholder {
        role,
        bbox: BBox::new(right_x, content_y, column_w, content_h),
    };

    let mut placeholders = SmallVec::new();
    match template {
        LayoutTemplate::TitleOnly => {
            placeholders.push(Placeholder {
                role: Title,
                bbox: BBox::new(m, COVER_TITLE_Y, full_w, COVER_TITLE_H),
            });
            placeholders.push(Placeholder {
                role: Subtitle,
                bbox: BBox::new(
                    m,
                    COVER_TITLE_Y + COVER_TITLE_H + m / 2.0,
                    full_w,
                    COVER_SUBTITLE_H,
                ),
            });
        },
        LayoutTemplate::TitleAndBody | LayoutTemplate::SingleColumn => {
            placeholders.push(title);
            placeholders.push(Placeholder {
                role: Body,
                bbox: BBox::new(m, content_y, full_w, content_h),
            });
        },
        LayoutTemplate::ImageAndText => {
            placeholders.push(title);
            placeholders.push(left(Body));
            placeholders.push(right(Image));
        },
        LayoutTemplate::TwoColumn => {
            placeholders.push(title);
            placeholders.push(left(LeftColumn));
            placeholders.push(right(RightColumn));
        },
    }
    placeholders
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_match_geometry() {
        for template in LayoutTemplate::ALL {
            for m in [0.01, 0.05, 0.15] {
                let placeholders = geometry(template, m);
                let roles: Vec<_> = placeholders.iter().map(|p| p.role).collect();
                assert_eq!(roles, template.roles());
                assert!(placeholders.iter().all(|p| p.bbox.is_valid()));
            }
        }
    }

    #[test]
    fn test_columns_do_not_overlap() {
        let placeholders = geometry(LayoutTemplate::TwoColumn, 0.05);
        let left = placeholders[1].bbox;
        let right = placeholders[2].bbox;
        assert!((right.x - left.right() - 0.05).abs() < 1e-12);
        assert!((right.right() - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_fit_aspect() {
        let bbox = BBox::new(0.5, 0.2, 0.4, 0.6);
        let wide = bbox.fit_aspect(2.0);
        assert!((wide.w - 0.4).abs() < 1e-12);
        assert!((wide.h - 0.2).abs() < 1e-12);
        assert!((wide.y - 0.4).abs() < 1e-12);
        assert_eq!(bbox.fit_aspect(f64::NAN), bbox);
    }

    #[test]
    fn test_part_index() {
        assert_eq!(LayoutTemplate::TitleOnly.part_index(), 1);
        assert_eq!(LayoutTemplate::SingleColumn.part_index(), 5);
    }
}
