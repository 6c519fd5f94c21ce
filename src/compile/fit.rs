//! Text capacity estimation and overflow truncation.
//!
//! Capacity is estimated from the box size and the font size: a line takes
//! 1.2 × the font size vertically and an average glyph 0.5 × the font size
//! horizontally. Content past the capacity is dropped; the last block that
//! partially fits is cut at a word boundary.

use crate::common::unit::EMUS_PER_PT;
use crate::layout::BBox;
use crate::outline::ContentBlock;

const LINE_HEIGHT: f64 = 1.2;
const GLYPH_WIDTH: f64 = 0.5;
pub const ELLIPSIS: char = '…';

/// Lines and characters per line available in a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub lines: usize,
    pub chars_per_line: usize,
}

impl Capacity {
    /// Capacity of `bbox` (relative units) on a slide of `slide_size` EMUs
    /// for text of `size_pt` points.
    pub fn of(bbox: BBox, slide_size: (i64, i64), size_pt: f64) -> Self {
        if !(size_pt.is_finite() && size_pt > 0.0) {
            return Self {
                lines: 0,
                chars_per_line: 0,
            };
        }
        let w_pt = bbox.w * slide_size.0 as f64 / EMUS_PER_PT as f64;
        let h_pt = bbox.h * slide_size.1 as f64 / EMUS_PER_PT as f64;
        Self {
            lines: (h_pt / (size_pt * LINE_HEIGHT)).floor().max(0.0) as usize,
            chars_per_line: (w_pt / (size_pt * GLYPH_WIDTH)).floor().max(0.0) as usize,
        }
    }

    /// Lines needed for `text`; at least one.
    pub fn lines_for(&self, text: &str) -> usize {
        if self.chars_per_line == 0 {
            return usize::MAX;
        }
        text.chars().count().div_ceil(self.chars_per_line).max(1)
    }
}

/// Result of fitting blocks into a box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fitted {
    pub blocks: Vec<ContentBlock>,
    /// Blocks removed entirely
    pub dropped: usize,
    /// Whether the last kept block was cut
    pub truncated: bool,
}

impl Fitted {
    pub fn overflowed(&self) -> bool {
        self.dropped > 0 || self.truncated
    }
}

/// Keep as many blocks as fit, in order.
pub fn fit_blocks(blocks: &[ContentBlock], capacity: Capacity) -> Fitted {
    let mut remaining = capacity.lines;
    let mut kept = Vec::with_capacity(blocks.len());
    let mut truncated = false;

    for block in blocks {
        let needed = capacity.lines_for(&block.text);
        if needed <= remaining {
            remaining -= needed;
            kept.push(block.clone());
            continue;
        }
        if remaining > 0 {
            if let Some(text) = truncate_words(&block.text, remaining * capacity.chars_per_line) {
                kept.push(ContentBlock {
                    text,
                    ..block.clone()
                });
                truncated = true;
            }
        }
        break;
    }

    Fitted {
        dropped: blocks.len() - kept.len(),
        blocks: kept,
        truncated,
    }
}

/// Fit a single line of text (a title) into `capacity`.
///
/// Returns the text unchanged when it fits and `None` when not even one
/// word does.
pub fn fit_text(text: &str, capacity: Capacity) -> Option<(String, bool)> {
    if capacity.lines_for(text) <= capacity.lines {
        return Some((text.to_string(), false));
    }
    let limit = capacity.lines.saturating_mul(capacity.chars_per_line);
    truncate_words(text, limit).map(|t| (t, true))
}

/// Cut `text` to at most `max_chars` characters including the trailing
/// ellipsis, preferring a word boundary.
pub fn truncate_words(text: &str, max_chars: usize) -> Option<String> {
    if max_chars < 2 {
        return None;
    }
    let head: String = text.chars().take(max_chars - 1).collect();
    let cut = match head.rfind(char::is_whitespace) {
        Some(pos) if !head[..pos].trim().is_empty() => &head[..pos],
        _ => head.as_str(),
    };
    let cut = cut.trim_end();
    if cut.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(cut.len() + ELLIPSIS.len_utf8());
    out.push_str(cut);
    out.push(ELLIPSIS);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: (i64, i64) = (12_192_000, 6_858_000);

    #[test]
    fn test_capacity() {
        // 0.5 × 540pt = 270pt tall, 0.5 × 960pt = 480pt wide at 20pt
        let cap = Capacity::of(BBox::new(0.0, 0.0, 0.5, 0.5), SLIDE, 20.0);
        assert_eq!(cap.lines, 11);
        assert_eq!(cap.chars_per_line, 48);
        assert_eq!(cap.lines_for(""), 1);
        assert_eq!(cap.lines_for(&"x".repeat(49)), 2);
        assert_eq!(Capacity::of(BBox::new(0.0, 0.0, 0.5, 0.5), SLIDE, f64::NAN).lines, 0);
    }

    #[test]
    fn test_truncate_at_word_boundary() {
        assert_eq!(
            truncate_words("the quick brown fox", 12).as_deref(),
            Some("the quick…")
        );
        assert_eq!(truncate_words("abcdefghij", 5).as_deref(), Some("abcd…"));
        assert_eq!(truncate_words("abc", 1), None);
        assert_eq!(truncate_words("   ", 3), None);
    }

    #[test]
    fn test_fit_blocks_drops_and_cuts() {
        let cap = Capacity {
            lines: 3,
            chars_per_line: 10,
        };
        let blocks = vec![
            ContentBlock::bullet("short"),
            ContentBlock::bullet("a much longer bullet text here"),
            ContentBlock::bullet("never shown"),
        ];
        let fitted = fit_blocks(&blocks, cap);
        assert_eq!(fitted.blocks.len(), 2);
        assert_eq!(fitted.blocks[0].text, "short");
        assert!(fitted.blocks[1].text.ends_with(ELLIPSIS));
        assert!(fitted.blocks[1].text.chars().count() <= 20);
        assert_eq!(fitted.dropped, 1);
        assert!(fitted.truncated);
        assert!(fitted.overflowed());
    }

    #[test]
    fn test_everything_fits() {
        let cap = Capacity {
            lines: 10,
            chars_per_line: 40,
        };
        let blocks = vec![ContentBlock::bullet("one"), ContentBlock::paragraph("two")];
        let fitted = fit_blocks(&blocks, cap);
        assert_eq!(fitted.blocks, blocks);
        assert!(!fitted.overflowed());
    }

    #[test]
    fn test_fit_title() {
        let cap = Capacity {
            lines: 1,
            chars_per_line: 8,
        };
        assert_eq!(fit_text("Roadmap", cap), Some(("Roadmap".to_string(), false)));
        assert_eq!(
            fit_text("Roadmap for next year", cap),
            Some(("Roadmap…".to_string(), true))
        );
    }
}
