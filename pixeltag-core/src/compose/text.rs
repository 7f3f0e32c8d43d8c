//! Centered multi-line text layout
//!
//! Lines come from explicit breaks only; there is no word wrap. Empty
//! lines are skipped. The block is centered vertically, each line
//! horizontally. Lines that would not fit are dropped from the bottom and
//! over-wide lines are cut, so everything stays inside the rectangle.

use heapless::Vec;

use crate::config::{LINE_SPACING, MAX_TEXT_LINES};
use crate::traits::{FontRole, Glyphs, Rect};

/// One positioned line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLine<'a> {
    pub text: &'a str,
    pub x: i32,
    pub baseline: i32,
    pub width: u32,
}

/// Laid-out text block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayout<'a> {
    pub role: FontRole,
    pub lines: Vec<TextLine<'a>, MAX_TEXT_LINES>,
}

impl<'a> TextLayout<'a> {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextLine<'a>> {
        self.lines.iter()
    }
}

/// Longest prefix of `text` no wider than `max_width`
fn fit_width<'a, G: Glyphs + ?Sized>(
    glyphs: &G,
    role: FontRole,
    text: &'a str,
    max_width: u32,
) -> (&'a str, u32) {
    let width = glyphs.text_width(role, text);
    if width <= max_width {
        return (text, width);
    }

    let mut fitted = ("", 0);
    for (idx, c) in text.char_indices() {
        let end = idx + c.len_utf8();
        let w = glyphs.text_width(role, &text[..end]);
        if w > max_width {
            break;
        }
        fitted = (&text[..end], w);
    }
    fitted
}

/// Lay out `text` centered inside `rect`
pub fn layout_text<'a, G: Glyphs + ?Sized>(
    glyphs: &G,
    role: FontRole,
    text: &'a str,
    rect: Rect,
) -> TextLayout<'a> {
    let mut layout = TextLayout {
        role,
        lines: Vec::new(),
    };

    let metrics = glyphs.metrics(role);
    let line_height = metrics.line_height();
    let pitch = line_height + LINE_SPACING as u32;
    if line_height == 0 || line_height > rect.height {
        return layout;
    }

    // n lines need n*line_height + (n-1)*spacing
    let fit = ((rect.height + LINE_SPACING as u32) / pitch) as usize;

    let segments = text
        .split('\n')
        .map(|s| s.trim_end_matches('\r'))
        .filter(|s| !s.is_empty())
        .take(fit.min(MAX_TEXT_LINES));

    for segment in segments {
        let (line, width) = fit_width(glyphs, role, segment, rect.width);
        if line.is_empty() {
            continue;
        }
        let x = rect.x + ((rect.width - width) / 2) as i32;
        // Baselines are filled in once the line count is known
        let _ = layout.lines.push(TextLine {
            text: line,
            x,
            baseline: 0,
            width,
        });
    }

    let count = layout.lines.len() as u32;
    if count == 0 {
        return layout;
    }

    let block = count * line_height + (count - 1) * LINE_SPACING as u32;
    let top = rect.y + ((rect.height - block) / 2) as i32;

    let min_baseline = rect.y + metrics.ascent as i32;
    let max_baseline = rect.bottom() - metrics.descent as i32;
    let mut baseline = (top + metrics.ascent as i32).max(min_baseline);
    for line in layout.lines.iter_mut() {
        line.baseline = baseline.min(max_baseline);
        baseline += pitch as i32;
    }

    layout
}
