//! Font selection
//!
//! Info lines use a 9x18 bold face; status and fallback messages use the
//! narrower 8x13 bold face so "No QR Data Available" fits in one line.

use embedded_graphics::mono_font::ascii::{FONT_8X13_BOLD, FONT_9X18_BOLD};
use embedded_graphics::mono_font::MonoFont;
use pixeltag_core::traits::{FontMetrics, FontRole, Glyphs};

/// Glyph metrics for the badge fonts
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoGlyphs;

impl MonoGlyphs {
    pub const fn new() -> Self {
        Self
    }

    /// Font used for a role
    pub fn font(role: FontRole) -> &'static MonoFont<'static> {
        match role {
            FontRole::Body => &FONT_9X18_BOLD,
            FontRole::Message => &FONT_8X13_BOLD,
        }
    }
}

impl Glyphs for MonoGlyphs {
    fn metrics(&self, role: FontRole) -> FontMetrics {
        let font = Self::font(role);
        FontMetrics {
            ascent: font.baseline,
            descent: font.character_size.height - font.baseline,
        }
    }

    fn text_width(&self, role: FontRole, text: &str) -> u32 {
        let font = Self::font(role);
        let count = text.chars().count() as u32;
        if count == 0 {
            return 0;
        }
        count * (font.character_size.width + font.character_spacing) - font.character_spacing
    }
}
