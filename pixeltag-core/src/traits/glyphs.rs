//! Font metrics collaborator

/// Which font a piece of text uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontRole {
    /// Personal info lines
    Body,
    /// Status and fallback messages
    Message,
}

/// Vertical font metrics in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FontMetrics {
    /// Pixels above the baseline
    pub ascent: u32,
    /// Pixels below the baseline
    pub descent: u32,
}

impl FontMetrics {
    pub const fn line_height(&self) -> u32 {
        self.ascent + self.descent
    }
}

/// Text measurement
pub trait Glyphs {
    fn metrics(&self, role: FontRole) -> FontMetrics;

    /// Rendered width of `text` in pixels
    fn text_width(&self, role: FontRole, text: &str) -> u32;
}
