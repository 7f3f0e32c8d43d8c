//! E-paper display trait

use super::glyphs::FontRole;

/// Errors from the panel driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// SPI or GPIO transfer failed
    Bus,
    /// Panel stayed busy past its timeout
    Timeout,
    /// Window outside the panel
    OutOfBounds,
}

/// Pixel color on a two-color panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    White,
    Black,
}

/// Axis-aligned rectangle in logical panel pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub const fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge
    pub const fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub const fn center_x(&self) -> i32 {
        self.x + (self.width / 2) as i32
    }

    pub const fn center_y(&self) -> i32 {
        self.y + (self.height / 2) as i32
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True if `other` lies entirely inside this rectangle
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// Overlap of two rectangles (empty when disjoint)
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return Rect::new(x, y, 0, 0);
        }
        Rect::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, (right - x) as u32, (bottom - y) as u32)
    }
}

/// Paged e-paper display
///
/// A refresh is bracketed by a window selection and a page loop:
///
/// ```text
/// set_full_window() | set_partial_window(rect)
/// first_page()
/// loop { paint; if !next_page()? { break } }
/// ```
///
/// The driver may run the paint step once or once per memory page, so
/// painting must be idempotent. The panel refresh itself is triggered by
/// the final `next_page`, with the refresh class implied by the window.
pub trait PaperDisplay {
    /// Logical width in pixels
    fn width(&self) -> u32;

    /// Logical height in pixels
    fn height(&self) -> u32;

    /// Full panel bounds
    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    /// Select the whole panel for a full refresh
    fn set_full_window(&mut self);

    /// Select a window for a partial refresh
    fn set_partial_window(&mut self, window: Rect);

    /// Start a paint pass
    fn first_page(&mut self);

    /// Push the current page; returns true while more pages remain
    fn next_page(&mut self) -> Result<bool, DisplayError>;

    /// Fill a rectangle, clipped to the current page
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a line of text with its baseline at `baseline`
    fn draw_text(&mut self, role: FontRole, x: i32, baseline: i32, text: &str);

    /// Put the panel controller into deep sleep
    fn hibernate(&mut self) -> Result<(), DisplayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_rect() {
        let outer = Rect::new(0, 0, 250, 122);
        assert!(outer.contains_rect(&Rect::new(10, 10, 50, 50)));
        assert!(outer.contains_rect(&Rect::new(0, 0, 250, 122)));
        assert!(!outer.contains_rect(&Rect::new(200, 0, 51, 10)));
        assert!(!outer.contains_rect(&Rect::new(-1, 0, 5, 5)));
    }

    #[test]
    fn test_intersection() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersection(&b), Rect::new(5, 5, 5, 5));
        assert!(a.intersection(&Rect::new(20, 20, 5, 5)).is_empty());
    }

    #[test]
    fn test_union() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 5, 5, 10);
        assert_eq!(a.union(&b), Rect::new(0, 0, 25, 15));
        assert_eq!(Rect::default().union(&b), b);
    }
}
