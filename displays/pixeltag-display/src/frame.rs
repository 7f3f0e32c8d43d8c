//! Banded page buffer
//!
//! The SSD1680 on the 2.13" badge panel is wired portrait: 250 gate lines
//! by 122 source lines. The badge draws landscape, so a logical column
//! `x` is gate `x` and a logical row `y` is source bit `y`. One RAM row
//! is one gate line of 16 bytes, MSB first, 1 = white.
//!
//! A band holds `BAND_GATES` gate lines. Each `next_page` streams the
//! band (cropped to the window's source bytes) to the sink, and the last
//! one triggers the panel update.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use pixeltag_core::render::RefreshClass;
use pixeltag_core::traits::{
    Color, DisplayError, FontMetrics, FontRole, Glyphs, PaperDisplay, Rect,
};

use crate::fonts::MonoGlyphs;

/// Bytes per gate line
pub const ROW_BYTES: usize = 16;

/// Gate lines per band
pub const BAND_GATES: usize = 64;

const BAND_BYTES: usize = ROW_BYTES * BAND_GATES;

/// Controller RAM window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RamWindow {
    /// First source byte (8 logical rows each)
    pub first_byte: u8,
    /// Source bytes per gate line
    pub row_bytes: u8,
    pub first_gate: u16,
    pub gates: u16,
}

impl RamWindow {
    pub const fn end_gate(&self) -> u16 {
        self.first_gate + self.gates
    }

    /// Smallest byte-aligned window covering `rect`, clipped to the panel
    fn covering(rect: Rect, width: u16, height: u16) -> Self {
        let rect = rect.intersection(&Rect::new(0, 0, width as u32, height as u32));
        if rect.is_empty() {
            return Self {
                first_byte: 0,
                row_bytes: 0,
                first_gate: 0,
                gates: 0,
            };
        }
        let first_byte = rect.y / 8;
        let end_byte = (rect.bottom() + 7) / 8;
        Self {
            first_byte: first_byte as u8,
            row_bytes: (end_byte - first_byte) as u8,
            first_gate: rect.x as u16,
            gates: rect.width as u16,
        }
    }
}

/// Where finished bands go
///
/// Implemented by the panel driver. The call order for one refresh is
/// `begin`, one `write_band` per band, then `update`.
pub trait PanelSink {
    /// Wake the controller if needed and select the RAM window
    fn begin(&mut self, class: RefreshClass, window: RamWindow) -> Result<(), DisplayError>;

    /// Write gate lines starting at `first_gate`
    ///
    /// `data` holds `window.row_bytes` bytes per gate line.
    fn write_band(&mut self, first_gate: u16, data: &[u8]) -> Result<(), DisplayError>;

    /// Show the RAM contents and wait for the panel to settle
    fn update(&mut self) -> Result<(), DisplayError>;

    /// Put the controller into deep sleep
    fn hibernate(&mut self) -> Result<(), DisplayError>;
}

/// Paged frame over a panel sink
pub struct PagedFrame<P> {
    sink: P,
    width: u16,
    height: u16,
    glyphs: MonoGlyphs,
    class: RefreshClass,
    window: RamWindow,
    band_start: u16,
    band: [u8; BAND_BYTES],
    error: Option<DisplayError>,
}

impl<P: PanelSink> PagedFrame<P> {
    /// Create a frame for a `width` x `height` landscape panel
    ///
    /// The height is capped at `ROW_BYTES * 8` source lines.
    pub fn new(sink: P, width: u16, height: u16) -> Self {
        let height = height.min((ROW_BYTES * 8) as u16);
        Self {
            sink,
            width,
            height,
            glyphs: MonoGlyphs::new(),
            class: RefreshClass::Full,
            window: RamWindow::covering(Rect::new(0, 0, width as u32, height as u32), width, height),
            band_start: 0,
            band: [0xFF; BAND_BYTES],
            error: None,
        }
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut P {
        &mut self.sink
    }

    pub fn window(&self) -> RamWindow {
        self.window
    }

    fn band_rows(&self) -> u16 {
        (self.window.end_gate().saturating_sub(self.band_start)).min(BAND_GATES as u16)
    }

    /// Drawable area of the current band in logical coordinates
    fn band_rect(&self) -> Rect {
        let top = self.window.first_byte as i32 * 8;
        let bottom = ((self.window.first_byte as i32 + self.window.row_bytes as i32) * 8)
            .min(self.height as i32);
        Rect::new(
            self.band_start as i32,
            top,
            self.band_rows() as u32,
            (bottom - top).max(0) as u32,
        )
    }

    fn set_pixel(&mut self, x: i32, y: i32, black: bool) {
        let clip = self.band_rect();
        if x < clip.x || x >= clip.right() || y < clip.y || y >= clip.bottom() {
            return;
        }
        let row = (x - self.band_start as i32) as usize;
        let index = row * ROW_BYTES + (y / 8) as usize;
        let mask = 0x80u8 >> (y % 8);
        if black {
            self.band[index] &= !mask;
        } else {
            self.band[index] |= mask;
        }
    }

    /// Move each gate line's window bytes to the front of the band
    fn compact(&mut self, rows: usize) -> usize {
        let first = self.window.first_byte as usize;
        let width = self.window.row_bytes as usize;
        for row in 0..rows {
            let src = row * ROW_BYTES + first;
            self.band.copy_within(src..src + width, row * width);
        }
        rows * width
    }
}

impl<P: PanelSink> Glyphs for PagedFrame<P> {
    fn metrics(&self, role: FontRole) -> FontMetrics {
        self.glyphs.metrics(role)
    }

    fn text_width(&self, role: FontRole, text: &str) -> u32 {
        self.glyphs.text_width(role, text)
    }
}

impl<P: PanelSink> PaperDisplay for PagedFrame<P> {
    fn width(&self) -> u32 {
        self.width as u32
    }

    fn height(&self) -> u32 {
        self.height as u32
    }

    fn set_full_window(&mut self) {
        self.class = RefreshClass::Full;
        self.window = RamWindow::covering(self.bounds(), self.width, self.height);
    }

    fn set_partial_window(&mut self, window: Rect) {
        self.class = RefreshClass::Partial;
        self.window = RamWindow::covering(window, self.width, self.height);
    }

    fn first_page(&mut self) {
        self.band_start = self.window.first_gate;
        self.band.fill(0xFF);
        self.error = self.sink.begin(self.class, self.window).err();
    }

    fn next_page(&mut self) -> Result<bool, DisplayError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        let rows = self.band_rows();
        let len = self.compact(rows as usize);
        self.sink.write_band(self.band_start, &self.band[..len])?;

        self.band_start += rows;
        if self.band_start < self.window.end_gate() {
            self.band.fill(0xFF);
            return Ok(true);
        }

        self.sink.update()?;
        Ok(false)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let area = rect.intersection(&self.band_rect());
        let black = color == Color::Black;
        for x in area.x..area.right() {
            for y in area.y..area.bottom() {
                self.set_pixel(x, y, black);
            }
        }
    }

    fn draw_text(&mut self, role: FontRole, x: i32, baseline: i32, text: &str) {
        let style = MonoTextStyle::new(MonoGlyphs::font(role), BinaryColor::On);
        let _ = Text::with_baseline(text, Point::new(x, baseline), style, Baseline::Alphabetic)
            .draw(self);
    }

    fn hibernate(&mut self) -> Result<(), DisplayError> {
        self.sink.hibernate()
    }
}

impl<P: PanelSink> OriginDimensions for PagedFrame<P> {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl<P: PanelSink> DrawTarget for PagedFrame<P> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        begins: Vec<(RefreshClass, RamWindow)>,
        bands: Vec<(u16, Vec<u8>)>,
        updates: u32,
        hibernations: u32,
        fail_begin: bool,
    }

    impl PanelSink for RecordingSink {
        fn begin(&mut self, class: RefreshClass, window: RamWindow) -> Result<(), DisplayError> {
            if self.fail_begin {
                return Err(DisplayError::Timeout);
            }
            self.begins.push((class, window));
            Ok(())
        }

        fn write_band(&mut self, first_gate: u16, data: &[u8]) -> Result<(), DisplayError> {
            self.bands.push((first_gate, data.to_vec()));
            Ok(())
        }

        fn update(&mut self) -> Result<(), DisplayError> {
            self.updates += 1;
            Ok(())
        }

        fn hibernate(&mut self) -> Result<(), DisplayError> {
            self.hibernations += 1;
            Ok(())
        }
    }

    fn frame() -> PagedFrame<RecordingSink> {
        PagedFrame::new(RecordingSink::default(), 250, 122)
    }

    fn pass<F: FnMut(&mut PagedFrame<RecordingSink>)>(
        f: &mut PagedFrame<RecordingSink>,
        mut paint: F,
    ) -> Result<u32, DisplayError> {
        let mut pages = 0;
        f.first_page();
        loop {
            paint(f);
            pages += 1;
            if !f.next_page()? {
                break;
            }
        }
        Ok(pages)
    }

    #[test]
    fn test_full_pass_bands() {
        let mut f = frame();
        f.set_full_window();
        assert_eq!(pass(&mut f, |_| {}).unwrap(), 4);

        let sink = f.sink();
        assert_eq!(sink.begins.len(), 1);
        assert_eq!(sink.begins[0].0, RefreshClass::Full);
        assert_eq!(sink.begins[0].1.row_bytes, 16);
        let gates: Vec<u16> = sink.bands.iter().map(|(g, _)| *g).collect();
        assert_eq!(gates, vec![0, 64, 128, 192]);
        assert_eq!(sink.bands[3].1.len(), 58 * ROW_BYTES);
        assert!(sink.bands.iter().all(|(_, d)| d.iter().all(|&b| b == 0xFF)));
        assert_eq!(sink.updates, 1);
    }

    #[test]
    fn test_pixel_lands_in_its_band() {
        let mut f = frame();
        f.set_full_window();
        pass(&mut f, |f| f.fill_rect(Rect::new(100, 9, 1, 1), Color::Black)).unwrap();

        let band = &f.sink().bands[1].1;
        assert_eq!(band[36 * ROW_BYTES + 1], 0xBF);
        let dark = band.iter().filter(|&&b| b != 0xFF).count();
        assert_eq!(dark, 1);
    }

    #[test]
    fn test_partial_window_crops_rows() {
        let mut f = frame();
        f.set_partial_window(Rect::new(25, 40, 200, 40));
        let window = f.window();
        assert_eq!(window.first_byte, 5);
        assert_eq!(window.row_bytes, 5);
        assert_eq!(window.first_gate, 25);
        assert_eq!(window.gates, 200);

        pass(&mut f, |f| {
            f.fill_rect(Rect::new(30, 41, 1, 1), Color::Black);
            // Outside the window
            f.fill_rect(Rect::new(30, 10, 1, 1), Color::Black);
        })
        .unwrap();

        let sink = f.sink();
        assert_eq!(sink.begins[0].0, RefreshClass::Partial);
        assert_eq!(sink.bands.len(), 4);
        assert_eq!(sink.bands[0].0, 25);
        assert_eq!(sink.bands[0].1.len(), 64 * 5);
        assert_eq!(sink.bands[3].1.len(), 8 * 5);
        assert_eq!(sink.bands[0].1[5 * 5], 0xBF);
        let dark: usize = sink
            .bands
            .iter()
            .map(|(_, d)| d.iter().filter(|&&b| b != 0xFF).count())
            .sum();
        assert_eq!(dark, 1);
    }

    #[test]
    fn test_text_inks_pixels() {
        let mut f = frame();
        f.set_full_window();
        pass(&mut f, |f| f.draw_text(FontRole::Body, 10, 30, "Ada")).unwrap();

        let sink = f.sink();
        assert!(sink.bands[0].1.iter().any(|&b| b != 0xFF));
        assert!(sink.bands[1..].iter().all(|(_, d)| d.iter().all(|&b| b == 0xFF)));
    }

    #[test]
    fn test_begin_error_surfaces() {
        let mut f = frame();
        f.sink_mut().fail_begin = true;
        f.set_full_window();
        assert_eq!(pass(&mut f, |_| {}), Err(DisplayError::Timeout));
        assert_eq!(f.sink().updates, 0);
    }

    #[test]
    fn test_hibernate_forwards() {
        let mut f = frame();
        f.hibernate().unwrap();
        assert_eq!(f.sink().hibernations, 1);
    }
}
