//! Host-side test doubles

use heapless::{String, Vec};
use pixeltag_hal::{FlashError, KeyValueStore, StorageKey};

use crate::traits::{
    Color, DisplayError, FontMetrics, FontRole, Glyphs, PaperDisplay, QrEncoder, QrError,
    QrMatrix, Rect,
};

const MAX_VALUE: usize = 192;

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: [Option<Vec<u8, MAX_VALUE>>; 3],
    unavailable: bool,
    fail_writes: bool,
    writes: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that fails every access as if it could not be opened
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn contains(&self, key: StorageKey) -> bool {
        self.values[key.as_u8() as usize].is_some()
    }

    /// Number of successful writes
    pub fn write_count(&self) -> u32 {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        if self.unavailable {
            return Err(FlashError::Unavailable);
        }
        match &self.values[key.as_u8() as usize] {
            Some(value) => {
                if buffer.len() < value.len() {
                    return Err(FlashError::BufferTooSmall);
                }
                buffer[..value.len()].copy_from_slice(value);
                Ok(value.len())
            }
            None => Err(FlashError::NotFound),
        }
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if self.unavailable {
            return Err(FlashError::Unavailable);
        }
        if self.fail_writes {
            return Err(FlashError::Flash);
        }
        let value = Vec::from_slice(data).map_err(|_| FlashError::Full)?;
        self.values[key.as_u8() as usize] = Some(value);
        self.writes += 1;
        Ok(())
    }
}

/// Refresh window of a recorded pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Full,
    Partial(Rect),
}

/// One text draw call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOp {
    pub role: FontRole,
    pub x: i32,
    pub baseline: i32,
    pub width: u32,
    pub text: String<64>,
}

/// Everything drawn during one refresh (last page only)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassRecord {
    pub window: Window,
    pub pages: u8,
    pub texts: Vec<TextOp, 16>,
    pub white_fills: Vec<Rect, 4>,
    pub dark_fills: u32,
    /// Union of every dark fill and text box
    pub ink: Rect,
}

impl PassRecord {
    fn new(window: Window) -> Self {
        Self {
            window,
            pages: 0,
            texts: Vec::new(),
            white_fills: Vec::new(),
            dark_fills: 0,
            ink: Rect::default(),
        }
    }

    fn reset_page(&mut self) {
        self.texts.clear();
        self.white_fills.clear();
        self.dark_fills = 0;
        self.ink = Rect::default();
    }

    pub fn is_full(&self) -> bool {
        self.window == Window::Full
    }

    /// True if only white was painted
    pub fn is_blank(&self) -> bool {
        self.texts.is_empty() && self.dark_fills == 0
    }

    pub fn has_text(&self, text: &str) -> bool {
        self.texts.iter().any(|t| t.text.as_str() == text)
    }
}

/// Panel double with fixed-metric glyphs
///
/// Body text is 6 px per character with ascent 8 and descent 2. Message
/// text is 7 px per character with ascent 10 and descent 3.
#[derive(Debug)]
pub struct RecordingDisplay {
    width: u32,
    height: u32,
    pages_per_pass: u8,
    page: u8,
    window: Window,
    passes: Vec<PassRecord, 32>,
    hibernations: u32,
    fail_pages: bool,
}

impl RecordingDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pages_per_pass: 1,
            page: 0,
            window: Window::Full,
            passes: Vec::new(),
            hibernations: 0,
            fail_pages: false,
        }
    }

    /// Run the paint step this many times per pass
    pub fn with_pages(mut self, pages: u8) -> Self {
        self.pages_per_pass = pages.max(1);
        self
    }

    /// Make every `next_page` fail
    pub fn fail_pages(&mut self, fail: bool) {
        self.fail_pages = fail;
    }

    pub fn passes(&self) -> &[PassRecord] {
        &self.passes
    }

    pub fn last_pass(&self) -> Option<&PassRecord> {
        self.passes.last()
    }

    pub fn clear_passes(&mut self) {
        self.passes.clear();
    }

    pub fn hibernations(&self) -> u32 {
        self.hibernations
    }

    fn current(&mut self) -> Option<&mut PassRecord> {
        self.passes.last_mut()
    }

    fn char_width(role: FontRole) -> u32 {
        match role {
            FontRole::Body => 6,
            FontRole::Message => 7,
        }
    }
}

impl Glyphs for RecordingDisplay {
    fn metrics(&self, role: FontRole) -> FontMetrics {
        match role {
            FontRole::Body => FontMetrics {
                ascent: 8,
                descent: 2,
            },
            FontRole::Message => FontMetrics {
                ascent: 10,
                descent: 3,
            },
        }
    }

    fn text_width(&self, role: FontRole, text: &str) -> u32 {
        text.chars().count() as u32 * Self::char_width(role)
    }
}

impl PaperDisplay for RecordingDisplay {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_full_window(&mut self) {
        self.window = Window::Full;
    }

    fn set_partial_window(&mut self, window: Rect) {
        self.window = Window::Partial(window);
    }

    fn first_page(&mut self) {
        self.page = 0;
        let record = PassRecord::new(self.window);
        if self.passes.push(record).is_err() {
            self.passes.remove(0);
            let _ = self.passes.push(PassRecord::new(self.window));
        }
    }

    fn next_page(&mut self) -> Result<bool, DisplayError> {
        if self.fail_pages {
            return Err(DisplayError::Bus);
        }
        self.page += 1;
        let more = self.page < self.pages_per_pass;
        let page = self.page;
        if let Some(pass) = self.current() {
            pass.pages = page;
            if more {
                pass.reset_page();
            }
        }
        Ok(more)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if let Some(pass) = self.current() {
            match color {
                Color::White => {
                    let _ = pass.white_fills.push(rect);
                }
                Color::Black => {
                    pass.dark_fills += 1;
                    pass.ink = pass.ink.union(&rect);
                }
            }
        }
    }

    fn draw_text(&mut self, role: FontRole, x: i32, baseline: i32, text: &str) {
        let metrics = self.metrics(role);
        let width = self.text_width(role, text);
        let mut recorded = String::new();
        for c in text.chars() {
            if recorded.push(c).is_err() {
                break;
            }
        }
        if let Some(pass) = self.current() {
            let bounds = Rect::new(
                x,
                baseline - metrics.ascent as i32,
                width,
                metrics.line_height(),
            );
            pass.ink = pass.ink.union(&bounds);
            let _ = pass.texts.push(TextOp {
                role,
                x,
                baseline,
                width,
                text: recorded,
            });
        }
    }

    fn hibernate(&mut self) -> Result<(), DisplayError> {
        self.hibernations += 1;
        Ok(())
    }
}

/// QR encoder that always fails
#[derive(Debug, Clone, Copy)]
pub struct FailingEncoder(pub QrError);

impl QrEncoder for FailingEncoder {
    fn encode(&mut self, _text: &str) -> Result<QrMatrix, QrError> {
        Err(self.0)
    }
}
