//! Refresh plans

use crate::compose::DATA_TOO_LONG;
use crate::content::DisplayMode;
use crate::traits::Rect;

/// Width of the status window
pub const STATUS_WIDTH: u32 = 200;

/// Height of the status window
pub const STATUS_HEIGHT: u32 = 40;

/// Panel refresh class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshClass {
    /// Whole-panel waveform, clears ghosting
    Full,
    /// Windowed fast update
    Partial,
}

/// Status messages shown in the status window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusMessage {
    /// A payload was over its limit and was not stored
    DataTooLong,
}

impl StatusMessage {
    pub fn text(self) -> &'static str {
        match self {
            StatusMessage::DataTooLong => DATA_TOO_LONG,
        }
    }
}

/// What to paint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PaintJob {
    Blank,
    Info,
    Qr,
    Status(StatusMessage),
}

impl PaintJob {
    /// Paint job that shows a display mode
    pub fn for_mode(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Info => PaintJob::Info,
            DisplayMode::Qr => PaintJob::Qr,
            DisplayMode::Blank => PaintJob::Blank,
            DisplayMode::Status => PaintJob::Status(StatusMessage::DataTooLong),
        }
    }

    /// Mode the panel is in after this job
    pub fn mode(self) -> DisplayMode {
        match self {
            PaintJob::Blank => DisplayMode::Blank,
            PaintJob::Info => DisplayMode::Info,
            PaintJob::Qr => DisplayMode::Qr,
            PaintJob::Status(_) => DisplayMode::Status,
        }
    }
}

/// A planned refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefreshPlan {
    pub class: RefreshClass,
    /// Window to paint (the whole panel for full refreshes)
    pub target: Rect,
    pub job: PaintJob,
    /// A full blank pass must run before this one
    pub blank_first: bool,
}

/// Fixed centered status window
///
/// The vertical position is rounded down to a multiple of 8 so the window
/// starts on a controller RAM byte in the panel's native orientation.
pub fn status_rect(panel: Rect) -> Rect {
    let width = STATUS_WIDTH.min(panel.width);
    let height = STATUS_HEIGHT.min(panel.height);
    let x = panel.x + ((panel.width - width) / 2) as i32;
    let y = panel.y + (((panel.height - height) / 2) & !7) as i32;
    Rect::new(x, y, width, height)
}

/// Plan the refresh for `job`
///
/// Content and blank jobs are full refreshes of the whole panel. Status
/// jobs are partial refreshes of the status window.
pub fn plan_refresh(job: PaintJob, panel: Rect, needs_full_clear_before_partial: bool) -> RefreshPlan {
    match job {
        PaintJob::Blank | PaintJob::Info | PaintJob::Qr => RefreshPlan {
            class: RefreshClass::Full,
            target: panel,
            job,
            blank_first: false,
        },
        PaintJob::Status(_) => RefreshPlan {
            class: RefreshClass::Partial,
            target: status_rect(panel),
            job,
            blank_first: needs_full_clear_before_partial,
        },
    }
}
