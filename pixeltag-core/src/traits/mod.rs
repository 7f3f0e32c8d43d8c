//! Collaborator traits
//!
//! These define the seams to the hardware and rendering libraries. The
//! display crate implements `PaperDisplay` and `Glyphs`; `QrEncoder` is
//! implemented here on top of qrcodegen. Persistence goes through
//! `pixeltag_hal::KeyValueStore`.

pub mod display;
pub mod glyphs;
pub mod qr;

pub use display::{Color, DisplayError, PaperDisplay, Rect};
pub use glyphs::{FontMetrics, FontRole, Glyphs};
pub use qr::{QrEncoder, QrError, QrMatrix};
