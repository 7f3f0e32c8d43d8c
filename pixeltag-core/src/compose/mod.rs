//! Glyph and QR compositor
//!
//! Turns text or a URL into a drawing plan for a target rectangle. The
//! layouts are pure data; the render module paints them.

pub mod codegen;
pub mod qr;
pub mod text;

pub use codegen::QrCodegenEncoder;
pub use qr::{layout_qr, QrLayout};
pub use text::{layout_text, TextLayout, TextLine};

/// Placeholder for empty info text
pub const NO_INFO: &str = "No Info";

/// Shown when the QR screen has no payload
pub const NO_QR_DATA: &str = "No QR Data Available";

/// Shown when QR generation fails
pub const QR_FAILED: &str = "QR Generation Failed";

/// Shown when a payload is over its limit
pub const DATA_TOO_LONG: &str = "Data Too Long";

/// Fallback message for a QR layout failure
pub fn qr_fallback(error: crate::traits::QrError) -> &'static str {
    use crate::traits::QrError;
    match error {
        QrError::Empty => NO_QR_DATA,
        QrError::TooLong => DATA_TOO_LONG,
        QrError::GeneratorRejected | QrError::DoesNotFit | QrError::ArenaTooSmall => QR_FAILED,
    }
}
