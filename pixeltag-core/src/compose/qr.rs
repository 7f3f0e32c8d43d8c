//! Scaled QR module grid layout

use crate::config::{MAX_QR_LEN, QR_QUIET_ZONE, QR_SCALE};
use crate::traits::{QrEncoder, QrError, QrMatrix, Rect};

/// A module grid placed inside a rectangle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrLayout {
    pub matrix: QrMatrix,
    /// Pixels per module
    pub scale: u32,
    /// Top-left pixel of module (0, 0)
    pub origin_x: i32,
    pub origin_y: i32,
}

impl QrLayout {
    /// Side length of the drawn grid in pixels (without quiet zone)
    pub fn grid_pixels(&self) -> u32 {
        self.matrix.size() as u32 * self.scale
    }

    /// Pixel square of every dark module
    pub fn dark_modules(&self) -> impl Iterator<Item = Rect> + '_ {
        let size = self.matrix.size();
        let scale = self.scale;
        (0..size).flat_map(move |my| {
            (0..size).filter_map(move |mx| {
                if !self.matrix.get(mx, my) {
                    return None;
                }
                Some(Rect::new(
                    self.origin_x + (mx as u32 * scale) as i32,
                    self.origin_y + (my as u32 * scale) as i32,
                    scale,
                    scale,
                ))
            })
        })
    }
}

/// Encode `text` and center the grid in `rect`
///
/// The length limit is checked before the generator runs. The symbol plus
/// its quiet zone must fit in `rect` at the fixed scale.
pub fn layout_qr<Q: QrEncoder + ?Sized>(
    encoder: &mut Q,
    text: &str,
    rect: Rect,
) -> Result<QrLayout, QrError> {
    if text.is_empty() {
        return Err(QrError::Empty);
    }
    if text.len() > MAX_QR_LEN {
        return Err(QrError::TooLong);
    }

    let matrix = encoder.encode(text)?;
    let scale = QR_SCALE as u32;
    let grid = matrix.size() as u32 * scale;
    let with_quiet = grid + 2 * QR_QUIET_ZONE as u32 * scale;
    if with_quiet > rect.width || with_quiet > rect.height {
        return Err(QrError::DoesNotFit);
    }

    let origin_x = (rect.center_x() - (grid / 2) as i32).max(rect.x);
    let origin_y = (rect.center_y() - (grid / 2) as i32).max(rect.y);

    Ok(QrLayout {
        matrix,
        scale,
        origin_x,
        origin_y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::QrCodegenEncoder;
    use crate::mock::FailingEncoder;

    const PANEL: Rect = Rect::new(0, 0, 250, 122);

    /// Encoder that counts calls
    struct Counting(u32);

    impl QrEncoder for Counting {
        fn encode(&mut self, _text: &str) -> Result<QrMatrix, QrError> {
            self.0 += 1;
            Err(QrError::GeneratorRejected)
        }
    }

    #[test]
    fn test_url_fits_full_screen() {
        let mut enc = QrCodegenEncoder::new();
        let layout = layout_qr(&mut enc, "https://example.com/a", PANEL).unwrap();
        assert_eq!(layout.scale, 2);
        assert_eq!(layout.grid_pixels(), 90);
        assert_eq!(layout.origin_x, 125 - 45);
        assert_eq!(layout.origin_y, 61 - 45);
        for module in layout.dark_modules() {
            assert!(PANEL.contains_rect(&module));
        }
    }

    #[test]
    fn test_too_long_never_reaches_generator() {
        let mut enc = Counting(0);
        let text = [b'a'; 91];
        let text = core::str::from_utf8(&text).unwrap();
        assert_eq!(layout_qr(&mut enc, text, PANEL), Err(QrError::TooLong));
        assert_eq!(enc.0, 0);
    }

    #[test]
    fn test_empty_rejected() {
        let mut enc = Counting(0);
        assert_eq!(layout_qr(&mut enc, "", PANEL), Err(QrError::Empty));
        assert_eq!(enc.0, 0);
    }

    #[test]
    fn test_generator_rejection_propagates() {
        let mut enc = FailingEncoder(QrError::GeneratorRejected);
        assert_eq!(
            layout_qr(&mut enc, "hello", PANEL),
            Err(QrError::GeneratorRejected)
        );
    }

    #[test]
    fn test_does_not_fit() {
        let mut enc = QrCodegenEncoder::new();
        // 45 modules + 8 quiet = 106 px needed
        let rect = Rect::new(0, 0, 200, 105);
        assert_eq!(
            layout_qr(&mut enc, "https://example.com/a", rect),
            Err(QrError::DoesNotFit)
        );
        assert!(layout_qr(&mut enc, "https://example.com/a", Rect::new(0, 0, 106, 106)).is_ok());
    }

    #[test]
    fn test_deterministic_layout() {
        let mut enc = QrCodegenEncoder::new();
        let a = layout_qr(&mut enc, "https://example.com/a", PANEL).unwrap();
        let b = layout_qr(&mut enc, "https://example.com/a", PANEL).unwrap();
        assert_eq!(a, b);
    }
}
