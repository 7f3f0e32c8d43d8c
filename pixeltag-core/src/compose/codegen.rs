//! QR encoding on top of qrcodegen-no-heap

use qrcodegen_no_heap::{QrCode, QrCodeEcc, Version};

use crate::config::{MAX_QR_LEN, QR_VERSION};
use crate::traits::qr::{QR_MATRIX_BYTES, QR_SIZE};
use crate::traits::{QrEncoder, QrError, QrMatrix};

/// Scratch size reserved per buffer for the fixed version
pub const QR_BUFFER_LEN: usize = QR_MATRIX_BYTES + 1;

/// Fixed-version, low-ECC encoder with its own scratch arena
pub struct QrCodegenEncoder {
    temp: [u8; QR_BUFFER_LEN],
    out: [u8; QR_BUFFER_LEN],
}

impl Default for QrCodegenEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl QrCodegenEncoder {
    pub const fn new() -> Self {
        Self {
            temp: [0; QR_BUFFER_LEN],
            out: [0; QR_BUFFER_LEN],
        }
    }
}

impl QrEncoder for QrCodegenEncoder {
    fn encode(&mut self, text: &str) -> Result<QrMatrix, QrError> {
        if text.is_empty() {
            return Err(QrError::Empty);
        }
        if text.len() > MAX_QR_LEN {
            return Err(QrError::TooLong);
        }

        let version = Version::new(QR_VERSION);
        if version.buffer_len() > QR_BUFFER_LEN {
            error!("QR arena {} < {}", QR_BUFFER_LEN, version.buffer_len());
            return Err(QrError::ArenaTooSmall);
        }

        let qr = QrCode::encode_text(
            text,
            &mut self.temp,
            &mut self.out,
            QrCodeEcc::Low,
            version,
            version,
            None,
            false,
        )
        .map_err(|_| QrError::GeneratorRejected)?;

        let size = qr.size();
        if size <= 0 || size as usize > QR_SIZE {
            return Err(QrError::GeneratorRejected);
        }

        let mut matrix = QrMatrix::new(size as u8).ok_or(QrError::GeneratorRejected)?;
        for y in 0..size {
            for x in 0..size {
                if qr.get_module(x, y) {
                    matrix.set(x as u8, y as u8, true);
                }
            }
        }
        Ok(matrix)
    }
}
