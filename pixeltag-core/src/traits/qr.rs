//! QR generator collaborator

use crate::config::QR_VERSION;

/// Side length of the fixed-version symbol in modules
pub const QR_SIZE: usize = QR_VERSION as usize * 4 + 17;

/// Bytes needed for one module bitmap
pub const QR_MATRIX_BYTES: usize = (QR_SIZE * QR_SIZE + 7) / 8;

/// Why a QR code could not be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QrError {
    /// No text to encode
    Empty,
    /// Text is over the payload limit
    TooLong,
    /// Generator refused the text at the fixed version and ECC level
    GeneratorRejected,
    /// Symbol plus quiet zone is larger than the target rectangle
    DoesNotFit,
    /// Scratch arena is smaller than the version needs
    ArenaTooSmall,
}

/// Module bitmap of one QR symbol
#[derive(Clone, PartialEq, Eq)]
pub struct QrMatrix {
    size: u8,
    bits: [u8; QR_MATRIX_BYTES],
}

impl QrMatrix {
    /// Empty matrix with `size` modules per side
    ///
    /// Returns `None` if the size exceeds the fixed version.
    pub fn new(size: u8) -> Option<Self> {
        if size as usize > QR_SIZE {
            return None;
        }
        Some(Self {
            size,
            bits: [0; QR_MATRIX_BYTES],
        })
    }

    /// Modules per side
    pub fn size(&self) -> u8 {
        self.size
    }

    fn index(&self, x: u8, y: u8) -> Option<usize> {
        if x >= self.size || y >= self.size {
            return None;
        }
        Some(y as usize * self.size as usize + x as usize)
    }

    /// Module at (x, y); out-of-range reads are light
    pub fn get(&self, x: u8, y: u8) -> bool {
        match self.index(x, y) {
            Some(i) => self.bits[i / 8] & (1 << (i % 8)) != 0,
            None => false,
        }
    }

    pub fn set(&mut self, x: u8, y: u8, dark: bool) {
        if let Some(i) = self.index(x, y) {
            if dark {
                self.bits[i / 8] |= 1 << (i % 8);
            } else {
                self.bits[i / 8] &= !(1 << (i % 8));
            }
        }
    }
}

impl core::fmt::Debug for QrMatrix {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QrMatrix").field("size", &self.size).finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for QrMatrix {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "QrMatrix[{}]", self.size);
    }
}

/// Text to module grid
pub trait QrEncoder {
    fn encode(&mut self, text: &str) -> Result<QrMatrix, QrError>;
}
