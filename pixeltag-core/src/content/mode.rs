//! Display modes

use serde::{Deserialize, Serialize};

/// What the panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    /// Personal info text
    #[default]
    Info,
    /// QR code of the QR payload
    Qr,
    /// Transient status message (never persisted)
    Status,
    /// Blank white panel
    Blank,
}

impl DisplayMode {
    /// Modes that survive a power cycle
    pub fn is_persistent(self) -> bool {
        !matches!(self, DisplayMode::Status)
    }

    /// Next mode for the single-click cycle
    ///
    /// INFO goes to QR only when there is QR text, otherwise straight to
    /// BLANK. A status screen returns to INFO.
    pub fn cycle_next(self, has_qr: bool) -> Self {
        match self {
            DisplayMode::Info if has_qr => DisplayMode::Qr,
            DisplayMode::Info => DisplayMode::Blank,
            DisplayMode::Qr => DisplayMode::Blank,
            DisplayMode::Blank | DisplayMode::Status => DisplayMode::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_with_qr() {
        let mut mode = DisplayMode::Info;
        mode = mode.cycle_next(true);
        assert_eq!(mode, DisplayMode::Qr);
        mode = mode.cycle_next(true);
        assert_eq!(mode, DisplayMode::Blank);
        mode = mode.cycle_next(true);
        assert_eq!(mode, DisplayMode::Info);
    }

    #[test]
    fn test_cycle_skips_empty_qr() {
        assert_eq!(DisplayMode::Info.cycle_next(false), DisplayMode::Blank);
        assert_eq!(DisplayMode::Status.cycle_next(false), DisplayMode::Info);
    }

    #[test]
    fn test_status_not_persistent() {
        assert!(!DisplayMode::Status.is_persistent());
        assert!(DisplayMode::Blank.is_persistent());
    }

    #[test]
    fn test_postcard_roundtrip() {
        let mut buf = [0u8; 4];
        let bytes = postcard::to_slice(&DisplayMode::Blank, &mut buf).unwrap();
        let mode: DisplayMode = postcard::from_bytes(bytes).unwrap();
        assert_eq!(mode, DisplayMode::Blank);
    }
}
