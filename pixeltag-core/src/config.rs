//! Configuration type definitions
//!
//! `BadgeConfig` is plain data so the firmware's build script can emit it
//! as a `const`. Limits that size buffers are compile-time constants.

/// Maximum info text length in bytes
pub const MAX_INFO_LEN: usize = 150;

/// Maximum QR payload length in bytes
pub const MAX_QR_LEN: usize = 90;

/// QR symbol version (fixed, never grown automatically)
pub const QR_VERSION: u8 = 7;

/// Pixels per QR module
pub const QR_SCALE: u16 = 2;

/// Quiet zone around the QR symbol, in modules
pub const QR_QUIET_ZONE: u16 = 4;

/// Extra pixels between text lines
pub const LINE_SPACING: u16 = 5;

/// Maximum number of text lines laid out
pub const MAX_TEXT_LINES: usize = 10;

/// What a button gesture does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonAction {
    /// Gesture is ignored
    None,
    /// Advance INFO -> QR -> BLANK -> INFO
    CycleMode,
    /// Stop responding; the panel keeps its image
    Halt,
    /// Blank the panel, then halt
    BlankAndHalt,
}

/// Gesture to action table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonActions {
    pub single: ButtonAction,
    pub double: ButtonAction,
}

impl ButtonActions {
    /// Single click cycles modes, double click blanks and halts
    pub const fn cycle() -> Self {
        Self {
            single: ButtonAction::CycleMode,
            double: ButtonAction::BlankAndHalt,
        }
    }

    /// Single click halts, double click does nothing
    pub const fn halt_only() -> Self {
        Self {
            single: ButtonAction::Halt,
            double: ButtonAction::None,
        }
    }
}

impl Default for ButtonActions {
    fn default() -> Self {
        Self::cycle()
    }
}

/// Badge tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BadgeConfig {
    /// Button level must be stable this long before an edge is accepted
    pub debounce_ms: u32,
    /// Second press must follow the first release within this window
    pub double_click_ms: u32,
    /// Gestures are suppressed this long after an accepted one
    pub cooldown_ms: u32,
    /// Awake time without a connection before sleeping
    pub awake_timeout_ms: u32,
    /// Advertising window after a wake before the sleep timer is re-armed
    pub advertise_window_ms: u32,
    /// Battery notification period while connected
    pub battery_notify_ms: u32,
    /// Gesture actions
    pub actions: ButtonActions,
    /// Logical panel width in pixels (landscape)
    pub panel_width: u16,
    /// Logical panel height in pixels (landscape)
    pub panel_height: u16,
}

impl BadgeConfig {
    pub const DEFAULT: Self = Self {
        debounce_ms: 50,
        double_click_ms: 350,
        cooldown_ms: 5000,
        awake_timeout_ms: 60_000,
        advertise_window_ms: 60_000,
        battery_notify_ms: 15_000,
        actions: ButtonActions::cycle(),
        panel_width: 250,
        panel_height: 122,
    };
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let config = BadgeConfig::default();
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.double_click_ms, 350);
        assert_eq!(config.cooldown_ms, 5000);
        assert_eq!(config.awake_timeout_ms, 60_000);
    }

    #[test]
    fn test_action_tables() {
        assert_eq!(ButtonActions::cycle().single, ButtonAction::CycleMode);
        assert_eq!(ButtonActions::cycle().double, ButtonAction::BlankAndHalt);
        assert_eq!(ButtonActions::halt_only().single, ButtonAction::Halt);
        assert_eq!(ButtonActions::halt_only().double, ButtonAction::None);
    }
}
