//! Power state types

/// Battery voltage reported as empty
pub const BATTERY_EMPTY_MV: u16 = 3000;

/// Battery voltage reported as full
pub const BATTERY_FULL_MV: u16 = 4200;

/// Why the badge is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeReason {
    /// Cold boot or reset
    PowerOn,
    /// Button press during sleep
    Button,
    /// Sleep timer elapsed
    Timer,
}

impl WakeReason {
    /// Power-on and button wakes repaint the current mode
    pub fn renders(self) -> bool {
        matches!(self, WakeReason::PowerOn | WakeReason::Button)
    }
}

/// What the firmware should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerDirective {
    /// Keep ticking
    StayAwake,
    /// Stop advertising and sleep until a button press or timer
    Sleep,
    /// Stop for good; only a reset brings the badge back
    Halt,
}

/// Map battery millivolts linearly to 0..=100 percent
pub fn battery_percent(millivolts: u16) -> u8 {
    if millivolts <= BATTERY_EMPTY_MV {
        return 0;
    }
    if millivolts >= BATTERY_FULL_MV {
        return 100;
    }
    let span = (BATTERY_FULL_MV - BATTERY_EMPTY_MV) as u32;
    ((millivolts - BATTERY_EMPTY_MV) as u32 * 100 / span) as u8
}
