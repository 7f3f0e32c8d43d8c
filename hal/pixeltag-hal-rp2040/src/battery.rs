//! Battery voltage sensing
//!
//! The Pico feeds VSYS through a 3:1 resistor divider into ADC channel 3
//! (GPIO29). Readings are 12-bit against a 3.3 V reference.

use embassy_rp::adc::{Adc, Async, Channel};

/// ADC full-scale value (12-bit)
pub const ADC_MAX: u32 = 4095;

/// ADC reference voltage in millivolts
pub const ADC_REF_MV: u32 = 3300;

/// VSYS divider ratio on the Pico
pub const VSYS_DIVIDER: u32 = 3;

/// Convert a raw ADC sample to battery millivolts
pub fn adc_to_millivolts(raw: u16, divider: u32) -> u16 {
    let mv = raw as u32 * ADC_REF_MV * divider / ADC_MAX;
    mv.min(u16::MAX as u32) as u16
}

/// Battery monitor over one ADC channel
pub struct BatteryMonitor<'d> {
    adc: Adc<'d, Async>,
    channel: Channel<'d>,
    divider: u32,
}

impl<'d> BatteryMonitor<'d> {
    pub fn new(adc: Adc<'d, Async>, channel: Channel<'d>) -> Self {
        Self {
            adc,
            channel,
            divider: VSYS_DIVIDER,
        }
    }

    /// Sample the battery voltage in millivolts
    ///
    /// Returns `None` when the conversion fails.
    pub async fn read_millivolts(&mut self) -> Option<u16> {
        match self.adc.read(&mut self.channel).await {
            Ok(raw) => Some(adc_to_millivolts(raw, self.divider)),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_scale() {
        assert_eq!(adc_to_millivolts(4095, 3), 9900);
    }

    #[test]
    fn test_typical_lipo() {
        // 3.9 V battery reads 1.3 V at the pin
        let raw = (1300 * ADC_MAX / ADC_REF_MV) as u16;
        let mv = adc_to_millivolts(raw, VSYS_DIVIDER);
        assert!((3895..=3900).contains(&mv));
    }
}
