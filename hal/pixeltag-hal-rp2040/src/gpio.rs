//! GPIO adapters
//!
//! Implements the `pixeltag-hal` pin traits for embassy-rp pins.

use embassy_rp::gpio::{Input, Output};
use pixeltag_hal::{InputPin, OutputPin};

/// Input pin wrapper
pub struct RpInput<'d>(pub Input<'d>);

impl InputPin for RpInput<'_> {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}

/// Output pin wrapper
pub struct RpOutput<'d>(pub Output<'d>);

impl OutputPin for RpOutput<'_> {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }
}
