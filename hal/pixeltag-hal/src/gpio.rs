//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins that can be implemented
//! by chip-specific HALs.

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Active-low input adapter
///
/// The badge button pulls its pin to ground when pressed, with the internal
/// pull-up holding it high otherwise. This wrapper turns the electrical
/// level into a "pressed" reading.
pub struct ActiveLow<P> {
    pin: P,
}

impl<P: InputPin> ActiveLow<P> {
    /// Wrap a pull-up input pin
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// True while the button is held down
    pub fn is_pressed(&self) -> bool {
        self.pin.is_low()
    }

    /// Access the wrapped pin, e.g. to await an edge
    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}
