//! SSD1680 E-Paper Display Driver
//!
//! Driver for 2.13" 250x122 SSD1680 panels over 4-wire SPI.
//! The controller RAM is addressed in bytes along the source axis and
//! in gate lines along the other, see `frame` for the mapping.
//!
//! Full refreshes write both RAM planes so the "previous image" plane
//! matches the panel. Partial refreshes only write the new image plane
//! and are diffed against it.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;
use pixeltag_core::render::RefreshClass;
use pixeltag_core::traits::DisplayError;

use crate::frame::{PanelSink, RamWindow};

/// Panel gate lines (logical width)
pub const GATES: u16 = 250;

/// Panel source lines (logical height)
pub const SOURCES: u16 = 122;

/// Longest a refresh may hold BUSY high
const BUSY_TIMEOUT_MS: u32 = 10_000;

/// SSD1680 commands
#[allow(dead_code)]
mod cmd {
    pub const DRIVER_OUTPUT: u8 = 0x01;
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const TEMP_SENSOR: u8 = 0x18;
    pub const MASTER_ACTIVATE: u8 = 0x20;
    pub const UPDATE_CONTROL_1: u8 = 0x21;
    pub const UPDATE_CONTROL_2: u8 = 0x22;
    pub const WRITE_RAM_BW: u8 = 0x24;
    pub const WRITE_RAM_PREVIOUS: u8 = 0x26;
    pub const BORDER_WAVEFORM: u8 = 0x3C;
    pub const SET_RAM_X_RANGE: u8 = 0x44;
    pub const SET_RAM_Y_RANGE: u8 = 0x45;
    pub const SET_RAM_X_COUNTER: u8 = 0x4E;
    pub const SET_RAM_Y_COUNTER: u8 = 0x4F;

    /// Display update sequences for UPDATE_CONTROL_2
    pub const SEQUENCE_FULL: u8 = 0xF7;
    pub const SEQUENCE_PARTIAL: u8 = 0xFF;
    /// X and Y increment
    pub const ENTRY_XY_INC: u8 = 0x03;
    pub const DEEP_SLEEP_MODE_1: u8 = 0x01;
}

/// SSD1680 e-paper driver
pub struct Ssd1680<SPI, DC, RST, BUSY, DELAY> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    delay: DELAY,
    class: RefreshClass,
    window: RamWindow,
    /// Controller needs a hardware reset before the next command
    asleep: bool,
}

impl<SPI, DC, RST, BUSY, DELAY> Ssd1680<SPI, DC, RST, BUSY, DELAY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    DELAY: DelayNs,
{
    /// Create a new SSD1680 driver
    ///
    /// The controller is initialized lazily by the first refresh.
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY, delay: DELAY) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            delay,
            class: RefreshClass::Full,
            window: RamWindow {
                first_byte: 0,
                row_bytes: 0,
                first_gate: 0,
                gates: 0,
            },
            asleep: true,
        }
    }

    /// Hardware reset plus controller setup
    fn init(&mut self) -> Result<(), DisplayError> {
        self.rst.set_low().map_err(|_| DisplayError::Bus)?;
        self.delay.delay_ms(10);
        self.rst.set_high().map_err(|_| DisplayError::Bus)?;
        self.delay.delay_ms(10);
        self.wait_busy()?;

        self.command(cmd::SW_RESET)?;
        self.wait_busy()?;

        let last_gate = GATES - 1;
        self.command_with(
            cmd::DRIVER_OUTPUT,
            &[last_gate as u8, (last_gate >> 8) as u8, 0x00],
        )?;
        self.command_with(cmd::DATA_ENTRY_MODE, &[cmd::ENTRY_XY_INC])?;
        self.command_with(cmd::BORDER_WAVEFORM, &[0x05])?;
        self.command_with(cmd::UPDATE_CONTROL_1, &[0x00, 0x80])?;
        // Internal temperature sensor
        self.command_with(cmd::TEMP_SENSOR, &[0x80])?;
        self.wait_busy()?;

        #[cfg(feature = "defmt")]
        defmt::debug!("SSD1680 initialized");
        Ok(())
    }

    /// Send a command byte
    fn command(&mut self, c: u8) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::Bus)?;
        self.spi.write(&[c]).map_err(|_| DisplayError::Bus)
    }

    /// Send data bytes
    fn data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::Bus)?;
        self.spi.write(data).map_err(|_| DisplayError::Bus)
    }

    fn command_with(&mut self, c: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.command(c)?;
        self.data(data)
    }

    /// Poll BUSY until it drops
    fn wait_busy(&mut self) -> Result<(), DisplayError> {
        for _ in 0..BUSY_TIMEOUT_MS {
            if self.busy.is_low().map_err(|_| DisplayError::Bus)? {
                return Ok(());
            }
            self.delay.delay_ms(1);
        }
        #[cfg(feature = "defmt")]
        defmt::error!("SSD1680 busy timeout");
        Err(DisplayError::Timeout)
    }

    fn set_ram_area(&mut self, window: RamWindow) -> Result<(), DisplayError> {
        let last_byte = (window.first_byte + window.row_bytes).saturating_sub(1);
        let last_gate = window.end_gate().saturating_sub(1);
        self.command_with(cmd::SET_RAM_X_RANGE, &[window.first_byte, last_byte])?;
        self.command_with(
            cmd::SET_RAM_Y_RANGE,
            &[
                window.first_gate as u8,
                (window.first_gate >> 8) as u8,
                last_gate as u8,
                (last_gate >> 8) as u8,
            ],
        )
    }

    fn set_ram_counter(&mut self, byte: u8, gate: u16) -> Result<(), DisplayError> {
        self.command_with(cmd::SET_RAM_X_COUNTER, &[byte])?;
        self.command_with(cmd::SET_RAM_Y_COUNTER, &[gate as u8, (gate >> 8) as u8])
    }
}

impl<SPI, DC, RST, BUSY, DELAY> PanelSink for Ssd1680<SPI, DC, RST, BUSY, DELAY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    DELAY: DelayNs,
{
    fn begin(&mut self, class: RefreshClass, window: RamWindow) -> Result<(), DisplayError> {
        if self.asleep {
            self.init()?;
            self.asleep = false;
        }
        self.class = class;
        self.window = window;
        self.set_ram_area(window)
    }

    fn write_band(&mut self, first_gate: u16, data: &[u8]) -> Result<(), DisplayError> {
        let byte = self.window.first_byte;
        self.set_ram_counter(byte, first_gate)?;
        self.command_with(cmd::WRITE_RAM_BW, data)?;
        if self.class == RefreshClass::Full {
            self.set_ram_counter(byte, first_gate)?;
            self.command_with(cmd::WRITE_RAM_PREVIOUS, data)?;
        }
        Ok(())
    }

    fn update(&mut self) -> Result<(), DisplayError> {
        let sequence = match self.class {
            RefreshClass::Full => cmd::SEQUENCE_FULL,
            RefreshClass::Partial => cmd::SEQUENCE_PARTIAL,
        };
        self.command_with(cmd::UPDATE_CONTROL_2, &[sequence])?;
        self.command(cmd::MASTER_ACTIVATE)?;
        self.wait_busy()
    }

    fn hibernate(&mut self) -> Result<(), DisplayError> {
        if self.asleep {
            return Ok(());
        }
        self.command_with(cmd::DEEP_SLEEP, &[cmd::DEEP_SLEEP_MODE_1])?;
        self.asleep = true;
        Ok(())
    }
}
