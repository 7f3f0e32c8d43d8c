//! E-paper display stack for PixelTag
//!
//! This crate provides:
//! - `MonoGlyphs`, font metrics backed by embedded-graphics mono fonts
//! - `PagedFrame`, a banded page buffer implementing the core `PaperDisplay`
//!   trait on top of any `PanelSink`
//! - `Ssd1680`, a blocking SPI driver for SSD1680 panels (2.13", 250x122)
//!
//! # Architecture
//!
//! The badge never holds a full frame. `PagedFrame` keeps one band of gate
//! rows, lets the compositor paint into it, and streams the band to the
//! panel controller before moving to the next one. The controller refresh
//! is triggered after the last band.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod fonts;
pub mod frame;
pub mod ssd1680;

pub use fonts::MonoGlyphs;
pub use frame::{PagedFrame, PanelSink, RamWindow, BAND_GATES, ROW_BYTES};
pub use ssd1680::Ssd1680;
