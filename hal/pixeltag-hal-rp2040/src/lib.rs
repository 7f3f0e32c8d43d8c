//! RP2040-specific HAL for the badge firmware
//!
//! This crate provides RP2040-specific implementations of the shared
//! `pixeltag-hal` traits, plus RP2040-specific functionality:
//!
//! - Flash storage driver (implements `pixeltag_hal::FlashStorage`)
//! - Battery voltage sensing through the VSYS divider
//! - GPIO adapters for embassy-rp pins

#![no_std]
#![deny(unsafe_code)]

pub mod battery;
pub mod flash;
pub mod gpio;

// Re-export shared traits from pixeltag-hal for convenience
pub use pixeltag_hal::{FlashStorage as FlashStorageTrait, StorageKey};
