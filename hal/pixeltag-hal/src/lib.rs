//! PixelTag Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs. The badge logic in `pixeltag-core` only ever sees
//! these traits, so it can be tested on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (pixeltag-firmware)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pixeltag-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ pixeltag-hal- │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::InputPin`] - Digital input (the badge button)
//! - [`gpio::OutputPin`] - Digital output (radio enable)
//! - [`flash::FlashStorage`] - Persistent key-value storage (async)
//! - [`flash::KeyValueStore`] - Blocking key-value storage used by the controller

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, KeyValueStore, StorageKey};
pub use gpio::{ActiveLow, InputPin, OutputPin};
