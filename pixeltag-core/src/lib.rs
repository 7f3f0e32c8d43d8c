//! Board-agnostic core logic for the e-paper badge
//!
//! This crate contains all badge logic that does not depend on specific
//! hardware implementations:
//!
//! - Content store and persisted state
//! - Render planner (full vs partial refresh sequencing)
//! - Text and QR compositor
//! - Input event reducer (wireless tokens, button gestures)
//! - Lifecycle controller (tick loop, sleep timer, wake restore)
//! - Configuration type definitions
//!
//! Everything here runs synchronously from a single tick loop. The
//! firmware feeds it transport events and button samples and acts on the
//! returned power directive.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod compose;
pub mod config;
pub mod content;
pub mod input;
pub mod lifecycle;
pub mod render;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::BadgeConfig;
pub use content::{ContentStore, DisplayMode};
pub use lifecycle::{BadgeController, PowerDirective, TickReport, WakeReason};
