//! Lifecycle controller
//!
//! The top-level tick loop plus the sleep/wake bookkeeping around it.

pub mod controller;
pub mod power;

pub use controller::{BadgeController, RunState, TickReport};
pub use power::{battery_percent, PowerDirective, WakeReason};
