//! Compiled-in configuration
//!
//! `build.rs` validates badge.toml and turns it into constants.

use pixeltag_core::config::{BadgeConfig, ButtonAction, ButtonActions};

include!(concat!(env!("OUT_DIR"), "/badge_config.rs"));
