//! PixelTag Wireless Protocol
//!
//! This crate defines the text protocol spoken between a phone app and the
//! badge. The radio is a BLE serial bridge: every characteristic write
//! arrives on the badge's UART as one newline-terminated UTF-8 token.
//!
//! # Token Overview
//!
//! ```text
//! clear | command:clear        blank the panel
//! display:info | display:qr    switch mode
//! data:personal:<text>         set the info text (\n escapes allowed)
//! data:qr:<text>               set the QR payload
//! read:<field>                 query a mirror field
//! ```
//!
//! Control tokens are case-insensitive. Anything else is ignored.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod line;
pub mod mirror;
pub mod transport;

pub use command::{unescape_newlines, Command, TooLong, INFO_PREFIX, QR_PREFIX};
pub use line::{LineAssembler, LineError, MAX_TOKEN_LEN};
pub use mirror::{format_battery, format_response, MirrorField, MAX_RESPONSE_LEN};
pub use transport::TransportEvent;
