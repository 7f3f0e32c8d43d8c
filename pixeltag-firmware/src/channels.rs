//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! The controller task is the only consumer of inbound events; everything
//! it says back goes through `OUTBOUND`.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::String;

use pixeltag_protocol::{MAX_RESPONSE_LEN, MAX_TOKEN_LEN};

/// Channel capacity for inbound transport events
const INBOUND_CHANNEL_SIZE: usize = 4;

/// Channel capacity for outbound responses
const OUTBOUND_CHANNEL_SIZE: usize = 4;

/// Owned form of a transport event
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InboundEvent {
    Connected,
    Disconnected,
    /// One complete token from the serial bridge
    Token(String<MAX_TOKEN_LEN>),
    /// A data write that overflowed the token buffer
    Oversized,
}

/// Transport events from the RX task
pub static TRANSPORT_EVENTS: Channel<CriticalSectionRawMutex, InboundEvent, INBOUND_CHANNEL_SIZE> =
    Channel::new();

/// Mirror responses and battery notifications for the TX task
pub static OUTBOUND: Channel<
    CriticalSectionRawMutex,
    String<MAX_RESPONSE_LEN>,
    OUTBOUND_CHANNEL_SIZE,
> = Channel::new();

/// Latest battery reading in millivolts (updated by battery task)
pub static BATTERY_READING: Signal<CriticalSectionRawMutex, u16> = Signal::new();
