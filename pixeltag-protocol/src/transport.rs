//! Transport events delivered by the wireless link

/// Everything the wireless link can report to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportEvent<'a> {
    /// A central connected
    Connected,
    /// The central went away
    Disconnected,
    /// A token was written to the payload channel
    DataWritten(&'a str),
    /// A data write too long for the link's token buffer
    Oversized,
}

