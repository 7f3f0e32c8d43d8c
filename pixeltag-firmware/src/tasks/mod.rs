//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod battery;
pub mod controller;
pub mod transport_rx;
pub mod transport_tx;

pub use battery::battery_task;
pub use controller::{controller_task, Badge};
pub use transport_rx::transport_rx_task;
pub use transport_tx::transport_tx_task;
