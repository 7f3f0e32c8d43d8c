//! Transport transmit task
//!
//! Writes mirror responses and battery notifications to the bridge.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::OUTBOUND;

#[embassy_executor::task]
pub async fn transport_tx_task(mut tx: BufferedUartTx) {
    info!("Transport TX task started");

    loop {
        let message = OUTBOUND.receive().await;
        match tx.write_all(message.as_bytes()).await {
            Ok(()) => trace!("TX: {}", message.as_str()),
            Err(e) => warn!("Failed to send response: {:?}", e),
        }
    }
}
