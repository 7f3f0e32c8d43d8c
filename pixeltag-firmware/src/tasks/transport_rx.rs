//! Transport receive task
//!
//! Reads the BLE serial bridge, splits the byte stream into tokens and
//! watches the bridge's STATE pin for connection changes.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Input;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use pixeltag_protocol::{LineAssembler, LineError};

use crate::channels::{InboundEvent, TRANSPORT_EVENTS};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Transport RX task
///
/// `link` is the bridge's STATE output, high while a central is connected.
#[embassy_executor::task]
pub async fn transport_rx_task(mut rx: BufferedUartRx, mut link: Input<'static>) {
    info!("Transport RX task started");

    let mut assembler = LineAssembler::new();
    let mut buf = [0u8; RX_BUF_SIZE];
    let mut connected = false;

    loop {
        let level = link.is_high();
        if level != connected {
            connected = level;
            let event = if connected {
                InboundEvent::Connected
            } else {
                // A half-received token dies with the link
                assembler.reset();
                InboundEvent::Disconnected
            };
            TRANSPORT_EVENTS.send(event).await;
        }

        let result = select(rx.read(&mut buf), link.wait_for_any_edge()).await;
        match result {
            Either::First(Ok(n)) => {
                trace!("RX: {} bytes", n);
                for &byte in &buf[..n] {
                    match assembler.feed(byte) {
                        Ok(Some(token)) => {
                            TRANSPORT_EVENTS.send(InboundEvent::Token(token)).await;
                        }
                        Ok(None) => {}
                        Err(LineError::Overflow { data_write: true }) => {
                            warn!("Data write overflowed the token buffer");
                            TRANSPORT_EVENTS.send(InboundEvent::Oversized).await;
                        }
                        Err(e) => warn!("Token dropped: {:?}", e),
                    }
                }
            }
            Either::First(Err(e)) => {
                warn!("UART read error: {:?}", e);
            }
            Either::Second(()) => {
                // Level re-checked at the top of the loop
            }
        }
    }
}
