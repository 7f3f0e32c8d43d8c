//! Badge controller task
//!
//! Runs the badge state machine from a fixed tick, feeds it transport
//! events and the button level, and carries out its power directives.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::{Delay, Duration, Instant, Ticker, Timer};
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use heapless::String;

use pixeltag_core::compose::QrCodegenEncoder;
use pixeltag_core::{BadgeController, PowerDirective, WakeReason};
use pixeltag_display::{PagedFrame, Ssd1680};
use pixeltag_hal::{ActiveLow, OutputPin};
use pixeltag_hal_rp2040::flash::Rp2040FlashStorage;
use pixeltag_hal_rp2040::gpio::{RpInput, RpOutput};
use pixeltag_protocol::{MirrorField, TransportEvent, MAX_RESPONSE_LEN};

use crate::channels::{InboundEvent, BATTERY_READING, OUTBOUND, TRANSPORT_EVENTS};
use crate::config::{BADGE_CONFIG, SLEEP_WAKE_MS};
use crate::storage::BlockingStore;

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 10;

type PanelSpi = ExclusiveDevice<Spi<'static, SPI1, Blocking>, Output<'static>, NoDelay>;

/// SSD1680 panel on SPI1
pub type Panel = PagedFrame<
    Ssd1680<PanelSpi, Output<'static>, Output<'static>, embassy_rp::gpio::Input<'static>, Delay>,
>;

/// The badge as wired on this board
pub type Badge =
    BadgeController<Panel, QrCodegenEncoder, BlockingStore<Rp2040FlashStorage<'static>>>;

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

/// Queue a response for the TX task
fn respond(message: String<MAX_RESPONSE_LEN>) {
    if OUTBOUND.try_send(message).is_err() {
        warn!("Outbound channel full, dropping response");
    }
}

fn dispatch(badge: &mut Badge, event: &InboundEvent, now: u64, battery_mv: Option<u16>) {
    let event = match event {
        InboundEvent::Connected => TransportEvent::Connected,
        InboundEvent::Disconnected => TransportEvent::Disconnected,
        InboundEvent::Token(token) => TransportEvent::DataWritten(token.as_str()),
        InboundEvent::Oversized => TransportEvent::Oversized,
    };
    if let Some(field) = badge.on_transport(event, now) {
        respond(badge.mirror(field, battery_mv));
    }
}

/// Wait for a button press or the wake timer
async fn sleep(button: &mut ActiveLow<RpInput<'static>>) -> WakeReason {
    info!("Sleeping");
    let press = button.inner_mut().0.wait_for_falling_edge();
    if SLEEP_WAKE_MS == 0 {
        press.await;
        return WakeReason::Button;
    }
    match select(press, Timer::after(Duration::from_millis(SLEEP_WAKE_MS))).await {
        Either::First(()) => WakeReason::Button,
        Either::Second(()) => WakeReason::Timer,
    }
}

/// Controller task - main badge loop
///
/// `radio` enables the BLE bridge; it is dropped while asleep or halted so
/// the badge stops advertising.
#[embassy_executor::task]
pub async fn controller_task(
    mut badge: Badge,
    mut button: ActiveLow<RpInput<'static>>,
    mut radio: RpOutput<'static>,
) {
    info!("Controller task started");

    radio.set_high();
    badge.wake(now_ms(), WakeReason::PowerOn, button.is_pressed());

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let mut battery_mv: Option<u16> = None;
    let mut next_battery_notify = 0u64;

    loop {
        ticker.next().await;
        let now = now_ms();

        while let Ok(event) = TRANSPORT_EVENTS.try_receive() {
            dispatch(&mut badge, &event, now, battery_mv);
        }
        if let Some(mv) = BATTERY_READING.try_take() {
            battery_mv = Some(mv);
        }

        let report = badge.tick(now, button.is_pressed());

        if badge.is_connected() && now >= next_battery_notify {
            respond(badge.mirror(MirrorField::BatteryLevel, battery_mv));
            next_battery_notify = now + BADGE_CONFIG.battery_notify_ms as u64;
        }

        match report.power {
            PowerDirective::StayAwake => {}
            PowerDirective::Sleep => {
                radio.set_low();
                let reason = sleep(&mut button).await;
                info!("Woke: {:?}", reason);
                radio.set_high();
                badge.wake(now_ms(), reason, button.is_pressed());
                ticker.reset();
            }
            PowerDirective::Halt => {
                radio.set_low();
                info!("Badge halted, reset to restart");
                core::future::pending::<()>().await;
            }
        }
    }
}
