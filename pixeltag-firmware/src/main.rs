//! PixelTag - E-Paper Badge Firmware
//!
//! Main firmware binary for RP2040-based e-paper name badges.
//! Content arrives as text tokens through a BLE serial bridge on UART0
//! and is drawn to a 2.13" SSD1680 panel on SPI1.
//!
//! Pin assignments (Pico + Pico-ePaper-2.13 + HM-10 style bridge):
//! - UART0 TX/RX: GPIO0/GPIO1, bridge STATE: GPIO2, bridge enable: GPIO3
//! - Panel DC/CS/CLK/DIN/RST/BUSY: GPIO8/9/10/11/12/13
//! - Button: GPIO15 (to ground)
//! - VSYS sense: GPIO29 (ADC3)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::{Config as SpiConfig, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pixeltag_core::compose::QrCodegenEncoder;
use pixeltag_core::BadgeController;
use pixeltag_display::{PagedFrame, Ssd1680};
use pixeltag_hal::ActiveLow;
use pixeltag_hal_rp2040::battery::BatteryMonitor;
use pixeltag_hal_rp2040::flash::Rp2040FlashStorage;
use pixeltag_hal_rp2040::gpio::{RpInput, RpOutput};

use crate::config::BADGE_CONFIG;
use crate::storage::BlockingStore;

mod channels;
mod config;
mod storage;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

/// Bridge baud rate (HM-10 factory default)
const BRIDGE_BAUD: u32 = 9600;

/// Panel SPI clock
const PANEL_SPI_HZ: u32 = 4_000_000;

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 512]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("PixelTag firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Serial bridge
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BRIDGE_BAUD;
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 512]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    let link = Input::new(p.PIN_2, Pull::Down);
    let radio = RpOutput(Output::new(p.PIN_3, Level::Low));
    info!("UART initialized for the serial bridge");

    // Panel
    let mut spi_config = SpiConfig::default();
    spi_config.frequency = PANEL_SPI_HZ;
    let spi = Spi::new_blocking_txonly(p.SPI1, p.PIN_10, p.PIN_11, spi_config);
    let cs = Output::new(p.PIN_9, Level::High);
    let spi = match ExclusiveDevice::new_no_delay(spi, cs) {
        Ok(device) => device,
        Err(e) => match e {},
    };
    let driver = Ssd1680::new(
        spi,
        Output::new(p.PIN_8, Level::Low),
        Output::new(p.PIN_12, Level::High),
        Input::new(p.PIN_13, Pull::None),
        Delay,
    );
    let panel = PagedFrame::new(driver, BADGE_CONFIG.panel_width, BADGE_CONFIG.panel_height);
    info!(
        "Panel {}x{} on SPI1",
        BADGE_CONFIG.panel_width, BADGE_CONFIG.panel_height
    );

    // Storage and battery
    let storage = BlockingStore::new(Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0));
    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let vsys = Channel::new_pin(p.PIN_29, Pull::None);
    let battery = BatteryMonitor::new(adc, vsys);

    let button = ActiveLow::new(RpInput(Input::new(p.PIN_15, Pull::Up)));
    let badge = BadgeController::new(BADGE_CONFIG, panel, QrCodegenEncoder::new(), storage);

    // Spawn tasks
    spawner.spawn(tasks::transport_rx_task(rx, link)).unwrap();
    spawner.spawn(tasks::transport_tx_task(tx)).unwrap();
    spawner.spawn(tasks::battery_task(battery)).unwrap();
    spawner
        .spawn(tasks::controller_task(badge, button, radio))
        .unwrap();

    info!("All tasks spawned, firmware running");
}
