//! BM-Lite sensor bring-up firmware
//!
//! Wires the fingerprint sensor from the board description in
//! `board.toml`, brings the transport session up, resets the sensor and
//! waits for it to report ready. From then on the session is the PHY the
//! protocol stack reads and writes through.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{self, Spi};
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

use bmlite_core::{HalError, HcpComm, InitParams, Peripherals, TransportSession};
use bmlite_hal_rp2040::{
    EmbassyClock, EmbassyDelay, GpioPeripherals, InputLine, OutputLine, PinBank, PinError,
    Rp2040SpiDevice, Rp2040SpiMaster, SpiWiring, RP2040_LIMITS,
};

mod board {
    use bmlite_core::{BoardConfig, PinAssignment};

    include!(concat!(env!("OUT_DIR"), "/board_config.rs"));
}

use board::{BOARD, RESET_PULSE_MS, RESET_SETTLE_MS, RX_TIMEOUT_MS, SPI_CLOCK_HZ};

/// SPI0 data pins the driver is bound to
const SPI0_SCLK: u8 = 18;
const SPI0_MOSI: u8 = 19;
const SPI0_MISO: u8 = 16;

/// Interval between ready-line status reports
const STATUS_INTERVAL_SECS: u64 = 5;

type Session = TransportSession<
    Rp2040SpiDevice<'static, SPI0>,
    OutputLine<'static>,
    InputLine<'static>,
    EmbassyClock,
    EmbassyDelay,
>;

/// Why bring-up stopped
#[derive(Format)]
enum BringUpError {
    /// SPI data pin already claimed
    SpiPins,
    /// Sensor line could not be taken from the bank
    Pin(PinError),
    /// Transport session refused to come up
    Session(HalError),
}

impl From<PinError> for BringUpError {
    fn from(e: PinError) -> Self {
        BringUpError::Pin(e)
    }
}

impl From<HalError> for BringUpError {
    fn from(e: HalError) -> Self {
        BringUpError::Session(e)
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("BM-Lite firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mut comm = HcpComm::default();
    let mut session = match bring_up(p, &mut comm) {
        Ok(session) => session,
        Err(e) => {
            error!("Sensor bring-up failed: {}", e);
            park().await
        }
    };
    info!(
        "Transport up: {} Hz, rx timeout {} us",
        SPI_CLOCK_HZ, comm.phy_rx_timeout_us
    );

    session.hardware_reset(RESET_PULSE_MS, RESET_SETTLE_MS).await;
    if session.wait_ready(RX_TIMEOUT_MS).await {
        info!("Sensor ready after reset");
    } else {
        warn!("Sensor not ready after {} ms", RX_TIMEOUT_MS);
    }

    loop {
        Timer::after_secs(STATUS_INTERVAL_SECS).await;
        debug!(
            "tick={} ms ready={}",
            session.get_tick().as_millis(),
            session.get_ready_status()
        );
    }
}

/// Take the sensor's pins and peripherals and bring the session up
fn bring_up(p: embassy_rp::Peripherals, comm: &mut HcpComm) -> Result<Session, BringUpError> {
    let (mut gpios, spi_blocks) = GpioPeripherals::split(p);

    // The SPI data pins are bound by type, so they leave the bank first
    let (Some(sclk), Some(mosi), Some(miso)) =
        (gpios.pin18.take(), gpios.pin19.take(), gpios.pin16.take())
    else {
        return Err(BringUpError::SpiPins);
    };
    let spi = Spi::new_blocking(spi_blocks.spi0, sclk, mosi, miso, spi::Config::default());

    let mut bank = PinBank::new(&mut gpios);
    let cs = bank.claim_flex(BOARD.pins.cs)?;
    let reset = bank.claim_flex(BOARD.pins.reset)?;
    let ready = bank.claim_flex(BOARD.pins.ready)?;
    info!(
        "Sensor lines: cs={} reset={} ready={}",
        BOARD.pins.cs, BOARD.pins.reset, BOARD.pins.ready
    );

    let wiring = SpiWiring {
        sclk: SPI0_SCLK,
        mosi: SPI0_MOSI,
        miso: SPI0_MISO,
        cs: BOARD.pins.cs,
    };
    let parts = Peripherals {
        spi: Rp2040SpiMaster::new(spi, OutputLine::new(cs), wiring),
        reset: OutputLine::new(reset),
        ready: InputLine::new(ready),
        clock: EmbassyClock,
        delay: EmbassyDelay,
        limits: RP2040_LIMITS,
    };
    let params = InitParams::spi(SPI_CLOCK_HZ, RX_TIMEOUT_MS);

    let session = TransportSession::init(parts, &BOARD, &params, comm)?;
    Ok(session)
}

/// Idle forever after a fatal bring-up error
async fn park() -> ! {
    loop {
        Timer::after_secs(60).await;
    }
}
