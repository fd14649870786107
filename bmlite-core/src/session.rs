//! Transport session
//!
//! The single object the protocol stack talks to. It owns the bus device,
//! the reset and ready lines and the timebase for the lifetime of the
//! process. There is no uninitialized session value: [`TransportSession::init`]
//! is the only way to get one, and it either hands back a fully wired
//! session or an error.
//!
//! ```text
//!   protocol stack ──write/read──▶ TransportSession ──▶ BusTransport ──▶ SPI
//!         ▲                             │        └──▶ LineController ──▶ GPIO
//!         └──────── ready status ───────┘        └──▶ Timebase ──▶ clock
//! ```

use bmlite_hal::{Clock, Delay, InputPin, OutputPin, SpiDevice, SpiMaster};

use crate::bus::BusTransport;
use crate::config::{BoardConfig, BusLimits, InitParams, Interface};
use crate::error::HalError;
use crate::line::LineController;
use crate::phy::{timeout_ms, HcpComm, Phy, PhyError};
use crate::timebase::{Tick, Timebase};

/// Interval between ready-line samples while waiting
pub const READY_POLL_INTERVAL_MS: u32 = 1;

/// Peripherals handed over to the session at start-up
pub struct Peripherals<M, R, S, C, W> {
    /// SPI master the sensor bus is brought up on
    pub spi: M,
    /// Sensor reset line
    pub reset: R,
    /// Sensor ready/IRQ line
    pub ready: S,
    /// Microsecond clock
    pub clock: C,
    /// Cooperative delay
    pub delay: W,
    /// Ceilings of the chip the board runs on
    pub limits: BusLimits,
}

/// An initialized transport session
pub struct TransportSession<D, R, S, C, W> {
    bus: BusTransport<D>,
    lines: LineController<R, S>,
    timebase: Timebase<C, W>,
    timeout_us: u32,
}

impl<D, R, S, C, W> TransportSession<D, R, S, C, W>
where
    D: SpiDevice,
    R: OutputPin,
    S: InputPin,
    C: Clock,
    W: Delay,
{
    /// Bring the transport up
    ///
    /// Brings up the bus and attaches the sensor at `params.baudrate`,
    /// configures the reset and ready lines, then binds `comm` to this
    /// session and stores the receive timeout in microseconds. `comm` is
    /// only written once everything else succeeded.
    pub fn init<M>(
        parts: Peripherals<M, R, S, C, W>,
        board: &BoardConfig,
        params: &InitParams,
        comm: &mut HcpComm,
    ) -> Result<Self, HalError>
    where
        M: SpiMaster<Device = D>,
    {
        let Peripherals {
            mut spi,
            reset,
            ready,
            clock,
            delay,
            limits,
        } = parts;

        // Only the SPI transport is wired up here
        if params.interface != Interface::Spi {
            return Err(HalError::Internal);
        }
        board.validate(&limits).map_err(|_| HalError::Internal)?;
        limits
            .check_clock(params.baudrate)
            .map_err(|_| HalError::Internal)?;

        let bus = BusTransport::init(
            &mut spi,
            &board.bus_config(),
            &board.device_config(params.baudrate),
        )?;
        let lines = LineController::new(reset, ready);
        let mut timebase = Timebase::new(clock, delay);
        timebase.init();

        let timeout_us = params.timeout_us();
        comm.interface = Some(params.interface);
        comm.phy_rx_timeout_us = timeout_us;

        Ok(Self {
            bus,
            lines,
            timebase,
            timeout_us,
        })
    }

    /// Drive the sensor reset line; `true` holds the sensor in reset
    pub fn reset(&mut self, assert: bool) {
        self.lines.reset(assert);
    }

    /// Whether the sensor is currently held in reset
    pub fn is_reset_asserted(&self) -> bool {
        self.lines.is_asserted()
    }

    /// Sample the sensor's ready line
    pub fn get_ready_status(&self) -> bool {
        self.lines.get_ready_status()
    }

    /// Exchange `length` bytes with the sensor
    ///
    /// See [`BusTransport::transfer`]. A failed transfer leaves the session
    /// usable.
    pub fn transfer(
        &mut self,
        write: Option<&[u8]>,
        read: Option<&mut [u8]>,
        length: usize,
        hold_select: bool,
    ) -> Result<(), HalError> {
        self.bus.transfer(write, read, length, hold_select)
    }

    /// Whether chip-select is held from the previous transfer
    pub fn is_select_held(&self) -> bool {
        self.bus.is_select_held()
    }

    /// Current millisecond tick
    pub fn get_tick(&self) -> Tick {
        self.timebase.get_tick()
    }

    /// Suspend for at least `duration_ms`, yielding to the executor
    pub async fn busy_wait(&mut self, duration_ms: u32) {
        self.timebase.busy_wait(duration_ms).await;
    }

    /// Receive timeout stored at initialization, in microseconds
    pub fn timeout_us(&self) -> u32 {
        self.timeout_us
    }

    /// Pulse the reset line
    ///
    /// Holds the sensor in reset for `pulse_ms`, releases it and gives it
    /// `settle_ms` to boot.
    pub async fn hardware_reset(&mut self, pulse_ms: u32, settle_ms: u32) {
        self.reset(true);
        self.busy_wait(pulse_ms).await;
        self.reset(false);
        self.busy_wait(settle_ms).await;
    }

    /// Poll the ready line until it is set or `timeout_ms` has elapsed
    ///
    /// A timeout of zero waits indefinitely. Returns whether the sensor
    /// became ready.
    pub async fn wait_ready(&mut self, timeout_ms: u32) -> bool {
        let start = self.get_tick();
        loop {
            if self.lines.is_ready() {
                return true;
            }
            if timeout_ms != 0 && self.timebase.elapsed_ms(start) >= u64::from(timeout_ms) {
                return false;
            }
            self.busy_wait(READY_POLL_INTERVAL_MS).await;
        }
    }
}

impl<D, R, S, C, W> Phy for TransportSession<D, R, S, C, W>
where
    D: SpiDevice,
    R: OutputPin,
    S: InputPin,
    C: Clock,
    W: Delay,
{
    async fn write(&mut self, data: &[u8], _timeout_us: u32) -> Result<(), PhyError> {
        self.transfer(Some(data), None, data.len(), false)?;
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8], timeout_us: u32) -> Result<(), PhyError> {
        if !self.wait_ready(timeout_ms(timeout_us)).await {
            return Err(PhyError::Timeout);
        }
        let length = buf.len();
        self.transfer(None, Some(buf), length, false)?;
        Ok(())
    }
}
