//! Sensor bus transport
//!
//! Runs synchronous full-duplex exchanges with the sensor over an attached
//! SPI device. A transfer can leave chip-select asserted so a multi-phase
//! exchange (header, then payload) looks like one transaction to the sensor.

use bmlite_hal::{BusConfig, DeviceConfig, SpiDevice, SpiMaster, Transaction};

use crate::error::HalError;

/// Bus transport over one attached device
pub struct BusTransport<D> {
    device: D,
    max_transfer_size: usize,
    select_held: bool,
}

impl<D: SpiDevice> BusTransport<D> {
    /// Bring up the bus and attach the sensor
    ///
    /// The device is only attached if the bus came up. Either failure is
    /// [`HalError::Internal`] and there is no retry path.
    pub fn init<M>(master: &mut M, bus: &BusConfig, device: &DeviceConfig) -> Result<Self, HalError>
    where
        M: SpiMaster<Device = D>,
    {
        master.init_bus(bus).map_err(|_| HalError::Internal)?;
        let device = master.add_device(device).map_err(|_| HalError::Internal)?;

        Ok(Self {
            device,
            max_transfer_size: bus.max_transfer_size,
            select_held: false,
        })
    }

    /// Exchange `length` bytes with the sensor
    ///
    /// Bytes from `write` are clocked out while bytes are clocked into
    /// `read`; either may be `None`. A zero-length transfer succeeds without
    /// touching the bus. With `hold_select` set, chip-select stays asserted
    /// for the next call.
    ///
    /// Requests longer than a supplied buffer or the configured maximum are
    /// rejected with [`HalError::Internal`] before anything goes on the bus.
    /// The transport never splits a request into chunks.
    pub fn transfer(
        &mut self,
        write: Option<&[u8]>,
        read: Option<&mut [u8]>,
        length: usize,
        hold_select: bool,
    ) -> Result<(), HalError> {
        if length == 0 {
            return Ok(());
        }

        if length > self.max_transfer_size {
            return Err(HalError::Internal);
        }
        if write.is_some_and(|w| w.len() < length) {
            return Err(HalError::Internal);
        }
        if read.as_ref().is_some_and(|r| r.len() < length) {
            return Err(HalError::Internal);
        }

        let mut transaction = Transaction {
            tx: write.map(|w| &w[..length]),
            rx: read.map(|r| &mut r[..length]),
            length,
            keep_cs_active: hold_select,
        };

        match self.device.transmit(&mut transaction) {
            Ok(()) => {
                self.select_held = hold_select;
                Ok(())
            }
            Err(_) => {
                // Devices release chip-select when a transaction fails
                self.select_held = false;
                Err(HalError::Io)
            }
        }
    }

    /// Whether chip-select is still asserted from the previous transfer
    pub fn is_select_held(&self) -> bool {
        self.select_held
    }

    /// Largest transfer accepted
    pub fn max_transfer_size(&self) -> usize {
        self.max_transfer_size
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use core::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    use bmlite_hal::{BusConfig, DeviceConfig, SpiDevice, SpiMaster, Transaction};

    /// Chip-select edges seen on the bus
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Edge {
        Select,
        Deselect,
    }

    /// One transaction as the bus saw it
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Recorded {
        pub tx: Option<Vec<u8>>,
        pub length: usize,
        pub keep_cs_active: bool,
    }

    #[derive(Debug, Default)]
    pub struct BusLog {
        pub init_calls: u32,
        pub attach_calls: u32,
        pub transmit_calls: u32,
        pub bus_config: Option<BusConfig>,
        pub device_config: Option<DeviceConfig>,
        pub transactions: Vec<Recorded>,
        pub edges: Vec<Edge>,
        /// Bytes the "sensor" sends back, consumed front to back
        pub rx_source: Vec<u8>,
        pub fail_init: bool,
        pub fail_attach: bool,
        pub fail_transmit: bool,
        cs_active: bool,
    }

    /// Recording SPI master; its devices share the same log
    #[derive(Clone, Default)]
    pub struct MockSpi {
        pub log: Rc<RefCell<BusLog>>,
    }

    impl MockSpi {
        pub fn failing_init() -> Self {
            let spi = Self::default();
            spi.log.borrow_mut().fail_init = true;
            spi
        }

        pub fn failing_attach() -> Self {
            let spi = Self::default();
            spi.log.borrow_mut().fail_attach = true;
            spi
        }

        pub fn feed(&self, bytes: &[u8]) {
            self.log.borrow_mut().rx_source.extend_from_slice(bytes);
        }

        pub fn fail_transmit(&self, fail: bool) {
            self.log.borrow_mut().fail_transmit = fail;
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MockSpiError;

    impl SpiMaster for MockSpi {
        type Error = MockSpiError;
        type Device = MockDevice;

        fn init_bus(&mut self, config: &BusConfig) -> Result<(), Self::Error> {
            let mut log = self.log.borrow_mut();
            log.init_calls += 1;
            log.bus_config = Some(*config);
            if log.fail_init {
                return Err(MockSpiError);
            }
            Ok(())
        }

        fn add_device(&mut self, config: &DeviceConfig) -> Result<Self::Device, Self::Error> {
            let mut log = self.log.borrow_mut();
            log.attach_calls += 1;
            log.device_config = Some(*config);
            if log.fail_attach {
                return Err(MockSpiError);
            }
            Ok(MockDevice {
                log: self.log.clone(),
            })
        }
    }

    pub struct MockDevice {
        log: Rc<RefCell<BusLog>>,
    }

    impl SpiDevice for MockDevice {
        type Error = MockSpiError;

        fn transmit(&mut self, t: &mut Transaction<'_>) -> Result<(), Self::Error> {
            let mut log = self.log.borrow_mut();
            log.transmit_calls += 1;

            if !log.cs_active {
                log.edges.push(Edge::Select);
                log.cs_active = true;
            }

            if log.fail_transmit {
                log.edges.push(Edge::Deselect);
                log.cs_active = false;
                return Err(MockSpiError);
            }

            let recorded = Recorded {
                tx: t.tx.map(|tx| tx.to_vec()),
                length: t.length,
                keep_cs_active: t.keep_cs_active,
            };
            log.transactions.push(recorded);

            let take = t.length.min(log.rx_source.len());
            let incoming: Vec<u8> = log.rx_source.drain(..take).collect();
            if let Some(rx) = t.rx.as_deref_mut() {
                rx[..take].copy_from_slice(&incoming);
                rx[take..].fill(0xFF);
            }

            if !t.keep_cs_active {
                log.edges.push(Edge::Deselect);
                log.cs_active = false;
            }
            Ok(())
        }
    }
}
