//! This module provides the implementation for an instrument controlled via a serial port.
//!
//! It includes a blocking implementation using the `serialport` crate.

use std::time::Duration;

use serialport::{SerialPort, SerialPortBuilder};

use crate::{Instrument, InstrumentError};

/// A blocking serial port interface using the `serialport` crate.
#[derive(Debug)]
pub struct SerialInterface {}

impl SerialInterface {
    /// Try to create a serial instrument with a simple configuration.
    ///
    /// The port is opened with 8 data bits, no parity, one stop bit, and a timeout of 3 seconds.
    /// The terminator is by default set to `"\n"`.
    ///
    /// # Arguments
    /// * `port` - The name of the serial port, e.g., `"/dev/ttyUSB0"` or `"COM4"`.
    /// * `baud` - The baud rate.
    pub fn simple(port: &str, baud: u32) -> Result<Instrument<Box<dyn SerialPort>>, InstrumentError> {
        let spb = serialport::new(port, baud).timeout(Duration::from_secs(3));
        Self::full(spb)
    }

    /// Try to create a serial instrument from a fully configured `SerialPortBuilder`.
    ///
    /// The timeout of the builder is used as the read timeout of the instrument.
    ///
    /// # Arguments
    /// * `spb` - A `SerialPortBuilder` to configure the serial port. See
    ///   [`serialport::SerialPortBuilder`] and the [`serialport::new`] function for more details.
    pub fn full(spb: SerialPortBuilder) -> Result<Instrument<Box<dyn SerialPort>>, InstrumentError> {
        let port = spb.open()?;
        let timeout = port.timeout();
        Ok(Instrument::new(port, timeout))
    }
}
