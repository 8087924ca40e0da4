//! InstrumentRs: Talk to your lab bench from Rust
//!
//! The InstrumentRs library provides the transport layer that the instrument drivers of this
//! workspace are written against. It provides an [`InstrumentInterface`] trait, a generic
//! [`Instrument`] implementation for anything that can read and write bytes, and an
//! [`InstrumentError`] type that all drivers return.
//!
//! # Currently implemented interfaces are:
//! - Serial (blocking) using the [`serialport`] crate, see [`SerialInterface`].
//! - TCP/IP raw sockets (blocking) using [`std::net::TcpStream`], see [`TcpIpInterface`].
//! - VISA resources (GPIB, USBTMC, ...) using the `visa-rs` crate. This requires the `visa`
//!   feature and a VISA library installed on the system.
//!
//! Resource strings as they are written on the lab bench, e.g., `"GPIB0::24::INSTR"` or `"COM4"`,
//! can be parsed into a [`Resource`] and opened directly. [`list_resources`] enumerates what is
//! currently available.
//!
//! # Testing drivers
//!
//! Every driver in this workspace is tested against the [`LoopbackInterfaceString`], which
//! asserts the exact command sequence a driver sends and plays back scripted replies. No hardware
//! is required to run the test suite.
//!
//! # License
//!
//! Licensed under either of
//!
//! - Apache License, Version 2.0 ([LICENSE-APACHE](http://www.apache.org/licenses/LICENSE-2.0))
//! - MIT license ([LICENSE-MIT](http://opensource.org/licenses/MIT))
//!
//! at your option.

#![warn(missing_docs)]

mod instrument;
mod loopback;
mod resource;
pub mod scpi;
#[cfg(feature = "serial")]
mod serial;
mod tcp_ip;
#[cfg(feature = "visa")]
mod visa;

use std::time::{Duration, Instant};

pub use instrument::{BoxedInstrument, Instrument, InstrumentError, Port};
pub use loopback::LoopbackInterfaceString;
pub use resource::{Resource, list_resources};
#[cfg(feature = "serial")]
pub use serial::SerialInterface;
pub use tcp_ip::TcpIpInterface;
#[cfg(feature = "visa")]
pub use visa::VisaInterface;

/// The `InstrumentInterface` trait defines the interface for controlling instruments.
///
/// Only reading an exact number of bytes and writing raw bytes must be implemented. Everything
/// else, i.e., sending terminated commands, reading terminated responses, and querying, is
/// provided on top of these two methods.
pub trait InstrumentInterface {
    /// Read exactly as many bytes from the instrument as fit into `buf`.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), InstrumentError>;

    /// Write raw bytes to the instrument and flush the interface.
    fn write_raw(&mut self, data: &[u8]) -> Result<(), InstrumentError>;

    /// Get the terminator that is appended to commands and that ends responses.
    fn get_terminator(&self) -> &str {
        "\n"
    }

    /// Set the terminator of an interface from a `&str`.
    ///
    /// # Arguments:
    /// - `_terminator` - A string slice that will be used as the terminator for commands
    fn set_terminator(&mut self, _terminator: &str) {}

    /// Get the timeout after which reading a response is given up.
    fn get_timeout(&self) -> Duration {
        Duration::from_secs(3)
    }

    /// Send a command to the instrument.
    ///
    /// This function takes the command, appends the terminator, and writes it to the instrument.
    ///
    /// # Arguments:
    /// - `cmd` - A string slice that will be sent to the instrument.
    fn sendcmd(&mut self, cmd: &str) -> Result<(), InstrumentError> {
        let cmd = format!("{cmd}{}", self.get_terminator());
        self.write_raw(cmd.as_bytes())
    }

    /// Write a string to the instrument without appending the terminator.
    fn write(&mut self, data: &str) -> Result<(), InstrumentError> {
        self.write_raw(data.as_bytes())
    }

    /// Read from the instrument until the terminator is encountered.
    ///
    /// The response is read byte by byte. If no terminator is encountered before the timeout is
    /// reached, an [`InstrumentError::Timeout`] is returned. Non-UTF-8 bytes are logged and
    /// skipped. The returned string is trimmed of surrounding whitespace, including the
    /// terminator.
    fn read_until_terminator(&mut self) -> Result<String, InstrumentError> {
        let terminator = self.get_terminator().to_string();
        let timeout = self.get_timeout();
        let mut response = String::new();
        let mut single_buf = [0u8];

        let tic = Instant::now();
        while tic.elapsed() < timeout {
            self.read_exact(&mut single_buf)?;
            match str::from_utf8(&single_buf) {
                Ok(val) => response.push_str(val),
                Err(_) => tracing::warn!("Received invalid UTF-8 data: {single_buf:?}"),
            }
            if response.ends_with(&terminator) {
                let retval = response.trim();
                tracing::trace!(response = retval, "read");
                return Ok(retval.to_string());
            }
        }

        Err(InstrumentError::Timeout(timeout))
    }

    /// Query the instrument with a command and return the response as a String.
    ///
    /// A timeout while waiting for the response is returned as an
    /// [`InstrumentError::TimeoutQuery`] that names the query.
    ///
    /// # Arguments
    /// * `cmd` - The command to send to the instrument for which we expect a response.
    fn query(&mut self, cmd: &str) -> Result<String, InstrumentError> {
        self.sendcmd(cmd)?;
        match self.read_until_terminator() {
            Err(InstrumentError::Timeout(timeout)) => Err(InstrumentError::TimeoutQuery {
                query: cmd.to_string(),
                timeout,
            }),
            other => other,
        }
    }

    /// Read one response and check that it equals the expected acknowledgment.
    fn check_acknowledgment(&mut self, ack: &str) -> Result<(), InstrumentError> {
        let resp = self.read_until_terminator()?;
        if resp == ack {
            Ok(())
        } else {
            Err(InstrumentError::NotAcknowledged(resp))
        }
    }
}
