//! This module provides the implementation for an instrument controlled via TCP/IP.
//!
//! Many SMUs and power meters expose a raw SCPI socket (usually port 5025) on their LAN port. It
//! includes a blocking implementation using the [`std::net::TcpStream`] struct.

use std::{
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use crate::{Instrument, InstrumentError};

/// A blocking TCP/IP interface using the [`std::net::TcpStream`] struct.
#[derive(Debug)]
pub struct TcpIpInterface {}

impl TcpIpInterface {
    /// Try to connect to an instrument's raw socket with a timeout of three seconds.
    ///
    /// # Arguments
    /// * `sock_addr` - Socket address, e.g., `"192.168.1.30:5025"`.
    pub fn try_new<A: ToSocketAddrs>(
        sock_addr: A,
    ) -> Result<Instrument<TcpStream>, InstrumentError> {
        Self::with_timeout(sock_addr, Duration::from_secs(3))
    }

    /// Try to connect to an instrument's raw socket with a given read and write timeout.
    ///
    /// A zero timeout is rejected, since the stream would then block forever on an instrument
    /// that does not answer.
    pub fn with_timeout<A: ToSocketAddrs>(
        sock_addr: A,
        timeout: Duration,
    ) -> Result<Instrument<TcpStream>, InstrumentError> {
        if timeout.is_zero() {
            return Err(InstrumentError::InvalidArgument(
                "TCP/IP timeout must be larger than zero".to_string(),
            ));
        }
        let stream = TcpStream::connect(sock_addr)?;
        stream.set_nodelay(true)?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_read_timeout(Some(timeout))?;
        Ok(Instrument::new(stream, timeout))
    }
}
