//! Bus resource identifiers as they are written on the lab bench.
//!
//! A [`Resource`] is parsed from the same strings a VISA resource manager would accept, plus the
//! plain serial port names of the operating system:
//!
//! | String | Resource |
//! |---|---|
//! | `COM4`, `/dev/ttyUSB0` | serial port |
//! | `ASRL4::INSTR`, `ASRL/dev/ttyUSB0::INSTR` | serial port (`COM4`, `/dev/ttyUSB0`) |
//! | `TCPIP0::192.168.1.30::5025::SOCKET` | raw TCP/IP socket |
//! | `GPIB0::24::INSTR`, `USB0::...::INSTR` | VISA resource |

use std::{fmt::Display, str::FromStr};

use crate::{BoxedInstrument, InstrumentError};

/// A parsed bus resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// A serial port, given by its operating system name.
    Serial(String),
    /// A raw TCP/IP socket.
    TcpIp {
        /// Host name or IP address.
        host: String,
        /// Port number.
        port: u16,
    },
    /// Any other resource, which is handed to the VISA library unchanged.
    Visa(String),
}

impl Resource {
    /// Open the resource.
    ///
    /// The baud rate is only used for serial ports. Serial ports are opened with 8 data bits, no
    /// parity, and one stop bit. Opening a VISA resource requires the `visa` feature.
    pub fn open(&self, baud: u32) -> Result<BoxedInstrument, InstrumentError> {
        tracing::info!(resource = %self, "opening instrument");
        match self {
            #[cfg(feature = "serial")]
            Resource::Serial(port) => Ok(crate::SerialInterface::simple(port, baud)?.boxed()),
            #[cfg(not(feature = "serial"))]
            Resource::Serial(port) => {
                let _ = baud;
                Err(InstrumentError::InvalidArgument(format!(
                    "Cannot open serial port {port}: instrumentrs was built without the `serial` feature"
                )))
            }
            Resource::TcpIp { host, port } => {
                Ok(crate::TcpIpInterface::try_new((host.as_str(), *port))?.boxed())
            }
            #[cfg(feature = "visa")]
            Resource::Visa(res) => Ok(crate::VisaInterface::open(res)?.boxed()),
            #[cfg(not(feature = "visa"))]
            Resource::Visa(res) => Err(InstrumentError::InvalidArgument(format!(
                "Cannot open {res}: instrumentrs was built without the `visa` feature"
            ))),
        }
    }
}

impl FromStr for Resource {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let upper = s.to_ascii_uppercase();

        if upper.starts_with("ASRL") && upper.ends_with("::INSTR") {
            let inner = &s[4..s.len() - "::INSTR".len()];
            if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
                return Ok(Resource::Serial(format!("COM{inner}")));
            }
            if !inner.is_empty() {
                return Ok(Resource::Serial(inner.to_string()));
            }
        } else if upper.starts_with("COM") || s.starts_with("/dev/") {
            return Ok(Resource::Serial(s.to_string()));
        } else if upper.starts_with("TCPIP") && upper.ends_with("::SOCKET") {
            let parts: Vec<&str> = s.split("::").collect();
            if let [_, host, port, _] = parts.as_slice() {
                let port = port.parse::<u16>().map_err(|_| {
                    InstrumentError::InvalidArgument(format!("Invalid socket port in {s}"))
                })?;
                return Ok(Resource::TcpIp {
                    host: host.to_string(),
                    port,
                });
            }
        } else if upper.ends_with("::INSTR") {
            return Ok(Resource::Visa(s.to_string()));
        }

        Err(InstrumentError::InvalidArgument(format!(
            "Unrecognized resource string: {s:?}"
        )))
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Serial(port) => write!(f, "{port}"),
            Resource::TcpIp { host, port } => write!(f, "TCPIP0::{host}::{port}::SOCKET"),
            Resource::Visa(res) => write!(f, "{res}"),
        }
    }
}

/// Enumerate the resources currently available on this machine.
///
/// Serial ports are listed with the `serial` feature, VISA resources with the `visa` feature.
pub fn list_resources() -> Result<Vec<String>, InstrumentError> {
    #[allow(unused_mut)]
    let mut resources = Vec::new();
    #[cfg(feature = "serial")]
    resources.extend(
        serialport::available_ports()?
            .into_iter()
            .map(|p| p.port_name),
    );
    #[cfg(feature = "visa")]
    resources.extend(crate::VisaInterface::list_resources()?);
    Ok(resources)
}
