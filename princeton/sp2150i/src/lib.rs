//! A rust driver for the Acton SP-2150i monochromator by Princeton Instruments.
//!
//! The commands are described in the "SP-2150i operating instructions". The monochromator echoes
//! every command and ends its replies with `ok`. While the grating moves, the monochromator does
//! not answer, which surfaces as a timeout on the interface.
//!
//! # Example
//!
//! ```no_run
//! use princeton_sp2150i::{DEFAULT_RESOURCE, SerialInterfaceSp2150i, Sp2150i};
//!
//! let serial_inst = SerialInterfaceSp2150i::simple(DEFAULT_RESOURCE).unwrap();
//! let mut mono = Sp2150i::try_new(serial_inst).unwrap();
//!
//! mono.set_scan_speed_nm_per_min(300.0).unwrap();
//! println!("Wavelength: {} nm", mono.get_wavelength_nm().unwrap());
//! println!("Moved to: {} nm", mono.set_wavelength_nm(300.0).unwrap());
//! ```

#![warn(missing_docs)]

mod parse;

pub use parse::{clean_number, settle_time};

use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use instrumentrs::{Instrument, InstrumentError, InstrumentInterface, SerialInterface};
use serialport::SerialPort;

/// The serial port the SP-2150i is found at on our bench.
pub const DEFAULT_RESOURCE: &str = "COM4";

/// Baud rate of the SP-2150i.
pub const BAUD: u32 = 9600;

/// Safety margin applied to the estimated move time when the monochromator is busy.
pub const MOVE_SETTLE_MARGIN: f64 = 1.1;

/// Number of attempts to set the grating. A grating change takes about 20 seconds.
const GRATING_ATTEMPTS: usize = 30;

/// Number of lines the monochromator sends in reply to `?GRATINGS`.
const GRATINGS_LINES: usize = 6;

/// A SerialInterface for the SP-2150i.
///
/// Builds an InstrumentRs SerialInterface with 9600 baud, 8 data bits, no parity, one stop bit,
/// and a timeout of 3 seconds.
#[derive(Debug)]
pub struct SerialInterfaceSp2150i {}

impl SerialInterfaceSp2150i {
    /// Try to open the serial port the SP-2150i is connected to.
    ///
    /// Arguments:
    /// * `port` - The name of the serial port, e.g., `"/dev/ttyUSB0"` or `"COM4"`.
    pub fn simple(port: &str) -> Result<Instrument<Box<dyn SerialPort>>, InstrumentError> {
        let port = serialport::new(port, BAUD)
            .timeout(Duration::from_secs(3))
            .parity(serialport::Parity::None)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One);
        SerialInterface::full(port)
    }
}

/// A rust driver for the SP-2150i.
///
/// See the top-level documentation for an example on how to use this driver.
pub struct Sp2150i<T: InstrumentInterface> {
    interface: Arc<Mutex<T>>,
}

impl<T: InstrumentInterface> Sp2150i<T> {
    /// Create a new Sp2150i instance with the given instrument interface.
    ///
    /// The terminator is set to `"\r"`.
    ///
    /// # Arguments
    /// * `interface` - An instrument interface that implements the [`InstrumentInterface`] trait.
    pub fn try_new(interface: T) -> Result<Self, InstrumentError> {
        let mut intf = interface;
        intf.set_terminator("\r");
        Ok(Sp2150i {
            interface: Arc::new(Mutex::new(intf)),
        })
    }

    /// Move to 200 nm and set the scan speed to 120 nm/min.
    pub fn initialize_defaults(&mut self) -> Result<(), InstrumentError> {
        self.set_wavelength_nm(200.0)?;
        self.set_scan_speed_nm_per_min(120.0)?;
        Ok(())
    }

    /// Read one reply from the buffer.
    pub fn read(&mut self) -> Result<String, InstrumentError> {
        let mut intf = self.interface.lock().expect("Mutex should not be poisoned");
        intf.read_until_terminator()
    }

    /// Set the scan speed in nm/min and return the reply, e.g., `"100.0 NM/MIN ok"`.
    pub fn set_scan_speed_nm_per_min(&mut self, rate: f64) -> Result<String, InstrumentError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(InstrumentError::FloatValueOutOfRange {
                value: rate,
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
            });
        }
        self.query(&format!("{rate:.1} NM/MIN"))
    }

    /// Go to a wavelength at the selected scan rate and return the raw reply.
    ///
    /// Unlike [`Sp2150i::set_wavelength_nm`], this does not wait for the move to finish.
    pub fn scan_to(&mut self, wavelength_nm: f64) -> Result<String, InstrumentError> {
        check_wavelength(wavelength_nm)?;
        self.query(&format!("{wavelength_nm:.1}NM"))
    }

    /// Go to a wavelength (to the nearest 0.1 nm) at the selected scan rate.
    ///
    /// The monochromator does not answer while it moves. If the command times out, we wait for
    /// the estimated move time (with a margin of [`MOVE_SETTLE_MARGIN`]) and then read the
    /// pending reply from the buffer. Returns the wavelength the monochromator reports afterwards.
    pub fn set_wavelength_nm(&mut self, wavelength_nm: f64) -> Result<f64, InstrumentError> {
        check_wavelength(wavelength_nm)?;
        let present = self.get_wavelength_nm()?;
        let speed = self.get_scan_speed_nm_per_min()?;
        let settle = settle_time(present, wavelength_nm, speed, MOVE_SETTLE_MARGIN)?;

        match self.query(&format!("{wavelength_nm:.1} NM")) {
            Ok(_) => {}
            Err(err) if is_busy(&err) => {
                tracing::warn!(
                    %err,
                    adjustment_s = settle.as_secs_f64(),
                    "Monochromator busy while moving, waiting"
                );
                thread::sleep(settle);
                self.read()?;
            }
            Err(err) => return Err(err),
        }

        self.get_wavelength_nm()
    }

    /// Select grating 1 or 2 on the present turret.
    ///
    /// This takes approximately 20 seconds, during which the monochromator does not answer. The
    /// command is repeated every second until it succeeds.
    pub fn set_grating(&mut self, grating: u8) -> Result<String, InstrumentError> {
        if !(1..=2).contains(&grating) {
            return Err(InstrumentError::IntValueOutOfRange {
                value: grating.into(),
                min: 1,
                max: 2,
            });
        }
        let cmd = format!("{grating} GRATING");
        let mut attempt = 1;
        loop {
            match self.query(&cmd) {
                Ok(resp) => return Ok(resp),
                Err(err) if is_busy(&err) && attempt < GRATING_ATTEMPTS => {
                    tracing::info!(attempt, "Grating moving, please wait...");
                    thread::sleep(Duration::from_secs(1));
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Select the parameters of turret 1, 2, or 3.
    pub fn set_turret(&mut self, turret: u8) -> Result<String, InstrumentError> {
        if !(1..=3).contains(&turret) {
            return Err(InstrumentError::IntValueOutOfRange {
                value: turret.into(),
                min: 1,
                max: 3,
            });
        }
        self.query(&format!("{turret} TURRET"))
    }

    /// Get the present wavelength as the raw reply, e.g., `"?NM 300.000 nm ok"`.
    pub fn get_wavelength_raw(&mut self) -> Result<String, InstrumentError> {
        self.query("?NM")
    }

    /// Get the present wavelength in nm.
    pub fn get_wavelength_nm(&mut self) -> Result<f64, InstrumentError> {
        clean_number(&self.get_wavelength_raw()?)
    }

    /// Get the present scan speed as the raw reply, e.g., `"?NM/MIN 100.0 nm/min ok"`.
    pub fn get_scan_speed_raw(&mut self) -> Result<String, InstrumentError> {
        self.query("?NM/MIN")
    }

    /// Get the present scan speed in nm/min.
    pub fn get_scan_speed_nm_per_min(&mut self) -> Result<f64, InstrumentError> {
        clean_number(&self.get_scan_speed_raw()?)
    }

    /// Get the grating position (1 or 2) on the present turret.
    pub fn get_grating(&mut self) -> Result<u8, InstrumentError> {
        let resp = self.query("?GRATING")?;
        parse_index(&resp)
    }

    /// Get groove spacing and blaze wavelength of all grating positions.
    ///
    /// Returns one line per grating as sent by the monochromator.
    pub fn get_gratings(&mut self) -> Result<Vec<String>, InstrumentError> {
        let mut intf = self.interface.lock().expect("Mutex should not be poisoned");
        intf.sendcmd("?GRATINGS")?;
        (0..GRATINGS_LINES)
            .map(|_| intf.read_until_terminator())
            .collect()
    }

    /// Get the selected turret number.
    pub fn get_turret(&mut self) -> Result<u8, InstrumentError> {
        let resp = self.query("?TURRET")?;
        parse_index(&resp)
    }

    /// Get the groove spacing of each grating for each turret as the raw reply.
    pub fn get_turrets(&mut self) -> Result<String, InstrumentError> {
        self.query("?TURRETS")
    }

    /// Query the instrument with a command and return the response as a String.
    fn query(&mut self, cmd: &str) -> Result<String, InstrumentError> {
        let mut intf = self.interface.lock().expect("Mutex should not be poisoned");
        intf.query(cmd)
    }
}

impl<T: InstrumentInterface> Clone for Sp2150i<T> {
    fn clone(&self) -> Self {
        Self {
            interface: self.interface.clone(),
        }
    }
}

/// A moving monochromator shows up as a transport fault, not as an error reply.
fn is_busy(err: &InstrumentError) -> bool {
    matches!(
        err,
        InstrumentError::Timeout(_) | InstrumentError::TimeoutQuery { .. } | InstrumentError::Io(_)
    )
}

fn check_wavelength(wavelength_nm: f64) -> Result<(), InstrumentError> {
    if wavelength_nm.is_finite() && wavelength_nm >= 0.0 {
        Ok(())
    } else {
        Err(InstrumentError::FloatValueOutOfRange {
            value: wavelength_nm,
            min: 0.0,
            max: f64::MAX,
        })
    }
}

fn parse_index(reply: &str) -> Result<u8, InstrumentError> {
    let val = clean_number(reply)?;
    if val.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&val) {
        return Err(InstrumentError::ResponseParseError(reply.to_string()));
    }
    Ok(val as u8)
}
