//! A rust driver for the Thorlabs PM100 series of optical power meters.
//!
//! The PM100 speaks SCPI. Since the responsivity of the sensor depends on the wavelength, set the
//! wavelength correction to the wavelength of the light you measure before reading the power.
//!
//! # Example
//!
//! ```no_run
//! use instrumentrs::Resource;
//! use thorlabs_pm100::Pm100;
//!
//! let resource: Resource = "USB0::0x1313::0x8078::P0000001::INSTR".parse().unwrap();
//! let mut inst = Pm100::try_new(resource.open(9600).unwrap()).unwrap();
//! println!("{}", inst.get_name().unwrap());
//!
//! inst.set_wavelength_nm(532.0).unwrap();
//! println!("Power: {}", inst.measure_power().unwrap());
//! ```

#![warn(missing_docs)]

use std::sync::{Arc, Mutex};

use instrumentrs::{InstrumentError, InstrumentInterface, scpi};
use measurements::{Current, Power};

/// A rust driver for the PM100.
///
/// See the top-level documentation for an example on how to use this driver.
pub struct Pm100<T: InstrumentInterface> {
    interface: Arc<Mutex<T>>,
}

impl<T: InstrumentInterface> Pm100<T> {
    /// Create a new Pm100 instance with the given instrument interface.
    ///
    /// # Arguments
    /// * `interface` - An instrument interface that implements the [`InstrumentInterface`] trait.
    pub fn try_new(interface: T) -> Result<Self, InstrumentError> {
        let mut intf = interface;
        intf.set_terminator("\n");
        Ok(Pm100 {
            interface: Arc::new(Mutex::new(intf)),
        })
    }

    /// Query the identification string of the instrument.
    pub fn get_name(&mut self) -> Result<String, InstrumentError> {
        self.query("*IDN?")
    }

    /// Measure the optical power.
    pub fn measure_power(&mut self) -> Result<Power, InstrumentError> {
        let resp = self.query("MEAS:POW?")?;
        let watts = scpi::parse_f64(&resp)?;
        tracing::debug!(power_w = watts, "power measured");
        Ok(Power::from_watts(watts))
    }

    /// Measure the photocurrent of a photodiode sensor.
    pub fn measure_current(&mut self) -> Result<Current, InstrumentError> {
        let resp = self.query("MEAS:CURR?")?;
        Ok(Current::from_amperes(scpi::parse_f64(&resp)?))
    }

    /// Get the wavelength used for the responsivity correction in nm.
    pub fn get_wavelength_nm(&mut self) -> Result<f64, InstrumentError> {
        let resp = self.query("SENS:CORR:WAV?")?;
        scpi::parse_f64(&resp)
    }

    /// Set the wavelength used for the responsivity correction in nm.
    ///
    /// The allowed range depends on the sensor. The meter ignores values outside of it, so we
    /// only reject wavelengths that are not positive.
    pub fn set_wavelength_nm(&mut self, wavelength_nm: f64) -> Result<(), InstrumentError> {
        if !wavelength_nm.is_finite() || wavelength_nm <= 0.0 {
            tracing::warn!(wavelength_nm, "Rejected wavelength correction");
            return Err(InstrumentError::FloatValueOutOfRange {
                value: wavelength_nm,
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
            });
        }
        self.sendcmd(&format!("SENS:CORR:WAV {wavelength_nm}"))
    }

    /// Get the number of samples averaged for one reading. One sample takes about 3 ms.
    pub fn get_averaging_count(&mut self) -> Result<u32, InstrumentError> {
        let resp = self.query("SENS:AVER:COUN?")?;
        let val = scpi::parse_f64(&resp)?;
        if val < 1.0 || val.fract() != 0.0 || val > f64::from(u32::MAX) {
            return Err(InstrumentError::ResponseParseError(resp));
        }
        Ok(val as u32)
    }

    /// Set the number of samples averaged for one reading.
    pub fn set_averaging_count(&mut self, count: u32) -> Result<(), InstrumentError> {
        if count == 0 {
            return Err(InstrumentError::IntValueOutOfRange {
                value: 0,
                min: 1,
                max: u32::MAX.into(),
            });
        }
        self.sendcmd(&format!("SENS:AVER:COUN {count}"))
    }

    /// Send a command to the instrument.
    fn sendcmd(&mut self, cmd: &str) -> Result<(), InstrumentError> {
        let mut intf = self.interface.lock().expect("Mutex should not be poisoned");
        intf.sendcmd(cmd)
    }

    /// Query the instrument with a command and return the response as a String.
    fn query(&mut self, cmd: &str) -> Result<String, InstrumentError> {
        let mut intf = self.interface.lock().expect("Mutex should not be poisoned");
        intf.query(cmd)
    }
}

impl<T: InstrumentInterface> Clone for Pm100<T> {
    fn clone(&self) -> Self {
        Self {
            interface: self.interface.clone(),
        }
    }
}
