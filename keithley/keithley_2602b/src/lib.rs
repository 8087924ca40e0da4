//! A rust driver for the Keithley 2602B dual channel SourceMeter.
//!
//! The 2602B is programmed with TSP (Test Script Processor) statements, a Lua based language that
//! runs on the instrument. It also understands a small number of SCPI commands, which our
//! photocurrent setup uses to bias the photodiode and read the current. Both are available here.
//!
//! Channels `smua` and `smub` are zero-indexed, i.e., channel 0 is `smua`.
//!
//! # Example
//!
//! ```no_run
//! use instrumentrs::Resource;
//! use keithley_2602b::{DEFAULT_RESOURCE, Keithley2602b, Quantity};
//!
//! let resource: Resource = DEFAULT_RESOURCE.parse().unwrap();
//! let mut inst = Keithley2602b::try_new(resource.open(9600).unwrap()).unwrap();
//! println!("{}", inst.get_name().unwrap());
//!
//! let mut smua = inst.get_channel(0).unwrap();
//! smua.set_limit(Quantity::Current, 0.01).unwrap();
//! smua.output_on().unwrap();
//! println!("Current: {} A", smua.measure(Quantity::Current).unwrap());
//! smua.output_off().unwrap();
//! ```

#![warn(missing_docs)]

mod tsp;

pub use tsp::{DisplayFunction, Quantity, Screen};

use std::sync::{Arc, Mutex};

use instrumentrs::{InstrumentError, InstrumentInterface, scpi};
use measurements::{Current, Voltage};

/// The GPIB address the 2602B is found at on our bench.
pub const DEFAULT_RESOURCE: &str = "GPIB0::30::INSTR";

/// Field of the current in the reply to `:MEAS:CURR:DC?`.
const CURRENT_FIELD: usize = 1;

/// A rust driver for the Keithley 2602B.
///
/// See the top-level documentation for an example on how to use this driver.
pub struct Keithley2602b<T: InstrumentInterface> {
    interface: Arc<Mutex<T>>,
    num_channels: usize,
}

impl<T: InstrumentInterface> Keithley2602b<T> {
    /// Create a new Keithley2602b instance with the given instrument interface.
    ///
    /// # Arguments
    /// * `interface` - An instrument interface that implements the [`InstrumentInterface`] trait.
    pub fn try_new(interface: T) -> Result<Self, InstrumentError> {
        let mut intf = interface;
        intf.set_terminator("\n");
        Ok(Keithley2602b {
            interface: Arc::new(Mutex::new(intf)),
            num_channels: 2,
        })
    }

    /// Get a new channel with a given index.
    ///
    /// Please note that channels are zero indexed: 0 is `smua`, 1 is `smub`.
    pub fn get_channel(&mut self, idx: usize) -> Result<Channel<T>, InstrumentError> {
        if idx >= self.num_channels {
            return Err(InstrumentError::ChannelIndexOutOfRange {
                idx,
                nof_channels: self.num_channels,
            });
        }
        Ok(Channel::new(idx, Arc::clone(&self.interface)))
    }

    /// Query the identification string of the instrument.
    pub fn get_name(&mut self) -> Result<String, InstrumentError> {
        self.query("*IDN?")
    }

    /// Put both channels into the state we start measurements from.
    ///
    /// Clears the error queue, limits both channels to 10 V and 1 A, sources -3 V on `smua` and
    /// 0 V on `smub`, zeroes the current levels, and displays DC current for both channels.
    pub fn initialize(&mut self) -> Result<(), InstrumentError> {
        self.clear_error_queue()?;
        let mut smua = self.get_channel(0)?;
        let mut smub = self.get_channel(1)?;

        smua.set_limit(Quantity::Voltage, 10.0)?;
        smub.set_limit(Quantity::Voltage, 10.0)?;
        smua.set_limit(Quantity::Current, 1.0)?;
        smub.set_limit(Quantity::Current, 1.0)?;

        smua.set_source_level(Quantity::Voltage, -3.0)?;
        smub.set_source_level(Quantity::Voltage, 0.0)?;
        smua.set_source_level(Quantity::Current, 0.0)?;
        smub.set_source_level(Quantity::Current, 0.0)?;

        smua.set_display_function(DisplayFunction::DcAmps)?;
        smub.set_display_function(DisplayFunction::DcAmps)
    }

    /// Bias the photodiode through the SCPI command set: 500 µA current protection, -2 V.
    pub fn initialize_scpi_bias(&mut self) -> Result<(), InstrumentError> {
        self.sendcmd(":CURRent:PROTection 500e-6")?;
        self.sendcmd(":SOUR:VOLT -2")
    }

    /// Reset the instrument, i.e., both channels, to default values.
    pub fn reset(&mut self) -> Result<(), InstrumentError> {
        self.sendcmd("reset()")
    }

    /// Clear all entries from the error queue.
    pub fn clear_error_queue(&mut self) -> Result<(), InstrumentError> {
        self.sendcmd("errorqueue.clear()")
    }

    /// Select which channels are shown on the front panel.
    pub fn set_display_screen(&mut self, screen: Screen) -> Result<(), InstrumentError> {
        self.sendcmd(&format!("display.screen = {}", screen.as_str()))
    }

    /// Turn the output on through the SCPI command set.
    pub fn scpi_output_on(&mut self) -> Result<(), InstrumentError> {
        self.sendcmd(":OUTP:STAT ON")
    }

    /// Turn the output off through the SCPI command set.
    pub fn scpi_output_off(&mut self) -> Result<(), InstrumentError> {
        self.sendcmd(":OUTP:STAT OFF")
    }

    /// Perform a one-shot measurement through SCPI and return the raw, comma-separated reply.
    pub fn scpi_measure_current_raw(&mut self) -> Result<String, InstrumentError> {
        self.query(":MEAS:CURR:DC?")
    }

    /// Perform a one-shot measurement through SCPI and return the current.
    pub fn scpi_measure_current(&mut self) -> Result<Current, InstrumentError> {
        let resp = self.scpi_measure_current_raw()?;
        let val = scpi::parse_f64(scpi::reply_field(&resp, CURRENT_FIELD)?)?;
        tracing::debug!(current_a = val, "SCPI current measured");
        Ok(Current::from_amperes(val))
    }

    /// Query the present level of the voltage source through SCPI.
    pub fn scpi_get_source_voltage(&mut self) -> Result<Voltage, InstrumentError> {
        let resp = self.query(":SOURce:VOLTage:AMPLitude?")?;
        Ok(Voltage::from_volts(scpi::parse_f64(resp.trim_end())?))
    }

    /// Query the present measurement configuration through SCPI.
    pub fn scpi_configuration(&mut self) -> Result<String, InstrumentError> {
        self.query(":CONF?")
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

impl<T: InstrumentInterface> Clone for Keithley2602b<T> {
    fn clone(&self) -> Self {
        Self {
            interface: self.interface.clone(),
            num_channels: self.num_channels,
        }
    }
}

/// Channel structure representing a single SMU of the 2602B.
///
/// **This structure can only be created through the [`Keithley2602b`] struct.**
pub struct Channel<T: InstrumentInterface> {
    idx: usize,
    interface: Arc<Mutex<T>>,
}

impl<T: InstrumentInterface> Channel<T> {
    fn new(idx: usize, interface: Arc<Mutex<T>>) -> Self {
        Channel { idx, interface }
    }

    /// Set the source limit (compliance) for voltage, current, or power.
    ///
    /// There is no resistance limit, asking for one is an invalid argument.
    pub fn set_limit(&mut self, quantity: Quantity, value: f64) -> Result<(), InstrumentError> {
        if quantity == Quantity::Resistance {
            tracing::warn!(smu = self.name(), "Resistance cannot limit the source");
            return Err(InstrumentError::InvalidArgument(
                "The source cannot be limited by resistance".to_string(),
            ));
        }
        let smu = self.name();
        self.sendcmd(&format!("{smu}.source.limit{} = {value}", quantity.suffix()))
    }

    /// Set the source level for voltage or current.
    pub fn set_source_level(
        &mut self,
        quantity: Quantity,
        value: f64,
    ) -> Result<(), InstrumentError> {
        if !matches!(quantity, Quantity::Voltage | Quantity::Current) {
            return Err(InstrumentError::InvalidArgument(
                "Only voltage and current can be sourced".to_string(),
            ));
        }
        let smu = self.name();
        self.sendcmd(&format!("{smu}.source.level{} = {value}", quantity.suffix()))
    }

    /// Measure a quantity and return its value in SI units.
    pub fn measure(&mut self, quantity: Quantity) -> Result<f64, InstrumentError> {
        let smu = self.name();
        let resp = self.query(&format!("print({smu}.measure.{}())", quantity.suffix()))?;
        let val = scpi::parse_f64(&resp)?;
        tracing::debug!(smu, ?quantity, value = val, "measured");
        Ok(val)
    }

    /// Turn the output of this channel on.
    pub fn output_on(&mut self) -> Result<(), InstrumentError> {
        let smu = self.name();
        self.sendcmd(&format!("{smu}.source.output = {smu}.OUTPUT_ON"))
    }

    /// Turn the output of this channel off.
    pub fn output_off(&mut self) -> Result<(), InstrumentError> {
        let smu = self.name();
        self.sendcmd(&format!("{smu}.source.output = {smu}.OUTPUT_OFF"))
    }

    /// Select what the front panel displays for this channel.
    pub fn set_display_function(
        &mut self,
        function: DisplayFunction,
    ) -> Result<(), InstrumentError> {
        let smu = self.name();
        self.sendcmd(&format!("display.{smu}.measure.func = {}", function.as_str()))
    }

    /// Set the number of measurements taken when a measurement is requested.
    pub fn set_measure_count(&mut self, count: u32) -> Result<(), InstrumentError> {
        if count == 0 {
            return Err(InstrumentError::IntValueOutOfRange {
                value: 0,
                min: 1,
                max: u32::MAX.into(),
            });
        }
        let smu = self.name();
        self.sendcmd(&format!("{smu}.measure.count = {count}"))
    }

    /// Select the DC function that is measured, voltage or current.
    pub fn set_measure_function(&mut self, quantity: Quantity) -> Result<(), InstrumentError> {
        let func = match quantity {
            Quantity::Current => "FUNC_DC_CURRENT",
            Quantity::Voltage => "FUNC_DC_VOLTAGE",
            _ => {
                return Err(InstrumentError::InvalidArgument(
                    "Only DC voltage and DC current can be selected".to_string(),
                ));
            }
        };
        let smu = self.name();
        self.sendcmd(&format!("{smu}.measure.func = {smu}.{func}"))
    }

    /// Map the zero-indexed channel number to the TSP name of the SMU.
    fn name(&self) -> &'static str {
        match self.idx {
            0 => "smua",
            1 => "smub",
            _ => unreachable!("Channel index out of range"),
        }
    }

    /// Send a command for this channel to the interface.
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

impl<T: InstrumentInterface> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            idx: self.idx,
            interface: self.interface.clone(),
        }
    }
}
