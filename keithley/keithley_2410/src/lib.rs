//! A rust driver for the Keithley 2410 SourceMeter.
//!
//! The 2410 speaks SCPI only. The commands used here are described in the 2400 series user
//! manual, chapter "SCPI command reference". Note that with the 1 kV source range selected, the
//! highest current measurement range is 20 mA, and with the 1 A or 100 mA source range selected,
//! the highest voltage measurement range is 20 V.
//!
//! # Example
//!
//! ```no_run
//! use instrumentrs::Resource;
//! use keithley_2410::{DEFAULT_RESOURCE, Function, Keithley2410};
//! use measurements::Voltage;
//!
//! let resource: Resource = DEFAULT_RESOURCE.parse().unwrap();
//! let mut inst = Keithley2410::try_new(resource.open(9600).unwrap()).unwrap();
//! println!("{}", inst.get_name().unwrap());
//!
//! inst.set_source_function(Function::Voltage).unwrap();
//! inst.set_voltage_source(Voltage::from_volts(-2.0)).unwrap();
//! inst.output_on().unwrap();
//! println!("Current: {}", inst.measure_current().unwrap());
//! inst.output_off().unwrap();
//! ```

#![warn(missing_docs)]

mod modes;

pub use modes::{Function, SourceMode};

use std::sync::{Arc, Mutex};

use instrumentrs::{
    InstrumentError, InstrumentInterface,
    scpi::{self, Bound, NumericValue},
};
use measurements::{Current, Voltage};

/// The GPIB address the 2410 is found at on our bench.
pub const DEFAULT_RESOURCE: &str = "GPIB0::24::INSTR";

/// Field of the current in the reply to `:MEAS:CURR:DC?` (voltage, current, resistance, time,
/// status).
const CURRENT_FIELD: usize = 1;
/// Field of the voltage in the reply to `:MEAS:CURR:DC?`.
const VOLTAGE_FIELD: usize = 0;

/// A rust driver for the Keithley 2410.
///
/// See the top-level documentation for an example on how to use this driver.
pub struct Keithley2410<T: InstrumentInterface> {
    interface: Arc<Mutex<T>>,
}

impl<T: InstrumentInterface> Keithley2410<T> {
    /// Create a new Keithley2410 instance with the given instrument interface.
    ///
    /// The terminator is set to `"\n"`.
    ///
    /// # Arguments
    /// * `interface` - An instrument interface that implements the [`InstrumentInterface`] trait.
    pub fn try_new(interface: T) -> Result<Self, InstrumentError> {
        let mut intf = interface;
        intf.set_terminator("\n");
        Ok(Keithley2410 {
            interface: Arc::new(Mutex::new(intf)),
        })
    }

    /// Query the identification string of the instrument.
    pub fn get_name(&mut self) -> Result<String, InstrumentError> {
        self.query("*IDN?")
    }

    /// Set the compliance limits we run the SourceMeter with: 25 V and 2 A.
    pub fn initialize(&mut self) -> Result<(), InstrumentError> {
        self.set_voltage_compliance(Voltage::from_volts(25.0))?;
        self.set_current_compliance(Current::from_amperes(2.0))
    }

    /// Reset the instrument to its default values.
    pub fn reset(&mut self) -> Result<(), InstrumentError> {
        self.sendcmd("*RST")
    }

    /// Perform the ROM checksum self test.
    ///
    /// Returns `true` if the test passed.
    pub fn self_test(&mut self) -> Result<bool, InstrumentError> {
        let resp = self.query("*TST?")?;
        Ok(!scpi::parse_bool(&resp)?)
    }

    /// Block until all pending operations are complete.
    ///
    /// The instrument places a `1` into the output queue once all pending commands have been
    /// executed.
    pub fn operation_complete(&mut self) -> Result<(), InstrumentError> {
        let resp = self.query("*OPC?")?;
        if scpi::parse_bool(&resp)? {
            Ok(())
        } else {
            Err(InstrumentError::ResponseParseError(resp))
        }
    }

    /// Read one line from the output queue.
    pub fn read(&mut self) -> Result<String, InstrumentError> {
        let mut intf = self.interface.lock().expect("Mutex should not be poisoned");
        intf.read_until_terminator()
    }

    /// Get the start level of a voltage sweep.
    pub fn get_voltage_sweep_start(
        &mut self,
        bound: Option<Bound>,
    ) -> Result<Voltage, InstrumentError> {
        self.query_volts(":SOUR:VOLT:STAR?", bound)
    }

    /// Get the stop level of a voltage sweep.
    pub fn get_voltage_sweep_stop(
        &mut self,
        bound: Option<Bound>,
    ) -> Result<Voltage, InstrumentError> {
        self.query_volts(":SOUR:VOLT:STOP?", bound)
    }

    /// Get the step size of a voltage sweep.
    pub fn get_voltage_sweep_step(
        &mut self,
        bound: Option<Bound>,
    ) -> Result<Voltage, InstrumentError> {
        self.query_volts(":SOUR:VOLT:STEP?", bound)
    }

    /// Select the function that is measured.
    pub fn set_sense_function(&mut self, function: Function) -> Result<(), InstrumentError> {
        self.sendcmd(&format!(":SENS:FUNC {}", function.as_str()))
    }

    /// Query if the front panel display is enabled.
    pub fn get_display_enabled(&mut self) -> Result<bool, InstrumentError> {
        let resp = self.query(":DISP:ENAB?")?;
        scpi::parse_bool(&resp)
    }

    /// Enable or disable the front panel display.
    ///
    /// With the display disabled the instrument operates at a higher speed and all front panel
    /// controls except LOCAL and OUTPUT OFF are disabled.
    pub fn set_display_enabled(&mut self, enabled: bool) -> Result<(), InstrumentError> {
        self.sendcmd(&format!(":DISP:ENAB {}", u8::from(enabled)))
    }

    /// Get the source function, i.e., if the V-Source or the I-Source is used.
    pub fn get_source_function(&mut self) -> Result<Function, InstrumentError> {
        let resp = self.query(":SOUR:FUNC?")?;
        Function::from_cmd_str(&resp)
    }

    /// Select the V-Source or the I-Source.
    pub fn set_source_function(&mut self, function: Function) -> Result<(), InstrumentError> {
        self.sendcmd(&format!(":SOUR:FUNC {}", function.as_str()))
    }

    /// Get the DC sourcing mode of the current source.
    pub fn get_current_source_mode(&mut self) -> Result<SourceMode, InstrumentError> {
        let resp = self.query(":SOUR:CURR:MODE?")?;
        SourceMode::from_cmd_str(&resp)
    }

    /// Get the DC sourcing mode of the voltage source.
    pub fn get_voltage_source_mode(&mut self) -> Result<SourceMode, InstrumentError> {
        let resp = self.query(":SOUR:VOLT:MODE?")?;
        SourceMode::from_cmd_str(&resp)
    }

    /// Get how many source-measure operations the trigger layer performs.
    pub fn get_trigger_count(&mut self, bound: Option<Bound>) -> Result<u32, InstrumentError> {
        let resp = self.query_bound(":TRIG:SEQ:COUN?", bound)?;
        parse_count(&resp)
    }

    /// Set how many source-measure operations the trigger layer performs.
    ///
    /// The product of arm count and trigger count cannot exceed 2500, which is checked by the
    /// instrument. Here we only ensure that the count itself is within 1 to 2500.
    pub fn set_trigger_count(&mut self, count: u32) -> Result<(), InstrumentError> {
        if !(1..=2500).contains(&count) {
            return Err(InstrumentError::IntValueOutOfRange {
                value: count.into(),
                min: 1,
                max: 2500,
            });
        }
        self.sendcmd(&format!(":TRIG:SEQ:COUN {count}"))
    }

    /// Get the over voltage protection limit of the V-Source.
    pub fn get_voltage_limit(&mut self, bound: Option<Bound>) -> Result<Voltage, InstrumentError> {
        self.query_volts(":SOUR:VOLT:PROT?", bound)
    }

    /// Set the over voltage protection limit of the V-Source.
    ///
    /// The instrument selects the next lower of its limits (20, 40, 100, 200, 300, 400, 500 V,
    /// and none).
    pub fn set_voltage_limit(&mut self, limit: Voltage) -> Result<(), InstrumentError> {
        self.sendcmd(&format!(":SOUR:VOLT:PROT {}", limit.as_volts()))
    }

    /// Get the level of the voltage source.
    pub fn get_voltage_source(
        &mut self,
        bound: Option<Bound>,
    ) -> Result<Voltage, InstrumentError> {
        self.query_volts(":SOUR:VOLT?", bound)
    }

    /// Set the level of the voltage source.
    pub fn set_voltage_source(&mut self, level: Voltage) -> Result<(), InstrumentError> {
        self.sendcmd(&format!(":SOUR:VOLT {}", level.as_volts()))
    }

    /// Get the level of the current source.
    pub fn get_current_source(
        &mut self,
        bound: Option<Bound>,
    ) -> Result<Current, InstrumentError> {
        self.query_amperes(":SOUR:CURR?", bound)
    }

    /// Set the level of the current source.
    pub fn set_current_source(&mut self, level: Current) -> Result<(), InstrumentError> {
        self.sendcmd(&format!(":SOUR:CURR {}", level.as_amperes()))
    }

    /// Get the voltage compliance.
    pub fn get_voltage_compliance(
        &mut self,
        bound: Option<Bound>,
    ) -> Result<Voltage, InstrumentError> {
        self.query_volts(":VOLT:PROT?", bound)
    }

    /// Set the voltage compliance.
    pub fn set_voltage_compliance(&mut self, compliance: Voltage) -> Result<(), InstrumentError> {
        self.sendcmd(&format!(":VOLT:PROT {}", compliance.as_volts()))
    }

    /// Get the current compliance.
    pub fn get_current_compliance(
        &mut self,
        bound: Option<Bound>,
    ) -> Result<Current, InstrumentError> {
        self.query_amperes(":CURR:PROT?", bound)
    }

    /// Set the current compliance.
    pub fn set_current_compliance(&mut self, compliance: Current) -> Result<(), InstrumentError> {
        self.sendcmd(&format!(":CURR:PROT {}", compliance.as_amperes()))
    }

    /// Get the filter count, i.e., the number of readings averaged into one.
    pub fn get_measurement_count(
        &mut self,
        bound: Option<Bound>,
    ) -> Result<u32, InstrumentError> {
        let resp = self.query_bound(":AVER:COUN?", bound)?;
        parse_count(&resp)
    }

    /// Set the filter count.
    ///
    /// Valid counts are 1 to 100. Values above are sent as `MAX`, values below as `MIN`, and a
    /// warning is logged.
    pub fn set_measurement_count(&mut self, count: NumericValue) -> Result<(), InstrumentError> {
        let arg = match count {
            NumericValue::Value(val) if val > 100.0 => {
                tracing::warn!(count = val, "Filter count set at max value of 100");
                Bound::Maximum.to_string()
            }
            NumericValue::Value(val) if val < 1.0 => {
                tracing::warn!(count = val, "Filter count set at min value of 1");
                Bound::Minimum.to_string()
            }
            NumericValue::Value(val) => format!("{}", val.round()),
            NumericValue::Bound(bound) => bound.to_string(),
        };
        self.sendcmd(&format!(":AVER:COUN {arg}"))
    }

    /// Get the integration time for current measurements in power line cycles (NPLC).
    ///
    /// The integration time is global: setting it for one function sets it for all of them.
    pub fn get_current_integration_time(
        &mut self,
        bound: Option<Bound>,
    ) -> Result<f64, InstrumentError> {
        let resp = self.query_bound(":CURR:NPLC?", bound)?;
        scpi::parse_f64(&resp)
    }

    /// Set the integration time for current measurements in NPLC.
    pub fn set_current_integration_time(&mut self, nplc: f64) -> Result<(), InstrumentError> {
        self.set_nplc(":CURR:NPLC", nplc)
    }

    /// Get the integration time for voltage measurements in NPLC.
    pub fn get_voltage_integration_time(
        &mut self,
        bound: Option<Bound>,
    ) -> Result<f64, InstrumentError> {
        let resp = self.query_bound(":VOLT:NPLC?", bound)?;
        scpi::parse_f64(&resp)
    }

    /// Set the integration time for voltage measurements in NPLC.
    pub fn set_voltage_integration_time(&mut self, nplc: f64) -> Result<(), InstrumentError> {
        self.set_nplc(":VOLT:NPLC", nplc)
    }

    /// Get the integration time for resistance measurements in NPLC.
    pub fn get_resistance_integration_time(
        &mut self,
        bound: Option<Bound>,
    ) -> Result<f64, InstrumentError> {
        let resp = self.query_bound(":RES:NPLC?", bound)?;
        scpi::parse_f64(&resp)
    }

    /// Set the integration time for resistance measurements in NPLC.
    pub fn set_resistance_integration_time(&mut self, nplc: f64) -> Result<(), InstrumentError> {
        self.set_nplc(":RES:NPLC", nplc)
    }

    /// Perform a one-shot measurement and return the raw reply.
    ///
    /// The reply holds voltage, current, resistance, timestamp, and status, separated by commas.
    pub fn measure_raw(&mut self) -> Result<String, InstrumentError> {
        self.query(":MEAS:CURR:DC?")
    }

    /// Perform a one-shot measurement and return the current.
    pub fn measure_current(&mut self) -> Result<Current, InstrumentError> {
        let resp = self.measure_raw()?;
        let val = scpi::parse_f64(scpi::reply_field(&resp, CURRENT_FIELD)?)?;
        Ok(Current::from_amperes(val))
    }

    /// Perform a one-shot measurement and return the voltage.
    pub fn measure_voltage(&mut self) -> Result<Voltage, InstrumentError> {
        let resp = self.measure_raw()?;
        let val = scpi::parse_f64(scpi::reply_field(&resp, VOLTAGE_FIELD)?)?;
        Ok(Voltage::from_volts(val))
    }

    /// Turn the output on.
    pub fn output_on(&mut self) -> Result<(), InstrumentError> {
        self.sendcmd(":OUTP:STAT ON")
    }

    /// Turn the output off.
    pub fn output_off(&mut self) -> Result<(), InstrumentError> {
        self.sendcmd(":OUTP:STAT OFF")
    }

    /// Query if the output is on.
    pub fn get_output_enabled(&mut self) -> Result<bool, InstrumentError> {
        let resp = self.query(":OUTP:STAT?")?;
        scpi::parse_bool(&resp)
    }

    fn set_nplc(&mut self, cmd: &str, nplc: f64) -> Result<(), InstrumentError> {
        if !(0.01..=10.0).contains(&nplc) {
            return Err(InstrumentError::FloatValueOutOfRange {
                value: nplc,
                min: 0.01,
                max: 10.0,
            });
        }
        self.sendcmd(&format!("{cmd} {nplc}"))
    }

    fn query_volts(
        &mut self,
        cmd: &str,
        bound: Option<Bound>,
    ) -> Result<Voltage, InstrumentError> {
        let resp = self.query_bound(cmd, bound)?;
        Ok(Voltage::from_volts(scpi::parse_f64(&resp)?))
    }

    fn query_amperes(
        &mut self,
        cmd: &str,
        bound: Option<Bound>,
    ) -> Result<Current, InstrumentError> {
        let resp = self.query_bound(cmd, bound)?;
        Ok(Current::from_amperes(scpi::parse_f64(&resp)?))
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

    fn query_bound(&mut self, cmd: &str, bound: Option<Bound>) -> Result<String, InstrumentError> {
        let mut intf = self.interface.lock().expect("Mutex should not be poisoned");
        scpi::query_with_bound(&mut *intf, cmd, bound)
    }
}

impl<T: InstrumentInterface> Clone for Keithley2410<T> {
    fn clone(&self) -> Self {
        Self {
            interface: self.interface.clone(),
        }
    }
}

/// Parse an integer count reply, which the instrument may send as a float, e.g., `+1.000000E+00`.
fn parse_count(reply: &str) -> Result<u32, InstrumentError> {
    let val = scpi::parse_f64(reply)?;
    if val < 0.0 || val.fract() != 0.0 || val > f64::from(u32::MAX) {
        return Err(InstrumentError::ResponseParseError(reply.to_string()));
    }
    Ok(val as u32)
}
