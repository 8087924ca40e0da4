//! Run a planned sweep with a monochromator, a SourceMeter, and optionally a power meter.

use std::thread;

use instrumentrs::InstrumentInterface;
use keithley_2602b::Keithley2602b;
use measurements::{Current, Power, Voltage};
use princeton_sp2150i::{Sp2150i, settle_time};
use thorlabs_pm100::Pm100;

use crate::{SweepError, SweepPlan};

/// Safety margin applied to the estimated move time after every step of the sweep.
pub const SWEEP_SETTLE_MARGIN: f64 = 1.2;

/// Settings of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepConfig {
    /// Scan speed of the monochromator in nm/min.
    pub scan_speed_nm_per_min: f64,
    /// Number of current readings averaged per wavelength.
    pub samples: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            scan_speed_nm_per_min: 300.0,
            samples: 9,
        }
    }
}

/// One recorded point of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    /// The wavelength we asked the monochromator for in nm.
    pub target_nm: u32,
    /// The wavelength the monochromator reported after the measurement in nm.
    pub wavelength_nm: f64,
    /// Mean of the current readings.
    pub current: Current,
    /// Optical power, if a power meter is attached.
    pub power: Option<Power>,
}

/// All points of a finished sweep together with the bias voltage of the SourceMeter.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRecord {
    /// Points in the order they were measured.
    pub points: Vec<SweepPoint>,
    /// Source voltage read back from the SourceMeter after the sweep.
    pub source_voltage: Voltage,
}

impl SweepRecord {
    /// Whether any point carries a power reading.
    pub fn has_power(&self) -> bool {
        self.points.iter().any(|pt| pt.power.is_some())
    }
}

/// Drives the instruments through a [`SweepPlan`].
///
/// The SourceMeter biases the photodiode on channel A and measures its current through SCPI.
pub struct Sweeper<S, M, P>
where
    S: InstrumentInterface,
    M: InstrumentInterface,
    P: InstrumentInterface,
{
    smu: Keithley2602b<S>,
    monochromator: Sp2150i<M>,
    power_meter: Option<Pm100<P>>,
    config: SweepConfig,
}

impl<S, M, P> Sweeper<S, M, P>
where
    S: InstrumentInterface,
    M: InstrumentInterface,
    P: InstrumentInterface,
{
    /// Create a sweeper without a power meter.
    pub fn new(smu: Keithley2602b<S>, monochromator: Sp2150i<M>, config: SweepConfig) -> Self {
        Sweeper {
            smu,
            monochromator,
            power_meter: None,
            config,
        }
    }

    /// Also read the optical power at every point.
    pub fn with_power_meter(mut self, power_meter: Pm100<P>) -> Self {
        self.power_meter = Some(power_meter);
        self
    }

    /// The settings this sweeper runs with.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Run the sweep and return the recorded points.
    ///
    /// The output of channel A is turned off when the sweep ends, also if it fails.
    pub fn run(&mut self, plan: &SweepPlan) -> Result<SweepRecord, SweepError> {
        if self.config.samples == 0 {
            return Err(SweepError::InvalidConfig(
                "at least one sample per point is required".to_string(),
            ));
        }

        self.smu.initialize_scpi_bias()?;
        let mut smua = self.smu.get_channel(0)?;
        smua.output_on()?;

        let sweep = self.sweep(plan);
        if let Err(err) = smua.output_off() {
            match &sweep {
                Ok(_) => return Err(err.into()),
                Err(_) => tracing::error!(%err, "Could not turn off the output of channel A"),
            }
        }
        let points = sweep?;

        let source_voltage = self.smu.scpi_get_source_voltage()?;
        tracing::info!(
            points = points.len(),
            source_voltage_v = source_voltage.as_volts(),
            "Sweep finished"
        );
        Ok(SweepRecord {
            points,
            source_voltage,
        })
    }

    fn sweep(&mut self, plan: &SweepPlan) -> Result<Vec<SweepPoint>, SweepError> {
        let speed = self.config.scan_speed_nm_per_min;
        self.monochromator.set_scan_speed_nm_per_min(speed)?;

        let mut points = Vec::with_capacity(plan.len());
        for &target_nm in plan.targets() {
            let target = f64::from(target_nm);
            let present = self.monochromator.get_wavelength_nm()?;
            self.monochromator.set_wavelength_nm(target)?;
            thread::sleep(settle_time(present, target, speed, SWEEP_SETTLE_MARGIN)?);

            let current = self.mean_current()?;
            let power = match self.power_meter.as_mut() {
                Some(pm) => {
                    pm.set_wavelength_nm(target)?;
                    Some(pm.measure_power()?)
                }
                None => None,
            };
            let wavelength_nm = self.monochromator.get_wavelength_nm()?;

            tracing::info!(
                target_nm,
                wavelength_nm,
                current_a = current.as_amperes(),
                "Point recorded"
            );
            points.push(SweepPoint {
                target_nm,
                wavelength_nm,
                current,
                power,
            });
        }
        Ok(points)
    }

    fn mean_current(&mut self) -> Result<Current, SweepError> {
        let mut sum = 0.0;
        for _ in 0..self.config.samples {
            sum += self.smu.scpi_measure_current()?.as_amperes();
        }
        Ok(Current::from_amperes(sum / f64::from(self.config.samples)))
    }
}
