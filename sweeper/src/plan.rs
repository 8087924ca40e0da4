//! Wavelength ranges and the ordered list of targets of a sweep.

use crate::SweepError;

/// An inclusive range of integer wavelengths in nm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavelengthRange {
    start: u32,
    stop: u32,
    step: u32,
}

impl WavelengthRange {
    /// Create a new range from `start` to `stop` (inclusive) with the given `step`.
    ///
    /// The step must be larger than zero and `start` must not be larger than `stop`.
    pub fn new(start: u32, stop: u32, step: u32) -> Result<Self, SweepError> {
        let invalid = |reason| SweepError::InvalidRange {
            start,
            stop,
            step,
            reason,
        };
        if step == 0 {
            return Err(invalid("step must be larger than zero"));
        }
        if start > stop {
            return Err(invalid("start must not be larger than stop"));
        }
        Ok(WavelengthRange { start, stop, step })
    }

    /// First wavelength in nm.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Last wavelength in nm that may be part of the range.
    pub fn stop(&self) -> u32 {
        self.stop
    }

    /// Step between two points in nm.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// All points of the range in ascending order.
    ///
    /// `stop` is included only if it is reached by a whole number of steps.
    pub fn points(&self) -> impl Iterator<Item = u32> {
        (self.start..=self.stop).step_by(self.step as usize)
    }
}

/// The ordered, strictly ascending wavelengths a sweep visits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepPlan {
    targets: Vec<u32>,
}

impl SweepPlan {
    /// Merge a coarse range with an optional fine range.
    ///
    /// Inside the fine range, only the fine points are visited. Coarse points below the start and
    /// above the stop of the fine range are kept.
    pub fn new(coarse: WavelengthRange, fine: Option<WavelengthRange>) -> Self {
        let targets = match fine {
            None => coarse.points().collect(),
            Some(fine) => coarse
                .points()
                .filter(|wl| *wl < fine.start())
                .chain(fine.points())
                .chain(coarse.points().filter(|wl| *wl > fine.stop()))
                .collect(),
        };
        SweepPlan { targets }
    }

    /// The wavelengths to visit in nm.
    pub fn targets(&self) -> &[u32] {
        &self.targets
    }

    /// Number of wavelengths in the plan.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// A plan built from valid ranges always holds at least one wavelength.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
