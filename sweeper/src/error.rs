//! Errors that can occur while planning, running, or saving a sweep.

use instrumentrs::InstrumentError;
use thiserror::Error;

/// Errors of the wavelength sweeper.
#[derive(Debug, Error)]
pub enum SweepError {
    /// A wavelength range that does not describe any points.
    #[error("Invalid wavelength range {start}..={stop} nm with step {step} nm: {reason}")]
    InvalidRange {
        /// First wavelength in nm.
        start: u32,
        /// Last wavelength in nm.
        stop: u32,
        /// Step in nm.
        step: u32,
        /// What is wrong with the range.
        reason: &'static str,
    },
    /// A sweep setting that cannot be used.
    #[error("Invalid sweep configuration: {0}")]
    InvalidConfig(String),
    /// An error reported by one of the instruments or their interfaces.
    #[error("Instrument error: {0}")]
    Instrument(#[from] InstrumentError),
    /// Writing the table failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Writing an output file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Drawing the plot failed.
    #[error("Plot error: {0}")]
    Plot(String),
}
