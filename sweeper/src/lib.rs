//! Record the photocurrent of a photodiode as a function of wavelength.
//!
//! An SP-2150i monochromator steps through a [`SweepPlan`] while a Keithley 2602B biases the
//! photodiode and measures its current. Optionally, a Thorlabs PM100 measures the optical power at
//! every point. The result is saved as a CSV table and an SVG plot.
//!
//! # Example
//!
//! ```no_run
//! use instrumentrs::Resource;
//! use keithley_2602b::Keithley2602b;
//! use princeton_sp2150i::{BAUD, Sp2150i};
//! use wavelength_sweeper::{SweepConfig, SweepPlan, Sweeper, WavelengthRange};
//!
//! let smu_res: Resource = "GPIB0::30::INSTR".parse().unwrap();
//! let mono_res: Resource = "COM4".parse().unwrap();
//! let smu = Keithley2602b::try_new(smu_res.open(BAUD).unwrap()).unwrap();
//! let mono = Sp2150i::try_new(mono_res.open(BAUD).unwrap()).unwrap();
//!
//! let coarse = WavelengthRange::new(400, 700, 100).unwrap();
//! let fine = WavelengthRange::new(500, 600, 20).unwrap();
//! let plan = SweepPlan::new(coarse, Some(fine));
//!
//! let mut sweeper: Sweeper<_, _, instrumentrs::BoxedInstrument> =
//!     Sweeper::new(smu, mono, SweepConfig::default());
//! let record = sweeper.run(&plan).unwrap();
//! println!("Recorded {} points", record.points.len());
//! ```

#![warn(missing_docs)]

mod error;
mod output;
mod plan;
mod sweep;

pub use error::SweepError;
pub use output::{DEFAULT_LABEL, OutputFiles, write_csv, write_csv_to, write_plot};
pub use plan::{SweepPlan, WavelengthRange};
pub use princeton_sp2150i::{MOVE_SETTLE_MARGIN, settle_time};
pub use sweep::{SWEEP_SETTLE_MARGIN, SweepConfig, SweepPoint, SweepRecord, Sweeper};
