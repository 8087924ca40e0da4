//! Command line program to sweep the monochromator and record the photocurrent.
//!
//! # Usage
//!
//! ```bash
//! # GPIB resources need a system VISA library
//! cargo run --release -p wavelength-sweeper --features visa -- 400 700 100 500 600 20
//!
//! # List the resources that can be opened
//! cargo run --release -p wavelength-sweeper --features visa -- --list-resources
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::Parser;
use instrumentrs::{Resource, list_resources};
use keithley_2602b::Keithley2602b;
use princeton_sp2150i::{BAUD, Sp2150i};
use thorlabs_pm100::Pm100;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wavelength_sweeper::{
    DEFAULT_LABEL, OutputFiles, SweepConfig, SweepPlan, Sweeper, WavelengthRange, write_csv,
    write_plot,
};

/// Wavelength sweep - record the photocurrent of a photodiode versus wavelength
#[derive(Parser, Debug)]
#[command(name = "wavelength-sweeper")]
#[command(about = "Sweep the monochromator and measure the photocurrent with the SourceMeter")]
struct Args {
    /// First wavelength of the coarse sweep (nm)
    #[arg(required_unless_present = "list_resources")]
    coarse_start: Option<u32>,

    /// Last wavelength of the coarse sweep (nm)
    #[arg(required_unless_present = "list_resources")]
    coarse_stop: Option<u32>,

    /// Step of the coarse sweep (nm)
    #[arg(required_unless_present = "list_resources")]
    coarse_step: Option<u32>,

    /// First wavelength of the fine sweep (nm)
    #[arg(requires = "fine_step")]
    fine_start: Option<u32>,

    /// Last wavelength of the fine sweep (nm)
    fine_stop: Option<u32>,

    /// Step of the fine sweep (nm)
    fine_step: Option<u32>,

    /// Monochromator resource
    #[arg(long, default_value = princeton_sp2150i::DEFAULT_RESOURCE)]
    monochromator: String,

    /// SourceMeter resource
    #[arg(long, default_value = keithley_2602b::DEFAULT_RESOURCE)]
    smu: String,

    /// Power meter resource, no power is recorded if not given
    #[arg(long)]
    power_meter: Option<String>,

    /// Scan speed of the monochromator (nm/min)
    #[arg(long, default_value_t = SweepConfig::default().scan_speed_nm_per_min)]
    scan_speed: f64,

    /// Current readings averaged per wavelength
    #[arg(long, default_value_t = SweepConfig::default().samples)]
    samples: u32,

    /// Label that the output file names start with
    #[arg(long, default_value = DEFAULT_LABEL)]
    label: String,

    /// Output directory for the table and the plot
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Print the available resources and exit
    #[arg(long)]
    list_resources: bool,

    /// Do not draw the plot
    #[arg(long)]
    no_plot: bool,
}

impl Args {
    fn plan(&self) -> Result<SweepPlan> {
        let (Some(start), Some(stop), Some(step)) =
            (self.coarse_start, self.coarse_stop, self.coarse_step)
        else {
            bail!("The coarse sweep needs a start, a stop, and a step");
        };
        let coarse = WavelengthRange::new(start, stop, step)?;
        let fine = match (self.fine_start, self.fine_stop, self.fine_step) {
            (Some(start), Some(stop), Some(step)) => Some(WavelengthRange::new(start, stop, step)?),
            (None, None, None) => None,
            _ => bail!("The fine sweep needs a start, a stop, and a step"),
        };
        Ok(SweepPlan::new(coarse, fine))
    }
}

fn open(resource: &str) -> Result<instrumentrs::BoxedInstrument> {
    let res: Resource = resource
        .parse()
        .with_context(|| format!("Invalid resource {resource:?}"))?;
    res.open(BAUD)
        .with_context(|| format!("Failed to open {res}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    if args.list_resources {
        for res in list_resources().context("Failed to list resources")? {
            println!("{res}");
        }
        return Ok(());
    }

    let plan = args.plan()?;
    info!(targets = ?plan.targets(), "Sweep planned");

    let smu = Keithley2602b::try_new(open(&args.smu)?)?;
    info!(smu = %args.smu, "SourceMeter connected");
    let monochromator = Sp2150i::try_new(open(&args.monochromator)?)?;
    info!(monochromator = %args.monochromator, "Monochromator connected");

    let config = SweepConfig {
        scan_speed_nm_per_min: args.scan_speed,
        samples: args.samples,
    };
    let mut sweeper = Sweeper::new(smu, monochromator, config);
    if let Some(pm) = &args.power_meter {
        sweeper = sweeper.with_power_meter(Pm100::try_new(open(pm)?)?);
        info!(power_meter = %pm, "Power meter connected");
    }

    let record = sweeper.run(&plan).context("Sweep failed")?;

    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            args.output_dir.display()
        )
    })?;
    let files = OutputFiles::new(&args.output_dir, &args.label, Local::now().naive_local());
    write_csv(&record, &files.csv)?;
    if !args.no_plot {
        write_plot(&record, &files.plot)?;
    }

    Ok(())
}
