//! Save a sweep as a CSV table and an SVG plot.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use plotters::prelude::*;

use crate::{SweepError, SweepRecord};

/// Label used for the output files if none is given.
pub const DEFAULT_LABEL: &str = "photocurrent_sweep";

/// Paths of the table and the plot of one sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    /// The CSV table.
    pub csv: PathBuf,
    /// The SVG plot.
    pub plot: PathBuf,
}

impl OutputFiles {
    /// Name both files `{label}_{YYYY-mm-dd_HH-MM-SS}` in `dir`.
    pub fn new(dir: &Path, label: &str, timestamp: NaiveDateTime) -> Self {
        let stem = format!("{label}_{}", timestamp.format("%Y-%m-%d_%H-%M-%S"));
        OutputFiles {
            csv: dir.join(format!("{stem}.csv")),
            plot: dir.join(format!("{stem}.svg")),
        }
    }
}

/// Write the table to a file, see [`write_csv_to`].
pub fn write_csv(record: &SweepRecord, path: &Path) -> Result<(), SweepError> {
    let file = std::fs::File::create(path)?;
    write_csv_to(record, file)?;
    tracing::info!(path = %path.display(), "Table written");
    Ok(())
}

/// Write one row per point with the wavelength, the current, and the source voltage.
///
/// A `power_w` column is added if any point carries a power reading.
pub fn write_csv_to<W: Write>(record: &SweepRecord, writer: W) -> Result<(), SweepError> {
    let with_power = record.has_power();
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["wavelength_nm", "current_a", "source_voltage_v"];
    if with_power {
        header.push("power_w");
    }
    wtr.write_record(&header)?;

    let voltage = record.source_voltage.as_volts().to_string();
    for pt in &record.points {
        let mut row = vec![
            pt.wavelength_nm.to_string(),
            pt.current.as_amperes().to_string(),
            voltage.clone(),
        ];
        if with_power {
            row.push(pt.power.map(|p| p.as_watts().to_string()).unwrap_or_default());
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Draw the current versus the wavelength as an SVG line plot.
pub fn write_plot(record: &SweepRecord, path: &Path) -> Result<(), SweepError> {
    let data: Vec<(f64, f64)> = record
        .points
        .iter()
        .map(|pt| (pt.wavelength_nm, pt.current.as_amperes()))
        .collect();
    let (x_min, x_max) = padded_extent(data.iter().map(|(x, _)| *x));
    let (y_min, y_max) = padded_extent(data.iter().map(|(_, y)| *y));

    let root = SVGBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Photocurrent vs. Wavelength", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("Wavelength [nm]")
        .y_desc("Current [A]")
        .y_label_formatter(&|y| format!("{y:.2e}"))
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(LineSeries::new(data, &BLUE))
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    tracing::info!(path = %path.display(), "Plot written");
    Ok(())
}

/// Minimum and maximum of the values, widened by 5 % so the line does not touch the frame.
///
/// An empty or constant series gets a range of one unit around its value.
fn padded_extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return (0.0, 1.0);
    }
    let pad = (max - min) * 0.05;
    if pad == 0.0 {
        let half = if min == 0.0 { 0.5 } else { min.abs() * 0.5 };
        return (min - half, max + half);
    }
    (min - pad, max + pad)
}

fn plot_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> SweepError {
    SweepError::Plot(err.to_string())
}
