//! Reply cleaning and timing helpers for the SP-2150i.

use std::time::Duration;

use instrumentrs::InstrumentError;

/// Extract the number from a reply of the monochromator.
///
/// The monochromator echoes the command and appends units and `ok`, e.g., `"?NM 300.000 nm ok"`.
/// Everything except digits and the decimal point is dropped before parsing.
pub fn clean_number(reply: &str) -> Result<f64, InstrumentError> {
    let digits: String = reply
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits
        .parse::<f64>()
        .map_err(|_| InstrumentError::ResponseParseError(reply.to_string()))
}

/// Estimate how long a move from one wavelength to another takes.
///
/// The distance is rounded to full nanometers, ties to even. The time is `60 * distance / scan_speed`, scaled
/// by `margin`.
///
/// # Arguments
/// * `from_nm` - Present wavelength in nm.
/// * `to_nm` - Target wavelength in nm.
/// * `scan_speed_nm_per_min` - Scan speed in nm/min, must be larger than zero.
/// * `margin` - Multiplicative safety margin, e.g., 1.1.
pub fn settle_time(
    from_nm: f64,
    to_nm: f64,
    scan_speed_nm_per_min: f64,
    margin: f64,
) -> Result<Duration, InstrumentError> {
    if !scan_speed_nm_per_min.is_finite() || scan_speed_nm_per_min <= 0.0 {
        return Err(InstrumentError::FloatValueOutOfRange {
            value: scan_speed_nm_per_min,
            min: f64::MIN_POSITIVE,
            max: f64::MAX,
        });
    }
    let distance = (from_nm - to_nm).round_ties_even().abs();
    let secs = 60.0 * distance / scan_speed_nm_per_min * margin;
    Duration::try_from_secs_f64(secs).map_err(|_| {
        InstrumentError::InvalidArgument(format!(
            "Cannot estimate the time to move from {from_nm} nm to {to_nm} nm"
        ))
    })
}
