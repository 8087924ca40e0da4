//! Names of TSP attributes and constants used by the 2602B driver.

/// The quantities a channel can source, limit, or measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Current in amperes.
    Current,
    /// Voltage in volts.
    Voltage,
    /// Resistance in ohms.
    Resistance,
    /// Power in watts.
    Power,
}

impl Quantity {
    /// The suffix TSP uses for this quantity, e.g., `i` in `smua.measure.i()`.
    pub(crate) fn suffix(&self) -> &str {
        match self {
            Quantity::Current => "i",
            Quantity::Voltage => "v",
            Quantity::Resistance => "r",
            Quantity::Power => "p",
        }
    }
}

/// What the front panel shows for a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFunction {
    /// DC current.
    DcAmps,
    /// DC voltage.
    DcVolts,
    /// Resistance.
    Ohms,
    /// Power.
    Watts,
}

impl DisplayFunction {
    pub(crate) fn as_str(&self) -> &str {
        match self {
            DisplayFunction::DcAmps => "display.MEASURE_DCAMPS",
            DisplayFunction::DcVolts => "display.MEASURE_DCVOLTS",
            DisplayFunction::Ohms => "display.MEASURE_OHMS",
            DisplayFunction::Watts => "display.MEASURE_WATTS",
        }
    }
}

/// Which channels the front panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Source, measure, and compliance of channel A.
    SmuA,
    /// Source, measure, and compliance of channel B.
    SmuB,
    /// Source and measure of both channels.
    SmuAB,
}

impl Screen {
    pub(crate) fn as_str(&self) -> &str {
        match self {
            Screen::SmuA => "display.SMUA",
            Screen::SmuB => "display.SMUB",
            Screen::SmuAB => "display.SMUA_SMUB",
        }
    }
}
