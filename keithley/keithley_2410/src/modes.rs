//! Source and sense settings of the 2410 and their SCPI spelling.

use std::fmt::Display;

use instrumentrs::InstrumentError;

/// The quantity the SourceMeter sources, or the quantity it senses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// Voltage (`VOLT`).
    Voltage,
    /// Current (`CURR`).
    Current,
}

impl Function {
    pub(crate) fn as_str(&self) -> &str {
        match self {
            Function::Voltage => "VOLT",
            Function::Current => "CURR",
        }
    }

    /// Parse the reply of `:SOUR:FUNC?` or `:SENS:FUNC?`.
    ///
    /// The sense function is returned quoted with a suffix, e.g., `"CURR:DC"`.
    pub(crate) fn from_cmd_str(value: &str) -> Result<Self, InstrumentError> {
        let val = value.trim().trim_matches('"');
        if val.starts_with("VOLT") {
            Ok(Function::Voltage)
        } else if val.starts_with("CURR") {
            Ok(Function::Current)
        } else {
            Err(InstrumentError::ResponseParseError(value.to_string()))
        }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Function::Voltage => write!(f, "Voltage"),
            Function::Current => write!(f, "Current"),
        }
    }
}

/// The DC sourcing mode of the voltage or current source.
///
/// The sourcing mode falls back to `Fixed` whenever the SourceMeter goes to local.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Outputs a fixed level.
    Fixed,
    /// Outputs the levels of a list.
    List,
    /// Performs a voltage, current, or memory sweep.
    Sweep,
}

impl SourceMode {
    pub(crate) fn from_cmd_str(value: &str) -> Result<Self, InstrumentError> {
        match value.trim() {
            "FIX" | "FIXED" => Ok(SourceMode::Fixed),
            "LIST" => Ok(SourceMode::List),
            "SWE" | "SWEEP" => Ok(SourceMode::Sweep),
            _ => Err(InstrumentError::ResponseParseError(value.to_string())),
        }
    }
}
