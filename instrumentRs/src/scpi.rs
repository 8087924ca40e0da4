//! Small helpers shared by SCPI instrument drivers.
//!
//! Many SCPI queries accept an optional `DEFault`, `MINimum`, or `MAXimum` parameter and many
//! setters accept either a number or one of these keywords. Replies are single lines, sometimes
//! holding several comma-separated values.

use std::{fmt::Display, str::FromStr};

use crate::{InstrumentError, InstrumentInterface};

/// The keyword parameters SCPI accepts in place of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `DEF`: the instrument's default value.
    Default,
    /// `MIN`: the smallest allowed value.
    Minimum,
    /// `MAX`: the largest allowed value.
    Maximum,
}

impl Bound {
    /// The short form of the keyword as it is sent to the instrument.
    pub fn as_str(&self) -> &'static str {
        match self {
            Bound::Default => "DEF",
            Bound::Minimum => "MIN",
            Bound::Maximum => "MAX",
        }
    }

    /// Parse a user given option, reporting invalid input instead of failing.
    ///
    /// Invalid input is logged as a warning and `None` is returned, such that the query is sent
    /// without any option.
    pub fn lenient(option: &str) -> Option<Self> {
        match option.parse() {
            Ok(bound) => Some(bound),
            Err(_) => {
                tracing::warn!(option, "Option does not do anything, querying the set value");
                None
            }
        }
    }
}

impl FromStr for Bound {
    type Err = InstrumentError;

    /// Case-insensitive parsing of `def`, `default`, `min`, `minimum`, `max`, and `maximum`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "def" | "default" => Ok(Bound::Default),
            "min" | "minimum" => Ok(Bound::Minimum),
            "max" | "maximum" => Ok(Bound::Maximum),
            _ => Err(InstrumentError::InvalidArgument(format!(
                "Invalid option {s:?}, expected one of def, default, min, minimum, max, maximum"
            ))),
        }
    }
}

impl Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A numeric setter argument: either a value or a keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    /// A plain number.
    Value(f64),
    /// One of the keywords `DEF`, `MIN`, `MAX`.
    Bound(Bound),
}

impl From<f64> for NumericValue {
    fn from(value: f64) -> Self {
        NumericValue::Value(value)
    }
}

impl From<Bound> for NumericValue {
    fn from(bound: Bound) -> Self {
        NumericValue::Bound(bound)
    }
}

impl Display for NumericValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericValue::Value(val) => write!(f, "{val}"),
            NumericValue::Bound(bound) => write!(f, "{bound}"),
        }
    }
}

/// Query `cmd`, with the keyword of `bound` appended if one is given.
pub fn query_with_bound<T: InstrumentInterface + ?Sized>(
    intf: &mut T,
    cmd: &str,
    bound: Option<Bound>,
) -> Result<String, InstrumentError> {
    match bound {
        Some(bound) => intf.query(&format!("{cmd} {bound}")),
        None => intf.query(cmd),
    }
}

/// Parse a reply that holds a single number.
pub fn parse_f64(reply: &str) -> Result<f64, InstrumentError> {
    reply
        .trim()
        .parse::<f64>()
        .map_err(|_| InstrumentError::ResponseParseError(reply.to_string()))
}

/// Get field `idx` of a comma-separated reply, trimmed.
pub fn reply_field(reply: &str, idx: usize) -> Result<&str, InstrumentError> {
    reply
        .split(',')
        .nth(idx)
        .map(str::trim)
        .ok_or_else(|| InstrumentError::ResponseParseError(reply.to_string()))
}

/// Parse a `0`/`1` state reply into a bool.
pub fn parse_bool(reply: &str) -> Result<bool, InstrumentError> {
    match reply.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(InstrumentError::ResponseParseError(reply.to_string())),
    }
}
