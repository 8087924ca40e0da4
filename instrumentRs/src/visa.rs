//! Instruments on a VISA bus (GPIB, USBTMC, VXI-11) using the `visa-rs` crate.
//!
//! This requires a VISA implementation (NI-VISA, Keysight IO libraries, ...) to be installed on
//! the system, which is why it sits behind the `visa` feature.

use std::{
    ffi::CString,
    io::{Read, Write},
    time::Duration,
};

use visa_rs::{DefaultRM, flags::AccessMode};

use crate::{Instrument, InstrumentError};

/// An open VISA session together with the resource manager it was opened from.
///
/// Closing a resource manager closes all of its sessions, so both live and die together. The
/// session is dropped first.
pub struct VisaSession {
    instr: visa_rs::Instrument,
    _rm: DefaultRM,
}

impl Read for VisaSession {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.instr.read(buf)
    }
}

impl Write for VisaSession {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.instr.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.instr.flush()
    }
}

/// Open instruments through the system's VISA library.
#[derive(Debug)]
pub struct VisaInterface {}

impl VisaInterface {
    /// Open a VISA resource, e.g., `"GPIB0::24::INSTR"`.
    ///
    /// The returned instrument uses `"\n"` as terminator and a read timeout of 3 seconds.
    pub fn open(resource: &str) -> Result<Instrument<VisaSession>, InstrumentError> {
        let rm = DefaultRM::new()?;
        let res_id = to_visa_string(resource)?;
        let instr = rm.open(&res_id.into(), AccessMode::NO_LOCK, Duration::from_secs(1))?;
        tracing::debug!(resource, "opened VISA session");
        Ok(Instrument::new(
            VisaSession { instr, _rm: rm },
            Duration::from_secs(3),
        ))
    }

    /// List all `INSTR` resources the VISA library can see.
    pub fn list_resources() -> Result<Vec<String>, InstrumentError> {
        let rm = DefaultRM::new()?;
        let expr = to_visa_string("?*INSTR")?;
        let mut list = rm.find_res_list(&expr.into())?;
        let mut resources = Vec::new();
        while let Some(res) = list.find_next()? {
            resources.push(res.to_string());
        }
        Ok(resources)
    }
}

fn to_visa_string(s: &str) -> Result<CString, InstrumentError> {
    CString::new(s).map_err(|_| {
        InstrumentError::InvalidArgument(format!("Resource string contains a nul byte: {s:?}"))
    })
}
