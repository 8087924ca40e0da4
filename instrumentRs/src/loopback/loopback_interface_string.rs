//! Loopback interface implemented for testing instruments that communicate by sending strings.
//!
//! End-of-command is in these cases always determined by a terminator string, usually `"\n"` or
//! `"\r"`.

use std::{collections::VecDeque, time::Duration};

use crate::{InstrumentError, InstrumentInterface, loopback::IncrIndex};

/// An interface that allows you to simply write tests for your instrument driver.
///
/// # Example
///
/// Let us build a simple instrument that sends `"*IDN?"` and returns the reply, and test it with
/// the [`LoopbackInterfaceString`]:
///
/// ```
/// use instrumentrs::{InstrumentInterface, InstrumentError, LoopbackInterfaceString};
///
/// struct MyInstrument<T: InstrumentInterface> {
///    interface: T,
/// }
///
/// impl<T: InstrumentInterface> MyInstrument<T> {
///    fn get_name(&mut self) -> Result<String, InstrumentError> {
///        self.interface.query("*IDN?")
///    }
/// }
///
/// let loopback = LoopbackInterfaceString::new(vec!["*IDN?"], vec!["MyInstrument,1.0,1234"], "\n");
/// let mut inst = MyInstrument { interface: loopback };
/// assert_eq!("MyInstrument,1.0,1234", inst.get_name().unwrap());
/// // Dropping `inst` checks that all scripted commands were used.
/// ```
///
/// Sending a command that is not the next expected one panics, as does dropping the interface
/// while scripted traffic is left over.
///
/// A reply equal to [`LoopbackInterfaceString::TIMEOUT`] makes the read fail with an
/// [`InstrumentError::Timeout`] instead, which lets you test how a driver handles an instrument
/// that does not answer.
pub struct LoopbackInterfaceString {
    from_host: Vec<String>,
    from_inst: Vec<String>,
    terminator_exp: String,
    from_host_index: IncrIndex,
    from_inst_index: IncrIndex,
    curr_bytes: VecDeque<u8>,
    terminator: String,
    timeout: Duration,
}

impl LoopbackInterfaceString {
    /// Scripted reply that simulates an instrument that does not answer in time.
    pub const TIMEOUT: &'static str = "<loopback timeout>";

    /// Create a new loopback instrument with given commands to and from instrument.
    ///
    /// The commands are read in order. When the [`LoopbackInterfaceString`] is dropped,
    /// [`LoopbackInterfaceString::finalize`] checks that all commands have been used.
    ///
    /// # Arguments:
    /// * `from_host` - Commands from host to instrument, without terminator.
    /// * `from_inst` - Replies from instrument to host, without terminator.
    /// * `terminator_exp` - The terminator that is expected after every command and that is
    ///   appended to every reply.
    pub fn new<S: Into<String>>(
        from_host: Vec<S>,
        from_inst: Vec<S>,
        terminator_exp: &str,
    ) -> Self {
        LoopbackInterfaceString {
            from_host: from_host.into_iter().map(Into::into).collect(),
            from_inst: from_inst.into_iter().map(Into::into).collect(),
            terminator_exp: terminator_exp.to_string(),
            from_host_index: IncrIndex::default(),
            from_inst_index: IncrIndex::default(),
            curr_bytes: VecDeque::new(),
            terminator: "\n".to_string(), // default terminator, as interfaces
            timeout: Duration::from_secs(3),
        }
    }

    /// This command panics if not all commands in the [`LoopbackInterfaceString`] have been used.
    ///
    /// It is automatically called when the [`LoopbackInterfaceString`] is dropped, but you can
    /// also call it manually to ensure that all commands have been used.
    pub fn finalize(&mut self) {
        let from_host_leftover = self.from_host.get(self.from_host_index.next());
        let from_inst_leftover = self.from_inst.get(self.from_inst_index.next());
        if let Some(fil) = from_host_leftover {
            panic!("Leftover expected commands found from host to instrument: {fil}");
        }
        if let Some(fil) = from_inst_leftover {
            panic!("Leftover expected commands found from instrument to host: {fil}");
        }
    }

    /// Get the next command from host to instrument including the terminator, or panic.
    fn next_from_host(&mut self) -> String {
        let cmd = self
            .from_host
            .get(self.from_host_index.next())
            .expect("No more commands were expected from host to instrument.");
        format!("{cmd}{}", self.terminator_exp)
    }

    /// Get the next reply from instrument to host, or panic.
    fn next_from_inst(&mut self) -> String {
        self.from_inst
            .get(self.from_inst_index.next())
            .expect("No more commands were expected from instrument to host.")
            .clone()
    }

    /// Read exactly one byte of the current reply, loading the next one if required.
    fn read_one_byte(&mut self) -> Result<u8, InstrumentError> {
        if let Some(byte) = self.curr_bytes.pop_front() {
            return Ok(byte);
        }
        let next = self.next_from_inst();
        if next == Self::TIMEOUT {
            return Err(InstrumentError::Timeout(self.timeout));
        }
        self.curr_bytes = format!("{next}{}", self.terminator_exp)
            .into_bytes()
            .into();
        self.read_one_byte()
    }
}

impl InstrumentInterface for LoopbackInterfaceString {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), InstrumentError> {
        for byte in buf.iter_mut() {
            *byte = self.read_one_byte()?;
        }
        Ok(())
    }

    fn get_terminator(&self) -> &str {
        self.terminator.as_str()
    }

    fn set_terminator(&mut self, terminator: &str) {
        self.terminator = terminator.to_string();
    }

    fn get_timeout(&self) -> Duration {
        self.timeout
    }

    fn write_raw(&mut self, cmd: &[u8]) -> Result<(), InstrumentError> {
        let exp = self.next_from_host();
        assert_eq!(
            exp.as_bytes(),
            cmd,
            "Expected sendcmd '{0:?}', got '{1:?}'",
            exp,
            str::from_utf8(cmd)
        );
        Ok(())
    }
}

impl Drop for LoopbackInterfaceString {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            self.finalize();
        }
    }
}
