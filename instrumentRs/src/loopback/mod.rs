//! The loopback module provides an instrument simulator for testing purposes.
//!
//! The [`LoopbackInterfaceString`] allows to test instruments drivers that communicate using
//! strings and have a fixed terminator to declare the end of a line. All drivers of this
//! workspace are tested with it.

mod loopback_interface_string;

pub use loopback_interface_string::*;

/// A self-incrementing index structure that by default starts at 0 and increments whenever `next`
/// is called.
#[derive(Debug, Default)]
struct IncrIndex {
    index: usize,
}

impl IncrIndex {
    fn next(&mut self) -> usize {
        let current = self.index;
        self.index += 1;
        current
    }
}
