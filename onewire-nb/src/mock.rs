//! Scripted bus used by the codec and transaction tests.

use std::collections::VecDeque;

use crate::{OneWireError, OneWireNb, OneWireStatus};

pub(crate) struct MockStatus {
    pub presence: bool,
}

impl OneWireStatus for MockStatus {
    fn presence(&self) -> bool {
        self.presence
    }
}

/// A bus whose device side is a bit script: read slots pop from `reads`,
/// write slots append to `writes`, reset pulses count up. With `gated` set,
/// every poll reports `WouldBlock` and nothing moves, mimicking a master
/// whose slot tick has not arrived.
pub(crate) struct MockBus {
    pub reads: VecDeque<bool>,
    pub writes: Vec<bool>,
    pub resets: usize,
    pub presence_errors: usize,
    pub gated: bool,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            reads: VecDeque::new(),
            writes: Vec::new(),
            resets: 0,
            presence_errors: 0,
            gated: false,
        }
    }
}

impl OneWireNb for MockBus {
    type BusError = core::convert::Infallible;
    type Status = MockStatus;

    fn poll_reset_pulse(&mut self) -> nb::Result<(), OneWireError<Self::BusError>> {
        if self.gated {
            return Err(nb::Error::WouldBlock);
        }
        self.resets += 1;
        Ok(())
    }

    fn poll_presence(&mut self) -> nb::Result<(), OneWireError<Self::BusError>> {
        if self.gated {
            return Err(nb::Error::WouldBlock);
        }
        if self.presence_errors > 0 {
            self.presence_errors -= 1;
            return Err(nb::Error::Other(OneWireError::NoDevicePresent));
        }
        Ok(())
    }

    fn poll_write_bit(&mut self, bit: bool) -> nb::Result<(), OneWireError<Self::BusError>> {
        if self.gated {
            return Err(nb::Error::WouldBlock);
        }
        self.writes.push(bit);
        Ok(())
    }

    fn poll_read_bit(&mut self) -> nb::Result<bool, OneWireError<Self::BusError>> {
        if self.gated {
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.reads.pop_front().expect("read script exhausted"))
    }

    fn status(&self) -> Self::Status {
        MockStatus { presence: true }
    }
}

/// Expands bytes into the bit order they travel on the wire.
pub(crate) fn bits_lsb_first(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).map(move |i| byte >> i & 1 == 1))
        .collect()
}
