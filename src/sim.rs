//! Register-level DS3231 stand-in for the unit tests.

extern crate alloc;

use alloc::vec::Vec;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};

use crate::interrupt::{Edge, InterruptLine, Pull};
use crate::registers::RegAddr;
use crate::DEVICE_ADDRESS;

const REGISTER_COUNT: usize = RegAddr::LSBTemp as usize + 1;

// OSF, A2F and A1F can only be cleared by a write
const STATUS_FLAGS: u8 = 0x83;

/// Holds a register file and an address pointer that auto-increments and
/// wraps, like the real chip.
#[derive(Debug, Default)]
pub(crate) struct SimDs3231 {
    pub regs: [u8; REGISTER_COUNT],
    pointer: usize,
    /// Number of successful transactions
    pub transactions: usize,
    /// Fail this many upcoming transactions
    pub fail_next: usize,
    /// Oscillator stop flag reasserts itself after every write
    pub stuck_oscillator: bool,
}

impl SimDs3231 {
    fn store(&mut self, value: u8) {
        let reg = self.pointer;
        self.regs[reg] = if reg == RegAddr::ControlStatus as usize {
            let old = self.regs[reg];
            let mut new = (value & !STATUS_FLAGS) | (old & value & STATUS_FLAGS);
            if self.stuck_oscillator {
                new |= 0x80;
            }
            new
        } else {
            value
        };
        self.advance();
    }

    fn load(&mut self) -> u8 {
        let value = self.regs[self.pointer];
        self.advance();
        value
    }

    fn advance(&mut self) {
        self.pointer = (self.pointer + 1) % REGISTER_COUNT;
    }
}

impl ErrorType for SimDs3231 {
    type Error = ErrorKind;
}

impl I2c for SimDs3231 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(ErrorKind::Other);
        }
        if address != DEVICE_ADDRESS {
            return Err(ErrorKind::Other);
        }
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    if let Some((reg, payload)) = bytes.split_first() {
                        self.pointer = usize::from(*reg) % REGISTER_COUNT;
                        for value in payload {
                            self.store(*value);
                        }
                    }
                }
                Operation::Read(buffer) => {
                    for byte in buffer.iter_mut() {
                        *byte = self.load();
                    }
                }
            }
        }
        self.transactions += 1;
        Ok(())
    }
}

/// Records every millisecond delay instead of sleeping.
#[derive(Debug, Default)]
pub(crate) struct RecordingDelay {
    pub delays_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingPin {
    pub attached: Option<(Pull, Edge)>,
    pub detach_count: usize,
}

impl InterruptLine for RecordingPin {
    fn attach(&mut self, pull: Pull, edge: Edge) {
        self.attached = Some((pull, edge));
    }

    fn detach(&mut self) {
        self.attached = None;
        self.detach_count += 1;
    }
}
