use std::fmt;

use crate::compiler::instructions::Register;
use crate::error::Fault;

pub const DEFAULT_REGISTERS: usize = 32;

/// Fixed-size bank of signed integer registers, all zero after construction
/// or [`Registers::reset`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registers {
    slots: Vec<i32>,
}

impl Registers {
    pub fn new() -> Registers {
        Registers::with_capacity(DEFAULT_REGISTERS)
    }

    pub fn with_capacity(capacity: usize) -> Registers {
        Registers {
            slots: vec![0; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn read(&self, index: Register) -> Result<i32, Fault> {
        self.slots
            .get(index)
            .copied()
            .ok_or(Fault::RegisterOutOfRange {
                index,
                capacity: self.capacity(),
            })
    }

    pub fn write(&mut self, index: Register, value: i32) -> Result<(), Fault> {
        let capacity = self.capacity();

        let slot = self
            .slots
            .get_mut(index)
            .ok_or(Fault::RegisterOutOfRange { index, capacity })?;
        *slot = value;

        Ok(())
    }

    pub fn reset(&mut self) {
        self.slots.fill(0);
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.slots
    }
}

impl Default for Registers {
    fn default() -> Registers {
        Registers::new()
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.slots.chunks(8).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }

            for (column, value) in chunk.iter().enumerate() {
                if column > 0 {
                    f.write_str("  ")?;
                }
                write!(f, "r{:<2} = {value:>6}", row * 8 + column)?;
            }
        }

        Ok(())
    }
}
