use std::io::Write;

use tracing::debug;

use crate::compiler::instructions::{Instruction, Operation};
use crate::computer::labels::Labels;
use crate::computer::registers::Registers;
use crate::error::Fault;

impl Instruction {
    /// Applies this instruction to the machine state.
    ///
    /// `pc` already points at the following instruction when this runs, so a
    /// branch only has to overwrite it. On a fault no register is written.
    pub(crate) fn execute<W: Write>(
        &self,
        registers: &mut Registers,
        pc: &mut usize,
        labels: &Labels,
        out: &mut W,
    ) -> Result<(), Fault> {
        match self.operation() {
            Operation::Add { result, left, right } => {
                let value = registers.read(*left)?.wrapping_add(registers.read(*right)?);
                registers.write(*result, value)
            }
            Operation::Sub { result, left, right } => {
                let value = registers.read(*left)?.wrapping_sub(registers.read(*right)?);
                registers.write(*result, value)
            }
            Operation::Mul { result, left, right } => {
                let value = registers.read(*left)?.wrapping_mul(registers.read(*right)?);
                registers.write(*result, value)
            }
            Operation::Div { result, left, right } => {
                let dividend = registers.read(*left)?;
                let divisor = registers.read(*right)?;

                if divisor == 0 {
                    return Err(Fault::DivisionByZero);
                }
                registers.write(*result, dividend.wrapping_div(divisor))
            }
            Operation::LoadImmediate { register, value } => registers.write(*register, *value),
            Operation::Output { register } => {
                writeln!(out, "{}", registers.read(*register)?)?;
                Ok(())
            }
            Operation::BranchIfNonZero { register, target } => {
                if registers.read(*register)? == 0 {
                    return Ok(());
                }

                match labels.lookup(target) {
                    Some(index) => {
                        debug!(from = *pc - 1, to = index, %target, "branch taken");
                        *pc = index;
                    }
                    None => debug!(%target, "branch target undefined, falling through"),
                }

                Ok(())
            }
        }
    }
}
