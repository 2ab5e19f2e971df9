mod execute;
pub mod labels;
pub mod registers;

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, info, instrument, trace, warn};

use crate::compiler::compiler;
use crate::compiler::instructions::{Instruction, Operation};
use crate::error::{ExecutionError, LoadError};

pub use labels::Labels;
pub use registers::{Registers, DEFAULT_REGISTERS};

/// Outcome of [`Machine::load`].
#[derive(Debug, Default)]
pub struct LoadReport {
    pub instructions: usize,
    /// Lines that were skipped.
    pub errors: Vec<LoadError>,
    /// Branch targets that no label defines. Such branches never jump.
    pub unresolved: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Program store, label table, register bank and program counter.
///
/// The program and labels are replaced wholesale by [`Machine::load`] and
/// only read while running; every run starts from zeroed registers and
/// `pc = 0`.
#[derive(Debug)]
pub struct Machine {
    program: Vec<Instruction>,
    labels: Labels,
    registers: Registers,
    pc: usize,
}

impl Machine {
    pub fn new() -> Machine {
        Machine::with_registers(DEFAULT_REGISTERS)
    }

    pub fn with_registers(capacity: usize) -> Machine {
        Machine {
            program: Vec::new(),
            labels: Labels::new(),
            registers: Registers::with_capacity(capacity),
            pc: 0,
        }
    }

    /// Replaces the current program with the one in `source`.
    ///
    /// Lines that fail to translate are reported and skipped; the rest of the
    /// program still loads.
    #[instrument(skip_all)]
    pub fn load(&mut self, source: &str) -> LoadReport {
        self.program.clear();
        self.labels.reset();

        let assembly = compiler::assemble(source);

        for instruction in assembly.instructions {
            if !instruction.label().is_empty() {
                self.labels.add(instruction.label(), self.program.len());
            }
            self.program.push(instruction);
        }

        for (label, index) in self.labels.duplicates() {
            debug!(label, index, "label redefined, earlier definition wins");
        }

        let unresolved = self.unresolved_targets();
        for target in &unresolved {
            warn!(%target, "branch target is never defined");
        }

        info!(
            instructions = self.program.len(),
            errors = assembly.errors.len(),
            "program loaded"
        );

        LoadReport {
            instructions: self.program.len(),
            errors: assembly.errors,
            unresolved,
        }
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<LoadReport, LoadError> {
        let path = path.as_ref();

        let source = fs::read_to_string(path).map_err(|source| LoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(self.load(&source))
    }

    /// Zeroes the registers and rewinds the program counter.
    pub fn reset(&mut self) {
        self.registers.reset();
        self.pc = 0;
    }

    /// Runs the loaded program, writing `out` values to standard output.
    pub fn run(&mut self) -> Result<(), ExecutionError> {
        let stdout = io::stdout();
        let mut out = stdout.lock();

        self.run_with(&mut out)
    }

    /// Runs the loaded program from the start until the program counter
    /// leaves the program, or until an instruction faults.
    pub fn run_with<W: Write>(&mut self, out: &mut W) -> Result<(), ExecutionError> {
        self.reset();

        while let Some(instruction) = self.program.get(self.pc) {
            let pc = self.pc;
            trace!(pc, %instruction, "execute");

            self.pc += 1;
            instruction
                .execute(&mut self.registers, &mut self.pc, &self.labels, out)
                .map_err(|fault| ExecutionError {
                    pc,
                    instruction: instruction.clone(),
                    fault,
                })?;
        }

        Ok(())
    }

    pub fn program(&self) -> &[Instruction] {
        &self.program
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    fn unresolved_targets(&self) -> Vec<String> {
        let mut unresolved = Vec::new();

        for instruction in &self.program {
            if let Operation::BranchIfNonZero { target, .. } = instruction.operation() {
                if self.labels.lookup(target).is_none() && !unresolved.contains(target) {
                    unresolved.push(target.clone());
                }
            }
        }

        unresolved
    }
}

impl Default for Machine {
    fn default() -> Machine {
        Machine::new()
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, instruction) in self.program.iter().enumerate() {
            writeln!(
                f,
                "{index:>4}  {:<24} ; {}",
                instruction.to_string(),
                instruction.describe()
            )?;
        }

        Ok(())
    }
}
