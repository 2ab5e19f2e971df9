//! A small register machine for SML programs: a translator from the textual
//! instruction format and an interpreter that runs the result.

pub mod compiler {
    #[allow(clippy::module_inception)]
    pub mod compiler;
    pub mod instructions;
}
pub mod computer;
pub mod error;

pub use compiler::instructions::{Instruction, Opcode, Operation};
pub use computer::{LoadReport, Machine};
pub use error::{ExecutionError, Fault, LoadError, TranslateError};
