//! Load-time and run-time errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::compiler::instructions::{Instruction, Opcode, Register};

/// Why a single source line could not be turned into an instruction.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("unknown opcode `{0}`")]
    UnknownOpcode(String),

    #[error("`{opcode}` expects {expected} operand(s), found {found}")]
    Arity {
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    #[error("operand {position} of `{opcode}` must be an integer, found `{token}`")]
    NotAnInteger {
        opcode: Opcode,
        position: usize,
        token: String,
    },

    #[error("empty label definition")]
    EmptyLabel,
}

/// Errors raised while loading a program.
///
/// A `Line` error drops only that line; loading carries on with the rest of
/// the source. `Unreadable` means there was no source to load at all.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: TranslateError,
    },

    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Fatal conditions raised by a single instruction.
#[derive(Debug, Error)]
pub enum Fault {
    #[error("division by zero")]
    DivisionByZero,

    #[error("register {index} out of range (bank has {capacity} registers)")]
    RegisterOutOfRange { index: Register, capacity: usize },

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// A fault together with the instruction that raised it.
#[derive(Debug, Error)]
#[error("instruction {pc} `{instruction}` failed: {fault}")]
pub struct ExecutionError {
    pub pc: usize,
    pub instruction: Instruction,
    #[source]
    pub fault: Fault,
}
