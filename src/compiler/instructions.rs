use std::fmt;

use phf::phf_map;

/// Index into the register bank.
pub type Register = usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    Lin,
    Out,
    Bnz,
}

/// Kind of token an operand slot accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Register,
    Immediate,
    Label,
}

pub static OPCODES: phf::Map<&'static str, Opcode> = phf_map! {
    "add" => Opcode::Add,
    "sub" => Opcode::Sub,
    "mul" => Opcode::Mul,
    "div" => Opcode::Div,
    "lin" => Opcode::Lin,
    "out" => Opcode::Out,
    "bnz" => Opcode::Bnz,
};

impl Opcode {
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        OPCODES.get(mnemonic).copied()
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Lin => "lin",
            Opcode::Out => "out",
            Opcode::Bnz => "bnz",
        }
    }

    /// Operand slots in source order. Every opcode has exactly one shape.
    pub fn operands(self) -> &'static [Operand] {
        match self {
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
                &[Operand::Register, Operand::Register, Operand::Register]
            }
            Opcode::Lin => &[Operand::Register, Operand::Immediate],
            Opcode::Out => &[Operand::Register],
            Opcode::Bnz => &[Operand::Register, Operand::Label],
        }
    }

    pub fn arity(self) -> usize {
        self.operands().len()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Add {
        result: Register,
        left: Register,
        right: Register,
    },
    Sub {
        result: Register,
        left: Register,
        right: Register,
    },
    Mul {
        result: Register,
        left: Register,
        right: Register,
    },
    Div {
        result: Register,
        left: Register,
        right: Register,
    },
    LoadImmediate {
        register: Register,
        value: i32,
    },
    Output {
        register: Register,
    },
    BranchIfNonZero {
        register: Register,
        target: String,
    },
}

impl Operation {
    pub fn opcode(&self) -> Opcode {
        match self {
            Operation::Add { .. } => Opcode::Add,
            Operation::Sub { .. } => Opcode::Sub,
            Operation::Mul { .. } => Opcode::Mul,
            Operation::Div { .. } => Opcode::Div,
            Operation::LoadImmediate { .. } => Opcode::Lin,
            Operation::Output { .. } => Opcode::Out,
            Operation::BranchIfNonZero { .. } => Opcode::Bnz,
        }
    }
}

/// A single decoded line of a program: an optional label plus the operation.
///
/// Instructions are built once by the translator and never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    label: String,
    operation: Operation,
}

impl Instruction {
    pub fn new(label: impl Into<String>, operation: Operation) -> Instruction {
        Instruction {
            label: label.into(),
            operation,
        }
    }

    /// Empty when the line carried no label.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn opcode(&self) -> Opcode {
        self.operation.opcode()
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Long-form English rendering used by program listings.
    pub fn describe(&self) -> String {
        match &self.operation {
            Operation::Add { result, left, right } => format!(
                "store in register {result} the result of adding register {left} and register {right}"
            ),
            Operation::Sub { result, left, right } => format!(
                "store in register {result} the result of subtracting register {right} from register {left}"
            ),
            Operation::Mul { result, left, right } => format!(
                "store in register {result} the product of register {left} and register {right}"
            ),
            Operation::Div { result, left, right } => format!(
                "store in register {result} the result of dividing register {left} by register {right}"
            ),
            Operation::LoadImmediate { register, value } => {
                format!("store the value {value} in register {register}")
            }
            Operation::Output { register } => format!("output the value of register {register}"),
            Operation::BranchIfNonZero { register, target } => {
                format!("if register {register} is not zero, jump to label {target}")
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.label.is_empty() {
            write!(f, "{}: ", self.label)?;
        }

        write!(f, "{}", self.opcode())?;

        match &self.operation {
            Operation::Add { result, left, right }
            | Operation::Sub { result, left, right }
            | Operation::Mul { result, left, right }
            | Operation::Div { result, left, right } => write!(f, " {result} {left} {right}"),
            Operation::LoadImmediate { register, value } => write!(f, " {register} {value}"),
            Operation::Output { register } => write!(f, " {register}"),
            Operation::BranchIfNonZero { register, target } => write!(f, " {register} {target}"),
        }
    }
}
