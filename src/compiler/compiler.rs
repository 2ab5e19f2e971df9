use crate::compiler::instructions::{Instruction, Opcode, Operand, Operation, Register};
use crate::error::{LoadError, TranslateError};

use std::str::FromStr;

use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::{debug, warn};

/// A non-blank source line with its label split off.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    /// Empty when the line has no label.
    pub label: &'a str,
    pub body: &'a str,
}

/// Everything the translator produced from one source text.
#[derive(Debug, Default)]
pub struct Assembly {
    pub instructions: Vec<Instruction>,
    pub errors: Vec<LoadError>,
}

/// Separates the optional leading label from the rest of the line.
///
/// Labels are written either as `name:` or, in the classic layout, as a bare
/// first word that is not itself a mnemonic (`f0 lin 20 6`). Returns `None`
/// for blank lines.
pub fn split_line(number: usize, raw: &str) -> Result<Option<Line<'_>>, TranslateError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (first, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (trimmed, ""),
    };

    let (label, body) = match first.strip_suffix(':') {
        Some("") => return Err(TranslateError::EmptyLabel),
        Some(name) => (name, rest),
        None if Opcode::from_mnemonic(first).is_some() || rest.is_empty() => ("", trimmed),
        None => (first, rest),
    };

    Ok(Some(Line {
        number,
        label,
        body,
    }))
}

/// Builds the instruction for one line whose label has already been removed.
///
/// Returns `Ok(None)` when there is nothing after the label.
pub fn translate(label: &str, text: &str) -> Result<Option<Instruction>, TranslateError> {
    let mut tokens = text.split_whitespace();

    let Some(mnemonic) = tokens.next() else {
        return Ok(None);
    };

    let opcode = Opcode::from_mnemonic(mnemonic)
        .ok_or_else(|| TranslateError::UnknownOpcode(mnemonic.to_string()))?;

    let operands = Operands {
        opcode,
        tokens: tokens.collect(),
    };

    if operands.tokens.len() != opcode.arity() {
        return Err(TranslateError::Arity {
            opcode,
            expected: opcode.arity(),
            found: operands.tokens.len(),
        });
    }

    let operation = match opcode {
        Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
            let result = operands.register(0)?;
            let left = operands.register(1)?;
            let right = operands.register(2)?;

            match opcode {
                Opcode::Add => Operation::Add { result, left, right },
                Opcode::Sub => Operation::Sub { result, left, right },
                Opcode::Mul => Operation::Mul { result, left, right },
                _ => Operation::Div { result, left, right },
            }
        }
        Opcode::Lin => Operation::LoadImmediate {
            register: operands.register(0)?,
            value: operands.immediate(1)?,
        },
        Opcode::Out => Operation::Output {
            register: operands.register(0)?,
        },
        Opcode::Bnz => Operation::BranchIfNonZero {
            register: operands.register(0)?,
            target: operands.label(1),
        },
    };

    Ok(Some(Instruction::new(label, operation)))
}

/// Translates one raw source line. `number` is 1-based.
pub fn translate_line(number: usize, raw: &str) -> Result<Option<Instruction>, LoadError> {
    let to_load_error = |source: TranslateError| LoadError::Line {
        line: number,
        source,
    };

    let Some(line) = split_line(number, raw).map_err(to_load_error)? else {
        return Ok(None);
    };

    let instruction = translate(line.label, line.body).map_err(to_load_error)?;
    if instruction.is_none() {
        debug!(line = number, label = line.label, "label without instruction ignored");
    }

    Ok(instruction)
}

/// Translates a whole source text.
///
/// Lines are independent of each other so they are translated in parallel;
/// the result keeps source order. Bad lines are logged, collected into
/// `errors` and left out of the program.
pub fn assemble(source: &str) -> Assembly {
    let lines = source.lines().collect::<Vec<&str>>();

    let translated = lines
        .par_iter()
        .enumerate()
        .map(|(i, raw)| translate_line(i + 1, raw))
        .collect::<Vec<_>>();

    let mut assembly = Assembly::default();

    for result in translated {
        match result {
            Ok(Some(instruction)) => assembly.instructions.push(instruction),
            Ok(None) => {}
            Err(error) => {
                warn!("skipping {error}");
                assembly.errors.push(error);
            }
        }
    }

    assembly
}

struct Operands<'a> {
    opcode: Opcode,
    tokens: SmallVec<[&'a str; 4]>,
}

impl Operands<'_> {
    fn register(&self, position: usize) -> Result<Register, TranslateError> {
        debug_assert_eq!(self.opcode.operands()[position], Operand::Register);
        self.integer(position)
    }

    fn immediate(&self, position: usize) -> Result<i32, TranslateError> {
        debug_assert_eq!(self.opcode.operands()[position], Operand::Immediate);
        self.integer(position)
    }

    fn label(&self, position: usize) -> String {
        debug_assert_eq!(self.opcode.operands()[position], Operand::Label);
        self.tokens[position].to_string()
    }

    fn integer<T: FromStr>(&self, position: usize) -> Result<T, TranslateError> {
        let token = self.tokens[position];

        token.parse::<T>().map_err(|_| TranslateError::NotAnInteger {
            opcode: self.opcode,
            position: position + 1,
            token: token.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_colon_label() {
        let line = split_line(4, "  top:   lin 1 1 ").unwrap().unwrap();
        assert_eq!(
            line,
            Line {
                number: 4,
                label: "top",
                body: "lin 1 1",
            }
        );
    }

    #[test]
    fn splits_bare_label() {
        let line = split_line(1, "f0 lin 20 6").unwrap().unwrap();
        assert_eq!(line.label, "f0");
        assert_eq!(line.body, "lin 20 6");
    }

    #[test]
    fn mnemonic_first_means_no_label() {
        let line = split_line(1, "out 2").unwrap().unwrap();
        assert_eq!(line.label, "");
        assert_eq!(line.body, "out 2");
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(split_line(1, "").unwrap(), None);
        assert_eq!(split_line(2, " \t ").unwrap(), None);
        assert!(translate_line(3, "   ").unwrap().is_none());
    }

    #[test]
    fn label_only_line_is_skipped() {
        assert!(translate_line(1, "done:").unwrap().is_none());
    }

    #[test]
    fn empty_label_is_rejected() {
        assert!(matches!(
            split_line(1, ": add 1 2 3"),
            Err(TranslateError::EmptyLabel)
        ));
    }

    #[test]
    fn translates_every_opcode() {
        let cases = [
            ("add 2 0 1", Operation::Add { result: 2, left: 0, right: 1 }),
            ("sub 2 0 1", Operation::Sub { result: 2, left: 0, right: 1 }),
            ("mul 2 0 1", Operation::Mul { result: 2, left: 0, right: 1 }),
            ("div 2 0 1", Operation::Div { result: 2, left: 0, right: 1 }),
            ("lin 5 -12", Operation::LoadImmediate { register: 5, value: -12 }),
            ("out 7", Operation::Output { register: 7 }),
            (
                "bnz 3 loop",
                Operation::BranchIfNonZero {
                    register: 3,
                    target: "loop".to_string(),
                },
            ),
        ];

        for (text, operation) in cases {
            let instruction = translate("", text).unwrap().unwrap();
            assert_eq!(instruction.operation(), &operation, "{text}");
            assert_eq!(instruction.label(), "");
        }
    }

    #[test]
    fn keeps_label() {
        let instruction = translate("top", "out 0").unwrap().unwrap();
        assert_eq!(instruction.label(), "top");
        assert_eq!(instruction.opcode(), Opcode::Out);
    }

    #[test]
    fn unknown_opcode() {
        assert!(matches!(
            translate("", "jmp 3"),
            Err(TranslateError::UnknownOpcode(op)) if op == "jmp"
        ));
    }

    #[test]
    fn lone_unknown_word_is_an_unknown_opcode() {
        assert!(matches!(
            translate_line(9, "halt"),
            Err(LoadError::Line {
                line: 9,
                source: TranslateError::UnknownOpcode(_),
            })
        ));
    }

    #[test]
    fn wrong_operand_count() {
        assert!(matches!(
            translate("", "add 1 2"),
            Err(TranslateError::Arity {
                opcode: Opcode::Add,
                expected: 3,
                found: 2,
            })
        ));
        assert!(matches!(
            translate("", "out 1 2"),
            Err(TranslateError::Arity { found: 2, .. })
        ));
    }

    #[test]
    fn non_integer_operand() {
        let error = translate("", "lin 1 ten").unwrap_err();
        assert!(matches!(
            &error,
            TranslateError::NotAnInteger { opcode: Opcode::Lin, position: 2, token } if token == "ten"
        ));
        assert_eq!(
            error.to_string(),
            "operand 2 of `lin` must be an integer, found `ten`"
        );
    }

    #[test]
    fn negative_register_is_rejected() {
        assert!(matches!(
            translate("", "out -1"),
            Err(TranslateError::NotAnInteger { position: 1, .. })
        ));
    }

    #[test]
    fn assemble_drops_bad_lines_and_keeps_order() {
        let source = "lin 0 5\nfrobnicate 1\n\nlin 1 3\nadd 2 0 x\nadd 2 0 1\nout 2\n";
        let assembly = assemble(source);

        let rendered = assembly
            .instructions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(rendered, ["lin 0 5", "lin 1 3", "add 2 0 1", "out 2"]);

        let lines = assembly
            .errors
            .iter()
            .map(|error| match error {
                LoadError::Line { line, .. } => *line,
                LoadError::Unreadable { .. } => unreachable!(),
            })
            .collect::<Vec<_>>();
        assert_eq!(lines, [2, 5]);
    }
}
