//! The IPPcode24 instruction set and validation of single instructions.
//!
//! Each [`Opcode`] has a fixed signature, the ordered list of [`OperandKind`]s it takes.
//! [`Instruction::build`] checks an opcode and its raw operand tokens against that
//! signature and produces a validated [`Instruction`]:
//!
//! ```
//! # use ippcode_parser::instruction::*;
//! # use ippcode_parser::operand::*;
//! let instruction = Instruction::build("add", &["GF@sum", "GF@sum", "int@1"]).unwrap();
//! assert_eq!(instruction.opcode(), Opcode::Add);
//! assert_eq!(instruction.operands().len(), 3);
//!
//! assert!(Instruction::build("ADD", &["GF@sum", "int@1"]).is_err());
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;

use crate::error::SingleError;
use crate::operand::{Operand, OperandKind};

const VAR: OperandKind = OperandKind::Variable;
const SYMB: OperandKind = OperandKind::Symb;
const LABEL: OperandKind = OperandKind::Label;
const TYPE: OperandKind = OperandKind::Type;

// Generates the enum together with `ALL` and `name`, so a new opcode can't be
// left out of the lookup table.
macro_rules! opcodes {
    ($(#[$meta:meta])* $($variant:ident => $name:literal,)*) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum Opcode {
            $($variant,)*
        }

        impl Opcode {
            /// Every opcode, in declaration order.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$variant,)*];

            /// The canonical (upper case) name of the opcode.
            pub fn name(self) -> &'static str {
                match self {
                    $(Opcode::$variant => $name,)*
                }
            }
        }
    };
}

opcodes! {
    /// An IPPcode24 operation code.
    ///
    /// Represents a *case-insensitive* string in the source code.
    /// That is, [`Opcode::Move`] can represent `MOVE`, `move`, or `Move`, etc.

    // Frames, function calls
    Move => "MOVE",
    CreateFrame => "CREATEFRAME",
    PushFrame => "PUSHFRAME",
    PopFrame => "POPFRAME",
    DefVar => "DEFVAR",
    Call => "CALL",
    Return => "RETURN",

    // Data stack
    PushS => "PUSHS",
    PopS => "POPS",

    // Arithmetic, relational, boolean and conversion
    Add => "ADD",
    Sub => "SUB",
    Mul => "MUL",
    IDiv => "IDIV",
    Lt => "LT",
    Gt => "GT",
    Eq => "EQ",
    And => "AND",
    Or => "OR",
    Not => "NOT",
    Int2Char => "INT2CHAR",
    StrI2Int => "STRI2INT",
    Str2Int => "STR2INT",

    // Input/output
    Read => "READ",
    Write => "WRITE",

    // Strings
    Concat => "CONCAT",
    StrLen => "STRLEN",
    GetChar => "GETCHAR",
    SetChar => "SETCHAR",

    // Types
    Type => "TYPE",

    // Control flow
    Label => "LABEL",
    Jump => "JUMP",
    JumpIfEq => "JUMPIFEQ",
    JumpIfNeq => "JUMPIFNEQ",
    Exit => "EXIT",

    // Debugging
    DPrint => "DPRINT",
    Break => "BREAK",
}

impl Opcode {
    /// The kinds of operands the opcode takes, in order.
    /// The length of the signature is the opcode's arity.
    pub fn signature(self) -> &'static [OperandKind] {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Break => &[],

            Opcode::DefVar
            | Opcode::PopS => &[VAR],

            Opcode::Call
            | Opcode::Label
            | Opcode::Jump => &[LABEL],

            Opcode::PushS
            | Opcode::Write
            | Opcode::Exit
            | Opcode::DPrint => &[SYMB],

            Opcode::Move
            | Opcode::Not
            | Opcode::Int2Char
            | Opcode::StrLen
            | Opcode::Type => &[VAR, SYMB],

            Opcode::Read => &[VAR, TYPE],

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::IDiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::StrI2Int
            | Opcode::Str2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar => &[VAR, SYMB, SYMB],

            Opcode::JumpIfEq
            | Opcode::JumpIfNeq => &[LABEL, SYMB, SYMB],
        }
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Opcode {
    type Err = SingleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical = s.to_uppercase();
        Opcode::ALL.iter()
            .copied()
            .find(|opcode| opcode.name() == canonical)
            .ok_or(SingleError::UnknownOpcode { opcode: canonical })
    }
}

/// Formats a signature like `<var> <symb> <symb>`.
pub fn display_signature(signature: &[OperandKind]) -> String {
    signature.iter()
        .map(|kind| format!("<{}>", kind))
        .join(" ")
}

/// A validated IPPcode24 instruction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instruction {
    opcode: Opcode,
    operands: Vec<Operand>,
}

impl Instruction {
    /// Validates `opcode` and its raw operand tokens and builds the instruction.
    ///
    /// Fails on the first problem found: an unknown opcode, a wrong number of operands,
    /// an operand token which is not any kind of operand, or an operand of the wrong kind.
    pub fn build<S: AsRef<str>>(opcode: &str, arguments: &[S]) -> Result<Instruction, SingleError> {
        let opcode: Opcode = opcode.parse()?;
        let signature = opcode.signature();

        if arguments.len() != signature.len() {
            return Err(SingleError::WrongArity {
                opcode,
                expected: signature.len(),
                actual: arguments.len(),
            });
        }

        let operands = signature.iter()
            .zip(arguments)
            .enumerate()
            .map(|(index, (&expected, argument))| {
                let operand = Operand::build(argument.as_ref(), Some(expected))?;
                if expected.accepts(&operand) {
                    Ok(operand)
                } else {
                    Err(SingleError::OperandMismatch {
                        opcode,
                        position: index + 1,
                        expected,
                        actual: operand.operand_type(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Instruction { opcode, operands })
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use crate::operand::{Frame, Literal, OperandType, TypeKeyword};

    #[test]
    fn opcode_names_round_trip() {
        for opcode in Opcode::ALL.iter() {
            assert_eq!(opcode.name().parse::<Opcode>(), Ok(*opcode));
            assert_eq!(opcode.name().to_lowercase().parse::<Opcode>(), Ok(*opcode));
        }
    }

    #[test]
    fn every_opcode_is_listed_once() {
        let names: std::collections::HashSet<_> = Opcode::ALL.iter().map(|opcode| opcode.name()).collect();
        assert_eq!(Opcode::ALL.len(), 36);
        assert_eq!(names.len(), Opcode::ALL.len());
        for name in &["INT2CHAR", "STRI2INT", "STR2INT", "BREAK", "MOVE"] {
            assert!(names.contains(name), "{}", name);
        }
        let arities: Vec<_> = Opcode::ALL.iter().map(|opcode| opcode.signature().len()).collect();
        assert_eq!(arities.iter().filter(|&&arity| arity == 0).count(), 5);
        assert_eq!(arities.iter().filter(|&&arity| arity == 3).count(), 16);
    }

    #[test]
    fn opcodes_are_case_insensitive() {
        for name in &["move", "Move", "MOVE", "mOvE"] {
            let instruction = Instruction::build(name, &["GF@x", "int@1"]).unwrap();
            assert_eq!(instruction.opcode(), Opcode::Move);
            assert_eq!(instruction.opcode().to_string(), "MOVE");
        }
    }

    #[test]
    fn unknown_opcodes() {
        assert_eq!(
            Instruction::build("foo", &["GF@x"]),
            Err(SingleError::UnknownOpcode { opcode: "FOO".to_string() })
        );
        assert_eq!(
            Instruction::build(".IPPcode24", &[] as &[&str]),
            Err(SingleError::UnknownOpcode { opcode: ".IPPCODE24".to_string() })
        );
    }

    #[test]
    fn arity_is_checked() {
        for arguments in [vec!["GF@x", "int@1"], vec!["GF@x", "int@1", "int@2", "int@3"]].iter() {
            assert_eq!(
                Instruction::build("ADD", arguments),
                Err(SingleError::WrongArity { opcode: Opcode::Add, expected: 3, actual: arguments.len() })
            );
        }
        assert!(Instruction::build("ADD", &["GF@x", "int@1", "LF@y"]).is_ok());
        assert_eq!(
            Instruction::build("BREAK", &["int@1"]),
            Err(SingleError::WrongArity { opcode: Opcode::Break, expected: 0, actual: 1 })
        );
    }

    #[test]
    fn arity_is_checked_before_operands() {
        assert_eq!(
            Instruction::build("WRITE", &["string@a#b", "GF@x"]),
            Err(SingleError::WrongArity { opcode: Opcode::Write, expected: 1, actual: 2 })
        );
    }

    #[test]
    fn operands_keep_their_order() {
        let instruction = Instruction::build("JUMPIFEQ", &["end", "GF@x", "nil@nil"]).unwrap();
        assert_eq!(
            instruction.operands(),
            &[
                Operand::Label("end".to_string()),
                Operand::build("GF@x", None).unwrap(),
                Operand::Literal(Literal::Nil),
            ][..]
        );
        if let Operand::Variable(variable) = &instruction.operands()[1] {
            assert_eq!(variable.frame(), Frame::Global);
        }
    }

    #[test]
    fn read_takes_a_type() {
        let instruction = Instruction::build("READ", &["GF@x", "bool"]).unwrap();
        assert_eq!(instruction.operands()[1], Operand::Type(TypeKeyword::Bool));
    }

    #[test]
    fn mismatched_kinds_are_reported() {
        assert_eq!(
            Instruction::build("MOVE", &["int@1", "GF@x"]),
            Err(SingleError::OperandMismatch {
                opcode: Opcode::Move,
                position: 1,
                expected: OperandKind::Variable,
                actual: OperandType::Literal,
            })
        );
        assert_eq!(
            Instruction::build("WRITE", &["loop"]),
            Err(SingleError::OperandMismatch {
                opcode: Opcode::Write,
                position: 1,
                expected: OperandKind::Symb,
                actual: OperandType::Label,
            })
        );
        assert_eq!(
            Instruction::build("READ", &["GF@x", "float"]),
            Err(SingleError::OperandMismatch {
                opcode: Opcode::Read,
                position: 2,
                expected: OperandKind::Type,
                actual: OperandType::Label,
            })
        );
        assert_eq!(
            Instruction::build("JUMP", &["GF@x"]),
            Err(SingleError::OperandMismatch {
                opcode: Opcode::Jump,
                position: 1,
                expected: OperandKind::Label,
                actual: OperandType::Variable,
            })
        );
    }

    #[test]
    fn first_failing_operand_wins() {
        assert_eq!(
            Instruction::build("CONCAT", &["GF@s", "string@a b", "label"]),
            Err(SingleError::InvalidOperand { token: "string@a b".to_string() })
        );
    }

    #[test]
    fn signatures_display() {
        assert_eq!(display_signature(Opcode::JumpIfEq.signature()), "<label> <symb> <symb>");
        assert_eq!(display_signature(Opcode::Break.signature()), "");
    }
}
