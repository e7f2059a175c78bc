//! A parser for IPPcode24, a small three-address code language.
//!
//! The parser checks the lexical and syntactic correctness of IPPcode24 source code
//! and produces a [`Program`], the ordered list of validated instructions, which can be
//! written out as [XML](crate::xml). It works in stages:
//!
//! - [`lex`] classifies operand tokens by their shape,
//! - [`operand`] builds typed operands from tokens,
//! - [`instruction`] holds the instruction set and validates single instructions,
//! - [`program`] reads the source line by line and assembles the program.
//!
//! ```
//! let program = ippcode_parser::parse(".IPPcode24\nMOVE GF@x string@hello\n").unwrap();
//! assert_eq!(program.len(), 1);
//! ```
//!
//! Every error is fatal. The first one found is returned with the [exit code](Error::exit_code)
//! the `parse` binary terminates with.

pub mod error;
pub mod lex;
pub mod operand;
pub mod instruction;
pub mod program;
pub mod xml;

pub use error::{Error, Location, Result, SingleError};
pub use instruction::{Instruction, Opcode};
pub use operand::{Operand, OperandKind};
pub use program::{parse, parse_reader, Assembler, OrderedInstruction, Program, HEADER, LANGUAGE};
