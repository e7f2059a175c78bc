//! Assembling a whole IPPcode24 source into a [`Program`].
//!
//! The source is processed one line at a time. Everything from the first `#` on a line
//! is a comment. Lines with no content left are skipped. The first line with content
//! must be the header, `.IPPcode24` in any letter case; every following line with
//! content is one instruction, its opcode followed by its operands, all separated by
//! whitespace. Instructions are numbered in the order they appear, starting from 1.
//!
//! ```
//! # use ippcode_parser::program::parse;
//! let source = "\
//! .IPPcode24
//! ## prints hello
//! DEFVAR GF@greeting
//!
//! MOVE GF@greeting string@hello # comment
//! WRITE GF@greeting
//! ";
//! let program = parse(source).unwrap();
//! let orders: Vec<_> = program.iter().map(|ordered| ordered.order).collect();
//! assert_eq!(orders, vec![1, 2, 3]);
//! ```
//!
//! Parsing stops at the first error; no part of a program with errors is returned.

use std::io::Read;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, trace};

use crate::error::{Error, Location, Result, SingleError};
use crate::instruction::Instruction;

/// The name of the source language.
pub const LANGUAGE: &str = "IPPcode24";

/// The line every source must start with (ignoring letter case).
pub const HEADER: &str = ".IPPcode24";

/// Starts a comment which runs to the end of the line.
pub const COMMENT_MARKER: char = '#';

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").expect("Invalid regex"));
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\r|\n").expect("Invalid regex"));

/// A validated instruction together with its position in the program.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderedInstruction {
    /// 1-based, without gaps.
    pub order: usize,
    pub instruction: Instruction,
}

/// The intermediate representation of a valid IPPcode24 source.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Program {
    instructions: Vec<OrderedInstruction>,
}

impl Program {
    pub fn language(&self) -> &'static str {
        LANGUAGE
    }

    pub fn instructions(&self) -> &[OrderedInstruction] {
        &self.instructions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrderedInstruction> {
        self.instructions.iter()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a OrderedInstruction;
    type IntoIter = std::slice::Iter<'a, OrderedInstruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    AwaitingHeader,
    Body,
}

/// Builds a [`Program`] from source lines fed to it one by one.
#[derive(Debug)]
pub struct Assembler {
    state: State,
    line_number: usize,
    instructions: Vec<OrderedInstruction>,
}

impl Default for Assembler {
    fn default() -> Self {
        Assembler::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        Assembler {
            state: State::AwaitingHeader,
            line_number: 0,
            instructions: Vec::new(),
        }
    }

    /// Processes the next line of the source, without its line terminator.
    pub fn feed(&mut self, line: &str) -> Result<()> {
        self.line_number += 1;

        let words = words(line);
        if words.is_empty() {
            trace!(line = self.line_number, "skipping line without content");
            return Ok(());
        }

        match self.state {
            State::AwaitingHeader => {
                self.check_header(line, &words)?;
                debug!(line = self.line_number, "header accepted");
                self.state = State::Body;
            }
            State::Body => self.push_instruction(line, &words)?,
        }
        Ok(())
    }

    /// Finishes the program once all lines are fed.
    pub fn finish(self) -> Result<Program> {
        if self.state == State::AwaitingHeader {
            return Err(SingleError::MissingHeader.into());
        }
        info!(instructions = self.instructions.len(), "program parsed");
        Ok(Program { instructions: self.instructions })
    }

    fn check_header(&self, line: &str, words: &[Word]) -> Result<()> {
        let content = content_span(words);
        let found = &line[content.clone()];
        if found.to_lowercase() == HEADER.to_lowercase() {
            Ok(())
        } else {
            Err(self.locate(SingleError::IncorrectHeader { found: found.to_string() }, line, content))
        }
    }

    fn push_instruction(&mut self, line: &str, words: &[Word]) -> Result<()> {
        let (opcode, operands) = match words.split_first() {
            Some((opcode, operands)) => (opcode, operands),
            None => return Err(SingleError::Internal("instruction line without an opcode".to_string()).into()),
        };
        let arguments: Vec<&str> = operands.iter().map(|word| word.text).collect();

        let instruction = Instruction::build(opcode.text, &arguments).map_err(|error| {
            let span = offending_span(&error, words);
            self.locate(error, line, span)
        })?;

        let order = self.instructions.len() + 1;
        debug!(
            order,
            opcode = instruction.opcode().name(),
            operands = instruction.operands().len(),
            line = self.line_number,
            "instruction parsed"
        );
        self.instructions.push(OrderedInstruction { order, instruction });
        Ok(())
    }

    fn locate(&self, error: SingleError, line: &str, span: Range<usize>) -> Error {
        Error::located(error, Location {
            line_number: self.line_number,
            line: line.to_string(),
            span,
        })
    }
}

/// A whitespace separated piece of a line's content, with its byte range in the line.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Word<'input> {
    text: &'input str,
    span: Range<usize>,
}

fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_MARKER) {
        Some(index) => &line[..index],
        None => line,
    }
}

fn words(line: &str) -> Vec<Word<'_>> {
    WORD.find_iter(strip_comment(line))
        .map(|found| Word { text: found.as_str(), span: found.start()..found.end() })
        .collect()
}

fn content_span(words: &[Word]) -> Range<usize> {
    match (words.first(), words.last()) {
        (Some(first), Some(last)) => first.span.start..last.span.end,
        _ => 0..0,
    }
}

// The part of the line an instruction error is about. Operand errors point at the
// operand; everything else points at the opcode.
fn offending_span(error: &SingleError, words: &[Word]) -> Range<usize> {
    let operand = match error {
        SingleError::OperandMismatch { position, .. } => words.get(*position),
        // The first invalid token stops the build, so the first occurrence is the culprit.
        SingleError::InvalidOperand { token } => words.iter().skip(1).find(|word| word.text == token),
        SingleError::UnknownOpcode { .. } | SingleError::WrongArity { .. } => None,
        _ => return content_span(words),
    };
    operand.or_else(|| words.first())
        .map(|word| word.span.clone())
        .unwrap_or(0..0)
}

/// Parses a whole source. Lines may end with `\n`, `\r\n` or a lone `\r`.
pub fn parse(source: &str) -> Result<Program> {
    let mut assembler = Assembler::new();
    for line in LINE_BREAK.split(source) {
        assembler.feed(line)?;
    }
    assembler.finish()
}

/// Parses a source read from `reader`.
///
/// Fails with [`Error::Input`] if reading fails, including when the input is not UTF-8.
pub fn parse_reader<R: Read>(mut reader: R) -> Result<Program> {
    let mut source = String::new();
    reader.read_to_string(&mut source).map_err(Error::Input)?;
    parse(&source)
}
