use std::io;
use std::ops::Range;

use annotate_snippets::display_list::{DisplayList, FormatOptions};
use annotate_snippets::snippet::{Annotation, AnnotationType, Slice, Snippet, SourceAnnotation};
use thiserror::Error;

use crate::instruction::{display_signature, Opcode};
use crate::operand::{OperandKind, OperandType};
use crate::program::HEADER;

pub type Result<T> = std::result::Result<T, Error>;

pub const INVALID_INVOCATION_EXIT_CODE: i32 = 10;
pub const INPUT_EXIT_CODE: i32 = 11;
pub const OUTPUT_EXIT_CODE: i32 = 12;
pub const HEADER_EXIT_CODE: i32 = 21;
pub const OPCODE_EXIT_CODE: i32 = 22;
pub const SYNTAX_EXIT_CODE: i32 = 23;
pub const INTERNAL_EXIT_CODE: i32 = 99;

/// A single problem with the content of the source code.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SingleError {
    #[error("missing header, the first line with content must be `{}`", HEADER)]
    MissingHeader,
    #[error("incorrect header `{found}`, expected `{}`", HEADER)]
    IncorrectHeader { found: String },
    #[error("unknown or incorrect operation code `{opcode}`")]
    UnknownOpcode { opcode: String },
    #[error("{opcode} takes {expected} operand(s), found {actual}")]
    WrongArity { opcode: Opcode, expected: usize, actual: usize },
    #[error("`{token}` is not a valid variable, literal, label or type")]
    InvalidOperand { token: String },
    #[error("operand {position} of {opcode} must be <{expected}>, found a {actual}")]
    OperandMismatch { opcode: Opcode, position: usize, expected: OperandKind, actual: OperandType },
    #[error("internal error: {0}")]
    Internal(String),
}

impl SingleError {
    pub fn exit_code(&self) -> i32 {
        use SingleError::*;
        match self {
            MissingHeader | IncorrectHeader { .. } => HEADER_EXIT_CODE,
            UnknownOpcode { .. } => OPCODE_EXIT_CODE,
            WrongArity { .. } | InvalidOperand { .. } | OperandMismatch { .. } => SYNTAX_EXIT_CODE,
            Internal(_) => INTERNAL_EXIT_CODE,
        }
    }

    fn annotation_label(&self) -> String {
        use SingleError::*;
        match self {
            MissingHeader => "header expected here".to_string(),
            IncorrectHeader { .. } => format!("expected `{}`", HEADER),
            UnknownOpcode { .. } => "unknown opcode".to_string(),
            WrongArity { opcode, .. } => format!("expected `{} {}`", opcode, display_signature(opcode.signature())),
            InvalidOperand { .. } => "invalid operand".to_string(),
            OperandMismatch { expected, .. } => format!("expected <{}>", expected),
            Internal(_) => "while parsing this".to_string(),
        }
    }
}

/// Where in the source code an error was found.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Location {
    /// 1-based.
    pub line_number: usize,
    pub line: String,
    /// Byte range of the offending text within `line`.
    pub span: Range<usize>,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidInvocation(String),
    #[error("cannot read input: {0}")]
    Input(#[source] io::Error),
    #[error("cannot write output: {0}")]
    Output(#[source] io::Error),
    #[error("{error}")]
    Source { error: SingleError, location: Option<Location> },
}

impl From<SingleError> for Error {
    fn from(error: SingleError) -> Self {
        Error::Source { error, location: None }
    }
}

impl Error {
    pub fn located(error: SingleError, location: Location) -> Self {
        Error::Source { error, location: Some(location) }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidInvocation(_) => INVALID_INVOCATION_EXIT_CODE,
            Error::Input(_) => INPUT_EXIT_CODE,
            Error::Output(_) => OUTPUT_EXIT_CODE,
            Error::Source { error, .. } => error.exit_code(),
        }
    }

    pub fn single_error(&self) -> Option<&SingleError> {
        match self {
            Error::Source { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Error::Source { location, .. } => location.as_ref(),
            _ => None,
        }
    }

    fn slices<'a>(&'a self, label: &'a str, origin: Option<&'a str>) -> Vec<Slice<'a>> {
        let mut slices = Vec::new();
        if let Some(Location { line_number, line, span }) = self.location() {
            slices.push(
                Slice {
                    source: line.as_str(),
                    line_start: *line_number,
                    origin,
                    fold: false,
                    annotations: vec![
                        SourceAnnotation {
                            range: char_range(line, span),
                            label,
                            annotation_type: AnnotationType::Error,
                        }
                    ],
                }
            );
        }
        slices
    }

    pub fn create_snippet<'a>(&'a self, title: &'a str, label: &'a str, origin: Option<&'a str>, color: bool) -> Snippet<'a> {
        Snippet {
            title: Some(Annotation {
                label: Some(title),
                id: None,
                annotation_type: AnnotationType::Error,
            }),
            footer: vec![],
            slices: self.slices(label, origin),
            opt: FormatOptions {
                color,
                ..Default::default()
            },
        }
    }

    /// Renders the error as a diagnostic, with the offending line and
    /// the offending part of it marked when the location is known.
    pub fn render(&self, origin: Option<&str>, color: bool) -> String {
        let title = self.to_string();
        let label = self.single_error()
            .map(SingleError::annotation_label)
            .unwrap_or_default();
        let snippet = self.create_snippet(&title, &label, origin, color);
        DisplayList::from(snippet).to_string()
    }
}

// Annotations count characters, not bytes.
fn char_range(line: &str, span: &Range<usize>) -> (usize, usize) {
    let start = line.get(..span.start).map_or(0, |prefix| prefix.chars().count());
    let length = line.get(span.clone()).map_or(0, |text| text.chars().count());
    (start, start + length)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn exit_codes() {
        assert_eq!(Error::from(SingleError::MissingHeader).exit_code(), 21);
        assert_eq!(Error::from(SingleError::IncorrectHeader { found: ".IPPcode25".to_string() }).exit_code(), 21);
        assert_eq!(Error::from(SingleError::UnknownOpcode { opcode: "FOO".to_string() }).exit_code(), 22);
        assert_eq!(Error::from(SingleError::WrongArity { opcode: Opcode::Add, expected: 3, actual: 2 }).exit_code(), 23);
        assert_eq!(Error::from(SingleError::InvalidOperand { token: "int@x".to_string() }).exit_code(), 23);
        assert_eq!(Error::from(SingleError::Internal("oops".to_string())).exit_code(), 99);
        assert_eq!(Error::InvalidInvocation("--foo".to_string()).exit_code(), 10);
        assert_eq!(Error::Input(io::Error::new(io::ErrorKind::InvalidData, "not UTF-8")).exit_code(), 11);
        assert_eq!(Error::Output(io::Error::new(io::ErrorKind::BrokenPipe, "closed")).exit_code(), 12);
    }

    #[test]
    fn messages() {
        assert_eq!(
            SingleError::WrongArity { opcode: Opcode::Add, expected: 3, actual: 2 }.to_string(),
            "ADD takes 3 operand(s), found 2"
        );
        assert_eq!(
            SingleError::OperandMismatch {
                opcode: Opcode::Move,
                position: 1,
                expected: OperandKind::Variable,
                actual: OperandType::Literal,
            }.to_string(),
            "operand 1 of MOVE must be <var>, found a literal"
        );
        assert_eq!(
            SingleError::IncorrectHeader { found: ".IPPcode23".to_string() }.to_string(),
            "incorrect header `.IPPcode23`, expected `.IPPcode24`"
        );
    }

    #[test]
    fn rendered_diagnostic_points_at_the_token() {
        let error = Error::located(
            SingleError::InvalidOperand { token: "int@x".to_string() },
            Location { line_number: 3, line: "WRITE int@x".to_string(), span: 6..11 },
        );
        let rendered = error.render(Some("<stdin>"), false);
        assert!(rendered.contains("error: `int@x` is not a valid variable, literal, label or type"), "{}", rendered);
        assert!(rendered.contains("<stdin>:3"), "{}", rendered);
        assert!(rendered.contains("WRITE int@x"), "{}", rendered);
        assert!(rendered.contains("^^^^"), "{}", rendered);
        assert!(rendered.contains("invalid operand"), "{}", rendered);
    }

    #[test]
    fn unlocated_errors_render_a_title() {
        let rendered = Error::from(SingleError::MissingHeader).render(None, false);
        assert_eq!(rendered.trim_end(), "error: missing header, the first line with content must be `.IPPcode24`");
    }

    #[test]
    fn char_ranges() {
        assert_eq!(char_range("WRITE string@čau", &(6..17)), (6, 16));
        assert_eq!(char_range("x", &(4..9)), (0, 0));
    }
}
