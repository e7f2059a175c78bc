//! Typed operands and the factory which builds them from tokens.
//!
//! An operand is one of four concrete kinds: a [`Variable`], a [`Literal`],
//! a label name, or a [`TypeKeyword`]. "Symb" is not a kind of its own; it is the
//! capability shared by variables and literals, checked with [`Operand::is_symb`].
//!
//! ```
//! # use ippcode_parser::operand::*;
//! let operand = Operand::build("GF@x", Some(OperandKind::Symb)).unwrap();
//! assert_eq!(operand.kind_tag(), "var");
//! assert_eq!(operand.value(), "GF@x");
//! assert!(operand.is_symb());
//! ```

use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use tracing::trace;

use crate::error::SingleError;
use crate::lex;
use crate::lex::{IntBase, LiteralKind};

/// A memory frame a variable lives in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Frame {
    /// `GF`
    Global,
    /// `LF`
    Local,
    /// `TF`
    Temporary,
}

impl Frame {
    pub fn prefix(self) -> &'static str {
        match self {
            Frame::Global => "GF",
            Frame::Local => "LF",
            Frame::Temporary => "TF",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Frame> {
        match prefix {
            "GF" => Some(Frame::Global),
            "LF" => Some(Frame::Local),
            "TF" => Some(Frame::Temporary),
            _ => None,
        }
    }
}

/// A variable reference, `FRAME@name`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Variable {
    frame: Frame,
    name: String,
}

impl Variable {
    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.frame.prefix(), self.name)
    }
}

/// A constant, written as `kind@payload` in the source.
///
/// Only the payload is stored. It is kept exactly as written;
/// escape sequences in strings and base prefixes of integers are not interpreted.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Literal {
    Bool(bool),
    Nil,
    Int { payload: String, base: IntBase },
    String(String),
}

impl Literal {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Literal::Bool(_) => LiteralKind::Bool,
            Literal::Nil => LiteralKind::Nil,
            Literal::Int { base, .. } => LiteralKind::Int(*base),
            Literal::String(_) => LiteralKind::String,
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            Literal::Bool(true) => "true",
            Literal::Bool(false) => "false",
            Literal::Nil => "nil",
            Literal::Int { payload, .. } => payload,
            Literal::String(payload) => payload,
        }
    }

    /// The numeric value of an integer literal, if it fits into an `i64`.
    pub fn int_value(&self) -> Option<i64> {
        match self {
            Literal::Int { payload, base } => base.value(payload),
            _ => None,
        }
    }
}

/// One of the type names accepted by `READ`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TypeKeyword {
    Int,
    Bool,
    String,
}

impl TypeKeyword {
    pub fn name(self) -> &'static str {
        match self {
            TypeKeyword::Int => "int",
            TypeKeyword::Bool => "bool",
            TypeKeyword::String => "string",
        }
    }

    fn from_name(name: &str) -> Option<TypeKeyword> {
        match name {
            "int" => Some(TypeKeyword::Int),
            "bool" => Some(TypeKeyword::Bool),
            "string" => Some(TypeKeyword::String),
            _ => None,
        }
    }
}

/// A classified operand of an instruction.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Operand {
    Variable(Variable),
    Literal(Literal),
    Label(String),
    Type(TypeKeyword),
}

/// The concrete kind of a built [`Operand`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperandType {
    Variable,
    Literal,
    Label,
    Type,
}

impl Display for OperandType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperandType::Variable => "variable",
            OperandType::Literal => "literal",
            OperandType::Label => "label",
            OperandType::Type => "type",
        };
        write!(f, "{}", name)
    }
}

/// The kind of operand an instruction expects in one position.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperandKind {
    Variable,
    /// A variable or a literal.
    Symb,
    Label,
    Type,
}

impl OperandKind {
    pub fn accepts(self, operand: &Operand) -> bool {
        match (self, operand) {
            (OperandKind::Variable, Operand::Variable(_)) => true,
            (OperandKind::Symb, operand) => operand.is_symb(),
            (OperandKind::Label, Operand::Label(_)) => true,
            (OperandKind::Type, Operand::Type(_)) => true,
            _ => false,
        }
    }
}

impl Display for OperandKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperandKind::Variable => "var",
            OperandKind::Symb => "symb",
            OperandKind::Label => "label",
            OperandKind::Type => "type",
        };
        write!(f, "{}", name)
    }
}

impl Operand {
    /// Builds an operand from a source token.
    ///
    /// If `expected` is given, the token is first checked against that kind only.
    /// When that check fails (or nothing is expected), the token is classified
    /// without regard to `expected`, trying variable, literal, label and type keyword
    /// in that order. The result may therefore be of a different kind than expected;
    /// callers which need a specific kind must check it themselves.
    ///
    /// ```
    /// # use ippcode_parser::operand::*;
    /// let operand = Operand::build("loop", Some(OperandKind::Symb)).unwrap();
    /// assert_eq!(operand, Operand::Label("loop".to_string()));
    ///
    /// assert!(Operand::build("string@a#b", None).is_err());
    /// ```
    pub fn build(token: &str, expected: Option<OperandKind>) -> Result<Operand, SingleError> {
        if let Some(kind) = expected {
            if let Some(operand) = Self::build_expected(token, kind)? {
                trace!(token, expected = %kind, "operand matched expected kind");
                return Ok(operand);
            }
        }

        let operand = Self::classify(token)?;
        trace!(token, kind = operand.kind_tag(), "operand classified");
        Ok(operand)
    }

    fn build_expected(token: &str, kind: OperandKind) -> Result<Option<Operand>, SingleError> {
        match kind {
            OperandKind::Label if lex::is_label(token) => Ok(Some(Operand::Label(token.to_string()))),
            OperandKind::Type if lex::is_type(token) => type_keyword(token).map(Some),
            OperandKind::Variable | OperandKind::Symb if lex::is_variable(token) => variable(token).map(Some),
            OperandKind::Symb => match lex::classify_literal(token) {
                Some(literal_kind) => literal(token, literal_kind).map(Some),
                None => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn classify(token: &str) -> Result<Operand, SingleError> {
        if lex::is_variable(token) {
            variable(token)
        } else if let Some(literal_kind) = lex::classify_literal(token) {
            literal(token, literal_kind)
        } else if lex::is_label(token) {
            Ok(Operand::Label(token.to_string()))
        } else if lex::is_type(token) {
            type_keyword(token)
        } else {
            Err(SingleError::InvalidOperand { token: token.to_string() })
        }
    }

    pub fn operand_type(&self) -> OperandType {
        match self {
            Operand::Variable(_) => OperandType::Variable,
            Operand::Literal(_) => OperandType::Literal,
            Operand::Label(_) => OperandType::Label,
            Operand::Type(_) => OperandType::Type,
        }
    }

    /// Whether this operand can stand where a "symb" (variable or literal) is expected.
    pub fn is_symb(&self) -> bool {
        match self {
            Operand::Variable(_) | Operand::Literal(_) => true,
            Operand::Label(_) | Operand::Type(_) => false,
        }
    }

    /// The tag written as the `type` attribute of the operand's XML element:
    /// `var`, `label`, `type`, or the literal's kind.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            Operand::Variable(_) => "var",
            Operand::Literal(literal) => literal.kind().prefix(),
            Operand::Label(_) => "label",
            Operand::Type(_) => "type",
        }
    }

    /// The operand's text as written in the source, without any `kind@` prefix
    /// for literals. Variables keep their frame prefix.
    pub fn value(&self) -> Cow<'_, str> {
        match self {
            Operand::Variable(variable) => Cow::Owned(variable.to_string()),
            Operand::Literal(literal) => Cow::Borrowed(literal.payload()),
            Operand::Label(name) => Cow::Borrowed(name),
            Operand::Type(keyword) => Cow::Borrowed(keyword.name()),
        }
    }
}

fn variable(token: &str) -> Result<Operand, SingleError> {
    token.split_once('@')
        .and_then(|(prefix, name)| {
            Frame::from_prefix(prefix).map(|frame| Variable { frame, name: name.to_string() })
        })
        .map(Operand::Variable)
        .ok_or_else(|| SingleError::Internal(format!("classified `{}` as a variable without a frame", token)))
}

fn literal(token: &str, kind: LiteralKind) -> Result<Operand, SingleError> {
    let payload = token.strip_prefix(kind.prefix())
        .and_then(|rest| rest.strip_prefix('@'))
        .ok_or_else(|| SingleError::Internal(format!("classified `{}` as a {} literal without its prefix", token, kind.prefix())))?;
    let literal = match kind {
        LiteralKind::Bool => Literal::Bool(payload == "true"),
        LiteralKind::Nil => Literal::Nil,
        LiteralKind::Int(base) => Literal::Int { payload: payload.to_string(), base },
        LiteralKind::String => Literal::String(payload.to_string()),
    };
    Ok(Operand::Literal(literal))
}

fn type_keyword(token: &str) -> Result<Operand, SingleError> {
    TypeKeyword::from_name(token)
        .map(Operand::Type)
        .ok_or_else(|| SingleError::Internal(format!("classified `{}` as a type without a known name", token)))
}
