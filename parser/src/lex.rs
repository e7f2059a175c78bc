//! Functions for classifying IPPcode24 operand tokens.
//!
//! Every operand of an IPPcode24 instruction is a single token without whitespace.
//! Classification decides which kind of operand a token denotes by matching it against
//! a fixed set of patterns. Here's an example:
//!
//! ```
//! # use ippcode_parser::lex::*;
//! assert!(is_variable("GF@counter"));
//! assert!(is_literal("int@0x1A"));
//! assert!(is_label("loop-start"));
//! assert!(is_type("string"));
//!
//! assert!(!is_variable("gf@counter"));
//! assert!(!is_literal("string@two#words"));
//! ```
//!
//! The predicates are independent of each other; a token may satisfy more than one
//! of them (`int` is both a valid label and a type keyword). Deciding which kind wins
//! is the job of the [operand factory](crate::operand::Operand::build).
//!
//! All patterns are compiled once per process and never change afterwards.

use num_traits::Num;
use once_cell::sync::Lazy;
use regex::Regex;

/// Characters allowed in label names and in the name part of variables.
/// Names must not start with a digit.
const IDENTIFIER: &str = r"[a-zA-Z_$&%*!?-][a-zA-Z0-9_$&%*!?-]*";

// Registering a pattern anchors it on both ends, so don't use ^ or $.
fn anchored(pattern: &str) -> Regex {
    assert!(!pattern.starts_with('^') && !pattern.ends_with('$'));
    let pattern = format!("^(?:{})$", pattern);
    Regex::new(pattern.as_str()).expect("Invalid regex")
}

static VARIABLE: Lazy<Regex> = Lazy::new(|| anchored(&format!("(?:LF|TF|GF)@{}", IDENTIFIER)));
static LABEL: Lazy<Regex> = Lazy::new(|| anchored(IDENTIFIER));
static TYPE: Lazy<Regex> = Lazy::new(|| anchored("int|bool|string"));

static BOOL: Lazy<Regex> = Lazy::new(|| anchored("bool@(?:true|false)"));
static NIL: Lazy<Regex> = Lazy::new(|| anchored("nil@nil"));
// No whitespace, '#', '"' or '\', except '\' starting a three digit escape sequence.
static STRING: Lazy<Regex> = Lazy::new(|| anchored(r#"string@(?:[^\s#"\\]|\\[0-9]{3})*"#));

static DECIMAL: Lazy<Regex> = Lazy::new(|| anchored("[+-]?[0-9](?:_?[0-9])*"));
static HEXADECIMAL: Lazy<Regex> = Lazy::new(|| anchored("[+-]?(?:0[xX]_?)?[0-9a-fA-F](?:_?[0-9a-fA-F])*"));
static OCTAL: Lazy<Regex> = Lazy::new(|| anchored("[+-]?(?:0[oO]_?)?[0-7](?:_?[0-7])*"));

/// Returns whether `token` is a variable (`GF@name`, `LF@name` or `TF@name`).
pub fn is_variable(token: &str) -> bool {
    VARIABLE.is_match(token)
}

/// Returns whether `token` is a constant of any literal kind.
pub fn is_literal(token: &str) -> bool {
    classify_literal(token).is_some()
}

/// Returns whether `token` is a label name.
pub fn is_label(token: &str) -> bool {
    LABEL.is_match(token)
}

/// Returns whether `token` is one of the type keywords `int`, `bool` or `string`.
pub fn is_type(token: &str) -> bool {
    TYPE.is_match(token)
}

/// The kind of a literal, determined by its `kind@` prefix.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LiteralKind {
    Bool,
    Nil,
    /// An integer, together with the base its payload was accepted in.
    Int(IntBase),
    String,
}

impl LiteralKind {
    /// The prefix (without `@`) which introduces literals of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            LiteralKind::Bool => "bool",
            LiteralKind::Nil => "nil",
            LiteralKind::Int(_) => "int",
            LiteralKind::String => "string",
        }
    }
}

/// Determines which kind of literal `token` is, if any.
///
/// The literal kinds are mutually exclusive by prefix.
pub fn classify_literal(token: &str) -> Option<LiteralKind> {
    if BOOL.is_match(token) {
        Some(LiteralKind::Bool)
    } else if NIL.is_match(token) {
        Some(LiteralKind::Nil)
    } else if STRING.is_match(token) {
        Some(LiteralKind::String)
    } else if let Some(payload) = token.strip_prefix("int@") {
        IntBase::of(payload).map(LiteralKind::Int)
    } else {
        None
    }
}

/// A base in which an integer literal's payload may be written.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IntBase {
    Decimal,
    Hexadecimal,
    Octal,
}

impl IntBase {
    /// The order in which bases are tried. The first one that accepts the payload wins,
    /// so `017` is decimal seventeen, never octal fifteen.
    pub const TRIAL_ORDER: [IntBase; 3] = [IntBase::Decimal, IntBase::Hexadecimal, IntBase::Octal];

    pub fn radix(self) -> u32 {
        match self {
            IntBase::Decimal => 10,
            IntBase::Hexadecimal => 16,
            IntBase::Octal => 8,
        }
    }

    /// Tries each base of [`TRIAL_ORDER`](IntBase::TRIAL_ORDER) on `payload`.
    ///
    /// ```
    /// # use ippcode_parser::lex::IntBase;
    /// assert_eq!(IntBase::of("017"), Some(IntBase::Decimal));
    /// assert_eq!(IntBase::of("0x1A"), Some(IntBase::Hexadecimal));
    /// assert_eq!(IntBase::of("0o17"), Some(IntBase::Octal));
    /// assert_eq!(IntBase::of("0b1"), Some(IntBase::Hexadecimal));
    /// assert_eq!(IntBase::of("0xg"), None);
    /// ```
    pub fn of(payload: &str) -> Option<IntBase> {
        Self::TRIAL_ORDER.iter()
            .copied()
            .find(|base| base.accepts(payload))
    }

    /// Returns whether `payload` is integer syntax in this base:
    /// an optional sign, an optional base prefix (`0x`, `0o`), and digits
    /// which may be separated by single underscores.
    pub fn accepts(self, payload: &str) -> bool {
        match self {
            IntBase::Decimal => DECIMAL.is_match(payload),
            IntBase::Hexadecimal => HEXADECIMAL.is_match(payload),
            IntBase::Octal => OCTAL.is_match(payload),
        }
    }

    /// Computes the value of `payload` in this base.
    ///
    /// Returns `None` if the payload is not valid in this base or
    /// the value does not fit into `T`.
    pub fn value<T: Num>(self, payload: &str) -> Option<T> {
        if !self.accepts(payload) {
            return None;
        }
        let (sign, unsigned) = match payload.as_bytes().first() {
            Some(b'-') => ("-", &payload[1..]),
            Some(b'+') => ("", &payload[1..]),
            _ => ("", payload),
        };
        let digits = match self {
            IntBase::Decimal => unsigned,
            IntBase::Hexadecimal => strip_base_prefix(unsigned, 'x'),
            IntBase::Octal => strip_base_prefix(unsigned, 'o'),
        };
        let digits: String = sign.chars()
            .chain(digits.chars().filter(|c| *c != '_'))
            .collect();
        T::from_str_radix(digits.as_str(), self.radix()).ok()
    }
}

fn strip_base_prefix(digits: &str, marker: char) -> &str {
    let mut chars = digits.chars();
    match (chars.next(), chars.next()) {
        (Some('0'), Some(c)) if c.to_ascii_lowercase() == marker => &digits[2..],
        _ => digits,
    }
}
