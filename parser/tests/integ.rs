extern crate ippcode_parser;

use ippcode_parser::error::SingleError;
use ippcode_parser::instruction::Opcode;
use ippcode_parser::lex::IntBase;
use ippcode_parser::operand::{Literal, Operand, TypeKeyword};
use ippcode_parser::{parse, parse_reader, xml, Program};
use pretty_assertions::assert_eq;

#[test]
fn hello() {
    let program = parse(include_str!("inputs/hello.ippcode")).unwrap();
    assert_eq!(xml::to_string(&program), include_str!("inputs/hello.xml"));
}

#[test]
fn factorial() {
    let program = parse(include_str!("inputs/factorial.ippcode")).unwrap();

    let opcodes: Vec<_> = program.iter()
        .map(|ordered| ordered.instruction.opcode().name())
        .collect();
    assert_eq!(
        opcodes,
        vec![
            "DEFVAR", "DEFVAR", "READ", "MOVE", "CREATEFRAME", "PUSHFRAME", "DEFVAR", "LABEL",
            "LT", "JUMPIFEQ", "MUL", "SUB", "JUMP", "LABEL", "POPFRAME", "TYPE", "PUSHS", "POPS",
            "STRI2INT", "INT2CHAR", "CONCAT", "STRLEN", "GETCHAR", "SETCHAR", "NOT", "AND", "OR",
            "EQ", "GT", "IDIV", "ADD", "CALL", "RETURN", "DPRINT", "BREAK", "WRITE", "JUMPIFNEQ",
            "EXIT",
        ]
    );

    let orders: Vec<_> = program.iter().map(|ordered| ordered.order).collect();
    assert_eq!(orders, (1..=38).collect::<Vec<_>>());
}

#[test]
fn factorial_operands() {
    let program = parse(include_str!("inputs/factorial.ippcode")).unwrap();
    let operands = |order: usize| program.instructions()[order - 1].instruction.operands().to_vec();

    assert_eq!(operands(3)[1], Operand::Type(TypeKeyword::Int));
    assert_eq!(operands(9)[2], Operand::Literal(Literal::Int { payload: "0x2".to_string(), base: IntBase::Hexadecimal }));
    assert_eq!(operands(29)[1], Operand::Literal(Literal::Int { payload: "017".to_string(), base: IntBase::Decimal }));
    assert_eq!(operands(29)[2], Operand::Literal(Literal::Int { payload: "0o17".to_string(), base: IntBase::Octal }));
    assert_eq!(operands(21)[2], Operand::Literal(Literal::String(String::new())));
    assert_eq!(operands(37)[0], Operand::Label("end".to_string()));
}

fn error_of(source: &str) -> (i32, SingleError, Option<usize>) {
    let error = parse(source).unwrap_err();
    let line = error.location().map(|location| location.line_number);
    (error.exit_code(), error.single_error().cloned().unwrap(), line)
}

#[test]
fn wrong_header() {
    assert_eq!(
        error_of(include_str!("inputs/wrong_header.ippcode")),
        (21, SingleError::IncorrectHeader { found: ".IPPcode23".to_string() }, Some(1))
    );
}

#[test]
fn missing_header() {
    assert_eq!(
        error_of(include_str!("inputs/missing_header.ippcode")),
        (21, SingleError::IncorrectHeader { found: "WRITE string@ok".to_string() }, Some(3))
    );
    assert_eq!(error_of(""), (21, SingleError::MissingHeader, None));
}

#[test]
fn unknown_opcode() {
    assert_eq!(
        error_of(include_str!("inputs/unknown_opcode.ippcode")),
        (22, SingleError::UnknownOpcode { opcode: "PRINT".to_string() }, Some(3))
    );
}

#[test]
fn invalid_operand() {
    assert_eq!(
        error_of(include_str!("inputs/invalid_operand.ippcode")),
        (23, SingleError::InvalidOperand { token: r"string@not\ok".to_string() }, Some(3))
    );
}

#[test]
fn wrong_arity() {
    assert_eq!(
        error_of(include_str!("inputs/wrong_arity.ippcode")),
        (23, SingleError::WrongArity { opcode: Opcode::Move, expected: 2, actual: 1 }, Some(3))
    );
}

#[test]
fn mismatched_operand() {
    let (code, error, line) = error_of(include_str!("inputs/mismatched_operand.ippcode"));
    assert_eq!((code, line), (23, Some(2)));
    assert!(matches!(error, SingleError::OperandMismatch { opcode: Opcode::DefVar, position: 1, .. }));
}

#[test]
fn reader_and_str_agree() {
    let source = include_str!("inputs/factorial.ippcode");
    let from_reader: Program = parse_reader(source.as_bytes()).unwrap();
    assert_eq!(from_reader, parse(source).unwrap());
}
