//! Writing a [`Program`] as XML.
//!
//! ```
//! # use ippcode_parser::{parse, xml};
//! let program = parse(".IPPcode24\nWRITE string@a<b\nBREAK\n").unwrap();
//! assert_eq!(xml::to_string(&program), "\
//! <?xml version=\"1.0\" encoding=\"UTF-8\"?>
//! <program language=\"IPPcode24\">
//!   <instruction order=\"1\" opcode=\"WRITE\">
//!     <arg1 type=\"string\">a&lt;b</arg1>
//!   </instruction>
//!   <instruction order=\"2\" opcode=\"BREAK\"/>
//! </program>
//! ");
//! ```

use std::borrow::Cow;
use std::io;
use std::io::Write;

use crate::program::{OrderedInstruction, Program};

const INDENT: &str = "  ";

/// Writes the XML document for `program` to `out`.
pub fn write<W: Write>(program: &Program, mut out: W) -> io::Result<()> {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;

    let language = escape_attribute(program.language());
    if program.is_empty() {
        return writeln!(out, r#"<program language="{}"/>"#, language);
    }

    writeln!(out, r#"<program language="{}">"#, language)?;
    for ordered in program {
        write_instruction(ordered, &mut out)?;
    }
    writeln!(out, "</program>")
}

fn write_instruction<W: Write>(ordered: &OrderedInstruction, out: &mut W) -> io::Result<()> {
    let OrderedInstruction { order, instruction } = ordered;
    let operands = instruction.operands();
    let opcode = instruction.opcode();

    if operands.is_empty() {
        return writeln!(out, r#"{}<instruction order="{}" opcode="{}"/>"#, INDENT, order, opcode);
    }

    writeln!(out, r#"{}<instruction order="{}" opcode="{}">"#, INDENT, order, opcode)?;
    for (index, operand) in operands.iter().enumerate() {
        let position = index + 1;
        let kind = escape_attribute(operand.kind_tag());
        let value = operand.value();
        if value.is_empty() {
            writeln!(out, r#"{0}{0}<arg{1} type="{2}"/>"#, INDENT, position, kind)?;
        } else {
            writeln!(out, r#"{0}{0}<arg{1} type="{2}">{3}</arg{1}>"#, INDENT, position, kind, escape_text(&value))?;
        }
    }
    writeln!(out, "{}</instruction>", INDENT)
}

/// The XML document for `program`.
pub fn to_string(program: &Program) -> String {
    let mut buffer = Vec::new();
    write(program, &mut buffer).expect("writing to a Vec does not fail");
    String::from_utf8(buffer).expect("the document is built from UTF-8 strings")
}

fn escape(text: &str, quotes: bool) -> Cow<'_, str> {
    let needs_escaping = |c: char| matches!(c, '&' | '<' | '>') || (quotes && c == '"');
    if !text.contains(needs_escaping) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if quotes => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn escape_text(text: &str) -> Cow<'_, str> {
    escape(text, false)
}

fn escape_attribute(value: &str) -> Cow<'_, str> {
    escape(value, true)
}
