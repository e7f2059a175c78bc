extern crate ippcode_parser;

use std::env;
use std::ffi::OsString;
use std::io;
use std::io::{BufWriter, IsTerminal, Write};
use std::panic;
use std::process;

use clap::{crate_version, App, ErrorKind};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ippcode_parser::error::{Error, Result, INTERNAL_EXIT_CODE};
use ippcode_parser::{parse_reader, xml};

const ABOUT: &str = "Reads source code in IPPcode24 from standard input, checks its lexical and \
syntactic correctness, and writes the XML representation of the program to standard output.";

const ORIGIN: &str = "<stdin>";

fn app() -> App<'static, 'static> {
    App::new("parse")
        .version(crate_version!())
        .about(ABOUT)
        .after_help("Exit codes: 10 invalid arguments, 11 unreadable input, 12 unwritable output, \
21 missing or incorrect header, 22 unknown opcode, 23 other lexical or syntax error, 99 internal error.")
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Returns whether parsing should go ahead; `false` once help or version was printed.
fn parse_arguments(arguments: Vec<OsString>) -> Result<bool> {
    // --help and --version may not be combined with anything.
    if arguments.len() > 2 {
        return Err(Error::InvalidInvocation(
            "error: parse takes at most one argument, --help or --version".to_string()
        ));
    }

    match app().get_matches_from_safe(arguments) {
        Ok(_) => Ok(true),
        Err(error) if error.kind == ErrorKind::HelpDisplayed || error.kind == ErrorKind::VersionDisplayed => {
            // clap prints the version itself and hands back the help text.
            if !error.message.is_empty() {
                println!("{}", error.message);
            }
            Ok(false)
        }
        Err(error) => Err(Error::InvalidInvocation(error.message)),
    }
}

fn run() -> Result<()> {
    if !parse_arguments(env::args_os().collect())? {
        return Ok(());
    }

    let stdin = io::stdin();
    let program = parse_reader(stdin.lock())?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    xml::write(&program, &mut out).map_err(Error::Output)?;
    out.flush().map_err(Error::Output)
}

fn report(error: &Error) {
    match error {
        Error::Source { .. } => {
            eprintln!("{}", error.render(Some(ORIGIN), io::stderr().is_terminal()));
        }
        Error::InvalidInvocation(message) => eprintln!("{}", message),
        _ => eprintln!("error: {}", error),
    }
}

fn main() {
    init_logging();

    let exit_code = match panic::catch_unwind(run) {
        Ok(Ok(())) => 0,
        Ok(Err(error)) => {
            debug!(exit_code = error.exit_code(), "parsing failed");
            report(&error);
            error.exit_code()
        }
        // The panic hook already printed the message.
        Err(_) => INTERNAL_EXIT_CODE,
    };

    process::exit(exit_code);
}
