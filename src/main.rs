/*---------------------------------------------------------------------------------------------
 *  Licensed under the Apache License, Version 2.0. See LICENSE.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! Command-line driver: flag parsing, logging setup, and translation of a
//! fatal [`blc::error::InterpreterError`] into a process exit code. All of
//! the actual interpreter lives in the library; this binary is a thin shell
//! over it, as clamb.c's own `main` is over its free functions.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use blc::bitreader::BitReader;
use blc::compile::translate;
use blc::driver;
use blc::error::{InterpreterError, Result};
use blc::heap::{Heap, INITIAL_HEAP_SIZE};
use blc::parser::parse;
use blc::stack::Stack;
use blc::unparse::unparse;

/// Matches clamb.c's `RDSTACK_SIZE`.
const STACK_CAPACITY: usize = 100_000;

struct Options {
    gc_notify: bool,
    print_stats: bool,
    parse_only: bool,
    unbuffered: bool,
    files: Vec<PathBuf>,
}

fn parse_args() -> Result<Options> {
    let mut pargs = pico_args::Arguments::from_env();

    let gc_notify = pargs.contains("-g");
    let print_stats = pargs.contains("-s");
    let parse_only = pargs.contains("-p");
    let unbuffered = pargs.contains("-u");

    let mut files = Vec::new();
    for arg in pargs.finish() {
        let text = arg.to_string_lossy();
        if text.starts_with('-') && text.len() > 1 {
            return Err(InterpreterError::UnknownOption(text.into_owned()));
        }
        files.push(PathBuf::from(arg));
    }

    Ok(Options { gc_notify, print_stats, parse_only, unbuffered, files })
}

fn run() -> Result<()> {
    let opts = parse_args()?;

    log::debug!("starting with {} named input file(s)", opts.files.len());

    let mut reader = BitReader::new(opts.files)?;
    let mut heap = Heap::new(INITIAL_HEAP_SIZE)?;
    let mut stack = Stack::new(STACK_CAPACITY);
    heap.gc_notify = opts.gc_notify;

    let term = parse(&mut reader, &mut heap, &mut stack)?;
    let root = translate(term, &mut heap, &mut stack)?;

    if opts.parse_only {
        println!("{}", unparse(root, &heap));
        return Ok(());
    }

    let stdout = io::stdout();
    let mut writer: Box<dyn Write> = if opts.unbuffered {
        Box::new(stdout.lock())
    } else {
        Box::new(io::BufWriter::new(stdout.lock()))
    };

    let stats = driver::run(&mut heap, &mut stack, root, &mut reader, &mut writer)?;
    writer.flush()?;

    if opts.print_stats {
        println!();
        println!("{} reductions", stats.reductions);
        println!("  total eval time --- {:5.2} sec.", stats.eval_time.as_secs_f64());
        println!("  total gc time   --- {:5.2} sec.", stats.gc_time.as_secs_f64());
        println!("  max stack depth --- {}", stats.max_stack_depth);
    }

    Ok(())
}

fn main() -> ExitCode {
    let level = if io::stderr().is_terminal() { log::LevelFilter::Warn } else { log::LevelFilter::Error };
    let _ = simple_logger::SimpleLogger::new().with_level(level).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
