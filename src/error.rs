/*---------------------------------------------------------------------------------------------
 *  Licensed under the Apache License, Version 2.0. See LICENSE.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! Crate-wide fatal error type.
//!
//! Every fatal condition in spec.md §7 — resource exhaustion, malformed
//! program, output-format errors, environment errors — is a variant here.
//! There is no recovery path; `main.rs` prints the `Display` form to stderr
//! and exits nonzero.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum InterpreterError {
    /// Heap allocation failed to grow, at startup or during a GC cycle.
    HeapExhausted { requested_cells: usize },
    /// The reduction stack's fixed capacity was exceeded.
    StackOverflow,
    /// The bit stream ended before a complete program could be parsed.
    UnexpectedEof,
    /// `PUTC`/`INC` evaluated their argument to something other than an `Int`.
    NotANumber,
    /// `PUTC` evaluated its argument to an `Int` outside `0..256`.
    InvalidCharacter(i64),
    /// An `Int` cell was applied as a function.
    AppliedNumber,
    /// A named input file could not be opened.
    CannotOpenFile { path: std::path::PathBuf, source: io::Error },
    /// An unrecognized command-line flag.
    UnknownOption(String),
    /// Any other I/O failure reading an already-open source or writing output.
    Io(io::Error),
}

impl From<io::Error> for InterpreterError {
    fn from(e: io::Error) -> Self {
        InterpreterError::Io(e)
    }
}

impl fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpreterError::HeapExhausted { requested_cells } => {
                write!(f, "cannot allocate heap storage ({requested_cells} cells)")
            }
            InterpreterError::StackOverflow => write!(f, "runtime error: stack overflow"),
            InterpreterError::UnexpectedEof => write!(f, "unexpected EOF"),
            InterpreterError::NotANumber => {
                write!(f, "invalid output format (result was not a number)")
            }
            InterpreterError::InvalidCharacter(n) => write!(f, "invalid character {n}"),
            InterpreterError::AppliedNumber => {
                write!(f, "invalid output format (attempted to apply a number)")
            }
            InterpreterError::CannotOpenFile { path, source } => {
                write!(f, "cannot open {}: {source}", path.display())
            }
            InterpreterError::UnknownOption(opt) => write!(f, "unknown option {opt}"),
            InterpreterError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for InterpreterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InterpreterError::CannotOpenFile { source, .. } => Some(source),
            InterpreterError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, InterpreterError>;
