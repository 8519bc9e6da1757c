/*---------------------------------------------------------------------------------------------
 *  Licensed under the Apache License, Version 2.0. See LICENSE.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! Multi-source, most-significant-bit-first bit reader.
//!
//! Mirrors clamb.c's `input_init`/`read_char`/`read_bit`: zero or more named
//! files are read in order; once the last one reaches EOF (or immediately,
//! if none were named), reading falls back to standard input, whose own EOF
//! is the final one. Byte buffering never crosses a source switch — each
//! new source starts by reading a fresh byte on the next `read_bit` call.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use crate::error::{InterpreterError, Result};

pub struct BitReader {
    pending_sources: VecDeque<PathBuf>,
    current: Box<dyn Read>,
    /// Becomes true once we have fallen back to stdin after the last named
    /// source (or immediately, if no sources were named at all) — at that
    /// point a further EOF is final rather than triggering another switch.
    on_stdin_fallback: bool,
    cur_byte: u8,
    bit_mask: u8,
}

impl BitReader {
    pub fn new(paths: Vec<PathBuf>) -> Result<BitReader> {
        let mut pending_sources: VecDeque<PathBuf> = paths.into_iter().collect();
        let (current, on_stdin_fallback): (Box<dyn Read>, bool) = match pending_sources.pop_front() {
            Some(path) => {
                let f = File::open(&path)
                    .map_err(|source| InterpreterError::CannotOpenFile { path, source })?;
                (Box::new(f), false)
            }
            None => (Box::new(io::stdin()), true),
        };
        Ok(BitReader { pending_sources, current, on_stdin_fallback, cur_byte: 0, bit_mask: 0 })
    }

    /// Reads the next byte, switching sources transparently at EOF. Returns
    /// `Ok(None)` only once standard input itself has been exhausted (after
    /// every named source has already been exhausted). This is the form the
    /// `READ` combinator calls: running out of input is not a fatal error.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        loop {
            let mut buf = [0u8; 1];
            let n = self.current.read(&mut buf)?;
            if n == 1 {
                return Ok(Some(buf[0]));
            }
            if let Some(path) = self.pending_sources.pop_front() {
                let f = File::open(&path)
                    .map_err(|source| InterpreterError::CannotOpenFile { path, source })?;
                self.current = Box::new(f);
            } else if !self.on_stdin_fallback {
                self.on_stdin_fallback = true;
                self.current = Box::new(io::stdin());
            } else {
                return Ok(None);
            }
        }
    }

    /// Reads the next bit, most-significant-first within each byte. Used
    /// only by the parser, where end of stream before a complete program is
    /// a malformed-program error rather than a value the running program
    /// can observe.
    pub fn read_bit(&mut self) -> Result<u8> {
        if self.bit_mask == 0 {
            match self.read_byte()? {
                Some(b) => {
                    self.cur_byte = b;
                    self.bit_mask = 0x80;
                }
                None => return Err(InterpreterError::UnexpectedEof),
            }
        }
        let bit = u8::from(self.cur_byte & self.bit_mask != 0);
        self.bit_mask >>= 1;
        Ok(bit)
    }

    /// Wraps an arbitrary reader as if it were the sole named input, with no
    /// further stdin fallback left to take once it is exhausted. Used to
    /// drive the interpreter over an in-memory byte buffer — both by this
    /// crate's own tests and by embedders that already have program/input
    /// bytes in hand rather than file paths.
    pub fn from_reader<R: Read + 'static>(source: R) -> BitReader {
        BitReader {
            pending_sources: VecDeque::new(),
            current: Box::new(source),
            on_stdin_fallback: true,
            cur_byte: 0,
            bit_mask: 0,
        }
    }
}
