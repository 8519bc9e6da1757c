/*---------------------------------------------------------------------------------------------
 *  Licensed under the Apache License, Version 2.0. See LICENSE.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! Wraps a compiled program root in the I/O harness and drives it to normal
//! form, gathering the statistics `-s` reports.
//!
//! Grounded on clamb.c's `eval_print` plus the timing/`rs_max_depth` calls
//! made around it in `main`.

use std::io::Write;
use std::time::Duration;

use cpu_time::ProcessTime;

use crate::bitreader::BitReader;
use crate::cell::{Cell, Combinator};
use crate::error::Result;
use crate::heap::Heap;
use crate::reduce::eval;
use crate::stack::Stack;

pub struct RunStats {
    pub reductions: u64,
    pub eval_time: Duration,
    pub gc_time: Duration,
    pub max_stack_depth: usize,
}

/// Runs `root` as `WRITE (root (READ NIL))`, streaming output through
/// `writer` and consuming input lazily through `reader`.
pub fn run(
    heap: &mut Heap,
    stack: &mut Stack,
    root: Cell,
    reader: &mut BitReader,
    writer: &mut dyn Write,
) -> Result<RunStats> {
    let read_nil = heap.allocate_pair(Cell::comb(Combinator::Read), Cell::NIL, stack)?;
    let applied = heap.allocate_pair(root, read_nil, stack)?;
    let harnessed = heap.allocate_pair(Cell::comb(Combinator::Write), applied, stack)?;

    let mut reductions = 0;
    let start = ProcessTime::now();
    eval(heap, stack, harnessed, &mut reductions, reader, writer)?;
    let total_time = start.elapsed();

    let gc_time = heap.total_gc_time();
    Ok(RunStats {
        reductions,
        eval_time: total_time.saturating_sub(gc_time),
        gc_time,
        max_stack_depth: stack.max_depth(),
    })
}
