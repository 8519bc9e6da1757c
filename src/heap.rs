/*---------------------------------------------------------------------------------------------
 *  Licensed under the Apache License, Version 2.0. See LICENSE.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! Two-space copying garbage collector over an index-addressed Pair arena.
//!
//! Mirrors clamb.c's `storage_init`/`pair`/`alloc`/`gc_run`/`copy_cell`, but
//! Pairs are addressed by index into a `Vec` rather than by raw pointer, per
//! spec.md §9's ownership-safe representation note.

use std::time::Duration;

use cpu_time::ProcessTime;

use crate::cell::{Cell, Combinator};
use crate::error::{InterpreterError, Result};
use crate::stack::Stack;

/// Initial heap capacity, in Pairs. Matches clamb.c's `128*1024`.
pub const INITIAL_HEAP_SIZE: usize = 128 * 1024;

/// Bails out of the grow-and-retry loop rather than looping forever when a
/// single request is pathologically larger than the live set can ever make
/// room for. clamb.c relies on an (almost always true) convergence argument
/// instead; this is a defensive backstop for the degenerate case spec.md
/// §9 calls out (`8 × live` over-committing without bound).
const MAX_GC_RETRIES: usize = 32;

pub struct Heap {
    space: Vec<(Cell, Cell)>,
    free: usize,
    heap_size: usize,
    next_heap_size: usize,
    /// Reusable to-space buffer from the previous cycle, kept around the way
    /// clamb.c's `static Pair *free_area` survives across `gc_run` calls.
    spare: Option<Vec<(Cell, Cell)>>,
    pub gc_notify: bool,
    gc_cycles: usize,
    total_gc_time: Duration,
}

impl Heap {
    pub fn new(initial_size: usize) -> Result<Heap> {
        let mut space = Vec::new();
        space
            .try_reserve_exact(initial_size)
            .map_err(|_| InterpreterError::HeapExhausted { requested_cells: initial_size })?;
        space.resize(initial_size, (Cell::NIL, Cell::NIL));

        Ok(Heap {
            space,
            free: 0,
            heap_size: initial_size,
            next_heap_size: initial_size * 3 / 2,
            spare: None,
            gc_notify: false,
            gc_cycles: 0,
            total_gc_time: Duration::ZERO,
        })
    }

    pub fn total_gc_time(&self) -> Duration {
        self.total_gc_time
    }

    pub fn gc_cycles(&self) -> usize {
        self.gc_cycles
    }

    #[inline]
    pub fn car(&self, index: usize) -> Cell {
        self.space[index].0
    }

    #[inline]
    pub fn cdr(&self, index: usize) -> Cell {
        self.space[index].1
    }

    #[inline]
    pub fn car_of(&self, c: Cell) -> Cell {
        self.space[c.pair_index()].0
    }

    #[inline]
    pub fn cdr_of(&self, c: Cell) -> Cell {
        self.space[c.pair_index()].1
    }

    #[inline]
    pub fn set(&mut self, index: usize, car: Cell, cdr: Cell) {
        self.space[index] = (car, cdr);
    }

    #[inline]
    pub fn set_car(&mut self, index: usize, car: Cell) {
        self.space[index].0 = car;
    }

    #[inline]
    pub fn set_cdr(&mut self, index: usize, cdr: Cell) {
        self.space[index].1 = cdr;
    }

    /// Allocates a single fresh `Pair(car, cdr)`. May trigger a GC cycle, in
    /// which case `car`/`cdr` are registered as extra roots so a caller
    /// holding them only in locals (not yet on the reduction stack) does not
    /// lose them.
    pub fn allocate_pair(&mut self, mut car: Cell, mut cdr: Cell, stack: &mut Stack) -> Result<Cell> {
        if self.free >= self.heap_size {
            self.collect(1, stack, Some(&mut car), Some(&mut cdr))?;
        }
        let idx = self.free;
        self.space[idx] = (car, cdr);
        self.free += 1;
        Ok(Cell::pair(idx))
    }

    /// Reserves `n` consecutive uninitialized Pairs and returns a `Cell`
    /// pointing at the first. The caller must fully initialize all `n` slots
    /// before the next allocation — no GC runs between the reservation and
    /// those writes, satisfying the precondition in spec.md §4.2.
    pub fn allocate_block(&mut self, n: usize, stack: &mut Stack) -> Result<Cell> {
        if self.free + n > self.heap_size {
            self.collect(n, stack, None, None)?;
        }
        let idx = self.free;
        self.free += n;
        Ok(Cell::pair(idx))
    }

    fn collect(
        &mut self,
        needed: usize,
        stack: &mut Stack,
        mut save1: Option<&mut Cell>,
        mut save2: Option<&mut Cell>,
    ) -> Result<()> {
        for _ in 0..MAX_GC_RETRIES {
            self.run_one_cycle(stack, save1.as_deref_mut(), save2.as_deref_mut());
            if self.free + needed <= self.heap_size {
                return Ok(());
            }
        }
        Err(InterpreterError::HeapExhausted { requested_cells: needed })
    }

    fn run_one_cycle(
        &mut self,
        stack: &mut Stack,
        save1: Option<&mut Cell>,
        save2: Option<&mut Cell>,
    ) {
        let gc_start = ProcessTime::now();

        let mut to_space = self.spare.take().unwrap_or_default();
        to_space.clear();
        to_space.resize(self.next_heap_size, (Cell::NIL, Cell::NIL));

        let mut from_space = std::mem::replace(&mut self.space, to_space);
        self.free = 0;

        for slot in stack.live_slots_mut() {
            *slot = Self::evacuate(&mut from_space, &mut self.space, &mut self.free, *slot);
        }
        if let Some(s) = save1 {
            *s = Self::evacuate(&mut from_space, &mut self.space, &mut self.free, *s);
        }
        if let Some(s) = save2 {
            *s = Self::evacuate(&mut from_space, &mut self.space, &mut self.free, *s);
        }

        let mut scan = 0;
        while scan < self.free {
            let (car, cdr) = self.space[scan];
            let new_car = Self::evacuate(&mut from_space, &mut self.space, &mut self.free, car);
            let new_cdr = Self::evacuate(&mut from_space, &mut self.space, &mut self.free, cdr);
            self.space[scan] = (new_car, new_cdr);
            scan += 1;
        }

        let num_alive = self.free;
        if self.gc_notify {
            eprintln!("GC: {} / {}", num_alive, self.heap_size);
        }
        log::debug!("gc cycle: {num_alive} live of {} (next target {})", self.heap_size, self.next_heap_size);

        if self.heap_size != self.next_heap_size || num_alive * 8 > self.next_heap_size {
            self.heap_size = self.next_heap_size;
            if num_alive * 8 > self.next_heap_size {
                self.next_heap_size = num_alive * 8;
            }
            self.spare = None;
        } else {
            self.spare = Some(from_space);
        }

        self.gc_cycles += 1;
        self.total_gc_time += gc_start.elapsed();
    }

    /// Copies `c` into `to` if it is a live Pair not yet evacuated, leaving a
    /// forwarding marker (`COPIED`, new index) behind in `from`. Non-pair
    /// cells pass through unchanged.
    ///
    /// While evacuating an `(I, x)` pair, chases any chain of further `(I,
    /// …)` pairs in `x` and forwards straight to the first non-`I` cdr: `I x`
    /// always reduces to `x`, so skipping the indirection cannot change the
    /// final normal form (spec.md §4.2 step 6).
    fn evacuate(from: &mut [(Cell, Cell)], to: &mut [(Cell, Cell)], free: &mut usize, c: Cell) -> Cell {
        if !c.is_pair() {
            return c;
        }
        let idx = c.pair_index();
        let (car, cdr) = from[idx];
        if car == Cell::COPIED {
            return cdr;
        }

        let mut new_cdr = cdr;
        if car.is_combinator(Combinator::I) {
            let mut x = cdr;
            while x.is_pair() {
                let (xcar, xcdr) = from[x.pair_index()];
                if xcar.is_combinator(Combinator::I) {
                    x = xcdr;
                } else {
                    break;
                }
            }
            new_cdr = x;
        }

        let new_idx = *free;
        to[new_idx] = (car, new_cdr);
        *free += 1;
        from[idx] = (Cell::COPIED, Cell::pair(new_idx));
        Cell::pair(new_idx)
    }
}
