/*---------------------------------------------------------------------------------------------
 *  Licensed under the Apache License, Version 2.0. See LICENSE.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! Bracket abstraction: rewrites a lambda tree with De Bruijn indices into an
//! SK-style combinator graph, applying the peephole optimizations (B, C, S',
//! B*, C') from spec.md §4.6 as each binder is eliminated.
//!
//! A direct transliteration of clamb.c's `translate`/`unabstract`. The
//! peephole table mutates Pair cells that were freshly produced by the
//! immediately preceding recursive call — safe because those cells are not
//! yet shared with anything else in the graph.

use crate::cell::{Cell, Combinator};
use crate::error::Result;
use crate::heap::Heap;
use crate::stack::Stack;

pub fn translate(t: Cell, heap: &mut Heap, stack: &mut Stack) -> Result<Cell> {
    if !t.is_pair() {
        return Ok(t);
    }
    if heap.car_of(t) == Cell::LAMBDA {
        let body = translate(heap.cdr_of(t), heap, stack)?;
        unabstract(body, heap, stack)
    } else {
        let f_term = heap.car_of(t);
        let g_term = heap.cdr_of(t);
        stack.push(g_term)?;
        let f = translate(f_term, heap, stack)?;
        stack.push(f)?;
        let g = translate(stack.pushed(1), heap, stack)?;
        let result = heap.allocate_pair(stack.top(), g, stack)?;
        stack.drop_n(2);
        Ok(result)
    }
}

#[inline]
fn is_k1(heap: &Heap, x: Cell) -> bool {
    x.is_pair() && heap.car_of(x).is_combinator(Combinator::K)
}

/// `x` matches the shape `Pair(Pair(B, y), z)`, i.e. the application `B y z`.
#[inline]
fn is_b2(heap: &Heap, x: Cell) -> bool {
    if !x.is_pair() {
        return false;
    }
    let inner = heap.car_of(x);
    inner.is_pair() && heap.car_of(inner).is_combinator(Combinator::B)
}

pub fn unabstract(t: Cell, heap: &mut Heap, stack: &mut Stack) -> Result<Cell> {
    if t.is_int() {
        return if t == Cell::int(0) {
            Ok(Cell::comb(Combinator::I))
        } else {
            heap.allocate_pair(Cell::comb(Combinator::K), Cell::int(t.int_value() - 1), stack)
        };
    }
    if !t.is_pair() {
        return heap.allocate_pair(Cell::comb(Combinator::K), t, stack);
    }

    let car_t = heap.car_of(t);
    let cdr_t = heap.cdr_of(t);
    stack.push(cdr_t)?;
    let f = unabstract(car_t, heap, stack)?;
    stack.push(f)?;
    let g = unabstract(stack.pushed(1), heap, stack)?;
    stack.set_pushed(1, g);
    // `unabstract(stack.pushed(1), ...)` may have GC'd and relocated the pair
    // `f` points at; the stack slot was corrected by the collector, so re-read
    // it here rather than trusting the (possibly now stale) local above.
    let f = stack.top();

    let result = if is_k1(heap, f) {
        if g.is_combinator(Combinator::I) {
            // S (K x) I => x
            heap.cdr_of(f)
        } else if is_k1(heap, g) {
            // S (K x) (K y) => K (x y)
            let x = heap.cdr_of(f);
            let y = heap.cdr_of(g);
            heap.set(g.pair_index(), x, y); // g becomes (x y)
            heap.set(f.pair_index(), Cell::comb(Combinator::K), g); // f becomes K (x y)
            f
        } else if is_b2(heap, g) {
            // S (K x) (B y z) => B* x y z
            let x = heap.cdr_of(f);
            let inner = heap.car_of(g); // Pair(B, y)
            let y = heap.cdr_of(inner);
            heap.set(f.pair_index(), Cell::comb(Combinator::BStar), x); // f becomes B* x
            heap.set(inner.pair_index(), f, y); // car(g) becomes (B* x) y
            g
        } else {
            // S (K x) y => B x y
            let x = heap.cdr_of(f);
            heap.set(f.pair_index(), Cell::comb(Combinator::B), x); // f becomes B x
            heap.allocate_pair(f, g, stack)?
        }
    } else if is_k1(heap, g) {
        if is_b2(heap, f) {
            // S (B x y) (K z) => C' x y z
            let inner = heap.car_of(f); // Pair(B, x)
            let x = heap.cdr_of(inner);
            let z = heap.cdr_of(g);
            heap.set(inner.pair_index(), Cell::comb(Combinator::CPrime), x); // car(car(f)) becomes C' x
            heap.set(g.pair_index(), f, z); // g becomes (C' x y) z, reusing f (now C' x y)
            g
        } else {
            // S x (K y) => C x y
            let y = heap.cdr_of(g);
            heap.set(g.pair_index(), Cell::comb(Combinator::C), f); // g becomes C f
            heap.allocate_pair(g, y, stack)?
        }
    } else if is_b2(heap, f) {
        // S (B x y) z => S' x y z
        let inner = heap.car_of(f); // Pair(B, x)
        let x = heap.cdr_of(inner);
        heap.set(inner.pair_index(), Cell::comb(Combinator::SPrime), x); // car(car(f)) becomes S' x
        heap.allocate_pair(f, g, stack)?
    } else {
        // default: S f g
        let sf = heap.allocate_pair(Cell::comb(Combinator::S), f, stack)?;
        // the allocation above may have GC'd and relocated `g`; re-read its
        // live stack slot instead of the now-possibly-stale local.
        heap.allocate_pair(sf, stack.pushed(1), stack)?
    };

    stack.drop_n(2);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::bitreader::BitReader;
    use std::io::Cursor;

    fn compile_bits(bits: &str) -> (Cell, Heap, Stack) {
        let mut bytes = Vec::new();
        let mut acc = 0u8;
        let mut n = 0;
        for ch in bits.chars() {
            if ch == ' ' {
                continue;
            }
            acc = (acc << 1) | if ch == '1' { 1 } else { 0 };
            n += 1;
            if n == 8 {
                bytes.push(acc);
                acc = 0;
                n = 0;
            }
        }
        if n > 0 {
            acc <<= 8 - n;
            bytes.push(acc);
        }
        let mut reader = BitReader::from_reader(Cursor::new(bytes));
        let mut heap = Heap::new(4096).unwrap();
        let mut stack = Stack::new(1024);
        let term = parse(&mut reader, &mut heap, &mut stack).unwrap();
        let compiled = translate(term, &mut heap, &mut stack).unwrap();
        (compiled, heap, stack)
    }

    #[test]
    fn identity_compiles_to_i() {
        // λ 0 == 01 1 0
        let (c, _heap, _stack) = compile_bits("01 1 0");
        assert!(c.is_combinator(Combinator::I));
    }

    #[test]
    fn k_combinator_compiles_from_const_function() {
        // λ λ 1 == 01 01 1 1 0  (ignores its argument, returns the outer one)
        // S (K K) I => K, by the `f' = K x, g' = I` peephole rule
        let (c, _heap, _stack) = compile_bits("01 01 1 1 0");
        assert!(c.is_combinator(Combinator::K));
    }

    #[test]
    fn self_application_compiles_to_s_i_i() {
        // λ (0 0) == 01 00 1 0 1 0
        let (c, heap, _stack) = compile_bits("01 00 1 0 1 0");
        assert!(c.is_pair());
        let f = heap.car_of(c);
        let x = heap.cdr_of(c);
        assert!(f.is_pair());
        assert!(heap.car_of(f).is_combinator(Combinator::S));
        assert!(heap.cdr_of(f).is_combinator(Combinator::I));
        assert!(x.is_combinator(Combinator::I));
    }
}
