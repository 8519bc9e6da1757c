/*---------------------------------------------------------------------------------------------
 *  Licensed under the Apache License, Version 2.0. See LICENSE.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! Prefix-notation printer for a translated combinator graph (the `-p` flag).
//!
//! A direct transliteration of clamb.c's `unparse`: backtick-prefixed
//! applications, single letters for the primitive combinators, apostrophe/
//! asterisk suffixes for the peephole combinators, the literal `` `ki `` for
//! `KI`, and `?` for anything else (including combinators that only ever
//! appear mid-reduction, never in a freshly compiled program).

use crate::cell::{Cell, Combinator};
use crate::heap::Heap;

pub fn unparse(root: Cell, heap: &Heap) -> String {
    let mut out = String::new();
    write_term(root, heap, &mut out);
    out
}

fn write_term(e: Cell, heap: &Heap, out: &mut String) {
    if e.is_pair() {
        out.push('`');
        write_term(heap.car_of(e), heap, out);
        write_term(heap.cdr_of(e), heap, out);
    } else if e.is_combinator(Combinator::S) {
        out.push('S');
    } else if e.is_combinator(Combinator::K) {
        out.push('K');
    } else if e.is_combinator(Combinator::I) {
        out.push('I');
    } else if e.is_combinator(Combinator::B) {
        out.push('B');
    } else if e.is_combinator(Combinator::C) {
        out.push('C');
    } else if e.is_combinator(Combinator::SPrime) {
        out.push_str("S'");
    } else if e.is_combinator(Combinator::BStar) {
        out.push_str("B*");
    } else if e.is_combinator(Combinator::CPrime) {
        out.push_str("C'");
    } else if e.is_combinator(Combinator::Ki) {
        out.push_str("`ki");
    } else {
        out.push('?');
    }
}
