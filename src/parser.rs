/*---------------------------------------------------------------------------------------------
 *  Licensed under the Apache License, Version 2.0. See LICENSE.txt in the project root for license information.
 *--------------------------------------------------------------------------------------------*/

//! Binary lambda calculus grammar decoder.
//!
//! ```text
//! term ::= 1 unary-zeros     -- variable: De Bruijn index = count of extra 1s
//!        | 00 term term      -- application
//!        | 01 term           -- lambda abstraction
//! ```
//!
//! Structurally the same recursive descent as clamb.c's `parse`: after the
//! leading `1` of a variable, bits are consumed while they are `1`; the
//! count of those (excluding the leading bit) is the De Bruijn index.
//! clamb.c itself assigns `01` to application and `00` to abstraction — the
//! reverse of the grammar above and of the worked `λ λ 0` example in the
//! spec's scenario list, which only decode correctly under `00` =
//! application, `01` = abstraction, so that is the assignment implemented
//! here. Applications and lambda bodies are pushed onto the reduction stack
//! across the recursive calls so GC during the nested allocation cannot
//! reclaim the not-yet-linked sibling subterm.

use crate::cell::Cell;
use crate::error::Result;
use crate::heap::Heap;
use crate::bitreader::BitReader;
use crate::stack::Stack;

pub fn parse(reader: &mut BitReader, heap: &mut Heap, stack: &mut Stack) -> Result<Cell> {
    if reader.read_bit()? == 1 {
        let mut index: i64 = 0;
        while reader.read_bit()? == 1 {
            index += 1;
        }
        Ok(Cell::int(index))
    } else if reader.read_bit()? == 1 {
        let body = parse(reader, heap, stack)?;
        heap.allocate_pair(Cell::LAMBDA, body, stack)
    } else {
        let left = parse(reader, heap, stack)?;
        stack.push(left)?;
        let right = parse(reader, heap, stack)?;
        let result = heap.allocate_pair(stack.top(), right, stack)?;
        stack.drop_n(1);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader_over_bits(bits: &str) -> BitReader {
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
        BitReader::from_reader(Cursor::new(bytes))
    }

    #[test]
    fn parses_identity_lambda_lambda_0() {
        // λ λ 0  ==  01 01 1 0
        let mut r = reader_over_bits("01 01 1 0");
        let mut heap = Heap::new(1024).unwrap();
        let mut stack = Stack::new(64);
        let root = parse(&mut r, &mut heap, &mut stack).unwrap();
        assert!(root.is_pair());
        assert_eq!(heap.car_of(root), Cell::LAMBDA);
        let inner = heap.cdr_of(root);
        assert!(inner.is_pair());
        assert_eq!(heap.car_of(inner), Cell::LAMBDA);
        assert_eq!(heap.cdr_of(inner), Cell::int(0));
    }

    #[test]
    fn parses_deep_de_bruijn_index() {
        // variable with index 64: leading 1, then 64 more 1s, then a 0
        let mut bits = String::from("1");
        for _ in 0..64 {
            bits.push('1');
        }
        bits.push('0');
        let mut r = reader_over_bits(&bits);
        let mut heap = Heap::new(1024).unwrap();
        let mut stack = Stack::new(64);
        let root = parse(&mut r, &mut heap, &mut stack).unwrap();
        assert_eq!(root, Cell::int(64));
    }

    #[test]
    fn parses_application() {
        // (0 0) == 00 1 0 1 0
        let mut r = reader_over_bits("00 1 0 1 0");
        let mut heap = Heap::new(1024).unwrap();
        let mut stack = Stack::new(64);
        let root = parse(&mut r, &mut heap, &mut stack).unwrap();
        assert!(root.is_pair());
        assert_eq!(heap.car_of(root), Cell::int(0));
        assert_eq!(heap.cdr_of(root), Cell::int(0));
    }
}
