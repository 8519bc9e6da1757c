//! Black-box end-to-end scenarios, driving the public library API directly
//! (no subprocess — the binary is a thin wrapper over this crate).

use std::io::Cursor;

use rstest::rstest;

use blc::bitreader::BitReader;
use blc::cell::Cell;
use blc::compile::translate;
use blc::driver;
use blc::error::InterpreterError;
use blc::heap::Heap;
use blc::parser::parse;
use blc::stack::Stack;

/// Turns a whitespace-separated string of '0'/'1' characters into the
/// corresponding MSB-first byte stream, padding the final partial byte with
/// zero bits (as any trailing padding in a real `.blc` file would be).
fn bits_to_bytes(bits: &str) -> Vec<u8> {
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
    bytes
}

/// De Bruijn bits for the closed Church numeral `λf.λz. f^n z`.
fn church_numeral_bits(n: u32) -> String {
    let mut body = String::from("1 0");
    for _ in 0..n {
        body = format!("00 1 1 0 {body}");
    }
    format!("01 01 {body}")
}

fn run_program(program_bits: &str, input: &[u8]) -> Result<Vec<u8>, InterpreterError> {
    let mut heap = Heap::new(4096).unwrap();
    let mut stack = Stack::new(1024);
    let mut program_reader = BitReader::from_reader(Cursor::new(bits_to_bytes(program_bits)));
    let term = parse(&mut program_reader, &mut heap, &mut stack)?;
    let root = translate(term, &mut heap, &mut stack)?;

    let mut input_reader = BitReader::from_reader(Cursor::new(input.to_vec()));
    let mut out = Vec::new();
    driver::run(&mut heap, &mut stack, root, &mut input_reader, &mut out)?;
    Ok(out)
}

#[test]
fn identity_program_copies_input_to_output_verbatim() {
    // λs. s, bits "01 1 0" — scenario 3: cat, including an embedded zero byte.
    let input = b"ab\x00cd";
    let out = run_program("01 1 0", input).unwrap();
    assert_eq!(out, input);
}

#[test]
fn identity_program_on_empty_input_produces_empty_output() {
    let out = run_program("01 1 0", b"").unwrap();
    assert!(out.is_empty());
}

#[rstest]
#[case::upper_a(65, b'A')]
#[case::newline(10, b'\n')]
#[case::max_byte(255, 255)]
fn constant_output_program_emits_one_byte_and_ignores_input(#[case] code: u32, #[case] expected: u8) {
    // λs. (λf. f NUM (λw.w)) — a Church pair of (numeral, an
    // immediately-terminating tail) that ignores its own argument `s`.
    let numeral = church_numeral_bits(code);
    let program = format!("01 01 00 00 1 0 {numeral} 01 1 0");
    let out = run_program(&program, b"this input is never touched").unwrap();
    assert_eq!(out, vec![expected]);
}

#[test]
fn non_numeral_output_head_is_a_format_error() {
    // Same shape as the constant-output program, but the "character" slot
    // holds the bare K combinator instead of a Church numeral: K INC 0
    // reduces to INC itself, not an Int, so PUTC's numeric check fails.
    let k_combinator = "01 01 1 1 0";
    let program = format!("01 00 00 1 0 {k_combinator} 01 1 0");
    let err = run_program(&program, b"").unwrap_err();
    assert!(matches!(err, InterpreterError::NotANumber));
    assert!(err.to_string().contains("invalid output format"));
}

#[test]
fn empty_program_bits_is_an_unexpected_eof() {
    let err = run_program("", b"").unwrap_err();
    assert!(matches!(err, InterpreterError::UnexpectedEof));
}

#[test]
fn spine_of_100_001_applications_overflows_the_reduction_stack() {
    let mut heap = Heap::new(1 << 20).unwrap();
    let mut stack = Stack::new(100_000);

    // A chain `(((atom x1) x2) ... xN)` with an atom that never dispatches
    // (a bare Character cell is not a valid applicable head on its own in
    // this position once wrapped this deeply) forces `eval`'s unspine loop
    // to push every level of the spine before it can inspect the head.
    let mut spine = Cell::char(0);
    for i in 0..100_001i64 {
        spine = heap.allocate_pair(spine, Cell::int(i), &mut stack).unwrap();
    }

    let mut reader = BitReader::from_reader(Cursor::new(Vec::new()));
    let mut out = Vec::new();
    let err = driver::run(&mut heap, &mut stack, spine, &mut reader, &mut out).unwrap_err();
    assert!(matches!(err, InterpreterError::StackOverflow));
}

#[test]
fn parse_only_unparse_round_trip_is_canonical() {
    let mut heap = Heap::new(4096).unwrap();
    let mut stack = Stack::new(1024);
    let mut reader = BitReader::from_reader(Cursor::new(bits_to_bytes("01 1 0")));
    let term = parse(&mut reader, &mut heap, &mut stack).unwrap();
    let root = translate(term, &mut heap, &mut stack).unwrap();
    assert_eq!(blc::unparse::unparse(root, &heap), "I");
}
