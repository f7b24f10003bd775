use crate::{ParseError, Parser, ParserOptions, Readers, StrSource, Value};

pub(crate) fn options(buffer_capacity: usize) -> ParserOptions {
    ParserOptions {
        buffer_capacity,
        panic_on_error: true,
        ..Default::default()
    }
}

/// Reads the first form, panicking with the rendered error on failure.
pub(crate) fn read(text: &str) -> Value {
    read_with(text, 8192)
}

pub(crate) fn read_with(text: &str, buffer_capacity: usize) -> Value {
    Parser::new(StrSource::new(text), options(buffer_capacity))
        .next_value()
        .unwrap()
}

/// Reads every top-level form.
pub(crate) fn read_all(text: &str, buffer_capacity: usize) -> Vec<Value> {
    Parser::with_readers(StrSource::new(text), options(buffer_capacity), Readers::preserving())
        .collect::<Result<_, _>>()
        .unwrap()
}

/// Reads the first form, expecting an error. Line tracking is on.
pub(crate) fn read_err(text: &str) -> ParseError {
    let options = ParserOptions {
        track_lines: true,
        ..Default::default()
    };
    match Parser::new(StrSource::new(text), options).next_value() {
        Ok(value) => panic!("expected an error for {text:?}, got {value}"),
        Err(err) => err,
    }
}

pub(crate) fn assert_err_contains(err: &ParseError, expected_sub: &str, line: usize, col: usize) {
    let s = err.to_string();
    assert!(s.contains(expected_sub), "expected substring {expected_sub:?} in {s:?}");
    assert_eq!(err.line(), Some(line), "line in {s:?}");
    assert_eq!(err.column(), Some(col), "column in {s:?}");
}
