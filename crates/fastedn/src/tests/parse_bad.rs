use std::io;

use super::utils::{assert_err_contains, read_err};
use crate::{
    CharSource, CollectionKind, ErrorKind, Parser, ParserOptions, Readers, StrSource, TokenKind,
    Value,
};

#[test]
fn error_empty_input() {
    let err = read_err("");
    assert_err_contains(&err, "EOF while reading", 1, 1);
    assert!(err.context().is_none());
}

#[test]
fn error_duplicate_map_key() {
    let err = read_err("{:a 1 :a 2}");
    assert_err_contains(&err, "duplicate key :a reading {:a 1", 1, 10);
}

#[test]
fn error_duplicate_map_key_with_equal_value() {
    let err = read_err("{:a 1, :a 1}");
    assert_err_contains(&err, "duplicate key :a", 1, 11);
}

#[test]
fn error_duplicate_set_element() {
    let err = read_err("#{1 1}");
    assert_err_contains(&err, "duplicate key 1 reading #{1", 1, 5);
}

#[test]
fn error_duplicate_across_integer_widths() {
    let err = read_err("#{1 1N}");
    assert_err_contains(&err, "duplicate key 1N reading #{1", 1, 6);
    let err = read_err("{1 :a 1N :b}");
    assert_err_contains(&err, "duplicate key 1N reading {1 :a", 1, 11);
    let err = read_err("#{9223372036854775808 9223372036854775808N}");
    assert_err_contains(&err, "duplicate key 9223372036854775808N", 1, 42);
}

#[test]
fn error_odd_map() {
    let err = read_err("{:a}");
    assert_err_contains(&err, "map literal must contain an even number of forms: {, :a", 1, 4);
}

#[test]
fn error_unterminated_string() {
    let err = read_err("\"abc");
    assert_err_contains(&err, "EOF while reading string: \"abc", 1, 4);
    assert!(matches!(err.kind(), ErrorKind::UnterminatedString { partial } if partial == "abc"));
}

#[test]
fn error_unterminated_vector() {
    let err = read_err("[1 2");
    assert_err_contains(&err, "EOF while reading vector: [1 2", 1, 4);
    assert!(matches!(
        err.kind(),
        ErrorKind::UnterminatedCollection { kind: CollectionKind::Vector, .. }
    ));
}

#[test]
fn error_unterminated_map_after_key() {
    let err = read_err("{:a");
    assert_err_contains(&err, "EOF while reading map: {", 1, 3);
}

#[test]
fn error_mismatched_delimiter() {
    let err = read_err("(1 2]");
    assert_err_contains(&err, "unexpected character: ]", 1, 5);
}

#[test]
fn error_stray_closer() {
    let err = read_err(")");
    assert_err_contains(&err, "unexpected character: )", 1, 1);
}

#[test]
fn error_discard_without_form() {
    let err = read_err("[1 #_]");
    assert_err_contains(&err, "unexpected character: ]", 1, 6);
}

#[test]
fn error_position_on_later_line() {
    let err = read_err("[1\n 2\n :a}");
    assert_err_contains(&err, "unexpected character: }", 3, 4);
    assert_eq!(err.context(), Some(" :a}\n   ^"));
}

#[test]
fn error_surrogate_character() {
    let err = read_err(r"\uD800");
    assert_err_contains(&err, r"invalid character constant: \uD800", 1, 6);
}

#[test]
fn error_unknown_named_character() {
    let err = read_err(r"\newlinex");
    assert_err_contains(&err, r"unsupported character: \newlinex", 1, 9);
}

#[test]
fn error_unknown_symbolic_value() {
    let err = read_err("##Foo");
    assert_err_contains(&err, "unknown symbolic value: ##Foo", 1, 5);
}

#[test]
fn error_unknown_tag() {
    let err = read_err("#foo 1");
    assert_err_contains(&err, "no reader function for tag foo", 1, 6);
}

#[test]
fn error_tag_must_be_symbol() {
    let err = read_err("#\"x\" 1");
    assert_err_contains(&err, "reader tag must be a symbol, got \"x\"", 1, 4);
}

#[test]
fn error_tag_handler_failure() {
    let readers = Readers::new().with("even", |v| match v {
        Value::Integer(i) if i % 2 == 0 => Ok(Value::Integer(i)),
        other => Err(format!("{other} is odd").into()),
    });
    let err = Parser::with_readers(StrSource::new("#even 3"), ParserOptions::default(), readers)
        .next_value()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "reader function for tag even failed: 3 is odd, offset: 7, context:\n#even 3\n      ^"
    );
}

#[test]
fn error_metadata_shape() {
    let err = read_err("^1 x");
    assert_err_contains(
        &err,
        "metadata must be a symbol, keyword, string, vector or map, got integer 1",
        1,
        2,
    );
}

#[test]
fn error_metadata_target() {
    let err = read_err("^:a 1");
    assert_err_contains(&err, "can't put metadata on integer 1", 1, 5);
}

#[test]
fn error_ratio_operand() {
    let err = read_err("1/2.5");
    assert_err_contains(&err, "ratio operand must be an integer", 1, 5);
}

#[test]
fn error_ratio_zero_denominator() {
    let err = read_err("1/0");
    assert_err_contains(&err, "invalid number: 1/0", 1, 3);
}

#[test]
fn error_malformed_number() {
    let err = read_err("12abc");
    assert_err_contains(&err, "invalid number: 12abc", 1, 5);
}

#[test]
fn error_unrecognized_string_escape() {
    let err = read_err(r#""\q""#);
    assert_err_contains(&err, r"unsupported escape character: \q", 1, 3);
}

#[test]
fn error_short_unicode_escape() {
    let err = read_err(r#""\u12""#);
    assert!(matches!(err.kind(), ErrorKind::MalformedEscape(_)), "{err}");
}

#[test]
fn error_empty_namespace() {
    let err = read_err("/foo");
    assert_err_contains(&err, "symbol namespace can't be empty: /foo", 1, 4);
    assert!(matches!(
        err.kind(),
        ErrorKind::EmptyNamespace { kind: TokenKind::Symbol, .. }
    ));
}

#[test]
fn error_empty_name() {
    let err = read_err(":foo/");
    assert_err_contains(&err, "keyword name can't be empty: foo/", 1, 5);
}

#[test]
fn error_empty_keyword() {
    let err = read_err(":");
    assert_err_contains(&err, "keyword can't be empty", 1, 1);
}

#[test]
fn error_qualified_namespaced_map() {
    let err = read_err("#:foo/bar{}");
    assert_err_contains(&err, "invalid namespaced map", 1, 9);
}

#[test]
fn error_namespaced_map_needs_map() {
    let err = read_err("#:foo [1]");
    assert_err_contains(&err, "invalid namespaced map: expected { after #:foo, got [", 1, 7);
}

#[test]
fn error_without_line_tracking_reports_offset() {
    let err = Parser::new(StrSource::new("[1 2"), ParserOptions::default())
        .next_value()
        .unwrap_err();
    assert_eq!(err.line(), None);
    assert_eq!(err.offset(), 4);
    assert_eq!(
        err.to_string(),
        "EOF while reading vector: [1 2, offset: 4, context:\n[1 2\n   ^"
    );
}

#[test]
fn iteration_stops_after_first_error() {
    let mut parser = Parser::new(StrSource::new("1 ) 2"), ParserOptions::default());
    assert_eq!(parser.next().unwrap().unwrap(), Value::Integer(1));
    assert!(parser.next().unwrap().is_err());
    assert!(parser.next().is_none());
}

#[test]
fn next_value_continues_after_error() {
    let mut parser = Parser::new(StrSource::new(") 2"), ParserOptions::default());
    assert!(parser.next_value().is_err());
    assert_eq!(parser.next_value().unwrap(), Value::Integer(2));
}

struct Broken;

impl CharSource for Broken {
    fn read_chars(&mut self, _dst: &mut [char]) -> io::Result<usize> {
        Err(io::Error::other("disk on fire"))
    }
}

#[test]
fn error_from_source() {
    let err = Parser::new(Broken, ParserOptions::default())
        .next_value()
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Io(_)));
    assert_eq!(err.to_string(), "i/o error: disk on fire, offset: 0");
}

#[test]
fn error_invalid_utf8() {
    let err = crate::from_reader(&b"[1 \xff]"[..]).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Io(e) if e.kind() == io::ErrorKind::InvalidData));
}
