use core::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_rational::BigRational;

use super::utils::{options, read, read_all, read_with};
use crate::{
    KeywordCache, OnEof, Parser, ParserOptions, Readers, StrSource, Symbol, Value,
    value::{Keyword, Map},
};

fn big(text: &str) -> BigInt {
    BigInt::from_str(text).unwrap()
}

fn ratio(n: i64, d: i64) -> Value {
    Value::Ratio(BigRational::new(BigInt::from(n), BigInt::from(d)))
}

fn keyword_of(value: &Value) -> &Keyword {
    match value {
        Value::Keyword(k) => k,
        other => panic!("expected a keyword, got {other}"),
    }
}

#[test]
fn scalars() {
    assert_eq!(read("nil"), Value::Nil);
    assert_eq!(read("true"), Value::Boolean(true));
    assert_eq!(read("false"), Value::Boolean(false));
    assert_eq!(read("\"hi\""), Value::from("hi"));
    assert_eq!(read("\\a"), Value::Character('a'));
    assert_eq!(read("42"), Value::Integer(42));
    assert_eq!(read("-7"), Value::Integer(-7));
    assert_eq!(read("+7"), Value::Integer(7));
    assert_eq!(read(":kw"), Value::keyword("kw"));
    assert_eq!(read(":ns/kw"), Value::keyword("ns/kw"));
    assert_eq!(read("sym"), Value::symbol("sym"));
    assert_eq!(read("ns.x/sym"), Value::symbol("ns.x/sym"));
}

#[test]
fn numeric_exactness() {
    assert_eq!(read("9223372036854775807"), Value::Integer(i64::MAX));
    assert_eq!(
        read("9223372036854775808"),
        Value::BigInt(big("9223372036854775808"))
    );
    assert_eq!(read("-9223372036854775808"), Value::Integer(i64::MIN));
    assert_eq!(read("1/2"), ratio(1, 2));
    assert_eq!(read("-1/2"), ratio(-1, 2));
    assert_eq!(read("1.5M"), Value::Decimal(BigDecimal::from_str("1.5").unwrap()));
    assert_eq!(read("1e10"), Value::from(1e10));
    assert_eq!(read("-2.5"), Value::from(-2.5));
    assert_eq!(read("7N"), Value::BigInt(big("7")));
    assert!(matches!(read("7N"), Value::BigInt(_)));
    assert!(matches!(read("-9223372036854775808"), Value::Integer(_)));
    assert_eq!(read("[7 7N]").to_string(), "[7 7N]");
    assert_eq!(read("-0x10"), Value::Integer(-16));
    assert_eq!(read("2r101"), Value::Integer(5));
    assert_eq!(read("010"), Value::Integer(8));
}

#[test]
fn signs_alone_are_symbols() {
    assert_eq!(read("-"), Value::symbol("-"));
    assert_eq!(read("+"), Value::symbol("+"));
    assert_eq!(read("-foo"), Value::symbol("-foo"));
    assert_eq!(read("+ 1"), Value::symbol("+"));
    assert_eq!(read("[- +]"), Value::vector([Value::symbol("-"), Value::symbol("+")]));
}

#[test]
fn collections() {
    assert_eq!(read("()"), Value::list([]));
    assert_eq!(
        read("(1 2)"),
        Value::list([Value::Integer(1), Value::Integer(2)])
    );
    assert_eq!(
        read("[1, 2,3]"),
        Value::vector([Value::Integer(1), Value::Integer(2), Value::Integer(3)])
    );
    assert_eq!(
        read("#{:a :b}"),
        Value::set([Value::keyword("a"), Value::keyword("b")])
    );
    assert_eq!(
        read("{:a 1, \"b\" [2]}"),
        Value::map([
            (Value::keyword("a"), Value::Integer(1)),
            (Value::from("b"), Value::vector([Value::Integer(2)])),
        ])
    );
}

#[test]
fn lists_and_vectors_are_distinct() {
    assert_ne!(read("(1)"), read("[1]"));
}

#[test]
fn nested() {
    let v = read("{:a [1 (2 #{3})] :b {:c nil}}");
    assert_eq!(v.to_string(), "{:a [1 (2 #{3})], :b {:c nil}}");
}

#[test]
fn comments_and_whitespace() {
    assert_eq!(
        read("; leading\n[1 ; inner\n 2]"),
        Value::vector([Value::Integer(1), Value::Integer(2)])
    );
    assert_eq!(read(",,, \t\r\n 3"), Value::Integer(3));
    assert_eq!(read("\u{2003}4"), Value::Integer(4));
}

#[test]
fn discard() {
    assert_eq!(
        read("[1 #_2 3]"),
        Value::vector([Value::Integer(1), Value::Integer(3)])
    );
    assert_eq!(read("#_ #_ 1 2 3"), Value::Integer(3));
    assert_eq!(read("#_[1 2 3] :x"), Value::keyword("x"));
}

#[test]
fn symbolic_values() {
    assert_eq!(read("##Inf"), Value::from(f64::INFINITY));
    assert_eq!(read("##-Inf"), Value::from(f64::NEG_INFINITY));
    match read("##NaN") {
        Value::Float(f) => assert!(f.0.is_nan()),
        other => panic!("expected NaN, got {other}"),
    }
}

#[test]
fn characters() {
    assert_eq!(
        read(r"[\a \newline \space \A \o101 \( \\]"),
        Value::vector([
            Value::Character('a'),
            Value::Character('\n'),
            Value::Character(' '),
            Value::Character('A'),
            Value::Character('A'),
            Value::Character('('),
            Value::Character('\\'),
        ])
    );
}

#[test]
fn strings() {
    assert_eq!(read(r#""A""#), Value::from("A"));
    assert_eq!(read(r#""\101""#), Value::from("A"));
    assert_eq!(read(r#""a\nb\t\"c\"""#), Value::from("a\nb\t\"c\""));
    assert_eq!(read(r#""😀""#), Value::from("😀"));
    assert_eq!(read("\"multi\nline\""), Value::from("multi\nline"));
}

#[test]
fn metadata_merges_with_newer_keys_winning() {
    let v = read("^:foo ^{:bar 1} [1 2]");
    assert_eq!(v, Value::vector([Value::Integer(1), Value::Integer(2)]));
    let expected: Map = [
        (Value::keyword("foo"), Value::Boolean(true)),
        (Value::keyword("bar"), Value::Integer(1)),
    ]
    .into_iter()
    .collect();
    assert_eq!(v.meta(), Some(&expected));

    let v = read("^{:a 1} ^{:a 2} x");
    assert_eq!(v.meta().unwrap().get(&Value::keyword("a")), Some(&Value::Integer(1)));
}

#[test]
fn metadata_shapes() {
    let tag = Value::keyword("tag");
    let v = read("^String x");
    assert_eq!(v.meta().unwrap().get(&tag), Some(&Value::symbol("String")));
    let v = read("^\"java.lang.String\" (f)");
    assert_eq!(v.meta().unwrap().get(&tag), Some(&Value::from("java.lang.String")));
    let v = read("^[long String] f");
    assert_eq!(
        v.meta().unwrap().get(&Value::keyword("param-tags")),
        Some(&Value::vector([Value::symbol("long"), Value::symbol("String")]))
    );
    let v = read("^:dynamic #{1}");
    assert_eq!(
        v.meta().unwrap().get(&Value::keyword("dynamic")),
        Some(&Value::Boolean(true))
    );
}

#[test]
fn namespaced_maps() {
    assert_eq!(
        read("#:foo{:a 1 :_/b 2 :bar/c 3}"),
        read("{:foo/a 1, :b 2, :bar/c 3}")
    );
    assert_eq!(read("#:foo {a 1 _/b 2}"), read("{foo/a 1 b 2}"));
    assert_eq!(read("#:foo{1 2}"), read("{1 2}"));
}

#[test]
fn tagged_literals_are_preserved() {
    let values = read_all("#inst \"2020-01-01\" #my/tag [1]", 8192);
    assert_eq!(values.len(), 2);
    assert_eq!(
        values[0],
        Value::Tagged(Symbol::parse("inst"), Box::new(Value::from("2020-01-01")))
    );
    assert_eq!(values[1].to_string(), "#my/tag [1]");
}

#[test]
fn tag_handlers() {
    let readers = Readers::new()
        .with("inc", |v| match v {
            Value::Integer(i) => Ok(Value::Integer(i + 1)),
            other => Err(format!("not an integer: {other}").into()),
        })
        .with_default(|tag, _| Ok(Value::from(tag.to_string())));
    let mut parser = Parser::with_readers(StrSource::new("#inc 1 #other x"), options(8192), readers);
    assert_eq!(parser.next_value().unwrap(), Value::Integer(2));
    assert_eq!(parser.next_value().unwrap(), Value::from("other"));
}

#[test]
fn interning_is_idempotent() {
    let values = read_all(":a/b :a/b foo :foo", 8192);
    let (first, second) = (keyword_of(&values[0]), keyword_of(&values[1]));
    assert!(Keyword::ptr_eq(first, second));

    let Value::Symbol(symbol, _) = &values[2] else {
        panic!("expected a symbol");
    };
    assert!(Symbol::ptr_eq(symbol, keyword_of(&values[3]).symbol()));
}

#[test]
fn namespaced_map_keys_are_interned() {
    let values = read_all("#:foo{:a 1} :foo/a", 8192);
    let Value::Map(entries, _) = &values[0] else {
        panic!("expected a map");
    };
    let key = entries.keys().next().unwrap();
    assert!(Symbol::ptr_eq(
        keyword_of(key).symbol(),
        keyword_of(&values[1]).symbol()
    ));
}

#[test]
fn cache_survives_across_parsers() {
    let mut parser = Parser::new(StrSource::new(":shared"), options(8192));
    let first = parser.next_value().unwrap();
    let cache = parser.into_cache();
    assert_eq!(cache.len(), 1);

    let mut parser = Parser::new(StrSource::new(":shared"), options(8192)).with_cache(cache);
    let second = parser.next_value().unwrap();
    assert!(Symbol::ptr_eq(
        keyword_of(&first).symbol(),
        keyword_of(&second).symbol()
    ));
    assert_eq!(parser.cache().len(), 1);
}

#[test]
fn cache_can_be_disabled() {
    let options = ParserOptions {
        keyword_cache: false,
        ..options(8192)
    };
    let values: Vec<Value> = Parser::new(StrSource::new(":a :a"), options)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(values[0], values[1]);
    assert!(!Symbol::ptr_eq(
        keyword_of(&values[0]).symbol(),
        keyword_of(&values[1]).symbol()
    ));
}

fn names(values: &[Value]) -> Vec<(Option<String>, String)> {
    values
        .iter()
        .map(|value| {
            let symbol = match value {
                Value::Map(entries, _) => keyword_of(entries.keys().next().unwrap()).symbol(),
                other => keyword_of(other).symbol(),
            };
            (symbol.namespace().map(str::to_owned), symbol.name().to_owned())
        })
        .collect()
}

#[test]
fn stripped_namespace_does_not_leak_into_literals() {
    let plain = (None, "a/b".to_owned());
    let qualified = (Some("a".to_owned()), "b".to_owned());
    for keyword_cache in [true, false] {
        let options = ParserOptions {
            keyword_cache,
            ..options(8192)
        };
        let read = |text: &str| {
            names(
                &Parser::new(StrSource::new(text), options.clone())
                    .collect::<Result<Vec<_>, _>>()
                    .unwrap(),
            )
        };
        assert_eq!(
            read("#:x{:_/a/b 1} :a/b"),
            [plain.clone(), qualified.clone()],
            "cache {keyword_cache}"
        );
        assert_eq!(
            read(":a/b #:x{:_/a/b 1}"),
            [qualified.clone(), plain.clone()],
            "cache {keyword_cache}"
        );
    }
}

#[test]
fn attach_keeps_the_cache() {
    let mut parser = Parser::new(StrSource::new(":k"), options(8192));
    let first = parser.next_value().unwrap();
    parser.attach(StrSource::new(":k"));
    let second = parser.next_value().unwrap();
    assert!(Symbol::ptr_eq(
        keyword_of(&first).symbol(),
        keyword_of(&second).symbol()
    ));
    assert_eq!(parser.offset(), 2);
}

#[test]
fn eof_value() {
    let mut parser = Parser::new(StrSource::new("  ; only a comment"), options(8192));
    assert_eq!(
        parser.parse_next(&OnEof::Return(Value::keyword("eof"))).unwrap(),
        Value::keyword("eof")
    );

    let options = ParserOptions {
        on_eof: OnEof::Return(Value::Nil),
        ..options(8192)
    };
    let mut parser = Parser::new(StrSource::new("1"), options);
    assert_eq!(parser.next_value().unwrap(), Value::Integer(1));
    assert_eq!(parser.next_value().unwrap(), Value::Nil);
}

#[test]
fn many_top_level_forms() {
    assert_eq!(
        read_all("1 :a \"s\" [x]", 2),
        vec![
            Value::Integer(1),
            Value::keyword("a"),
            Value::from("s"),
            Value::vector([Value::symbol("x")]),
        ]
    );
}

#[test]
fn tiny_buffers_agree() {
    let text = r#"{:user/name "Ada", :langs #{:clj :rust}, :ratio -3/4, :big 123456789012345678901234567890N}"#;
    let expected = read(text);
    for capacity in 1..16 {
        assert_eq!(read_with(text, capacity), expected, "capacity {capacity}");
    }
}

#[test]
fn free_functions() {
    assert_eq!(crate::from_str("[1]").unwrap(), Value::vector([Value::Integer(1)]));
    assert_eq!(crate::from_str_all("1 2").unwrap().len(), 2);
    assert_eq!(
        crate::from_reader("\"bytes\"".as_bytes()).unwrap(),
        Value::from("bytes")
    );
}

#[test]
fn keyword_cache_default_is_empty() {
    assert!(KeywordCache::default().is_empty());
}
