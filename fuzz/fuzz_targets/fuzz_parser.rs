#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use fastedn::{ChunkedSource, Parser, ParserOptions, Readers, StrSource, Value};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

const HEADER: usize = 5; // 1 flag + 4-byte seed

thread_local! {
    static RNG: RefCell<SmallRng> =
        RefCell::new(SmallRng::from_os_rng());
}

static WS_TABLE: &[&[u8]] = &[
    b" ",
    b",",
    b"\t",
    b"\n",
    b"\r",
    b"; comment\n",
    b"#_ :skipped ",
    "\u{2003}".as_bytes(),
    "\u{3000}".as_bytes(),
];

static SYMBOLS: &[&str] = &["a", "foo/bar", "-", "+", "*x*", "/", "ns.y/z", "<="];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8 & 0x1F);
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let mut prefix = HEADER;
        while prefix < size {
            let limit = max_size - prefix;
            prefix += append_whitespace(&mut data[prefix..], limit);
            prefix += append_value(&mut data[prefix..], size, limit);
            prefix += append_whitespace(&mut data[prefix..], limit);
        }
        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Append 1‒N separators (whitespace, comments, discards) to `buf`, never
/// exceeding `limit`. Returns the number of bytes written.
fn append_whitespace(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }
        let n = rng.random_range(1..=limit.min(8));
        let mut written = 0;
        for _ in 0..n {
            let w = WS_TABLE[rng.random_range(0..WS_TABLE.len())];
            if written + w.len() > limit {
                break;
            }
            buf[written..written + w.len()].copy_from_slice(w);
            written += w.len();
        }
        written
    })
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2).min(limit));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };

    let printed = value.0.to_string();
    let len = printed.len().min(limit);
    data[..len].copy_from_slice(&printed.as_bytes()[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(24)? {
            0 => Value::Nil,
            1 => Value::Boolean(u.arbitrary()?),
            2 => Value::Integer(u.arbitrary()?),
            3 => Value::from(u.arbitrary::<f64>()?),
            4 => Value::Character(u.arbitrary()?),
            5..=8 => Value::String(u.arbitrary()?),
            9..=10 => Value::symbol(u.choose(SYMBOLS)?),
            11..=12 => Value::keyword(u.choose(SYMBOLS)?),
            13..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::vector(elems.into_iter().map(|v| v.0))
            }
            16..=17 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::list(elems.into_iter().map(|v| v.0))
            }
            18..=19 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::set(elems.into_iter().map(|v| v.0))
            }
            20..=22 => {
                let m: Vec<(ArbitraryValue, ArbitraryValue)> = u.arbitrary()?;
                Value::map(m.into_iter().map(|(k, v)| (k.0, v.0)))
            }
            23 => Value::Tagged(
                fastedn::Symbol::parse("inst"),
                Box::new(ArbitraryValue::arbitrary(u)?.0),
            ),
            _ => Err(arbitrary::Error::IncorrectFormat)?,
        };
        Ok(ArbitraryValue(value))
    }
}

fn parser(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let split_seed = u32::from_le_bytes(data[1..5].try_into().unwrap()) as usize;
    let text = String::from_utf8_lossy(&data[HEADER..]).into_owned();
    if text.is_empty() {
        return;
    }

    let options = ParserOptions {
        buffer_capacity: match (flags >> 3) & 3 {
            0 => 1,
            1 => 7,
            2 => 64,
            _ => 8192,
        },
        track_lines: flags & 1 != 0,
        keyword_cache: flags & 2 != 0,
        panic_on_error: false,
        ..Default::default()
    };
    let readers = if flags & 4 != 0 {
        Readers::preserving()
    } else {
        Readers::new()
    };
    let source = ChunkedSource::new(StrSource::new(&text), split_seed % 64 + 1);
    let mut values = Vec::new();
    for result in Parser::with_readers(source, options, readers) {
        match result {
            Ok(value) => values.push(value),
            Err(err) => {
                // Rendering must never panic, whatever the buffered context.
                let _ = err.to_string();
                break;
            }
        }
    }

    // Anything that was read must print as EDN that reads back the same.
    for value in values {
        let printed = value.to_string();
        let reread = Parser::with_readers(
            StrSource::new(&printed),
            ParserOptions::default(),
            Readers::preserving(),
        )
        .next_value()
        .unwrap_or_else(|err| panic!("re-reading {printed:?} failed: {err}"));
        assert_eq!(reread, value, "{printed}");
    }
}

fuzz_target!(|data: &[u8]| parser(data));
