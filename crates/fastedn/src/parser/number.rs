//! Numeric literals.
//!
//! Plain decimal integers that fit in an `i64` and end inside the current
//! buffer are accumulated directly from the buffer with overflow checks.
//! Everything else is collected as text while noting which markers appear,
//! then finalized in this order: radix (`NrDDD`), forced big integer (`N`),
//! hex (`0x`) or octal (leading `0`), plain integer, decimal (`M`), float,
//! and finally ratio (`n/d`).

use core::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use ordered_float::OrderedFloat;
use tracing::trace;

use super::{chars::is_boundary, lexer::Lexer};
use crate::{
    error::{ErrorKind, ParseError},
    source::CharSource,
    value::Value,
};

/// A scanned, unsigned number.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Number {
    Integer(i64),
    /// Too large for `i64` without an `N` suffix. Negation may bring it back
    /// into range.
    Promoted(BigInt),
    /// Explicitly arbitrary precision.
    BigInt(BigInt),
    Float(f64),
    Decimal(BigDecimal),
    Ratio(BigRational),
}

impl Number {
    fn from_bigint(value: BigInt) -> Self {
        match value.to_i64() {
            Some(v) => Number::Integer(v),
            None => Number::Promoted(value),
        }
    }

    /// The integer value, or the number itself when it is not an integer.
    fn into_bigint(self) -> Result<BigInt, Number> {
        match self {
            Number::Integer(v) => Ok(BigInt::from(v)),
            Number::Promoted(v) | Number::BigInt(v) => Ok(v),
            other => Err(other),
        }
    }

    #[must_use]
    pub(crate) fn negate(self) -> Self {
        match self {
            Number::Integer(v) => Number::Integer(-v),
            Number::Promoted(v) => Number::from_bigint(-v),
            Number::BigInt(v) => Number::BigInt(-v),
            Number::Float(v) => Number::Float(-v),
            Number::Decimal(v) => Number::Decimal(-v),
            Number::Ratio(v) => Number::Ratio(-v),
        }
    }

    pub(crate) fn into_value(self) -> Value {
        match self {
            Number::Integer(v) => Value::Integer(v),
            Number::Promoted(v) | Number::BigInt(v) => Value::BigInt(v),
            Number::Float(v) => Value::Float(OrderedFloat(v)),
            Number::Decimal(v) => Value::Decimal(v),
            Number::Ratio(v) => Value::Ratio(v),
        }
    }
}

/// Markers seen while collecting a number that did not take the fast path.
#[derive(Debug, Default, Clone, Copy)]
struct Shape {
    integer: bool,
    float: bool,
    radix: Option<usize>,
}

impl Shape {
    fn observe(&mut self, c: char, at: usize) {
        match c {
            '.' | 'e' | 'E' | 'M' if !self.integer && !self.float => self.float = true,
            'x' | 'X' | 'N' if !self.integer && !self.float => self.integer = true,
            'r' | 'R' if self.radix.is_none() => {
                self.radix = Some(at);
                self.integer = true;
            }
            _ => {}
        }
    }
}

enum FastPath {
    Done(usize, i64),
    Slow(usize),
}

impl<S: CharSource> Lexer<S> {
    /// Scans an unsigned number starting at the read position.
    pub(crate) fn scan_number(&mut self) -> Result<Number, ParseError> {
        let outcome = {
            let chunk = self.input.chunk();
            let leading_zero = chunk.first() == Some(&'0');
            let mut value = 0i64;
            let mut outcome = FastPath::Slow(chunk.len());
            for (i, &c) in chunk.iter().enumerate() {
                let digit = c.to_digit(10);
                if digit.is_none() && i > 0 && is_boundary(c) {
                    outcome = FastPath::Done(i, value);
                    break;
                }
                let next = digit
                    .filter(|_| i == 0 || !leading_zero)
                    .and_then(|d| value.checked_mul(10)?.checked_add(i64::from(d)));
                match next {
                    Some(v) => value = v,
                    None => {
                        outcome = FastPath::Slow(i);
                        break;
                    }
                }
            }
            outcome
        };

        let prefix = match outcome {
            FastPath::Done(len, value) => {
                self.input.consume(len);
                return Ok(Number::Integer(value));
            }
            FastPath::Slow(prefix) => prefix,
        };

        trace!(offset = self.input.offset(), "number slow path");
        self.scratch.clear();
        self.scratch.extend_from_slice(&self.input.chunk()[..prefix]);
        self.input.consume(prefix);

        let mut shape = Shape::default();
        let mut seen = prefix;
        let stop = self.input.copy_while(&mut self.scratch, |c| {
            if c == '/' || is_boundary(c) {
                return false;
            }
            shape.observe(c, seen);
            seen += 1;
            true
        })?;
        let text = self.scratch.collect_string();

        if stop != Some('/') {
            return finish(&text, shape).map_err(|kind| self.error(kind));
        }

        self.input.consume(1);
        if shape.float && !shape.integer {
            return Err(self.error(ErrorKind::InvalidRatioOperand(text)));
        }
        let numerator = finish_integer(&text, shape.radix)
            .map_err(|kind| self.error(kind))?
            .into_bigint()
            .map_err(|n| self.error(ErrorKind::InvalidRatioOperand(n.into_value().to_string())))?;
        let denominator = self
            .scan_number()?
            .into_bigint()
            .map_err(|n| self.error(ErrorKind::InvalidRatioOperand(n.into_value().to_string())))?;
        if denominator.is_zero() {
            return Err(self.error(ErrorKind::InvalidNumber(format!("{text}/0"))));
        }
        let ratio = BigRational::new(numerator, denominator);
        Ok(if ratio.is_integer() {
            Number::from_bigint(ratio.to_integer())
        } else {
            Number::Ratio(ratio)
        })
    }
}

fn finish(text: &str, shape: Shape) -> Result<Number, ErrorKind> {
    if !text.is_ascii() {
        return Err(ErrorKind::InvalidNumber(text.to_owned()));
    }
    if shape.integer || !shape.float {
        finish_integer(text, shape.radix)
    } else {
        finish_float(text)
    }
}

fn finish_integer(text: &str, radix_at: Option<usize>) -> Result<Number, ErrorKind> {
    let invalid = || ErrorKind::InvalidNumber(text.to_owned());
    if !text.is_ascii() {
        return Err(invalid());
    }

    let mut forced = false;
    let (radix, digits) = match radix_at {
        Some(at) => {
            let radix = text[..at]
                .parse::<u32>()
                .ok()
                .filter(|r| (2..=36).contains(r))
                .ok_or_else(invalid)?;
            (radix, &text[at + 1..])
        }
        None => {
            let digits = match text.strip_suffix('N') {
                Some(digits) => {
                    forced = true;
                    digits
                }
                None => text,
            };
            if let Some(hex) = digits
                .strip_prefix("0x")
                .or_else(|| digits.strip_prefix("0X"))
            {
                (16, hex)
            } else if digits.len() > 1 && digits.starts_with('0') {
                (8, &digits[1..])
            } else {
                (10, digits)
            }
        }
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(invalid());
    }
    if forced {
        return BigInt::parse_bytes(digits.as_bytes(), radix)
            .map(Number::BigInt)
            .ok_or_else(invalid);
    }
    match i64::from_str_radix(digits, radix) {
        Ok(v) => Ok(Number::Integer(v)),
        Err(_) => BigInt::parse_bytes(digits.as_bytes(), radix)
            .map(Number::Promoted)
            .ok_or_else(invalid),
    }
}

fn finish_float(text: &str) -> Result<Number, ErrorKind> {
    let invalid = || ErrorKind::InvalidNumber(text.to_owned());
    match text.strip_suffix('M') {
        Some(body) => BigDecimal::from_str(body)
            .map(Number::Decimal)
            .map_err(|_| invalid()),
        None => text.parse::<f64>().map(Number::Float).map_err(|_| invalid()),
    }
}
