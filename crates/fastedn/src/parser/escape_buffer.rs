//! Incremental decoders for numeric escape sequences.
//!
//! The [`UnicodeEscapeBuffer`] type accumulates exactly four ASCII hexadecimal
//! digits (`0-9`, `A-F`, `a-f`) into a UTF-16 code unit as they arrive. The
//! [`OctalEscapeBuffer`] type accumulates one to three octal digits. Scanners
//! feed both one character at a time, so an escape may straddle a buffer
//! refill without any lookahead.
//!
//! # Errors
//!
//! - Feeding a non-hexadecimal character to [`UnicodeEscapeBuffer::feed`]
//!   returns [`ErrorKind::MalformedEscape`].
//! - [`OctalEscapeBuffer::finish`] returns the decoded value in `Err` when it
//!   is above `0o377`.
//!
//! Surrogate code units are returned as-is; pairing them is up to the caller.

use crate::error::ErrorKind;

#[derive(Debug)]
/// Accumulates four hexadecimal digits into a UTF-16 code unit.
pub(crate) struct UnicodeEscapeBuffer {
    acc: u16,
    len: u8,
}

impl UnicodeEscapeBuffer {
    /// Creates a new, empty `UnicodeEscapeBuffer`.
    pub fn new() -> Self {
        Self { acc: 0, len: 0 }
    }

    /// Clears any accumulated digits.
    pub fn reset(&mut self) {
        self.acc = 0;
        self.len = 0;
    }

    /// Convert a single ASCII hex digit into its 0..=15 value.
    #[inline]
    pub(crate) fn hex_val(c: char) -> Option<u16> {
        c.to_digit(16).and_then(|d| u16::try_from(d).ok())
    }

    /// Feeds a single hexadecimal digit into the buffer.
    ///
    /// - Returns `Ok(None)` if fewer than four digits have been provided so
    ///   far.
    /// - Returns `Ok(Some(unit))` once exactly four digits have been
    ///   accumulated, resetting the buffer.
    /// - Returns `Err` if `c` is not an ASCII hex digit. The buffer is reset.
    pub fn feed(&mut self, c: char) -> Result<Option<u16>, ErrorKind> {
        let Some(d) = Self::hex_val(c) else {
            self.reset();
            return Err(ErrorKind::MalformedEscape(format!(
                "invalid character '{c}' in \\u escape"
            )));
        };

        debug_assert!(self.len < 4);
        self.acc = (self.acc << 4) | d;
        self.len += 1;

        if self.len < 4 {
            return Ok(None);
        }
        let unit = self.acc;
        self.reset();
        Ok(Some(unit))
    }
}

/// Accumulates up to three octal digits.
#[derive(Debug)]
pub(crate) struct OctalEscapeBuffer {
    acc: u32,
    len: u8,
}

impl OctalEscapeBuffer {
    pub const MAX_DIGITS: u8 = 3;

    pub fn new() -> Self {
        Self { acc: 0, len: 0 }
    }

    /// Feeds one character. Returns `false`, leaving the buffer untouched,
    /// when `c` is not an octal digit or three digits were already taken.
    pub fn feed(&mut self, c: char) -> bool {
        match c.to_digit(8) {
            Some(d) if self.len < Self::MAX_DIGITS => {
                self.acc = self.acc * 8 + d;
                self.len += 1;
                true
            }
            _ => false,
        }
    }

    pub fn is_full(&self) -> bool {
        self.len == Self::MAX_DIGITS
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decodes the digits taken so far and resets. Values above `0o377` are
    /// returned in `Err`.
    pub fn finish(&mut self) -> Result<char, u32> {
        let value = self.acc;
        self.acc = 0;
        self.len = 0;
        u8::try_from(value).map(char::from).map_err(|_| value)
    }
}

/// Combines a high and a low surrogate into one character.
pub(crate) fn combine_surrogates(high: u16, low: u16) -> Option<char> {
    match char::decode_utf16([high, low]).next() {
        Some(Ok(c)) if c.len_utf16() == 2 => Some(c),
        _ => None,
    }
}

pub(crate) fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

pub(crate) fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}
