//! Character classes shared by every scanner.

const fn ascii_mask(chars: &[u8]) -> u128 {
    let mut mask = 0u128;
    let mut i = 0;
    while i < chars.len() {
        mask |= 1u128 << chars[i];
        i += 1;
    }
    mask
}

const WHITESPACE: u128 = ascii_mask(b" \t\n\r,");
const BOUNDARY: u128 = WHITESPACE | ascii_mask(b"\"()[]{}\\");

/// Space, tab, newline, carriage return, comma, or any non-ASCII Unicode
/// whitespace.
#[inline]
pub(crate) fn is_whitespace(c: char) -> bool {
    if c.is_ascii() {
        (WHITESPACE >> (c as u32)) & 1 == 1
    } else {
        c.is_whitespace()
    }
}

/// Whitespace, a quote, a backslash or a bracket: the characters that end a
/// symbol, keyword, number or character token.
#[inline]
pub(crate) fn is_boundary(c: char) -> bool {
    if c.is_ascii() {
        (BOUNDARY >> (c as u32)) & 1 == 1
    } else {
        c.is_whitespace()
    }
}
