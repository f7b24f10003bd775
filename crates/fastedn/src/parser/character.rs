//! Character literals: `\c`, `\uXXXX`, `\oNNN` and named characters.

use super::{
    chars::is_boundary,
    escape_buffer::{OctalEscapeBuffer, UnicodeEscapeBuffer, is_high_surrogate, is_low_surrogate},
    lexer::Lexer,
};
use crate::{
    error::{ErrorKind, ParseError},
    source::CharSource,
};

impl<S: CharSource> Lexer<S> {
    /// Scans a character literal; the backslash has been consumed.
    pub(crate) fn scan_character(&mut self) -> Result<char, ParseError> {
        let Some(first) = self.input.read()? else {
            return Err(self.error(ErrorKind::UnexpectedEndOfInput));
        };
        match self.input.peek()? {
            Some(next) if !is_boundary(next) => {}
            _ => return Ok(first),
        }
        self.scratch.clear();
        self.scratch.push(first);
        self.input.copy_while(&mut self.scratch, |c| !is_boundary(c))?;
        decode_character(self.scratch.as_slice()).map_err(|kind| self.error(kind))
    }
}

fn decode_character(token: &[char]) -> Result<char, ErrorKind> {
    let text = || token.iter().collect::<String>();
    match token {
        ['u', digits @ ..] if digits.len() == 4 => {
            let mut escape = UnicodeEscapeBuffer::new();
            let mut unit = None;
            for &d in digits {
                unit = escape
                    .feed(d)
                    .map_err(|_| ErrorKind::MalformedCharacterLiteral(text()))?;
            }
            match unit {
                Some(unit) if !is_high_surrogate(unit) && !is_low_surrogate(unit) => {
                    char::from_u32(u32::from(unit))
                        .ok_or_else(|| ErrorKind::InvalidCharacterConstant(text()))
                }
                _ => Err(ErrorKind::InvalidCharacterConstant(text())),
            }
        }
        ['o', digits @ ..] if (1..=3).contains(&digits.len()) => {
            let mut escape = OctalEscapeBuffer::new();
            if !digits.iter().all(|&d| escape.feed(d)) {
                return Err(ErrorKind::MalformedCharacterLiteral(text()));
            }
            escape
                .finish()
                .map_err(|_| ErrorKind::InvalidCharacterConstant(text()))
        }
        _ => match text().as_str() {
            "newline" => Ok('\n'),
            "return" => Ok('\r'),
            "space" => Ok(' '),
            "tab" => Ok('\t'),
            "backspace" => Ok('\u{8}'),
            "formfeed" => Ok('\u{c}'),
            other => Err(ErrorKind::MalformedCharacterLiteral(other.to_owned())),
        },
    }
}
