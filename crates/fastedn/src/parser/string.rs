//! String literals.

use tracing::trace;

use super::{
    escape_buffer::{
        OctalEscapeBuffer, UnicodeEscapeBuffer, combine_surrogates, is_high_surrogate,
        is_low_surrogate,
    },
    lexer::Lexer,
};
use crate::{
    error::{ErrorKind, ParseError},
    source::CharSource,
};

impl<S: CharSource> Lexer<S> {
    /// Scans a string body; the opening quote has been consumed.
    ///
    /// A string that closes inside the current buffer with no escapes is
    /// copied straight out of the buffer. Otherwise runs of plain characters
    /// are bulk-copied into the accumulator between escapes and refills.
    pub(crate) fn scan_string(&mut self) -> Result<String, ParseError> {
        let closed_at = {
            let chunk = self.input.chunk();
            chunk
                .iter()
                .position(|&c| c == '"' || c == '\\')
                .filter(|&i| chunk[i] == '"')
        };
        if let Some(end) = closed_at {
            self.input.consume(end + 1);
            return Ok(self.input.behind(end + 1)[..end].iter().collect());
        }

        trace!(offset = self.input.offset(), "string slow path");
        self.scratch.clear();
        loop {
            match self.input.copy_while(&mut self.scratch, |c| c != '"' && c != '\\')? {
                Some('"') => {
                    self.input.consume(1);
                    return Ok(self.scratch.collect_string());
                }
                Some(_) => {
                    self.input.consume(1);
                    let c = self.scan_escape()?;
                    self.scratch.push(c);
                }
                None => return Err(self.unterminated_string()),
            }
        }
    }

    fn unterminated_string(&self) -> ParseError {
        self.error(ErrorKind::UnterminatedString {
            partial: self.scratch.collect_string(),
        })
    }

    fn scan_escape(&mut self) -> Result<char, ParseError> {
        let Some(c) = self.input.read()? else {
            return Err(self.unterminated_string());
        };
        Ok(match c {
            '"' | '\\' | '/' => c,
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => self.scan_unicode_escape()?,
            '0'..='7' => {
                self.input.unread();
                self.scan_octal_escape()?
            }
            other => return Err(self.error(ErrorKind::UnrecognizedEscape(other))),
        })
    }

    fn read_code_unit(&mut self) -> Result<u16, ParseError> {
        let mut escape = UnicodeEscapeBuffer::new();
        loop {
            let Some(c) = self.input.read()? else {
                return Err(self.error(ErrorKind::MalformedEscape(
                    "EOF inside \\u escape".to_owned(),
                )));
            };
            if let Some(unit) = escape.feed(c).map_err(|kind| self.error(kind))? {
                return Ok(unit);
            }
        }
    }

    fn scan_unicode_escape(&mut self) -> Result<char, ParseError> {
        let unit = self.read_code_unit()?;
        let unpaired = |unit: u16| {
            ErrorKind::MalformedEscape(format!("unpaired surrogate \\u{unit:04X}"))
        };
        if is_low_surrogate(unit) {
            return Err(self.error(unpaired(unit)));
        }
        if !is_high_surrogate(unit) {
            return char::from_u32(u32::from(unit)).ok_or_else(|| self.error(unpaired(unit)));
        }
        if self.input.read()? != Some('\\') || self.input.read()? != Some('u') {
            return Err(self.error(unpaired(unit)));
        }
        let low = self.read_code_unit()?;
        combine_surrogates(unit, low).ok_or_else(|| self.error(unpaired(unit)))
    }

    fn scan_octal_escape(&mut self) -> Result<char, ParseError> {
        let mut escape = OctalEscapeBuffer::new();
        while !escape.is_full() {
            match self.input.read()? {
                Some(c) if escape.feed(c) => {}
                Some(_) => {
                    self.input.unread();
                    break;
                }
                None => break,
            }
        }
        escape.finish().map_err(|value| {
            self.error(ErrorKind::InvalidEscape(format!(
                "octal escape \\{value:o} is out of range [0, 377]"
            )))
        })
    }
}
