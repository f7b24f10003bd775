//! Shared scanner state.
//!
//! The lexer owns the character [`Buffer`] and the [`Accumulator`] every
//! scanner borrows for slow-path tokens. Scanners are split by token class
//! into sibling modules (`string`, `symbol`, `number`, `character`), each
//! adding methods to [`Lexer`].

use tracing::trace;

use super::{accumulator::Accumulator, buffer::Buffer, chars::is_boundary};
use crate::{
    error::{ErrorKind, ParseError},
    source::CharSource,
};

pub(crate) struct Lexer<S> {
    pub(crate) input: Buffer<S>,
    pub(crate) scratch: Accumulator,
}

/// Where a scanned token's characters live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Span {
    /// The last `n` characters consumed from the buffer.
    Behind(usize),
    /// The whole accumulator.
    Scratch,
}

/// A token read up to the next boundary character.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Token {
    pub(crate) span: Span,
    /// Index of the first `/` within the token.
    pub(crate) slash: Option<usize>,
}

impl<S: CharSource> Lexer<S> {
    pub(crate) fn new(input: Buffer<S>) -> Self {
        Self {
            input,
            scratch: Accumulator::new(),
        }
    }

    pub(crate) fn error(&self, kind: ErrorKind) -> ParseError {
        self.input.error(kind)
    }

    pub(crate) fn text(&self, span: Span) -> &[char] {
        match span {
            Span::Behind(n) => self.input.behind(n),
            Span::Scratch => self.scratch.as_slice(),
        }
    }

    /// Reads up to the next boundary character, which is left unread.
    ///
    /// `lead` is a character the caller already consumed that belongs to the
    /// token. When it is still in the buffer the token is scanned in place;
    /// otherwise it seeds the accumulator.
    pub(crate) fn scan_token(&mut self, lead: Option<char>) -> Result<Token, ParseError> {
        let in_place = lead.is_none_or(|c| self.input.rewind_to(c));
        if in_place {
            let mut slash = None;
            let mut end = None;
            for (i, &c) in self.input.chunk().iter().enumerate() {
                if is_boundary(c) {
                    end = Some(i);
                    break;
                }
                if c == '/' && slash.is_none() {
                    slash = Some(i);
                }
            }
            if let Some(end) = end {
                self.input.consume(end);
                return Ok(Token {
                    span: Span::Behind(end),
                    slash,
                });
            }
        }

        trace!(offset = self.input.offset(), "token crosses buffer");
        self.scratch.clear();
        if let (false, Some(c)) = (in_place, lead) {
            self.scratch.push(c);
        }
        let mut seen = self.scratch.len();
        let mut slash = None;
        self.input.copy_while(&mut self.scratch, |c| {
            if is_boundary(c) {
                return false;
            }
            if c == '/' && slash.is_none() {
                slash = Some(seen);
            }
            seen += 1;
            true
        })?;
        Ok(Token {
            span: Span::Scratch,
            slash,
        })
    }
}
