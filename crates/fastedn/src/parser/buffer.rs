//! Fixed-capacity character buffer over a [`CharSource`].
//!
//! The buffer holds one block of characters at a time. Scanners look at the
//! unread part of the block directly through [`Buffer::chunk`] and consume
//! whole runs at once; only tokens that cross a refill are copied into the
//! [`Accumulator`]. A single character of pushback is supported, which is all
//! the grammar needs.

use core::mem;

use tracing::{debug, trace};

use super::accumulator::Accumulator;
use crate::{
    error::{ErrorKind, Location, ParseError},
    source::CharSource,
};

/// Characters shown on either side of the error position.
const CONTEXT_RADIUS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pushback {
    /// The last read returned a character still in the buffer.
    Char,
    /// The last read hit end of input.
    Eof,
    /// Nothing to push back.
    Spent,
}

/// Line and column of the first character in the buffer.
#[derive(Debug, Clone, Copy)]
struct LineStart {
    line: usize,
    column: usize,
}

impl LineStart {
    fn advanced(self, retired: &[char]) -> Self {
        match retired.iter().rposition(|&c| c == '\n') {
            Some(last) => LineStart {
                line: self.line + retired.iter().filter(|&&c| c == '\n').count(),
                column: retired.len() - last,
            },
            None => LineStart {
                line: self.line,
                column: self.column + retired.len(),
            },
        }
    }
}

pub(crate) struct Buffer<S> {
    source: S,
    data: Box<[char]>,
    len: usize,
    pos: usize,
    /// Characters retired by earlier refills.
    base: usize,
    exhausted: bool,
    pushback: Pushback,
    lines: Option<LineStart>,
}

impl<S: CharSource> Buffer<S> {
    pub(crate) fn new(source: S, capacity: usize, track_lines: bool) -> Self {
        Self {
            source,
            data: vec!['\0'; capacity.max(1)].into_boxed_slice(),
            len: 0,
            pos: 0,
            base: 0,
            exhausted: false,
            pushback: Pushback::Spent,
            lines: track_lines.then_some(LineStart { line: 1, column: 1 }),
        }
    }

    /// Replaces the source and forgets everything read so far.
    pub(crate) fn attach(&mut self, source: S) {
        self.source = source;
        self.len = 0;
        self.pos = 0;
        self.base = 0;
        self.exhausted = false;
        self.pushback = Pushback::Spent;
        if let Some(lines) = &mut self.lines {
            *lines = LineStart { line: 1, column: 1 };
        }
    }

    /// Loads the next block once the current one is fully consumed. Returns
    /// `false` at end of input; the last block stays in place for error
    /// context.
    pub(crate) fn fill(&mut self) -> Result<bool, ParseError> {
        debug_assert_eq!(self.pos, self.len, "refill with unread characters");
        if self.exhausted {
            return Ok(false);
        }
        let lines = self.lines.map(|l| l.advanced(&self.data[..self.len]));
        let read = match self.source.read_chars(&mut self.data) {
            Ok(n) => n.min(self.data.len()),
            Err(e) => return Err(self.error(ErrorKind::Io(e))),
        };
        if read == 0 {
            self.exhausted = true;
            debug!(offset = self.offset(), "end of input");
            return Ok(false);
        }
        self.base += self.len;
        self.len = read;
        self.pos = 0;
        self.lines = lines;
        trace!(offset = self.base, len = read, "refilled buffer");
        Ok(true)
    }

    #[inline]
    pub(crate) fn read(&mut self) -> Result<Option<char>, ParseError> {
        if self.pos == self.len && !self.fill()? {
            self.pushback = Pushback::Eof;
            return Ok(None);
        }
        let c = self.data[self.pos];
        self.pos += 1;
        self.pushback = Pushback::Char;
        Ok(Some(c))
    }

    /// Steps back over the character returned by the last [`read`](Self::read).
    /// After an end-of-input read this is a no-op.
    ///
    /// # Panics
    ///
    /// If called twice without an intervening read.
    #[inline]
    pub(crate) fn unread(&mut self) {
        match mem::replace(&mut self.pushback, Pushback::Spent) {
            Pushback::Char => {
                assert!(self.pos > 0, "unread before the start of the buffer");
                self.pos -= 1;
            }
            Pushback::Eof => {}
            Pushback::Spent => panic!("unread without a preceding read"),
        }
    }

    #[inline]
    pub(crate) fn peek(&mut self) -> Result<Option<char>, ParseError> {
        let c = self.read()?;
        self.unread();
        Ok(c)
    }

    /// The unread part of the current block.
    #[inline]
    pub(crate) fn chunk(&self) -> &[char] {
        &self.data[self.pos..self.len]
    }

    /// Marks `n` characters of [`chunk`](Self::chunk) as consumed.
    #[inline]
    pub(crate) fn consume(&mut self, n: usize) {
        debug_assert!(self.pos + n <= self.len);
        self.pos += n;
        self.pushback = Pushback::Spent;
    }

    /// The `n` characters just consumed.
    #[inline]
    pub(crate) fn behind(&self, n: usize) -> &[char] {
        &self.data[self.pos - n..self.pos]
    }

    /// Steps back over `lead` if it is the character just before the read
    /// position in the current block.
    pub(crate) fn rewind_to(&mut self, lead: char) -> bool {
        if self.pos > 0 && self.data[self.pos - 1] == lead {
            self.pos -= 1;
            self.pushback = Pushback::Spent;
            true
        } else {
            false
        }
    }

    /// Consumes characters until one fails `predicate`, and returns it. The
    /// returned character is consumed and may be pushed back with
    /// [`unread`](Self::unread).
    pub(crate) fn skip_while<F>(&mut self, mut predicate: F) -> Result<Option<char>, ParseError>
    where
        F: FnMut(char) -> bool,
    {
        loop {
            if let Some(i) = self.chunk().iter().position(|&c| !predicate(c)) {
                let c = self.data[self.pos + i];
                self.pos += i + 1;
                self.pushback = Pushback::Char;
                return Ok(Some(c));
            }
            self.pos = self.len;
            if !self.fill()? {
                self.pushback = Pushback::Eof;
                return Ok(None);
            }
        }
    }

    /// Copies characters into `dst` while `predicate` holds, across refills.
    /// Returns the first character that failed, left unread, or `None` at
    /// end of input.
    pub(crate) fn copy_while<F>(
        &mut self,
        dst: &mut Accumulator,
        mut predicate: F,
    ) -> Result<Option<char>, ParseError>
    where
        F: FnMut(char) -> bool,
    {
        loop {
            let chunk = &self.data[self.pos..self.len];
            if let Some(i) = chunk.iter().position(|&c| !predicate(c)) {
                dst.extend_from_slice(&chunk[..i]);
                let stop = chunk[i];
                self.consume(i);
                return Ok(Some(stop));
            }
            dst.extend_from_slice(chunk);
            self.pos = self.len;
            self.pushback = Pushback::Spent;
            if !self.fill()? {
                return Ok(None);
            }
        }
    }

    /// Characters consumed from the source so far.
    pub(crate) fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Index in the live block of the last consumed character.
    fn focus(&self) -> usize {
        self.pos.saturating_sub(1)
    }

    fn line_column(&self) -> Option<(usize, usize)> {
        let start = self.lines?;
        let focus = self.focus();
        let before = &self.data[..focus.min(self.len)];
        Some(match before.iter().rposition(|&c| c == '\n') {
            Some(last) => (
                start.line + before.iter().filter(|&&c| c == '\n').count(),
                focus - last,
            ),
            None => (start.line, start.column + focus),
        })
    }

    /// An excerpt of the live block around the last consumed character,
    /// cut at line breaks and at `radius` characters, with a caret line
    /// underneath.
    pub(crate) fn context(&self, radius: usize) -> Option<String> {
        let live = &self.data[..self.len];
        if live.is_empty() {
            return None;
        }
        let focus = self.focus().min(live.len() - 1);
        let is_break = |c: char| c == '\n' || c == '\r';

        let lower = focus.saturating_sub(radius);
        let mut start = focus;
        while start > lower && !is_break(live[start - 1]) {
            start -= 1;
        }
        let upper = (focus + radius).min(live.len());
        let mut end = focus;
        while end < upper && !is_break(live[end]) {
            end += 1;
        }
        if end <= start {
            return None;
        }

        let mut out: String = live[start..end].iter().collect();
        out.push('\n');
        out.extend(core::iter::repeat_n(' ', focus - start));
        out.push('^');
        Some(out)
    }

    pub(crate) fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError {
            kind,
            location: Location {
                offset: self.offset(),
                line_column: self.line_column(),
                context: self.context(CONTEXT_RADIUS),
            },
        }
    }
}
