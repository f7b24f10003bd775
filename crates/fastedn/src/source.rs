//! Character sources the reader pulls blocks from.
//!
//! A [`CharSource`] fills a caller-provided slice with as many characters as
//! it has ready and returns how many it wrote. Returning `0` is a permanent
//! end of input: the reader never asks again.

use std::io;

/// A pull-based source of characters.
pub trait CharSource {
    /// Writes up to `dst.len()` characters into `dst`, returning the count.
    /// `dst` is never empty. `Ok(0)` signals end of input.
    ///
    /// # Errors
    ///
    /// Any I/O or decoding error from the underlying input.
    fn read_chars(&mut self, dst: &mut [char]) -> io::Result<usize>;
}

impl<T: CharSource + ?Sized> CharSource for &mut T {
    fn read_chars(&mut self, dst: &mut [char]) -> io::Result<usize> {
        (**self).read_chars(dst)
    }
}

impl<T: CharSource + ?Sized> CharSource for Box<T> {
    fn read_chars(&mut self, dst: &mut [char]) -> io::Result<usize> {
        (**self).read_chars(dst)
    }
}

/// Reads from a string slice.
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    rest: core::str::Chars<'a>,
}

impl<'a> StrSource<'a> {
    /// Creates a source over `text`.
    pub fn new(text: &'a str) -> Self {
        Self { rest: text.chars() }
    }
}

impl CharSource for StrSource<'_> {
    fn read_chars(&mut self, dst: &mut [char]) -> io::Result<usize> {
        Ok(fill_from(&mut self.rest, dst))
    }
}

/// Reads from any iterator of characters.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    iter: I,
}

impl<I: Iterator<Item = char>> IterSource<I> {
    /// Creates a source over `iter`.
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I: Iterator<Item = char>> CharSource for IterSource<I> {
    fn read_chars(&mut self, dst: &mut [char]) -> io::Result<usize> {
        Ok(fill_from(&mut self.iter, dst))
    }
}

fn fill_from(iter: &mut impl Iterator<Item = char>, dst: &mut [char]) -> usize {
    let mut written = 0;
    for (slot, c) in dst.iter_mut().zip(iter) {
        *slot = c;
        written += 1;
    }
    written
}

/// Wraps another source and hands out at most `max_block` characters per
/// read, so a large reader buffer still sees short blocks.
#[derive(Debug, Clone)]
pub struct ChunkedSource<S> {
    inner: S,
    max_block: usize,
}

impl<S: CharSource> ChunkedSource<S> {
    /// Limits each block from `inner` to `max_block` characters (at least one).
    pub fn new(inner: S, max_block: usize) -> Self {
        Self {
            inner,
            max_block: max_block.max(1),
        }
    }
}

impl<S: CharSource> CharSource for ChunkedSource<S> {
    fn read_chars(&mut self, dst: &mut [char]) -> io::Result<usize> {
        let n = dst.len().min(self.max_block);
        self.inner.read_chars(&mut dst[..n])
    }
}

const BYTE_BLOCK: usize = 8192;

/// Decodes UTF-8 from an [`io::Read`] incrementally.
///
/// Multi-byte sequences split across reads are carried over to the next read.
/// Invalid or truncated UTF-8 is reported as [`io::ErrorKind::InvalidData`].
#[derive(Debug)]
pub struct Utf8Source<R> {
    reader: R,
    pending: Vec<u8>,
    start: usize,
    eof: bool,
}

impl<R: io::Read> Utf8Source<R> {
    /// Creates a decoder over `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::with_capacity(BYTE_BLOCK),
            start: 0,
            eof: false,
        }
    }

    fn decode_into(&mut self, dst: &mut [char]) -> io::Result<usize> {
        let mut written = 0;
        while written < dst.len() {
            let rest = &self.pending[self.start..];
            if rest.is_empty() {
                break;
            }
            match bstr::decode_utf8(rest) {
                (Some(c), len) => {
                    dst[written] = c;
                    written += 1;
                    self.start += len;
                }
                // A valid prefix running to the end of the block may finish
                // in the next read.
                (None, len) if len == rest.len() && !self.eof => break,
                (None, _) if written > 0 => break,
                (None, _) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid UTF-8 at byte {:#04x}", rest[0]),
                    ));
                }
            }
        }
        Ok(written)
    }

    fn fill_bytes(&mut self) -> io::Result<()> {
        self.pending.drain(..self.start);
        self.start = 0;
        let old_len = self.pending.len();
        self.pending.resize(old_len + BYTE_BLOCK, 0);
        let read = loop {
            match self.reader.read(&mut self.pending[old_len..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.pending.truncate(old_len);
                    return Err(e);
                }
            }
        };
        self.pending.truncate(old_len + read);
        if read == 0 {
            self.eof = true;
        }
        Ok(())
    }
}

impl<R: io::Read> CharSource for Utf8Source<R> {
    fn read_chars(&mut self, dst: &mut [char]) -> io::Result<usize> {
        loop {
            let written = self.decode_into(dst)?;
            if written > 0 {
                return Ok(written);
            }
            if self.eof {
                return Ok(0);
            }
            self.fill_bytes()?;
        }
    }
}
