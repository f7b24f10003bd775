use core::fmt;
use std::io;

use thiserror::Error;

use crate::value::{Symbol, Unclosed, Value};

/// An error raised while reading EDN, together with where it happened.
///
/// The rendered message always names the failure first, then the position
/// (`offset: N` by default, `line:column` when line tracking is enabled) and,
/// when any of the buffered input is still available, an excerpt of the
/// surrounding text with a caret under the last character consumed.
#[derive(Error, Debug)]
#[error("{kind}{location}")]
pub struct ParseError {
    #[source]
    pub(crate) kind: ErrorKind,
    pub(crate) location: Location,
}

impl ParseError {
    /// The failure category.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Number of characters consumed from the source when the error was raised.
    pub fn offset(&self) -> usize {
        self.location.offset
    }

    /// One-based line of the offending character, when line tracking is on.
    pub fn line(&self) -> Option<usize> {
        self.location.line_column.map(|(line, _)| line)
    }

    /// One-based column of the offending character, when line tracking is on.
    pub fn column(&self) -> Option<usize> {
        self.location.line_column.map(|(_, column)| column)
    }

    /// The excerpt and caret line, if any buffered input was available.
    pub fn context(&self) -> Option<&str> {
        self.location.context.as_deref()
    }

    /// Discards the position and returns the failure category.
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Location {
    pub(crate) offset: usize,
    pub(crate) line_column: Option<(usize, usize)>,
    pub(crate) context: Option<String>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_column {
            Some((line, column)) => write!(f, " at {line}:{column}")?,
            None => write!(f, ", offset: {}", self.offset)?,
        }
        if let Some(context) = &self.context {
            write!(f, ", context:\n{context}")?;
        }
        Ok(())
    }
}

/// Whether a symbol-like token was read as a symbol or a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare symbol such as `foo/bar`.
    Symbol,
    /// A keyword such as `:foo/bar`.
    Keyword,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Symbol => "symbol",
            TokenKind::Keyword => "keyword",
        })
    }
}

/// The kind of collection an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// `( ... )`
    List,
    /// `[ ... ]`
    Vector,
    /// `#{ ... }`
    Set,
    /// `{ ... }`
    Map,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CollectionKind::List => "list",
            CollectionKind::Vector => "vector",
            CollectionKind::Set => "set",
            CollectionKind::Map => "map",
        })
    }
}

/// Every way reading EDN can fail.
#[derive(Error, Debug)]
pub enum ErrorKind {
    /// Input ended inside a string literal.
    #[error("EOF while reading string: \"{partial}")]
    UnterminatedString {
        /// Characters decoded before the input ran out.
        partial: String,
    },
    /// Input ended inside a collection.
    #[error("EOF while reading {kind}: {}", Unclosed(.partial))]
    UnterminatedCollection {
        /// The collection that was left open.
        kind: CollectionKind,
        /// Elements read before the input ran out.
        partial: Value,
    },
    /// A `\u` escape had a bad digit, ended early, or left a surrogate unpaired.
    #[error("malformed escape sequence: {0}")]
    MalformedEscape(String),
    /// A numeric escape decoded to a value outside its allowed range.
    #[error("invalid escape sequence: {0}")]
    InvalidEscape(String),
    /// A backslash in a string was followed by an unknown character.
    #[error("unsupported escape character: \\{0}")]
    UnrecognizedEscape(char),
    /// A symbol or keyword token with no characters.
    #[error("{0} can't be empty")]
    EmptyToken(TokenKind),
    /// A qualified token with nothing before the `/`.
    #[error("{kind} namespace can't be empty: {token}")]
    EmptyNamespace {
        /// Symbol or keyword.
        kind: TokenKind,
        /// The offending token text.
        token: String,
    },
    /// A qualified token with nothing after the `/`.
    #[error("{kind} name can't be empty: {token}")]
    EmptyName {
        /// Symbol or keyword.
        kind: TokenKind,
        /// The offending token text.
        token: String,
    },
    /// A map or set literal repeated an element.
    #[error("duplicate key {key} reading {}", Unclosed(.partial))]
    DuplicateKey {
        /// The repeated key or element.
        key: Value,
        /// The collection read so far.
        partial: Value,
    },
    /// A map literal closed after a key with no value.
    #[error("map literal must contain an even number of forms: {}, {key}", Unclosed(.partial))]
    OddNumberOfForms {
        /// The key left without a value.
        key: Value,
        /// The map read so far.
        partial: Value,
    },
    /// Metadata was applied to a value that cannot carry it.
    #[error("can't put metadata on {0}")]
    NonMetaAttachable(String),
    /// The form after `^` was not a symbol, keyword, string, vector or map.
    #[error("metadata must be a symbol, keyword, string, vector or map, got {0}")]
    InvalidMetadataShape(String),
    /// No handler and no default handler exist for a tag.
    #[error("no reader function for tag {0}")]
    UnknownTag(Symbol),
    /// A ratio whose numerator or denominator is not an integer.
    #[error("ratio operand must be an integer: {0}")]
    InvalidRatioOperand(String),
    /// A character that cannot start a form, or a mismatched closing delimiter.
    #[error("unexpected character: {0}")]
    UnexpectedCharacter(char),
    /// `##` followed by something other than `Inf`, `-Inf` or `NaN`.
    #[error("unknown symbolic value: ##{0}")]
    UnknownSymbolicValue(String),
    /// A `\uXXXX` or `\oNNN` character literal naming an invalid character.
    #[error("invalid character constant: \\{0}")]
    InvalidCharacterConstant(String),
    /// A character literal that is neither a single character nor a known name.
    #[error("unsupported character: \\{0}")]
    MalformedCharacterLiteral(String),
    /// Input ended where a form was required.
    #[error("EOF while reading")]
    UnexpectedEndOfInput,
    /// A numeric token that does not form a valid number.
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    /// The form after `#` was not a symbol.
    #[error("reader tag must be a symbol, got {0}")]
    InvalidTag(String),
    /// `#:` not followed by an unqualified keyword and a map.
    #[error("invalid namespaced map: {0}")]
    InvalidNamespacedMap(String),
    /// A tag handler rejected its value.
    #[error("reader function for tag {tag} failed: {message}")]
    TagHandler {
        /// The tag being read.
        tag: Symbol,
        /// The handler's error message.
        message: String,
    },
    /// The character source failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
