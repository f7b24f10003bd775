//! A buffered, streaming reader for EDN (extensible data notation).
//!
//! Characters are pulled from a [`CharSource`] in fixed-size blocks. Tokens
//! that fit in the current block are scanned in place, and only tokens that
//! cross a block boundary are copied. Symbols and keywords are interned
//! through a reusable [`KeywordCache`].
//!
//! ```
//! use fastedn::Value;
//!
//! let value = fastedn::from_str(r#"{:name "fastedn", :tags #{:edn :reader}}"#).unwrap();
//! let Value::Map(entries, _) = &value else { unreachable!() };
//! assert_eq!(entries.get(&Value::keyword("name")), Some(&Value::from("fastedn")));
//! ```

mod error;
mod keyword_cache;
mod options;
mod parser;
mod readers;
mod source;
mod value;

#[cfg(test)]
mod tests;

use std::io;

pub use error::{CollectionKind, ErrorKind, ParseError, TokenKind};
pub use keyword_cache::KeywordCache;
pub use options::{DEFAULT_BUFFER_CAPACITY, OnEof, ParserOptions};
pub use parser::Parser;
pub use readers::{Readers, TagError};
pub use source::{CharSource, ChunkedSource, IterSource, StrSource, Utf8Source};
pub use value::{Keyword, Map, Meta, Seq, Set, Symbol, Value};

/// Reads the first form in `text`.
///
/// # Errors
///
/// Any syntax error, an unknown tag, or empty input.
pub fn from_str(text: &str) -> Result<Value, ParseError> {
    Parser::new(StrSource::new(text), ParserOptions::default()).next_value()
}

/// Reads every top-level form in `text`.
///
/// # Errors
///
/// The first syntax error or unknown tag.
pub fn from_str_all(text: &str) -> Result<Vec<Value>, ParseError> {
    Parser::new(StrSource::new(text), ParserOptions::default()).collect()
}

/// Reads the first form from UTF-8 encoded bytes.
///
/// # Errors
///
/// Any syntax error, an unknown tag, empty input, or an I/O or UTF-8 error
/// from `reader`.
pub fn from_reader<R: io::Read>(reader: R) -> Result<Value, ParseError> {
    Parser::new(Utf8Source::new(reader), ParserOptions::default()).next_value()
}
