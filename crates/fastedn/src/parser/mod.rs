//! Recursive-descent EDN reader over a buffered character source.
//!
//! Overview
//! - [`Parser`] pulls blocks of characters from a [`CharSource`] into a
//!   fixed-capacity buffer and reads one top-level form per call.
//! - Scanners work directly on the buffered block when a token fits in it and
//!   fall back to a growable accumulator when the token crosses a refill. The
//!   capacity therefore affects speed, never results.
//! - Collections are read recursively. Each call to `read_form` yields a
//!   value, a closing delimiter for the enclosing collection to check, or the
//!   end of input. Comments and `#_` discards are consumed without yielding.
//! - Symbols and keywords are interned through a [`KeywordCache`] that the
//!   parser owns and can hand back for reuse.
//!
//! Errors
//! - Every error carries the character offset (or line and column) and an
//!   excerpt of the buffered text around the failure.
//! - Nothing is left half-done in the parser after an error; the next read
//!   starts wherever the failed one stopped.

mod accumulator;
mod buffer;
mod character;
mod chars;
mod escape_buffer;
mod lexer;
mod number;
mod string;
mod symbol;

use tracing::debug;

use self::{
    buffer::Buffer,
    chars::{is_boundary, is_whitespace},
    lexer::Lexer,
    symbol::Word,
};
use crate::{
    error::{CollectionKind, ErrorKind, ParseError, TokenKind},
    keyword_cache::KeywordCache,
    options::{OnEof, ParserOptions},
    readers::Readers,
    source::CharSource,
    value::{Keyword, Map, Meta, Seq, Set, Symbol, Value},
};

/// One step of the reader.
enum Form {
    Value(Value),
    /// A closing `)`, `]` or `}`.
    Close(char),
    End,
}

/// The accepted forms of `^meta`, before expansion to a map.
enum MetaShape {
    /// `^Foo` or `^"Foo"`: `{:tag Foo}`.
    Tag(Value),
    /// `^[A B]`: `{:param-tags [A B]}`.
    ParamTags(Value),
    /// `^:kw`: `{:kw true}`.
    Flag(Keyword),
    /// `^{...}`
    Map(Map),
}

/// A streaming EDN reader.
///
/// # Examples
///
/// ```
/// use fastedn::{Parser, ParserOptions, StrSource, Value};
///
/// let mut parser = Parser::new(StrSource::new("1 [2 3] ; done"), ParserOptions::default());
/// assert_eq!(parser.next_value().unwrap(), Value::Integer(1));
/// assert_eq!(parser.next_value().unwrap().to_string(), "[2 3]");
/// assert!(parser.next_value().is_err());
/// ```
pub struct Parser<S> {
    lexer: Lexer<S>,
    cache: KeywordCache,
    readers: Readers,
    options: ParserOptions,
    failed: bool,
}

impl<S: CharSource> Parser<S> {
    /// Creates a parser with no tag handlers.
    pub fn new(source: S, options: ParserOptions) -> Self {
        Self::with_readers(source, options, Readers::default())
    }

    /// Creates a parser that applies `readers` to tagged literals.
    pub fn with_readers(source: S, options: ParserOptions, readers: Readers) -> Self {
        let buffer = Buffer::new(source, options.buffer_capacity, options.track_lines);
        Self {
            lexer: Lexer::new(buffer),
            cache: KeywordCache::new(),
            readers,
            options,
            failed: false,
        }
    }

    /// Replaces the keyword cache, typically with one returned by
    /// [`into_cache`](Self::into_cache) from an earlier parser.
    #[must_use]
    pub fn with_cache(mut self, cache: KeywordCache) -> Self {
        self.cache = cache;
        self
    }

    /// Starts reading from a new source. Buffered input from the old source
    /// is discarded; the keyword cache and handlers are kept.
    pub fn attach(&mut self, source: S) {
        self.lexer.input.attach(source);
        self.failed = false;
    }

    /// The keyword cache.
    pub fn cache(&self) -> &KeywordCache {
        &self.cache
    }

    /// Consumes the parser, returning its keyword cache.
    pub fn into_cache(self) -> KeywordCache {
        self.cache
    }

    /// The tag handlers, for registering more.
    pub fn readers_mut(&mut self) -> &mut Readers {
        &mut self.readers
    }

    /// Characters consumed from the current source.
    pub fn offset(&self) -> usize {
        self.lexer.input.offset()
    }

    /// Reads the next top-level form, using the configured
    /// [`on_eof`](ParserOptions::on_eof) behavior at end of input.
    ///
    /// # Errors
    ///
    /// Any syntax, tag handler or source error.
    pub fn next_value(&mut self) -> Result<Value, ParseError> {
        match self.read_top()? {
            Some(value) => Ok(value),
            None => self.end_of_input(&self.options.on_eof),
        }
    }

    /// Reads the next top-level form. At end of input, returns the value in
    /// `on_eof` or fails, regardless of the configured behavior.
    ///
    /// # Errors
    ///
    /// Any syntax, tag handler or source error.
    pub fn parse_next(&mut self, on_eof: &OnEof) -> Result<Value, ParseError> {
        match self.read_top()? {
            Some(value) => Ok(value),
            None => self.end_of_input(on_eof),
        }
    }

    fn end_of_input(&self, on_eof: &OnEof) -> Result<Value, ParseError> {
        match on_eof {
            OnEof::Return(value) => Ok(value.clone()),
            OnEof::Error => Err(self.fail(ErrorKind::UnexpectedEndOfInput)),
        }
    }

    fn read_top(&mut self) -> Result<Option<Value>, ParseError> {
        let result = match self.read_form() {
            Ok(Form::Value(value)) => Ok(Some(value)),
            Ok(Form::Close(c)) => Err(self.error(ErrorKind::UnexpectedCharacter(c))),
            Ok(Form::End) => Ok(None),
            Err(err) => Err(err),
        };
        #[cfg(any(test, feature = "fuzzing"))]
        if let Err(err) = &result {
            assert!(!self.options.panic_on_error, "{err}");
        }
        result
    }

    fn error(&self, kind: ErrorKind) -> ParseError {
        self.lexer.error(kind)
    }

    fn fail(&self, kind: ErrorKind) -> ParseError {
        let err = self.error(kind);
        #[cfg(any(test, feature = "fuzzing"))]
        assert!(!self.options.panic_on_error, "{err}");
        err
    }

    fn read_form(&mut self) -> Result<Form, ParseError> {
        loop {
            let Some(c) = self.lexer.input.skip_while(is_whitespace)? else {
                return Ok(Form::End);
            };
            let value = match c {
                '"' => Value::String(self.lexer.scan_string()?),
                ':' => Value::Keyword(self.read_keyword(None)?),
                '(' => self.read_seq(CollectionKind::List)?,
                '[' => self.read_seq(CollectionKind::Vector)?,
                '{' => self.read_map(None)?,
                ')' | ']' | '}' => return Ok(Form::Close(c)),
                ';' => {
                    self.lexer.input.skip_while(|c| c != '\n' && c != '\r')?;
                    continue;
                }
                '\\' => Value::Character(self.lexer.scan_character()?),
                '^' => self.read_meta()?,
                '#' => match self.read_dispatch()? {
                    Some(value) => value,
                    None => continue,
                },
                '-' | '+' => self.read_signed(c)?,
                '0'..='9' => {
                    self.lexer.input.unread();
                    self.lexer.scan_number()?.into_value()
                }
                c if is_boundary(c) => return Err(self.error(ErrorKind::UnexpectedCharacter(c))),
                _ => {
                    self.lexer.input.unread();
                    self.read_symbol(None)?
                }
            };
            return Ok(Form::Value(value));
        }
    }

    /// Reads a form where one is required.
    fn read_value(&mut self) -> Result<Value, ParseError> {
        match self.read_form()? {
            Form::Value(value) => Ok(value),
            Form::Close(c) => Err(self.error(ErrorKind::UnexpectedCharacter(c))),
            Form::End => Err(self.error(ErrorKind::UnexpectedEndOfInput)),
        }
    }

    fn intern(&mut self, namespace: Option<&str>, name: &str) -> Symbol {
        if !self.options.keyword_cache {
            return Symbol::new(namespace, name);
        }
        let scratch = &mut self.lexer.scratch;
        scratch.clear();
        let mut slash = None;
        if let Some(ns) = namespace {
            for c in ns.chars() {
                scratch.push(c);
            }
            slash = Some(scratch.len());
            scratch.push('/');
        }
        for c in name.chars() {
            scratch.push(c);
        }
        self.cache.intern(scratch.as_slice(), slash)
    }

    fn scan_word(&mut self, lead: Option<char>, kind: TokenKind) -> Result<Word, ParseError> {
        let cache = self.options.keyword_cache.then_some(&mut self.cache);
        self.lexer.scan_word(lead, kind, cache)
    }

    fn read_symbol(&mut self, lead: Option<char>) -> Result<Value, ParseError> {
        Ok(match self.scan_word(lead, TokenKind::Symbol)? {
            Word::Nil => Value::Nil,
            Word::Boolean(b) => Value::Boolean(b),
            Word::Symbol(s) => Value::Symbol(s, Meta::default()),
        })
    }

    fn read_keyword(&mut self, lead: Option<char>) -> Result<Keyword, ParseError> {
        match self.scan_word(lead, TokenKind::Keyword)? {
            Word::Symbol(s) => Ok(Keyword(s)),
            Word::Nil | Word::Boolean(_) => unreachable!("keywords never resolve to literals"),
        }
    }

    /// `-` or `+`: a signed number, or a symbol starting with the sign.
    fn read_signed(&mut self, sign: char) -> Result<Value, ParseError> {
        match self.lexer.input.peek()? {
            Some(c) if c.is_ascii_digit() => {
                let number = self.lexer.scan_number()?;
                Ok(if sign == '-' { number.negate() } else { number }.into_value())
            }
            _ => self.read_symbol(Some(sign)),
        }
    }

    fn read_seq(&mut self, kind: CollectionKind) -> Result<Value, ParseError> {
        let (close, wrap): (char, fn(Seq, Meta) -> Value) = match kind {
            CollectionKind::List => (')', Value::List),
            _ => (']', Value::Vector),
        };
        let mut items = Seq::new();
        loop {
            match self.read_form()? {
                Form::Value(value) => items.push_back(value),
                Form::Close(c) if c == close => return Ok(wrap(items, Meta::default())),
                Form::Close(c) => return Err(self.error(ErrorKind::UnexpectedCharacter(c))),
                Form::End => {
                    return Err(self.error(ErrorKind::UnterminatedCollection {
                        kind,
                        partial: wrap(items, Meta::default()),
                    }));
                }
            }
        }
    }

    fn read_set(&mut self) -> Result<Value, ParseError> {
        let mut items = Set::new();
        loop {
            match self.read_form()? {
                Form::Value(value) => {
                    if items.contains(&value) {
                        return Err(self.error(ErrorKind::DuplicateKey {
                            key: value,
                            partial: Value::Set(items, Meta::default()),
                        }));
                    }
                    items.insert(value);
                }
                Form::Close('}') => return Ok(Value::Set(items, Meta::default())),
                Form::Close(c) => return Err(self.error(ErrorKind::UnexpectedCharacter(c))),
                Form::End => {
                    return Err(self.error(ErrorKind::UnterminatedCollection {
                        kind: CollectionKind::Set,
                        partial: Value::Set(items, Meta::default()),
                    }));
                }
            }
        }
    }

    /// Reads map entries up to `}`. Inside `#:ns{...}`, unqualified keyword
    /// and symbol keys take `namespace`, and keys in the `_` namespace lose it.
    fn read_map(&mut self, namespace: Option<&str>) -> Result<Value, ParseError> {
        let mut entries = Map::new();
        loop {
            let key = match self.read_form()? {
                Form::Value(key) => key,
                Form::Close('}') => return Ok(Value::Map(entries, Meta::default())),
                Form::Close(c) => return Err(self.error(ErrorKind::UnexpectedCharacter(c))),
                Form::End => return Err(self.unterminated_map(entries)),
            };
            let key = match namespace {
                Some(ns) => self.qualify(key, ns),
                None => key,
            };
            let value = match self.read_form()? {
                Form::Value(value) => value,
                Form::Close('}') => {
                    return Err(self.error(ErrorKind::OddNumberOfForms {
                        key,
                        partial: Value::Map(entries, Meta::default()),
                    }));
                }
                Form::Close(c) => return Err(self.error(ErrorKind::UnexpectedCharacter(c))),
                Form::End => return Err(self.unterminated_map(entries)),
            };
            if entries.contains_key(&key) {
                return Err(self.error(ErrorKind::DuplicateKey {
                    key,
                    partial: Value::Map(entries, Meta::default()),
                }));
            }
            entries.insert(key, value);
        }
    }

    fn unterminated_map(&self, entries: Map) -> ParseError {
        self.error(ErrorKind::UnterminatedCollection {
            kind: CollectionKind::Map,
            partial: Value::Map(entries, Meta::default()),
        })
    }

    fn qualify(&mut self, key: Value, namespace: &str) -> Value {
        let requalify = |this: &mut Self, symbol: &Symbol| match symbol.namespace() {
            None => Some(this.intern(Some(namespace), symbol.name())),
            Some("_") => Some(this.intern(None, symbol.name())),
            Some(_) => None,
        };
        match key {
            Value::Keyword(k) => match requalify(self, &k.0) {
                Some(s) => Value::Keyword(Keyword(s)),
                None => Value::Keyword(k),
            },
            Value::Symbol(s, meta) => match requalify(self, &s) {
                Some(q) => Value::Symbol(q, meta),
                None => Value::Symbol(s, meta),
            },
            other => other,
        }
    }

    fn read_meta(&mut self) -> Result<Value, ParseError> {
        let shape = match self.read_value()? {
            value @ (Value::Symbol(..) | Value::String(_)) => MetaShape::Tag(value),
            value @ Value::Vector(..) => MetaShape::ParamTags(value),
            Value::Keyword(k) => MetaShape::Flag(k),
            Value::Map(entries, _) => MetaShape::Map(entries),
            other => {
                return Err(self.error(ErrorKind::InvalidMetadataShape(format!(
                    "{} {other}",
                    other.type_name()
                ))));
            }
        };
        let meta = match shape {
            MetaShape::Tag(value) => Map::unit(Value::Keyword(Keyword(self.intern(None, "tag"))), value),
            MetaShape::ParamTags(value) => Map::unit(
                Value::Keyword(Keyword(self.intern(None, "param-tags"))),
                value,
            ),
            MetaShape::Flag(k) => Map::unit(Value::Keyword(k), Value::Boolean(true)),
            MetaShape::Map(entries) => entries,
        };
        let target = self.read_value()?;
        target.with_merged_meta(meta).map_err(|target| {
            self.error(ErrorKind::NonMetaAttachable(format!(
                "{} {target}",
                target.type_name()
            )))
        })
    }

    /// Handles the character after `#`. Returns `None` for `#_`.
    fn read_dispatch(&mut self) -> Result<Option<Value>, ParseError> {
        let Some(c) = self.lexer.input.read()? else {
            return Err(self.error(ErrorKind::UnexpectedEndOfInput));
        };
        match c {
            '{' => self.read_set().map(Some),
            '_' => {
                self.read_value()?;
                Ok(None)
            }
            '#' => self.read_symbolic().map(Some),
            ':' => self.read_namespaced_map().map(Some),
            _ => {
                self.lexer.input.unread();
                self.read_tagged().map(Some)
            }
        }
    }

    fn read_symbolic(&mut self) -> Result<Value, ParseError> {
        let token = self.lexer.scan_token(None)?;
        Ok(Value::from(match self.lexer.text(token.span) {
            ['I', 'n', 'f'] => f64::INFINITY,
            ['-', 'I', 'n', 'f'] => f64::NEG_INFINITY,
            ['N', 'a', 'N'] => f64::NAN,
            other => {
                let text = other.iter().collect();
                return Err(self.error(ErrorKind::UnknownSymbolicValue(text)));
            }
        }))
    }

    fn read_namespaced_map(&mut self) -> Result<Value, ParseError> {
        let keyword = self.read_keyword(None)?;
        if keyword.namespace().is_some() {
            return Err(self.error(ErrorKind::InvalidNamespacedMap(format!(
                "namespace must be unqualified, got :{}",
                keyword.0
            ))));
        }
        match self.lexer.input.skip_while(is_whitespace)? {
            Some('{') => {}
            Some(c) => {
                return Err(self.error(ErrorKind::InvalidNamespacedMap(format!(
                    "expected {{ after #:{}, got {c}",
                    keyword.0
                ))));
            }
            None => return Err(self.error(ErrorKind::UnexpectedEndOfInput)),
        }
        self.read_map(Some(keyword.name()))
    }

    fn read_tagged(&mut self) -> Result<Value, ParseError> {
        let tag = match self.read_value()? {
            Value::Symbol(tag, _) => tag,
            other => return Err(self.error(ErrorKind::InvalidTag(other.to_string()))),
        };
        let value = self.read_value()?;
        debug!(%tag, "reading tagged literal");
        match self.readers.apply(&tag, value) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(self.error(ErrorKind::UnknownTag(tag))),
            Err(err) => Err(self.error(ErrorKind::TagHandler {
                tag,
                message: err.to_string(),
            })),
        }
    }
}

/// Yields each top-level form until the input is exhausted. Iteration stops
/// after the first error.
impl<S: CharSource> Iterator for Parser<S> {
    type Item = Result<Value, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.read_top().transpose();
        if matches!(result, Some(Err(_))) {
            self.failed = true;
        }
        result
    }
}
