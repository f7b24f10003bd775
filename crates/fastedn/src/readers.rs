//! Tag handlers for `#tag value` literals.

use core::fmt;
use std::collections::HashMap;

use crate::value::{Symbol, Value};

/// Error type tag handlers report failures with.
pub type TagError = Box<dyn std::error::Error + Send + Sync>;

type TagFn = dyn Fn(Value) -> Result<Value, TagError> + Send + Sync;
type DefaultTagFn = dyn Fn(&Symbol, Value) -> Result<Value, TagError> + Send + Sync;

/// Handlers applied to tagged literals.
///
/// A tag is looked up in the handler table first; if absent the default
/// handler, when set, receives the tag and value; otherwise reading fails with
/// [`ErrorKind::UnknownTag`](crate::ErrorKind::UnknownTag).
///
/// # Examples
///
/// ```
/// use fastedn::{Parser, ParserOptions, Readers, StrSource, Value};
///
/// let readers = Readers::new().with("double", |v| match v {
///     Value::Integer(i) => Ok(Value::Integer(i * 2)),
///     other => Err(format!("expected an integer, got {other}").into()),
/// });
/// let mut parser = Parser::with_readers(StrSource::new("#double 21"), ParserOptions::default(), readers);
/// assert_eq!(parser.next_value().unwrap(), Value::Integer(42));
/// ```
#[derive(Default)]
pub struct Readers {
    handlers: HashMap<Symbol, Box<TagFn>>,
    default: Option<Box<DefaultTagFn>>,
}

impl Readers {
    /// No handlers and no default: every tag is an error.
    pub fn new() -> Self {
        Self::default()
    }

    /// A default handler that keeps unknown tags as [`Value::Tagged`].
    pub fn preserving() -> Self {
        Self::new().with_default(|tag, value| Ok(Value::Tagged(tag.clone(), Box::new(value))))
    }

    /// Registers `handler` for `tag`, replacing any previous handler.
    #[must_use]
    pub fn with<F>(mut self, tag: &str, handler: F) -> Self
    where
        F: Fn(Value) -> Result<Value, TagError> + Send + Sync + 'static,
    {
        self.insert(Symbol::parse(tag), handler);
        self
    }

    /// Sets the handler consulted for tags with no registered handler.
    #[must_use]
    pub fn with_default<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Symbol, Value) -> Result<Value, TagError> + Send + Sync + 'static,
    {
        self.default = Some(Box::new(handler));
        self
    }

    /// Registers `handler` for `tag`, replacing any previous handler.
    pub fn insert<F>(&mut self, tag: Symbol, handler: F)
    where
        F: Fn(Value) -> Result<Value, TagError> + Send + Sync + 'static,
    {
        self.handlers.insert(tag, Box::new(handler));
    }

    /// Applies the handler for `tag`. `Ok(None)` means no handler applies.
    pub(crate) fn apply(&self, tag: &Symbol, value: Value) -> Result<Option<Value>, TagError> {
        if let Some(handler) = self.handlers.get(tag) {
            return handler(value).map(Some);
        }
        match &self.default {
            Some(default) => default(tag, value).map(Some),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for Readers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Readers")
            .field("tags", &self.handlers.keys().collect::<Vec<_>>())
            .field("default", &self.default.is_some())
            .finish()
    }
}
