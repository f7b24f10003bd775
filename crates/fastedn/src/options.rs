use crate::value::Value;

/// Default size of the character buffer, in characters.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8192;

/// What [`Parser::next_value`](crate::Parser::next_value) does when the input
/// holds no further forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OnEof {
    /// Fail with [`ErrorKind::UnexpectedEndOfInput`](crate::ErrorKind::UnexpectedEndOfInput).
    #[default]
    Error,
    /// Return this value instead.
    Return(Value),
}

/// Configuration options for the EDN reader.
///
/// # Default
///
/// An 8192-character buffer, offset-only error positions, an error at end of
/// input, and keyword interning enabled.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Capacity of the character buffer the source is read into.
    ///
    /// Tokens shorter than the buffer are scanned in place; longer ones
    /// spill into a growable scratch buffer. Any capacity produces the same
    /// values. Zero is treated as one.
    ///
    /// # Default
    ///
    /// [`DEFAULT_BUFFER_CAPACITY`]
    pub buffer_capacity: usize,

    /// Whether errors report `line:column` instead of a character offset.
    ///
    /// Tracking costs one extra pass over each buffer as it is retired. Only
    /// `\n` starts a new line.
    ///
    /// # Default
    ///
    /// `false`
    pub track_lines: bool,

    /// Behavior when the input holds no further forms.
    ///
    /// # Default
    ///
    /// [`OnEof::Error`]
    pub on_eof: OnEof,

    /// Whether symbols and keywords are interned through a
    /// [`KeywordCache`](crate::KeywordCache).
    ///
    /// # Default
    ///
    /// `true`
    pub keyword_cache: bool,

    #[cfg(any(test, feature = "fuzzing"))]
    /// Panic on errors instead of returning them.
    ///
    /// Enabled only in test builds to produce backtraces on parse failures.
    pub panic_on_error: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            track_lines: false,
            on_eof: OnEof::Error,
            keyword_cache: true,
            #[cfg(any(test, feature = "fuzzing"))]
            panic_on_error: false,
        }
    }
}
