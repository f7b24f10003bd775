//! Symbols, keywords and the `nil`/`true`/`false` literals.

use super::lexer::Lexer;
use crate::{
    error::{ErrorKind, ParseError, TokenKind},
    keyword_cache::{KeywordCache, span_hash},
    source::CharSource,
    value::Symbol,
};

/// A resolved symbol-like token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Word {
    Nil,
    Boolean(bool),
    Symbol(Symbol),
}

impl<S: CharSource> Lexer<S> {
    /// Scans a symbol or keyword body and resolves it, interning through
    /// `cache` when one is given. Keywords never resolve to literals.
    pub(crate) fn scan_word(
        &mut self,
        lead: Option<char>,
        kind: TokenKind,
        cache: Option<&mut KeywordCache>,
    ) -> Result<Word, ParseError> {
        let token = self.scan_token(lead)?;
        let span = self.text(token.span);

        if kind == TokenKind::Symbol {
            match span {
                ['n', 'i', 'l'] => return Ok(Word::Nil),
                ['t', 'r', 'u', 'e'] => return Ok(Word::Boolean(true)),
                ['f', 'a', 'l', 's', 'e'] => return Ok(Word::Boolean(false)),
                _ => {}
            }
        }

        let slash = match (span, token.slash) {
            ([], _) => return Err(self.error(ErrorKind::EmptyToken(kind))),
            (['/'], _) => None,
            (_, Some(0)) => {
                return Err(self.error(ErrorKind::EmptyNamespace {
                    kind,
                    token: span.iter().collect(),
                }));
            }
            (_, Some(at)) if at + 1 == span.len() => {
                return Err(self.error(ErrorKind::EmptyName {
                    kind,
                    token: span.iter().collect(),
                }));
            }
            (_, slash) => slash,
        };

        Ok(Word::Symbol(match cache {
            Some(cache) => cache.intern(span, slash),
            None => Symbol::from_span(span, slash, span_hash(span.iter().copied())),
        }))
    }
}
