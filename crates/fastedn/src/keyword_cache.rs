//! Interning table for symbol and keyword names.
//!
//! Lookups are keyed by the raw character span of a token, so a hit costs one
//! hash over the span and one slice comparison, with no intermediate string.
//! Buckets are a power of two; when the load factor is exceeded the table
//! doubles and each chain is split in place into a "low" and a "high" chain by
//! testing the single hash bit that the doubled mask adds.

use tracing::trace;

use crate::value::Symbol;

const DEFAULT_CAPACITY: usize = 128;
const LOAD_FACTOR_NUM: usize = 3;
const LOAD_FACTOR_DEN: usize = 4;

/// Polynomial hash over characters: `h = 31 * h + c`, wrapping.
pub(crate) fn span_hash(chars: impl IntoIterator<Item = char>) -> u32 {
    chars
        .into_iter()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32))
}

struct Entry {
    hash: u32,
    span: Box<[char]>,
    slash: Option<usize>,
    symbol: Symbol,
    next: Option<Box<Entry>>,
}

/// Maps token text to a shared [`Symbol`].
///
/// A cache can outlive a single [`Parser`](crate::Parser) and be handed to the
/// next one with [`Parser::with_cache`](crate::Parser::with_cache), so names
/// seen in earlier documents stay interned.
pub struct KeywordCache {
    buckets: Vec<Option<Box<Entry>>>,
    len: usize,
}

impl KeywordCache {
    /// Creates an empty cache with the default bucket count.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty cache with at least `capacity` buckets, rounded up to
    /// a power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        Self {
            buckets: empty_buckets(capacity),
            len: 0,
        }
    }

    /// Number of distinct names interned.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current bucket count.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the symbol for `span`, creating and storing it on first sight.
    /// `slash` is the index of the namespace separator within `span`; the same
    /// text split differently is a different entry.
    pub(crate) fn intern(&mut self, span: &[char], slash: Option<usize>) -> Symbol {
        let hash = span_hash(span.iter().copied());
        let index = hash as usize & (self.buckets.len() - 1);

        let mut node = self.buckets[index].as_deref();
        while let Some(entry) = node {
            if entry.hash == hash && entry.slash == slash && *entry.span == *span {
                return entry.symbol.clone();
            }
            node = entry.next.as_deref();
        }

        let symbol = Symbol::from_span(span, slash, hash);
        let next = self.buckets[index].take();
        self.buckets[index] = Some(Box::new(Entry {
            hash,
            span: span.into(),
            slash,
            symbol: symbol.clone(),
            next,
        }));
        self.len += 1;

        if self.len * LOAD_FACTOR_DEN > self.buckets.len() * LOAD_FACTOR_NUM {
            self.grow();
        }
        symbol
    }

    /// Returns the interned symbol for an already split name, if present.
    pub fn get(&self, namespace: Option<&str>, name: &str) -> Option<Symbol> {
        let probe = Symbol::new(namespace, name);
        let hash = probe.span_hash();
        let mut node = self.buckets[hash as usize & (self.buckets.len() - 1)].as_deref();
        while let Some(entry) = node {
            if entry.hash == hash && entry.symbol == probe {
                return Some(entry.symbol.clone());
            }
            node = entry.next.as_deref();
        }
        None
    }

    fn grow(&mut self) {
        let old_capacity = self.buckets.len();
        let mut buckets = empty_buckets(old_capacity * 2);

        for (index, slot) in self.buckets.iter_mut().enumerate() {
            let mut lo: Option<Box<Entry>> = None;
            let mut hi: Option<Box<Entry>> = None;
            let mut chain = slot.take();
            while let Some(mut entry) = chain {
                chain = entry.next.take();
                let side = if entry.hash as usize & old_capacity == 0 {
                    &mut lo
                } else {
                    &mut hi
                };
                entry.next = side.take();
                *side = Some(entry);
            }
            buckets[index] = lo;
            buckets[index + old_capacity] = hi;
        }

        trace!(
            from = old_capacity,
            to = buckets.len(),
            entries = self.len,
            "grew keyword cache"
        );
        self.buckets = buckets;
    }
}

impl Default for KeywordCache {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for KeywordCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeywordCache")
            .field("len", &self.len)
            .field("capacity", &self.buckets.len())
            .finish()
    }
}

impl Drop for KeywordCache {
    fn drop(&mut self) {
        // Unlink chains iteratively so long chains cannot overflow the stack.
        for slot in &mut self.buckets {
            let mut chain = slot.take();
            while let Some(mut entry) = chain {
                chain = entry.next.take();
            }
        }
    }
}

fn empty_buckets(capacity: usize) -> Vec<Option<Box<Entry>>> {
    core::iter::repeat_with(|| None).take(capacity).collect()
}
