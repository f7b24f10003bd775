//! EDN values.
//!
//! [`Value`] covers every form the reader produces. Collections are persistent
//! (`im`) so partially built collections can be handed to errors cheaply, and
//! maps and sets are ordered so that printing is deterministic.
//!
//! Symbols and keywords share a single interned [`Symbol`] representation. Two
//! symbols read through the same [`KeywordCache`](crate::KeywordCache) with
//! the same text are backed by the same allocation, which
//! [`Symbol::ptr_eq`] exposes.

use core::{
    cmp::Ordering,
    fmt::{self, Write as _},
    hash::{Hash, Hasher},
};
use std::sync::Arc;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::ToPrimitive;
use ordered_float::OrderedFloat;

use crate::keyword_cache::span_hash;

/// Ordered map of EDN values.
pub type Map = im::OrdMap<Value, Value>;
/// Ordered set of EDN values.
pub type Set = im::OrdSet<Value>;
/// Sequence used for both lists and vectors.
pub type Seq = im::Vector<Value>;

/// An EDN value.
///
/// Equality, ordering and hashing ignore [`Meta`], so `^:private foo` equals
/// `foo`. Integers that fit in an `i64` are [`Value::Integer`]; values forced
/// with an `N` suffix or too large for `i64` are [`Value::BigInt`]. The two
/// compare by numeric value, so `1` equals `1N` and `#{1 1N}` is a duplicate,
/// while each keeps its own printed form.
///
/// # Examples
///
/// ```
/// use fastedn::Value;
///
/// let v = fastedn::from_str("[1 :a \"b\"]").unwrap();
/// assert_eq!(v.to_string(), "[1 :a \"b\"]");
/// ```
#[derive(Clone, Debug)]
pub enum Value {
    /// `nil`
    Nil,
    /// `true` or `false`
    Boolean(bool),
    /// `\c`, `\newline`, `A`, ...
    Character(char),
    /// `"..."`
    String(String),
    /// An integer that fits in 64 bits.
    Integer(i64),
    /// An arbitrary-precision integer.
    BigInt(BigInt),
    /// A double-precision float, including `##Inf`, `##-Inf` and `##NaN`.
    Float(OrderedFloat<f64>),
    /// An arbitrary-precision decimal, written with an `M` suffix.
    Decimal(BigDecimal),
    /// An exact ratio in lowest terms with a denominator greater than one.
    Ratio(BigRational),
    /// A symbol and its metadata.
    Symbol(Symbol, Meta),
    /// A keyword.
    Keyword(Keyword),
    /// `( ... )` and its metadata.
    List(Seq, Meta),
    /// `[ ... ]` and its metadata.
    Vector(Seq, Meta),
    /// `#{ ... }` and its metadata.
    Set(Set, Meta),
    /// `{ ... }` and its metadata.
    Map(Map, Meta),
    /// A tagged literal preserved without interpretation.
    Tagged(Symbol, Box<Value>),
}

impl Value {
    /// Builds a list without metadata.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect(), Meta::default())
    }

    /// Builds a vector without metadata.
    pub fn vector(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Vector(items.into_iter().collect(), Meta::default())
    }

    /// Builds a set without metadata.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Set(items.into_iter().collect(), Meta::default())
    }

    /// Builds a map without metadata.
    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Map(entries.into_iter().collect(), Meta::default())
    }

    /// Builds an uninterned symbol from `ns/name` or `name` text.
    pub fn symbol(text: &str) -> Self {
        Value::Symbol(Symbol::parse(text), Meta::default())
    }

    /// Builds an uninterned keyword from `ns/name` or `name` text, without the
    /// leading colon.
    pub fn keyword(text: &str) -> Self {
        Value::Keyword(Keyword(Symbol::parse(text)))
    }

    /// A short name for the kind of value, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Character(_) => "character",
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::BigInt(_) => "bigint",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Ratio(_) => "ratio",
            Value::Symbol(..) => "symbol",
            Value::Keyword(_) => "keyword",
            Value::List(..) => "list",
            Value::Vector(..) => "vector",
            Value::Set(..) => "set",
            Value::Map(..) => "map",
            Value::Tagged(..) => "tagged literal",
        }
    }

    /// The metadata map attached to this value, if any.
    pub fn meta(&self) -> Option<&Map> {
        match self {
            Value::Symbol(_, meta)
            | Value::List(_, meta)
            | Value::Vector(_, meta)
            | Value::Set(_, meta)
            | Value::Map(_, meta) => meta.get(),
            _ => None,
        }
    }

    /// Merges `newer` over this value's metadata, with keys in `newer`
    /// winning. Returns the value unchanged in `Err` when it cannot carry
    /// metadata.
    pub(crate) fn with_merged_meta(self, newer: Map) -> Result<Value, Value> {
        Ok(match self {
            Value::Symbol(s, meta) => Value::Symbol(s, meta.merged(newer)),
            Value::List(items, meta) => Value::List(items, meta.merged(newer)),
            Value::Vector(items, meta) => Value::Vector(items, meta.merged(newer)),
            Value::Set(items, meta) => Value::Set(items, meta.merged(newer)),
            Value::Map(entries, meta) => Value::Map(entries, meta.merged(newer)),
            other => return Err(other),
        })
    }
}

impl Value {
    /// Position in the cross-type ordering. Integers of either width share a
    /// rank.
    fn rank(&self) -> u8 {
        match self {
            Value::Nil => 0,
            Value::Boolean(_) => 1,
            Value::Character(_) => 2,
            Value::String(_) => 3,
            Value::Integer(_) | Value::BigInt(_) => 4,
            Value::Float(_) => 5,
            Value::Decimal(_) => 6,
            Value::Ratio(_) => 7,
            Value::Symbol(..) => 8,
            Value::Keyword(_) => 9,
            Value::List(..) => 10,
            Value::Vector(..) => 11,
            Value::Set(..) => 12,
            Value::Map(..) => 13,
            Value::Tagged(..) => 14,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Nil, Value::Nil) => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Character(a), Value::Character(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Integer(a), Value::BigInt(b)) => BigInt::from(*a).cmp(b),
            (Value::BigInt(a), Value::Integer(b)) => a.cmp(&BigInt::from(*b)),
            (Value::BigInt(a), Value::BigInt(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (Value::Ratio(a), Value::Ratio(b)) => a.cmp(b),
            (Value::Symbol(a, _), Value::Symbol(b, _)) => a.cmp(b),
            (Value::Keyword(a), Value::Keyword(b)) => a.cmp(b),
            (Value::List(a, _), Value::List(b, _)) | (Value::Vector(a, _), Value::Vector(b, _)) => a.cmp(b),
            (Value::Set(a, _), Value::Set(b, _)) => a.cmp(b),
            (Value::Map(a, _), Value::Map(b, _)) => a.cmp(b),
            (Value::Tagged(a, x), Value::Tagged(b, y)) => a.cmp(b).then_with(|| x.cmp(y)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.rank());
        match self {
            Value::Nil => {}
            Value::Boolean(b) => b.hash(state),
            Value::Character(c) => c.hash(state),
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::BigInt(b) => match b.to_i64() {
                Some(i) => i.hash(state),
                None => b.hash(state),
            },
            Value::Float(f) => f.hash(state),
            Value::Decimal(d) => d.hash(state),
            Value::Ratio(r) => r.hash(state),
            Value::Symbol(s, _) => s.hash(state),
            Value::Keyword(k) => k.hash(state),
            Value::List(items, _) | Value::Vector(items, _) => items.hash(state),
            Value::Set(items, _) => items.hash(state),
            Value::Map(entries, _) => entries.hash(state),
            Value::Tagged(tag, value) => {
                tag.hash(state);
                value.hash(state);
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(OrderedFloat(v))
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Character(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Keyword> for Value {
    fn from(v: Keyword) -> Self {
        Value::Keyword(v)
    }
}

impl From<Symbol> for Value {
    fn from(v: Symbol) -> Self {
        Value::Symbol(v, Meta::default())
    }
}

/// Metadata attached to a symbol or collection.
///
/// Metadata never takes part in equality, ordering or hashing of the value it
/// is attached to.
#[derive(Clone, Default)]
pub struct Meta(Option<Arc<Map>>);

impl Meta {
    /// Wraps a metadata map. An empty map is the same as no metadata.
    pub fn new(map: Map) -> Self {
        if map.is_empty() {
            Meta(None)
        } else {
            Meta(Some(Arc::new(map)))
        }
    }

    /// The metadata map, if any.
    pub fn get(&self) -> Option<&Map> {
        self.0.as_deref()
    }

    /// Whether no metadata is attached.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    fn merged(self, newer: Map) -> Meta {
        match self.0 {
            None => Meta::new(newer),
            Some(older) => Meta::new(newer.union(Arc::unwrap_or_clone(older))),
        }
    }
}

impl fmt::Debug for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(map) => f.debug_tuple("Meta").field(map).finish(),
            None => f.write_str("Meta(None)"),
        }
    }
}

impl PartialEq for Meta {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for Meta {}

impl PartialOrd for Meta {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Meta {
    fn cmp(&self, _: &Self) -> Ordering {
        Ordering::Equal
    }
}

impl Hash for Meta {
    fn hash<H: Hasher>(&self, _: &mut H) {}
}

struct QualifiedName {
    namespace: Option<Box<str>>,
    name: Box<str>,
    hash: u32,
}

/// A possibly namespace-qualified name, shared by symbols and keywords.
///
/// Cloning is a reference count bump. Equality compares text, with a pointer
/// check first, so interned and uninterned symbols with the same text are
/// equal.
#[derive(Clone)]
pub struct Symbol(Arc<QualifiedName>);

impl Symbol {
    /// Creates an uninterned symbol.
    pub fn new(namespace: Option<&str>, name: &str) -> Self {
        let chars = namespace
            .into_iter()
            .flat_map(|ns| ns.chars().chain(['/']))
            .chain(name.chars());
        Symbol(Arc::new(QualifiedName {
            namespace: namespace.map(Box::from),
            name: Box::from(name),
            hash: span_hash(chars),
        }))
    }

    /// Splits `text` at its first `/` into namespace and name. A lone `/` is
    /// the unqualified symbol named `/`.
    pub fn parse(text: &str) -> Self {
        match text.split_once('/') {
            Some((ns, name)) if text != "/" => Symbol::new(Some(ns), name),
            _ => Symbol::new(None, text),
        }
    }

    /// Builds a symbol from a token span. `slash` is the index of the
    /// namespace separator within `span`.
    pub(crate) fn from_span(span: &[char], slash: Option<usize>, hash: u32) -> Self {
        let (namespace, name) = match slash {
            Some(at) => (Some(span[..at].iter().collect::<String>()), &span[at + 1..]),
            None => (None, span),
        };
        Symbol(Arc::new(QualifiedName {
            namespace: namespace.map(String::into_boxed_str),
            name: name.iter().collect::<String>().into_boxed_str(),
            hash,
        }))
    }

    /// The namespace part, if qualified.
    pub fn namespace(&self) -> Option<&str> {
        self.0.namespace.as_deref()
    }

    /// The name part.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Whether both symbols share one allocation, i.e. were interned together.
    pub fn ptr_eq(a: &Symbol, b: &Symbol) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn span_hash(&self) -> u32 {
        self.0.hash
    }
}

impl From<&str> for Symbol {
    fn from(text: &str) -> Self {
        Symbol::parse(text)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Symbol::ptr_eq(self, other)
            || (self.0.hash == other.0.hash
                && self.0.name == other.0.name
                && self.0.namespace == other.0.namespace)
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.namespace()
            .cmp(&other.namespace())
            .then_with(|| self.name().cmp(other.name()))
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.0.hash);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = self.namespace() {
            f.write_str(ns)?;
            f.write_char('/')?;
        }
        f.write_str(self.name())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({self})")
    }
}

/// A keyword. It carries the same interned name as a symbol, without the
/// leading colon.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Keyword(pub(crate) Symbol);

impl Keyword {
    /// Creates an uninterned keyword.
    pub fn new(namespace: Option<&str>, name: &str) -> Self {
        Keyword(Symbol::new(namespace, name))
    }

    /// The underlying name.
    pub fn symbol(&self) -> &Symbol {
        &self.0
    }

    /// The namespace part, if qualified.
    pub fn namespace(&self) -> Option<&str> {
        self.0.namespace()
    }

    /// The name part.
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// Whether both keywords share one interned name.
    pub fn ptr_eq(a: &Keyword, b: &Keyword) -> bool {
        Symbol::ptr_eq(&a.0, &b.0)
    }
}

impl From<Symbol> for Keyword {
    fn from(symbol: Symbol) -> Self {
        Keyword(symbol)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keyword({self})")
    }
}

fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{8}' => f.write_str("\\b")?,
            '\u{c}' => f.write_str("\\f")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

fn write_character(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    match c {
        '\n' => f.write_str("\\newline"),
        '\r' => f.write_str("\\return"),
        ' ' => f.write_str("\\space"),
        '\t' => f.write_str("\\tab"),
        '\u{8}' => f.write_str("\\backspace"),
        '\u{c}' => f.write_str("\\formfeed"),
        c if c.is_control() || c.is_whitespace() => write!(f, "\\u{:04x}", c as u32),
        c => write!(f, "\\{c}"),
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        f.write_str("##NaN")
    } else if v.is_infinite() {
        f.write_str(if v > 0.0 { "##Inf" } else { "##-Inf" })
    } else {
        // Debug always keeps a `.` or exponent, so the text reads back as a float.
        write!(f, "{v:?}")
    }
}

fn write_items<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = &'a Value>,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_char(' ')?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_entries<'a>(
    f: &mut fmt::Formatter<'_>,
    entries: impl IntoIterator<Item = (&'a Value, &'a Value)>,
) -> fmt::Result {
    for (i, (k, v)) in entries.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{k} {v}")?;
    }
    Ok(())
}

/// Writes a value as EDN text. Metadata is not printed.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::List(..) => write!(f, "{})", Unclosed(self)),
            Value::Vector(..) => write!(f, "{}]", Unclosed(self)),
            Value::Set(..) | Value::Map(..) => write!(f, "{}}}", Unclosed(self)),
            Value::Symbol(s, _) => write!(f, "{s}"),
            Value::Nil => f.write_str("nil"),
            Value::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            Value::Character(c) => write_character(f, *c),
            Value::String(s) => write_string(f, s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::BigInt(i) => write!(f, "{i}N"),
            Value::Float(v) => write_float(f, v.0),
            Value::Decimal(d) => write!(f, "{d}M"),
            Value::Ratio(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Value::Keyword(k) => write!(f, "{k}"),
            Value::Tagged(tag, value) => write!(f, "#{tag} {value}"),
        }
    }
}

/// Renders a collection without its closing delimiter, the way a partially
/// read collection is shown in error messages. Other values print normally.
pub(crate) struct Unclosed<'a>(pub(crate) &'a Value);

impl fmt::Display for Unclosed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::List(items, _) => {
                f.write_char('(')?;
                write_items(f, items)
            }
            Value::Vector(items, _) => {
                f.write_char('[')?;
                write_items(f, items)
            }
            Value::Set(items, _) => {
                f.write_str("#{")?;
                write_items(f, items)
            }
            Value::Map(entries, _) => {
                f.write_char('{')?;
                write_entries(f, entries)
            }
            other => write!(f, "{other}"),
        }
    }
}
