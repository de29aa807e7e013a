//! # Native Value Model
//!
//! `Value` is the in-memory side of the codec: everything a caller can hand
//! to `pack` and everything `unpack` can hand back. It is a closed tagged
//! union, so the codec dispatches with an exhaustive `match` instead of
//! probing types at runtime.
//!
//! Two variants exist only to be refused: `Bytes` has no JSON form, and
//! `Response` stands for a live I/O-bound object that must never be cached.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_json::Number;

use crate::decimal::Decimal;
use crate::error::CodecError;
use crate::identity::ObjectId;
use crate::record::{Record, RecordValue};
use crate::temporal::Timestamp;

/// Any value the codec can be asked to pack or can produce by unpacking.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer or finite float.
    Number(Number),
    /// Text.
    String(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Naive or aware datetime.
    DateTime(Timestamp),
    /// Exact decimal.
    Decimal(Decimal),
    /// External object id.
    ObjectId(ObjectId),
    /// Unordered collection without duplicates.
    Set(ValueSet),
    /// Fixed-arity heterogeneous sequence.
    Tuple(Vec<Value>),
    /// Ordered sequence.
    List(Vec<Value>),
    /// String-keyed mapping.
    Map(BTreeMap<String, Value>),
    /// Instance of a structured record type.
    Record(RecordValue),
    /// Raw octets. Not representable in JSON.
    Bytes(Vec<u8>),
    /// Live response handle. Never serializable.
    Response(ResponseHandle),
}

impl Value {
    /// Build a number from a float.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::NonFiniteFloat` for NaN and infinities.
    pub fn float(f: f64) -> Result<Self, CodecError> {
        Number::from_f64(f)
            .map(Self::Number)
            .ok_or(CodecError::NonFiniteFloat(f))
    }

    /// Build a tuple.
    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Tuple(items.into_iter().collect())
    }

    /// Build a list.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Build a set, dropping duplicates.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Set(items.into_iter().collect())
    }

    /// Build a mapping.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Wrap a record instance.
    pub fn record<T: Record>(record: T) -> Self {
        Self::Record(RecordValue::new(record))
    }

    /// Short name of this value's kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Decimal(_) => "decimal",
            Self::ObjectId(_) => "object_id",
            Self::Set(_) => "set",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
            Self::Bytes(_) => "bytes",
            Self::Response(_) => "response",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }
}

/// Unordered collection of values without duplicates.
///
/// `Value` holds floats, so it cannot be `Hash`/`Eq`; membership is checked
/// by equality instead. Two sets are equal when they hold the same elements
/// in any order.
#[derive(Debug, Clone, Default)]
pub struct ValueSet(Vec<Value>);

impl ValueSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert `value`, returning false if an equal element was present.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.contains(&value) {
            return false;
        }
        self.0.push(value);
        true
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = Self::new();
        for v in iter {
            set.insert(v);
        }
        set
    }
}

impl IntoIterator for ValueSet {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Handle to a live HTTP response.
///
/// Responses own a connection and a body stream. Caching one would store a
/// snapshot that silently diverges from the resource, so `pack` refuses them
/// outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHandle {
    /// HTTP status code.
    pub status: u16,
    /// URL the response was fetched from.
    pub url: String,
}

// -- Conversions --------------------------------------------------------------

macro_rules! number_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Self::Number(Number::from(n))
                }
            }
        )*
    };
}

number_from!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl TryFrom<f64> for Value {
    type Error = CodecError;

    fn try_from(f: f64) -> Result<Self, Self::Error> {
        Self::float(f)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(Timestamp::Naive(dt))
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::DateTime(Timestamp::Aware(dt))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(Timestamp::from(dt))
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Self::DateTime(ts)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Self::ObjectId(id)
    }
}

impl From<ValueSet> for Value {
    fn from(set: ValueSet) -> Self {
        Self::Set(set)
    }
}

impl From<RecordValue> for Value {
    fn from(r: RecordValue) -> Self {
        Self::Record(r)
    }
}

impl From<ResponseHandle> for Value {
    fn from(r: ResponseHandle) -> Self {
        Self::Response(r)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(entries: BTreeMap<String, V>) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Self::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>> From<(A, B, C)> for Value {
    fn from((a, b, c): (A, B, C)) -> Self {
        Self::Tuple(vec![a.into(), b.into(), c.into()])
    }
}
