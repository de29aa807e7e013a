//! # Structured Records
//!
//! A record is a fixed-shape, named-field type. Instead of reflecting over
//! arbitrary types, each record type describes itself through
//! [`Record::descriptor`] and moves its fields in and out explicitly:
//!
//! - [`Record::field_values`] reads every declared field from the instance
//!   directly. Nested records stay `Value::Record`, so the codec can give
//!   each its own MODEL envelope.
//! - [`Record::from_fields`] rebuilds an instance from a [`Fields`] map whose
//!   values were already decoded against the declared shapes.
//!
//! ```ignore
//! #[derive(Debug, Clone, PartialEq)]
//! struct User {
//!     id: String,
//!     joined: NaiveDate,
//! }
//!
//! impl Record for User {
//!     fn descriptor() -> RecordDescriptor {
//!         RecordDescriptor::new(module_path!(), "User")
//!             .field("id", Shape::Str)
//!             .field("joined", Shape::Date)
//!     }
//!
//!     fn field_values(&self) -> Vec<(&'static str, Value)> {
//!         vec![("id", self.id.clone().into()), ("joined", self.joined.into())]
//!     }
//!
//!     fn from_fields(fields: &mut Fields) -> Result<Self, CodecError> {
//!         Ok(Self { id: fields.take("id")?, joined: fields.take("joined")? })
//!     }
//! }
//! ```

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::decimal::Decimal;
use crate::error::CodecError;
use crate::identity::ObjectId;
use crate::shape::Shape;
use crate::temporal::Timestamp;
use crate::value::{Value, ValueSet};

/// A fixed-shape, named-field type the codec can carry in a MODEL envelope.
pub trait Record: Any + fmt::Debug + Clone + PartialEq + Send + Sync {
    /// Static description of the type and its fields.
    fn descriptor() -> RecordDescriptor;

    /// Every declared field, read from the instance.
    fn field_values(&self) -> Vec<(&'static str, Value)>;

    /// Build an instance, taking fields out of `fields`.
    ///
    /// Fields left behind are reported as unexpected by the caller.
    fn from_fields(fields: &mut Fields) -> Result<Self, CodecError>;
}

/// One declared record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub shape: Shape,
}

/// Declaring location, name and fields of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDescriptor {
    /// Module the type is declared in, usually `module_path!()`.
    pub module_path: &'static str,
    /// Unqualified type name.
    pub type_name: &'static str,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    pub fn new(module_path: &'static str, type_name: &'static str) -> Self {
        Self {
            module_path,
            type_name,
            fields: Vec::new(),
        }
    }

    /// Append a field declaration.
    pub fn field(mut self, name: &'static str, shape: Shape) -> Self {
        self.fields.push(FieldDescriptor { name, shape });
        self
    }

    /// `module::path::TypeName`.
    pub fn qualified_name(&self) -> String {
        if self.module_path.is_empty() {
            self.type_name.to_string()
        } else {
            format!("{}::{}", self.module_path, self.type_name)
        }
    }

    /// Declared shape of `name`, if the field exists.
    pub fn field_shape(&self, name: &str) -> Option<&Shape> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.shape)
    }
}

// -- Type-erased record handle ------------------------------------------------

trait DynRecord: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn record_type(&self) -> TypeId;
    fn type_name(&self) -> &'static str;
    fn field_values(&self) -> Vec<(&'static str, Value)>;
    fn dyn_eq(&self, other: &dyn DynRecord) -> bool;
}

impl<T: Record> DynRecord for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn record_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        Record::field_values(self)
    }

    fn dyn_eq(&self, other: &dyn DynRecord) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|o| self == o)
    }
}

/// A record instance of some registered-or-not type.
///
/// Cloning shares the instance. Two handles are equal when they hold the
/// same concrete type and the instances compare equal.
#[derive(Clone)]
pub struct RecordValue(Arc<dyn DynRecord>);

impl RecordValue {
    pub fn new<T: Record>(record: T) -> Self {
        Self(Arc::new(record))
    }

    /// `TypeId` of the concrete record type.
    pub fn record_type(&self) -> TypeId {
        self.0.record_type()
    }

    /// Compiler-provided name of the concrete type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    pub fn field_values(&self) -> Vec<(&'static str, Value)> {
        self.0.field_values()
    }

    pub fn is<T: Record>(&self) -> bool {
        self.record_type() == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: Record>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Clone out the concrete instance.
    pub fn downcast<T: Record>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }
}

impl PartialEq for RecordValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(other.0.as_ref())
    }
}

impl fmt::Debug for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

// -- Field map -----------------------------------------------------------------

/// Decoded field values handed to [`Record::from_fields`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self(values)
    }

    /// Take a required field.
    ///
    /// # Errors
    ///
    /// `MissingField` if absent; `Field` wrapping the conversion error if the
    /// value does not convert to `T`.
    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T, CodecError> {
        let value = self.0.remove(name).ok_or_else(|| CodecError::MissingField {
            field: name.to_string(),
        })?;
        convert_field(name, value)
    }

    /// Take a field that may be absent or null.
    pub fn take_optional<T: FromValue>(&mut self, name: &str) -> Result<Option<T>, CodecError> {
        match self.0.remove(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => convert_field(name, value).map(Some),
        }
    }

    /// Take a required field holding a nested record.
    pub fn take_record<T: Record>(&mut self, name: &str) -> Result<T, CodecError> {
        let record: RecordValue = self.take(name)?;
        let found = record.type_name();
        record.downcast::<T>().ok_or_else(|| CodecError::Field {
            field: name.to_string(),
            source: Box::new(CodecError::ValueMismatch {
                expected: std::any::type_name::<T>(),
                found,
            }),
        })
    }

    /// Put a value back, e.g. to default a field before construction.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fail on the first field nobody took.
    pub fn finish(self) -> Result<(), CodecError> {
        match self.0.into_keys().next() {
            Some(field) => Err(CodecError::UnexpectedField { field }),
            None => Ok(()),
        }
    }
}

fn convert_field<T: FromValue>(name: &str, value: Value) -> Result<T, CodecError> {
    T::from_value(value).map_err(|e| CodecError::Field {
        field: name.to_string(),
        source: Box::new(e),
    })
}

// -- FromValue -------------------------------------------------------------------

/// Conversion from a decoded [`Value`] into a concrete field type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, CodecError>;
}

fn mismatch<T>(expected: &'static str, found: &Value) -> Result<T, CodecError> {
    Err(CodecError::ValueMismatch {
        expected,
        found: found.kind(),
    })
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::String(s) => Ok(s),
            other => mismatch("string", &other),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => mismatch("bool", &other),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value.as_i64() {
            Some(n) => Ok(n),
            None => mismatch("integer", &value),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value.as_i64().and_then(|n| i32::try_from(n).ok()) {
            Some(n) => Ok(n),
            None => mismatch("32-bit integer", &value),
        }
    }
}

impl FromValue for u32 {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value.as_i64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) => Ok(n),
            None => mismatch("unsigned 32-bit integer", &value),
        }
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match &value {
            Value::Number(n) => match n.as_u64() {
                Some(u) => Ok(u),
                None => mismatch("unsigned integer", &value),
            },
            other => mismatch("unsigned integer", other),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value.as_f64() {
            Some(f) => Ok(f),
            None => mismatch("number", &value),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Date(d) => Ok(d),
            other => mismatch("date", &other),
        }
    }
}

impl FromValue for Timestamp {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::DateTime(ts) => Ok(ts),
            other => mismatch("datetime", &other),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::DateTime(Timestamp::Naive(dt)) => Ok(dt),
            other => mismatch("naive datetime", &other),
        }
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::DateTime(Timestamp::Aware(dt)) => Ok(dt),
            other => mismatch("aware datetime", &other),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Decimal(d) => Ok(d),
            other => mismatch("decimal", &other),
        }
    }
}

impl FromValue for ObjectId {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::ObjectId(id) => Ok(id),
            other => mismatch("object id", &other),
        }
    }
}

impl FromValue for ValueSet {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Set(s) => Ok(s),
            other => mismatch("set", &other),
        }
    }
}

impl FromValue for RecordValue {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Record(r) => Ok(r),
            other => mismatch("record", &other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => mismatch("list", &other),
        }
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            other => mismatch("map", &other),
        }
    }
}

impl<A: FromValue, B: FromValue> FromValue for (A, B) {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Tuple(items) if items.len() == 2 => {
                let mut it = items.into_iter();
                match (it.next(), it.next()) {
                    (Some(a), Some(b)) => Ok((A::from_value(a)?, B::from_value(b)?)),
                    _ => Err(CodecError::ValueMismatch {
                        expected: "2-tuple",
                        found: "tuple",
                    }),
                }
            }
            other => mismatch("2-tuple", &other),
        }
    }
}
