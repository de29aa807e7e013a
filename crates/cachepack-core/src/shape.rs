//! # Shapes — Expected-Type Descriptors
//!
//! A `Shape` tells `unpack` what the caller expects at a position, in place
//! of runtime type introspection. Shapes only ever *refine* decoding:
//! containers pass element shapes down, and strings are opportunistically
//! converted to the scalar the shape names. Self-describing envelopes
//! (dates, decimals, object ids, records) ignore the shape entirely.

use std::fmt;

/// Expected type of a value at some position in a payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    /// No expectation; decode untyped.
    #[default]
    Any,
    /// Text.
    Str,
    /// Integer number.
    Int,
    /// Floating-point number.
    Float,
    /// Boolean.
    Bool,
    /// Calendar date.
    Date,
    /// Naive or aware datetime.
    DateTime,
    /// Exact decimal.
    Decimal,
    /// External object id.
    ObjectId,
    /// Ordered sequence with a uniform element shape.
    List(Box<Shape>),
    /// Unordered collection with a uniform element shape.
    Set(Box<Shape>),
    /// Fixed-arity sequence with one shape per position.
    Tuple(Vec<Shape>),
    /// String-keyed mapping with a uniform value shape.
    Map(Box<Shape>),
    /// Value that may be null; non-null data decodes against the inner shape.
    Optional(Box<Shape>),
    /// Instance of the record registered under the given alias.
    Record(String),
}

impl Shape {
    /// `List(element)`.
    pub fn list(element: Shape) -> Self {
        Self::List(Box::new(element))
    }

    /// `Set(element)`.
    pub fn set(element: Shape) -> Self {
        Self::Set(Box::new(element))
    }

    /// `Map(value)`.
    pub fn map(value: Shape) -> Self {
        Self::Map(Box::new(value))
    }

    /// `Optional(inner)`.
    pub fn optional(inner: Shape) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// `Tuple(positions)`.
    pub fn tuple(positions: impl IntoIterator<Item = Shape>) -> Self {
        Self::Tuple(positions.into_iter().collect())
    }

    /// `Record(alias)`.
    pub fn record(alias: impl Into<String>) -> Self {
        Self::Record(alias.into())
    }

    /// Strip any `Optional` wrappers.
    pub fn resolve(&self) -> &Shape {
        match self {
            Self::Optional(inner) => inner.resolve(),
            other => other,
        }
    }

    /// Returns true when decoding should run untyped.
    pub fn is_any(&self) -> bool {
        matches!(self.resolve(), Self::Any)
    }

    /// Element shape of a list, if this is one.
    pub fn list_element(&self) -> Option<&Shape> {
        match self.resolve() {
            Self::List(element) => Some(element),
            _ => None,
        }
    }

    /// Element shape of a set, if this is one.
    pub fn set_element(&self) -> Option<&Shape> {
        match self.resolve() {
            Self::Set(element) => Some(element),
            _ => None,
        }
    }

    /// Value shape of a keyed container, if this is one.
    pub fn map_value(&self) -> Option<&Shape> {
        match self.resolve() {
            Self::Map(value) => Some(value),
            _ => None,
        }
    }

    /// Positional shapes of a tuple, if this is one.
    pub fn tuple_positions(&self) -> Option<&[Shape]> {
        match self.resolve() {
            Self::Tuple(positions) => Some(positions),
            _ => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Str => f.write_str("str"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::Date => f.write_str("date"),
            Self::DateTime => f.write_str("datetime"),
            Self::Decimal => f.write_str("decimal"),
            Self::ObjectId => f.write_str("object_id"),
            Self::List(e) => write!(f, "list[{e}]"),
            Self::Set(e) => write!(f, "set[{e}]"),
            Self::Map(v) => write!(f, "map[str, {v}]"),
            Self::Optional(inner) => write!(f, "optional[{inner}]"),
            Self::Record(alias) => write!(f, "record[{alias}]"),
            Self::Tuple(positions) => {
                f.write_str("tuple[")?;
                for (i, p) in positions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_see_through_optional() {
        let shape = Shape::optional(Shape::list(Shape::Decimal));
        assert_eq!(shape.list_element(), Some(&Shape::Decimal));
        assert_eq!(shape.set_element(), None);
        assert!(!shape.is_any());
        assert!(Shape::optional(Shape::Any).is_any());
    }

    #[test]
    fn tuple_positions() {
        let shape = Shape::tuple([Shape::Int, Shape::Date]);
        assert_eq!(shape.tuple_positions().map(<[Shape]>::len), Some(2));
        assert_eq!(Shape::Int.tuple_positions(), None);
    }

    #[test]
    fn display_is_readable() {
        let shape = Shape::map(Shape::tuple([Shape::Str, Shape::set(Shape::ObjectId)]));
        assert_eq!(shape.to_string(), "map[str, tuple[str, set[object_id]]]");
    }

    #[test]
    fn default_is_any() {
        assert_eq!(Shape::default(), Shape::Any);
    }
}
