use alloc::boxed::Box;
use core::fmt;

use crate::object::ObjectKind;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Scalar

/// Primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scalar {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl Scalar {
    /// Every scalar kind, in declaration order.
    pub const ALL: [Scalar; 8] = [
        Scalar::Bool,
        Scalar::Char,
        Scalar::I8,
        Scalar::I16,
        Scalar::I32,
        Scalar::I64,
        Scalar::F32,
        Scalar::F64,
    ];

    /// Returns `true` for the integer kinds.
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Returns `true` for the integer and floating point kinds.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Bool | Self::Char)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

// -----------------------------------------------------------------------------
// ValueType

/// The semantic type a property declares.
///
/// `ValueType` is the key of the converter registry: a conversion always
/// targets one `ValueType`. [`Primitive`] and [`Nullable`] share the same
/// default converters and only differ in how they treat [`Value::Null`]:
/// a primitive slot can never hold null.
///
/// [`Primitive`]: ValueType::Primitive
/// [`Nullable`]: ValueType::Nullable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Accepts every value, never converts.
    Any,
    /// A non-null scalar.
    Primitive(Scalar),
    /// A scalar that may also be null.
    Nullable(Scalar),
    String,
    Date,
    /// A fixed-length sequence with a declared element type.
    Array(Box<ValueType>),
    /// A resizable sequence of arbitrary values.
    List,
    /// A shared handle to a key/value map.
    Map,
    /// A shared handle to any object.
    Object,
}

impl ValueType {
    /// Shorthand for `ValueType::Array(Box::new(element))`.
    #[inline]
    pub fn array_of(element: ValueType) -> Self {
        Self::Array(Box::new(element))
    }

    /// Returns `true` if the type cannot hold null.
    #[inline]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Returns the scalar kind of primitive and nullable types.
    #[inline]
    pub const fn scalar(&self) -> Option<Scalar> {
        match self {
            Self::Primitive(scalar) | Self::Nullable(scalar) => Some(*scalar),
            _ => None,
        }
    }

    /// Returns `true` for types holding a sequence.
    #[inline]
    pub const fn is_sequence(&self) -> bool {
        matches!(self, Self::Array(_) | Self::List)
    }

    /// The type of a single element of this type.
    ///
    /// Arrays report their declared element type, lists accept anything.
    /// Scalars, strings and dates have no elements.
    pub fn element_type(&self) -> Option<&ValueType> {
        static ANY: ValueType = ValueType::Any;

        match self {
            Self::Array(element) => Some(&**element),
            Self::List | Self::Any | Self::Object => Some(&ANY),
            _ => None,
        }
    }

    /// Returns `true` if `value` can be stored in a slot of this type without conversion.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_property::{Scalar, Value, ValueType};
    ///
    /// assert!(ValueType::Nullable(Scalar::I32).accepts(&Value::Null));
    /// assert!(!ValueType::Primitive(Scalar::I32).accepts(&Value::Null));
    /// assert!(!ValueType::Primitive(Scalar::I32).accepts(&Value::I64(1)));
    /// assert!(ValueType::Any.accepts(&Value::from("text")));
    /// ```
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Any, _) => true,
            (Self::Primitive(_), Value::Null) => false,
            (_, Value::Null) => true,
            (Self::Primitive(scalar) | Self::Nullable(scalar), value) => {
                value.scalar() == Some(*scalar)
            }
            (Self::String, Value::String(_)) => true,
            (Self::Date, Value::Date(_)) => true,
            (Self::Array(element), Value::Array(items)) => {
                items.iter().all(|item| element.accepts(item))
            }
            (Self::List, Value::List(_)) => true,
            (Self::Map, Value::Object(handle)) => handle.kind() == ObjectKind::Map,
            (Self::Object, Value::Object(_)) => true,
            _ => false,
        }
    }
}

impl From<Scalar> for ValueType {
    #[inline]
    fn from(value: Scalar) -> Self {
        Self::Primitive(value)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Primitive(scalar) => write!(f, "{scalar}"),
            Self::Nullable(scalar) => write!(f, "{scalar}?"),
            Self::String => f.write_str("string"),
            Self::Date => f.write_str("date"),
            Self::Array(element) => write!(f, "[{element}]"),
            Self::List => f.write_str("list"),
            Self::Map => f.write_str("map"),
            Self::Object => f.write_str("object"),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{Scalar, ValueType};
    use crate::value::Value;

    #[test]
    fn display() {
        assert_eq!(ValueType::Primitive(Scalar::I32).to_string(), "i32");
        assert_eq!(ValueType::Nullable(Scalar::F64).to_string(), "f64?");
        assert_eq!(
            ValueType::array_of(ValueType::Nullable(Scalar::Bool)).to_string(),
            "[bool?]"
        );
    }

    #[test]
    fn array_accepts_checks_elements() {
        let ty = ValueType::array_of(ValueType::Primitive(Scalar::I32));
        assert!(ty.accepts(&Value::Array(alloc::vec![Value::I32(1), Value::I32(2)])));
        assert!(!ty.accepts(&Value::Array(alloc::vec![Value::I32(1), Value::Null])));
        assert!(!ty.accepts(&Value::List(alloc::vec![Value::I32(1)])));
        assert!(ty.accepts(&Value::Null));
    }
}
