use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use chrono::NaiveDateTime;

use crate::convert::DEFAULT_DATE_FORMAT;
use crate::object::ObjectHandle;
use crate::value::Scalar;

// -----------------------------------------------------------------------------
// Value

/// A dynamically typed property value.
///
/// Scalars, strings, dates and sequences are plain values: reading a
/// property returns a copy. [`Value::Object`] holds an [`ObjectHandle`],
/// a shared reference, so nested objects are mutated in place when a
/// path is written through them.
///
/// # Equality
///
/// Two objects compare equal only if they are the same handle.
///
/// # Examples
///
/// ```
/// use vc_property::Value;
///
/// let v = Value::from(42_i32);
/// assert_eq!(v, Value::I32(42));
/// assert_eq!(v.as_i64(), Some(42));
///
/// let list = Value::list(["a", "b"]);
/// assert_eq!(list.as_slice().map(<[Value]>::len), Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Date(NaiveDateTime),
    /// A fixed-length sequence.
    Array(Vec<Value>),
    /// A resizable sequence.
    List(Vec<Value>),
    Object(ObjectHandle),
}

impl Value {
    /// Builds a [`Value::Array`] from anything convertible to values.
    pub fn array<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// Builds a [`Value::List`] from anything convertible to values.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The scalar kind of this value, if it is a scalar.
    pub const fn scalar(&self) -> Option<Scalar> {
        match self {
            Self::Bool(_) => Some(Scalar::Bool),
            Self::Char(_) => Some(Scalar::Char),
            Self::I8(_) => Some(Scalar::I8),
            Self::I16(_) => Some(Scalar::I16),
            Self::I32(_) => Some(Scalar::I32),
            Self::I64(_) => Some(Scalar::I64),
            Self::F32(_) => Some(Scalar::F32),
            Self::F64(_) => Some(Scalar::F64),
            _ => None,
        }
    }

    /// A short name of the value's kind, used in error messages.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::Array(_) => "array",
            Self::List(_) => "list",
            Self::Object(_) => "object",
            _ => match self.scalar() {
                Some(scalar) => scalar.name(),
                None => "unknown",
            },
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns any integer value widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I8(v) => Some(v as i64),
            Self::I16(v) => Some(v as i64),
            Self::I32(v) => Some(v as i64),
            Self::I64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns any numeric value widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(v as f64),
            Self::F64(v) => Some(v),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_date(&self) -> Option<&NaiveDateTime> {
        match self {
            Self::Date(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the elements of an array or a list.
    #[inline]
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) | Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&ObjectHandle> {
        match self {
            Self::Object(handle) => Some(handle),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Canonical, locale-independent text.
///
/// Dates use [`DEFAULT_DATE_FORMAT`]; sequences render as `[a, b]`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => fmt::Display::fmt(v, f),
            Self::Char(v) => fmt::Display::fmt(v, f),
            Self::I8(v) => fmt::Display::fmt(v, f),
            Self::I16(v) => fmt::Display::fmt(v, f),
            Self::I32(v) => fmt::Display::fmt(v, f),
            Self::I64(v) => fmt::Display::fmt(v, f),
            Self::F32(v) => fmt::Display::fmt(v, f),
            Self::F64(v) => fmt::Display::fmt(v, f),
            Self::String(v) => f.write_str(v),
            Self::Date(v) => write!(f, "{}", v.format(DEFAULT_DATE_FORMAT)),
            Self::Array(items) | Self::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index != 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(item, f)?;
                }
                f.write_str("]")
            }
            Self::Object(handle) => fmt::Display::fmt(handle, f),
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions from native values

macro_rules! impl_from_native {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_native! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    String => String,
    NaiveDateTime => Date,
    ObjectHandle => Object,
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}
