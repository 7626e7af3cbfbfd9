use alloc::borrow::Cow;
use alloc::string::{String, ToString};

use thiserror::Error;

use crate::access::ParseError;
use crate::convert::ConvertError;
use crate::value::Scalar;

// -----------------------------------------------------------------------------
// PropertyError

/// An error returned from reading or writing a property.
///
/// Each variant is a distinct failure callers can match on, for example
/// treating [`NoSuchProperty`](Self::NoSuchProperty) as an absent optional
/// property and [`Conversion`](Self::Conversion) as bad input.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum PropertyError {
    /// The path string could not be parsed.
    #[error(transparent)]
    MalformedPath(#[from] ParseError),

    #[error("Unknown property `{name}` on `{object}`")]
    NoSuchProperty { object: String, name: String },

    /// An index or key was used where the value does not support it.
    #[error("Invalid access `{step}`: {reason}")]
    InvalidPath {
        step: String,
        reason: Cow<'static, str>,
    },

    #[error("Index {index} out of bounds for `{name}` of length {len}")]
    IndexOutOfBounds {
        name: String,
        index: usize,
        len: usize,
    },

    /// A step before the last one resolved to null.
    #[error("Null value at `{path}`, cannot resolve `{next}`")]
    NullIntermediate { path: String, next: String },

    #[error("Cannot assign null to property `{name}` of primitive type `{ty}`")]
    NullToPrimitive { name: String, ty: Scalar },

    #[error("Property `{name}` on `{object}` has no getter")]
    NotReadable { object: String, name: String },

    #[error("Property `{name}` on `{object}` has no setter")]
    NotWritable { object: String, name: String },

    #[error("Cannot convert value of property `{name}`: {source}")]
    Conversion {
        name: String,
        #[source]
        source: ConvertError,
    },
}

impl PropertyError {
    #[inline]
    pub fn no_such_property(object: &str, name: &str) -> Self {
        Self::NoSuchProperty {
            object: object.to_string(),
            name: name.to_string(),
        }
    }

    #[inline]
    pub fn invalid_path(step: impl ToString, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidPath {
            step: step.to_string(),
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn out_of_bounds(name: &str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            name: name.to_string(),
            index,
            len,
        }
    }

    #[inline]
    pub fn not_readable(object: &str, name: &str) -> Self {
        Self::NotReadable {
            object: object.to_string(),
            name: name.to_string(),
        }
    }

    #[inline]
    pub fn not_writable(object: &str, name: &str) -> Self {
        Self::NotWritable {
            object: object.to_string(),
            name: name.to_string(),
        }
    }

    /// Wraps a conversion failure of property `name`.
    ///
    /// A [`ConvertError::NullToPrimitive`] becomes [`PropertyError::NullToPrimitive`].
    pub fn conversion(name: &str, source: ConvertError) -> Self {
        match source {
            ConvertError::NullToPrimitive(ty) => Self::NullToPrimitive {
                name: name.to_string(),
                ty,
            },
            source => Self::Conversion {
                name: name.to_string(),
                source,
            },
        }
    }

    /// Returns `true` if the error means the property does not exist or
    /// cannot be written, as opposed to a failure of the value itself.
    pub fn is_missing_target(&self) -> bool {
        matches!(self, Self::NoSuchProperty { .. } | Self::NotWritable { .. })
    }
}
