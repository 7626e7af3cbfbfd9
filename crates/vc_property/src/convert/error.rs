use alloc::borrow::Cow;
use alloc::string::{String, ToString};

use thiserror::Error;

use crate::value::{Scalar, Value, ValueType};

/// An error returned from a failed conversion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConvertError {
    /// No converter is registered for the target and the value is not assignable to it.
    #[error("No converter for `{target}` accepts a {found} value")]
    NoConverter { target: ValueType, found: &'static str },

    /// A converter exists but refused the input.
    #[error("Cannot convert `{input}` to `{target}`: {reason}")]
    Rejected {
        target: ValueType,
        input: String,
        reason: Cow<'static, str>,
    },

    #[error("Cannot convert null to primitive `{0}`")]
    NullToPrimitive(Scalar),

    /// A converter produced a value the target does not accept.
    #[error("A {found} value is not assignable to `{target}`")]
    Unassignable { target: ValueType, found: &'static str },
}

impl ConvertError {
    #[inline]
    pub fn no_converter(target: &ValueType, value: &Value) -> Self {
        Self::NoConverter {
            target: target.clone(),
            found: value.kind_name(),
        }
    }

    #[inline]
    pub fn rejected(
        target: &ValueType,
        value: &Value,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::Rejected {
            target: target.clone(),
            input: value.to_string(),
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn unassignable(target: &ValueType, value: &Value) -> Self {
        Self::Unassignable {
            target: target.clone(),
            found: value.kind_name(),
        }
    }
}
