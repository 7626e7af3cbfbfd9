use alloc::sync::Arc;
use core::fmt;

use crate::convert::{ConvertError, ConverterRegistry};
use crate::value::{Value, ValueType};

// -----------------------------------------------------------------------------
// ConvertContext

/// What a [`Converter`] knows about the conversion it performs.
#[derive(Clone, Copy)]
pub struct ConvertContext<'a> {
    registry: &'a ConverterRegistry,
    target: &'a ValueType,
}

impl<'a> ConvertContext<'a> {
    #[inline]
    pub(crate) fn new(registry: &'a ConverterRegistry, target: &'a ValueType) -> Self {
        Self { registry, target }
    }

    /// The registry running the conversion, for converting nested values.
    #[inline]
    pub fn registry(&self) -> &'a ConverterRegistry {
        self.registry
    }

    /// The type being converted to.
    #[inline]
    pub fn target(&self) -> &'a ValueType {
        self.target
    }
}

// -----------------------------------------------------------------------------
// Converter

type ConvertFn = dyn Fn(&Value, &ConvertContext<'_>) -> Result<Value, ConvertError> + Send + Sync;

/// A shareable conversion function.
///
/// A converter never sees null, nulls are handled by the registry.
/// Converters must be pure: a failed conversion has no side effect.
///
/// # Examples
///
/// ```
/// use vc_property::convert::{ConvertError, Converter, ConverterRegistry};
/// use vc_property::{Value, ValueType};
///
/// let shout = Converter::new(|value| match value {
///     Value::String(s) => Ok(Value::String(s.to_uppercase())),
///     other => Err(ConvertError::rejected(&ValueType::String, other, "not a string")),
/// });
///
/// let mut registry = ConverterRegistry::new();
/// registry.register(ValueType::String, shout);
///
/// let out = registry.convert(&Value::from("hi"), &ValueType::String).unwrap();
/// assert_eq!(out, Value::from("HI"));
/// ```
#[derive(Clone)]
pub struct Converter(Arc<ConvertFn>);

impl Converter {
    /// Creates a converter from a function of the input value only.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ConvertError> + Send + Sync + 'static,
    {
        Self(Arc::new(move |value: &Value, _: &ConvertContext<'_>| f(value)))
    }

    /// Creates a converter that also receives the [`ConvertContext`].
    pub fn with_context<F>(f: F) -> Self
    where
        F: Fn(&Value, &ConvertContext<'_>) -> Result<Value, ConvertError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn convert(&self, value: &Value, cx: &ConvertContext<'_>) -> Result<Value, ConvertError> {
        (self.0)(value, cx)
    }

    /// Returns `true` if both converters share the same function.
    #[inline]
    pub fn ptr_eq(&self, other: &Converter) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Converter(..)")
    }
}
