use alloc::borrow::Cow;
use alloc::string::ToString;
use alloc::sync::Arc;
use std::sync::LazyLock;

use crate::convert::defaults;
use crate::convert::{ConvertContext, ConvertError, Converter, DEFAULT_DATE_FORMAT};
use crate::hash::HashMap;
use crate::value::{Value, ValueType};

// -----------------------------------------------------------------------------
// MissingConverterPolicy

/// What [`ConverterRegistry::convert`] does when no converter applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingConverterPolicy {
    /// Fail with [`ConvertError::NoConverter`].
    #[default]
    Fail,
    /// Return the string representation of the value.
    UseString,
}

// -----------------------------------------------------------------------------
// Defaults

struct Defaults {
    table: HashMap<ValueType, Converter>,
    array: Converter,
}

static DEFAULTS: LazyLock<Arc<Defaults>> = LazyLock::new(|| {
    Arc::new(Defaults {
        table: defaults::default_table(),
        array: defaults::array_converter(),
    })
});

impl Defaults {
    fn get(&self, target: &ValueType) -> Option<&Converter> {
        match target {
            ValueType::Array(_) => Some(&self.array),
            _ => self.table.get(target),
        }
    }
}

// -----------------------------------------------------------------------------
// ConverterRegistry

/// A table of converters keyed by target [`ValueType`].
///
/// Custom converters shadow the default converters, they never replace
/// them: deregistering a custom converter makes the default visible again.
///
/// See the [module documentation](crate::convert) for the lookup order.
///
/// # Examples
///
/// ```
/// use vc_property::{ConverterRegistry, Scalar, Value, ValueType};
///
/// let registry = ConverterRegistry::new();
/// let target = ValueType::Primitive(Scalar::I32);
///
/// assert_eq!(registry.convert(&Value::from("42"), &target).unwrap(), Value::I32(42));
/// assert!(registry.convert(&Value::from("abc"), &target).is_err());
/// ```
#[derive(Clone)]
pub struct ConverterRegistry {
    custom: HashMap<ValueType, Converter>,
    defaults: Option<Arc<Defaults>>,
    policy: MissingConverterPolicy,
    date_format: Cow<'static, str>,
}

impl Default for ConverterRegistry {
    /// See [`ConverterRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterRegistry {
    /// Creates a registry without any converter, not even the defaults.
    ///
    /// Only null handling and already assignable values convert.
    pub fn empty() -> Self {
        Self {
            custom: HashMap::default(),
            defaults: None,
            policy: MissingConverterPolicy::Fail,
            date_format: Cow::Borrowed(DEFAULT_DATE_FORMAT),
        }
    }

    /// Creates a registry with the default converters.
    pub fn new() -> Self {
        Self {
            defaults: Some(Arc::clone(&DEFAULTS)),
            ..Self::empty()
        }
    }

    /// Registers a custom converter for `target`.
    ///
    /// Returns the custom converter previously registered for `target`.
    pub fn register(&mut self, target: ValueType, converter: Converter) -> Option<Converter> {
        log::debug!("register converter for `{target}`");
        self.custom.insert(target, converter)
    }

    /// Removes the custom converter for `target`.
    ///
    /// The default converter for `target`, if any, applies again.
    pub fn deregister(&mut self, target: &ValueType) -> Option<Converter> {
        let removed = self.custom.remove(target);
        if removed.is_some() {
            log::debug!("deregister converter for `{target}`");
        }
        removed
    }

    /// Removes every custom converter.
    pub fn reset_to_defaults(&mut self) {
        log::debug!("reset {} custom converter(s)", self.custom.len());
        self.custom.clear();
    }

    /// Returns `true` if a custom converter is registered for `target`.
    #[inline]
    pub fn contains(&self, target: &ValueType) -> bool {
        self.custom.contains_key(target)
    }

    /// The converter [`convert`](Self::convert) would run for `target`.
    pub fn lookup(&self, target: &ValueType) -> Option<&Converter> {
        self.custom
            .get(target)
            .or_else(|| self.defaults.as_deref()?.get(target))
    }

    #[inline]
    pub fn policy(&self) -> MissingConverterPolicy {
        self.policy
    }

    #[inline]
    pub fn set_policy(&mut self, policy: MissingConverterPolicy) {
        self.policy = policy;
    }

    /// The `chrono` format used to render dates as text.
    #[inline]
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    #[inline]
    pub fn set_date_format(&mut self, format: impl Into<Cow<'static, str>>) {
        self.date_format = format.into();
    }

    /// Converts `value` to `target`.
    ///
    /// The result is not checked against `target`, a custom converter is
    /// trusted to return what it was registered for.
    pub fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, ConvertError> {
        if value.is_null() {
            return match target {
                ValueType::Primitive(scalar) => Err(ConvertError::NullToPrimitive(*scalar)),
                _ => Ok(Value::Null),
            };
        }

        if let Some(converter) = self.custom.get(target) {
            return converter.convert(value, &ConvertContext::new(self, target));
        }

        if target.accepts(value) {
            return Ok(value.clone());
        }

        if let Some(converter) = self.defaults.as_deref().and_then(|d| d.get(target)) {
            return converter.convert(value, &ConvertContext::new(self, target));
        }

        match self.policy {
            MissingConverterPolicy::Fail => Err(ConvertError::no_converter(target, value)),
            MissingConverterPolicy::UseString => self.to_text(value),
        }
    }

    fn to_text(&self, value: &Value) -> Result<Value, ConvertError> {
        let target = &ValueType::String;
        match self.lookup(target) {
            Some(converter) => converter.convert(value, &ConvertContext::new(self, target)),
            None => Ok(Value::String(value.to_string())),
        }
    }
}

impl core::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("custom", &self.custom.keys())
            .field("defaults", &self.defaults.is_some())
            .field("policy", &self.policy)
            .field("date_format", &self.date_format)
            .finish()
    }
}
