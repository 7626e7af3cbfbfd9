//! The default converters.

use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use chrono::{DateTime, NaiveDateTime};

use crate::convert::{ConvertContext, ConvertError, Converter};
use crate::hash::HashMap;
use crate::value::{Scalar, Value, ValueType};

// -----------------------------------------------------------------------------
// Default table

/// Builds the default converter table.
///
/// Array targets are not in the table, their converter is generic over
/// the element type, see [`array_converter`].
pub(crate) fn default_table() -> HashMap<ValueType, Converter> {
    let mut table: HashMap<ValueType, Converter> = HashMap::default();
    for scalar in Scalar::ALL {
        let converter = Converter::with_context(move |value, cx| to_scalar(value, scalar, cx));
        table.insert(ValueType::Primitive(scalar), converter.clone());
        table.insert(ValueType::Nullable(scalar), converter);
    }
    table.insert(ValueType::String, Converter::with_context(to_text));
    table.insert(ValueType::List, Converter::new(to_list));
    table
}

pub(crate) fn array_converter() -> Converter {
    Converter::with_context(to_array)
}

/// Builds a converter parsing dates from strings in `format`.
///
/// No such converter is registered by default; register it explicitly to
/// make string → date conversions succeed. Strings are trimmed and fall
/// back to RFC 3339 when `format` does not match.
///
/// # Examples
///
/// ```
/// use vc_property::convert::{self, ConverterRegistry, DEFAULT_DATE_FORMAT};
/// use vc_property::{Value, ValueType};
///
/// let mut registry = ConverterRegistry::new();
/// let text = Value::from("2024-05-01T08:30:00");
/// assert!(registry.convert(&text, &ValueType::Date).is_err());
///
/// registry.register(ValueType::Date, convert::date_parser(DEFAULT_DATE_FORMAT));
/// let date = registry.convert(&text, &ValueType::Date).unwrap();
/// assert_eq!(registry.convert(&date, &ValueType::String).unwrap(), text);
/// ```
pub fn date_parser(format: impl Into<Cow<'static, str>>) -> Converter {
    let format: Cow<'static, str> = format.into();
    Converter::with_context(move |value, cx| match value {
        Value::Date(_) => Ok(value.clone()),
        Value::String(text) => {
            let text = text.trim();
            NaiveDateTime::parse_from_str(text, &format)
                .or_else(|_| DateTime::parse_from_rfc3339(text).map(|date| date.naive_utc()))
                .map(Value::Date)
                .map_err(|err| ConvertError::rejected(cx.target(), value, err.to_string()))
        }
        other => Err(ConvertError::no_converter(cx.target(), other)),
    })
}

// -----------------------------------------------------------------------------
// Scalars

fn to_scalar(
    value: &Value,
    scalar: Scalar,
    cx: &ConvertContext<'_>,
) -> Result<Value, ConvertError> {
    if value.scalar() == Some(scalar) {
        return Ok(value.clone());
    }
    match scalar {
        Scalar::Bool => to_bool(value, cx),
        Scalar::Char => to_char(value, cx),
        Scalar::F32 | Scalar::F64 => to_float(value, scalar, cx),
        _ => to_integer(value, scalar, cx),
    }
}

fn to_bool(value: &Value, cx: &ConvertContext<'_>) -> Result<Value, ConvertError> {
    match value {
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "n" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(ConvertError::rejected(cx.target(), value, "not a boolean")),
        },
        other => match other.as_f64() {
            Some(number) => Ok(Value::Bool(number != 0.0)),
            None => Err(ConvertError::no_converter(cx.target(), other)),
        },
    }
}

fn to_char(value: &Value, cx: &ConvertContext<'_>) -> Result<Value, ConvertError> {
    match value {
        Value::String(text) => match text.chars().next() {
            Some(c) => Ok(Value::Char(c)),
            None => Err(ConvertError::rejected(cx.target(), value, "empty string")),
        },
        other => match other.as_i64() {
            Some(code) => u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .map(Value::Char)
                .ok_or_else(|| ConvertError::rejected(cx.target(), value, "not a code point")),
            None => Err(ConvertError::no_converter(cx.target(), other)),
        },
    }
}

/// Reads any numeric-like value as an integer.
fn integer_of(value: &Value, cx: &ConvertContext<'_>) -> Result<i64, ConvertError> {
    match *value {
        Value::Bool(b) => Ok(b as i64),
        Value::Char(c) => Ok(c as i64),
        Value::F32(_) | Value::F64(_) => {
            let number = value.as_f64().unwrap_or(f64::NAN);
            // `i64::MAX as f64` rounds up to 2^63, which is out of range.
            if number.is_finite() && number >= i64::MIN as f64 && number < i64::MAX as f64 {
                Ok(number.trunc() as i64)
            } else {
                Err(ConvertError::rejected(cx.target(), value, "out of range"))
            }
        }
        Value::String(ref text) => text
            .trim()
            .parse::<i64>()
            .map_err(|err| ConvertError::rejected(cx.target(), value, err.to_string())),
        _ => match value.as_i64() {
            Some(number) => Ok(number),
            None => Err(ConvertError::no_converter(cx.target(), value)),
        },
    }
}

fn to_integer(
    value: &Value,
    scalar: Scalar,
    cx: &ConvertContext<'_>,
) -> Result<Value, ConvertError> {
    let number = match (value, scalar) {
        (Value::Date(date), Scalar::I64) => {
            return Ok(Value::I64(date.and_utc().timestamp_millis()));
        }
        _ => integer_of(value, cx)?,
    };
    let out_of_range = || ConvertError::rejected(cx.target(), value, "out of range");
    match scalar {
        Scalar::I8 => i8::try_from(number).map(Value::I8).map_err(|_| out_of_range()),
        Scalar::I16 => i16::try_from(number).map(Value::I16).map_err(|_| out_of_range()),
        Scalar::I32 => i32::try_from(number).map(Value::I32).map_err(|_| out_of_range()),
        _ => Ok(Value::I64(number)),
    }
}

fn to_float(value: &Value, scalar: Scalar, cx: &ConvertContext<'_>) -> Result<Value, ConvertError> {
    let number = match value {
        Value::Bool(b) => *b as i64 as f64,
        Value::Char(c) => *c as u32 as f64,
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|err| ConvertError::rejected(cx.target(), value, err.to_string()))?,
        other => match other.as_f64() {
            Some(number) => number,
            None => return Err(ConvertError::no_converter(cx.target(), other)),
        },
    };
    if scalar == Scalar::F64 {
        return Ok(Value::F64(number));
    }
    if number.is_finite() && number.abs() > f32::MAX as f64 {
        return Err(ConvertError::rejected(cx.target(), value, "out of range"));
    }
    Ok(Value::F32(number as f32))
}

// -----------------------------------------------------------------------------
// Text

/// Canonical text of a value; sequences render their first element.
fn to_text(value: &Value, cx: &ConvertContext<'_>) -> Result<Value, ConvertError> {
    match value {
        Value::String(_) => Ok(value.clone()),
        Value::Date(date) => Ok(Value::String(
            date.format(cx.registry().date_format()).to_string(),
        )),
        Value::Array(items) | Value::List(items) => match items.first() {
            Some(first) => cx.registry().convert(first, cx.target()),
            None => Ok(Value::Null),
        },
        other => Ok(Value::String(other.to_string())),
    }
}

// -----------------------------------------------------------------------------
// Sequences

/// Splits `{a, b, c}` or `a, b, c` into trimmed elements.
fn split_elements(text: &str) -> Vec<Value> {
    let text = text.trim();
    let text = text
        .strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(text);
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(',')
        .map(|item| Value::String(String::from(item.trim())))
        .collect()
}

fn elements_of(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) | Value::List(items) => items.clone(),
        Value::String(text) => split_elements(text),
        other => alloc::vec![other.clone()],
    }
}

fn to_array(value: &Value, cx: &ConvertContext<'_>) -> Result<Value, ConvertError> {
    let Some(element) = cx.target().element_type() else {
        return Err(ConvertError::no_converter(cx.target(), value));
    };
    elements_of(value)
        .iter()
        .map(|item| cx.registry().convert(item, element))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn to_list(value: &Value) -> Result<Value, ConvertError> {
    Ok(Value::List(elements_of(value)))
}
