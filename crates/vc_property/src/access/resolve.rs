//! Provide single-step resolution against the three object capabilities.
//!
//! A step is resolved while the caller holds the lock of one object only.
//! When a mapped step goes through a map stored in a property, the map
//! handle is returned as [`Pending::Key`] and the caller finishes the step
//! after releasing the parent.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::access::{PropertyError, Step};
use crate::convert::{ConvertError, ConverterRegistry};
use crate::object::{
    AccessArg, ArgShape, DynamicBag, MapLike, Object, ObjectHandle, ObjectKind, ObjectMut,
    ObjectRef, PropertyDescriptor, RecordAccessor, StructuredRecord,
};
use crate::value::{Value, ValueType};

// -----------------------------------------------------------------------------
// Outcomes

/// The result of a step read.
pub(crate) enum Pending {
    Done(Value),
    /// Read the step key from this map.
    Key(ObjectHandle),
}

/// The result of a step write.
pub(crate) enum PendingWrite {
    Done,
    /// Insert the value under the step key of this map.
    Key(ObjectHandle, Value),
}

// -----------------------------------------------------------------------------
// Sequence and map helpers

fn null_intermediate(name: &str, step: &dyn core::fmt::Display) -> PropertyError {
    PropertyError::NullIntermediate {
        path: name.to_string(),
        next: step.to_string(),
    }
}

fn not_a(kind: &'static str, value: &Value) -> String {
    alloc::format!("{} value is not {kind}", value.kind_name())
}

/// Returns the element `index` of the sequence `value` of property `name`.
pub(crate) fn element_at(name: &str, value: Value, index: usize) -> Result<Value, PropertyError> {
    match value {
        Value::Array(mut items) | Value::List(mut items) => {
            let len = items.len();
            if index < len {
                Ok(items.swap_remove(index))
            } else {
                Err(PropertyError::out_of_bounds(name, index, len))
            }
        }
        Value::Null => Err(null_intermediate(name, &Step::indexed(name, index))),
        other => Err(PropertyError::invalid_path(
            Step::indexed(name, index),
            not_a("a sequence", &other),
        )),
    }
}

/// Stores `value` at `index` of the resizable sequence `items`.
///
/// `index == len` appends when `grows` is set.
pub(crate) fn store_element(
    name: &str,
    items: &mut Vec<Value>,
    index: usize,
    value: Value,
    grows: bool,
) -> Result<(), PropertyError> {
    let len = items.len();
    if index < len {
        items[index] = value;
        Ok(())
    } else if index == len && grows {
        items.push(value);
        Ok(())
    } else if index == len {
        Err(PropertyError::invalid_path(
            Step::indexed(name, index),
            "the owner does not grow lists on index",
        ))
    } else {
        Err(PropertyError::out_of_bounds(name, index, len))
    }
}

/// Stores `value` at `index` of the sequence `seq`, fixed arrays never grow.
fn store_in(
    name: &str,
    seq: &mut Value,
    index: usize,
    value: Value,
    grows: bool,
) -> Result<(), PropertyError> {
    match seq {
        Value::Array(items) if index < items.len() => {
            items[index] = value;
            Ok(())
        }
        Value::Array(items) => Err(PropertyError::out_of_bounds(name, index, items.len())),
        Value::List(items) => store_element(name, items, index, value, grows),
        Value::Null => Err(null_intermediate(name, &Step::indexed(name, index))),
        other => Err(PropertyError::invalid_path(
            Step::indexed(name, index),
            not_a("a sequence", other),
        )),
    }
}

fn expect_map(name: &str, key: &str, value: Value) -> Result<ObjectHandle, PropertyError> {
    match value {
        Value::Object(handle) if handle.kind() == ObjectKind::Map => Ok(handle),
        Value::Null => Err(null_intermediate(name, &Step::mapped(name, key))),
        other => Err(PropertyError::invalid_path(
            Step::mapped(name, key),
            not_a("a map", &other),
        )),
    }
}

fn with_map<R>(
    handle: &ObjectHandle,
    name: &str,
    key: &str,
    f: impl FnOnce(ObjectMut<'_>) -> R,
) -> Result<R, PropertyError> {
    if handle.kind() != ObjectKind::Map {
        return Err(PropertyError::invalid_path(
            Step::mapped(name, key),
            "object value is not a map",
        ));
    }
    let mut guard = handle.write();
    Ok(f(guard.object_mut()))
}

/// Reads `key` from the map behind `handle`; a missing key reads as null.
pub(crate) fn read_key(
    handle: &ObjectHandle,
    name: &str,
    key: &str,
) -> Result<Value, PropertyError> {
    if handle.kind() != ObjectKind::Map {
        return Err(PropertyError::invalid_path(
            Step::mapped(name, key),
            "object value is not a map",
        ));
    }
    let guard = handle.read();
    match guard.object_ref() {
        ObjectRef::Map(map) => Ok(map.get(key).unwrap_or_default()),
        _ => Ok(Value::Null),
    }
}

/// Inserts `value` under `key` into the map behind `handle`.
pub(crate) fn write_key(
    handle: &ObjectHandle,
    name: &str,
    key: &str,
    value: Value,
) -> Result<(), PropertyError> {
    with_map(handle, name, key, |object| {
        if let ObjectMut::Map(map) = object {
            map.insert(key, value);
        }
    })
}

// -----------------------------------------------------------------------------
// Conversion

/// A null written to a nullable slot leaves the stored value as it is.
fn keeps_value(ty: &ValueType, value: &Value) -> bool {
    matches!(ty, ValueType::Nullable(_)) && value.is_null()
}

fn is_scalar_slot(ty: &ValueType) -> bool {
    ty.scalar().is_some() || matches!(ty, ValueType::String | ValueType::Date)
}

/// Converts `value` for a slot of type `ty` belonging to property `name`.
///
/// - Accepted values are returned unchanged.
/// - A sequence written to a scalar slot is replaced by its first element.
/// - Object-typed slots are never converted.
/// - The converted value must be accepted by `ty`.
pub(crate) fn convert_for_slot(
    registry: &ConverterRegistry,
    name: &str,
    ty: &ValueType,
    value: Value,
) -> Result<Value, PropertyError> {
    if ty.accepts(&value) {
        return Ok(value);
    }
    let value = match value {
        Value::Array(items) | Value::List(items) if is_scalar_slot(ty) => {
            let first = items.into_iter().next().unwrap_or_default();
            return convert_for_slot(registry, name, ty, first);
        }
        value => value,
    };
    if matches!(ty, ValueType::Map | ValueType::Object) {
        return Err(PropertyError::conversion(
            name,
            ConvertError::unassignable(ty, &value),
        ));
    }
    let converted = registry
        .convert(&value, ty)
        .map_err(|err| PropertyError::conversion(name, err))?;
    if ty.accepts(&converted) {
        Ok(converted)
    } else {
        Err(PropertyError::conversion(
            name,
            ConvertError::unassignable(ty, &converted),
        ))
    }
}

// -----------------------------------------------------------------------------
// Read

/// Reads `step` from `object`.
pub(crate) fn read_step(object: &dyn Object, step: &Step<'_>) -> Result<Pending, PropertyError> {
    log::trace!("read `{step}` on {}", object.type_name());
    match object.object_ref() {
        ObjectRef::Map(map) => read_map(map, step),
        ObjectRef::Bag(bag) => read_bag(object.type_name(), bag, step),
        ObjectRef::Record(record) => read_record(object.type_name(), record, step),
    }
}

fn read_map(map: &dyn MapLike, step: &Step<'_>) -> Result<Pending, PropertyError> {
    let value = map.get(step.name()).unwrap_or_default();
    match step {
        Step::Simple { .. } => Ok(Pending::Done(value)),
        Step::Indexed { name, index } => element_at(name, value, *index).map(Pending::Done),
        Step::Mapped { name, key } => expect_map(name, key, value).map(Pending::Key),
    }
}

/// The descriptor `step` resolves to, checked against the shape of the step.
fn bag_descriptor<'b>(
    object: &str,
    bag: &'b dyn DynamicBag,
    step: &Step<'_>,
) -> Result<&'b PropertyDescriptor, PropertyError> {
    let name = step.name();
    let desc = bag
        .descriptor(name)
        .ok_or_else(|| PropertyError::no_such_property(object, name))?;
    match step {
        Step::Indexed { .. } if !desc.is_indexed() => {
            Err(PropertyError::invalid_path(step, "property is not indexed"))
        }
        Step::Mapped { .. } if !desc.is_mapped() => {
            Err(PropertyError::invalid_path(step, "property is not mapped"))
        }
        _ => Ok(desc),
    }
}

fn read_bag(
    object: &str,
    bag: &dyn DynamicBag,
    step: &Step<'_>,
) -> Result<Pending, PropertyError> {
    bag_descriptor(object, bag, step)?;
    let value = match step {
        Step::Simple { name } => bag.get(name)?,
        Step::Indexed { name, index } => bag.get_indexed(name, *index)?,
        Step::Mapped { name, key } => bag.get_mapped(name, key)?,
    };
    Ok(Pending::Done(value))
}

fn plain_accessor(
    object: &str,
    record: &dyn StructuredRecord,
    name: &str,
) -> Result<RecordAccessor, PropertyError> {
    record
        .find_accessor(name, ArgShape::Plain)
        .ok_or_else(|| PropertyError::no_such_property(object, name))
}

fn read_plain(
    object: &str,
    record: &dyn StructuredRecord,
    name: &str,
) -> Result<Value, PropertyError> {
    let accessor = plain_accessor(object, record, name)?;
    if !accessor.is_readable() {
        return Err(PropertyError::not_readable(object, name));
    }
    record.read(&accessor, AccessArg::None)
}

fn read_record(
    object: &str,
    record: &dyn StructuredRecord,
    step: &Step<'_>,
) -> Result<Pending, PropertyError> {
    let (arg, shape) = match step {
        Step::Simple { name } => return read_plain(object, record, name).map(Pending::Done),
        Step::Indexed { index, .. } => (AccessArg::Index(*index), ArgShape::Indexed),
        Step::Mapped { key, .. } => (AccessArg::Key(key), ArgShape::Mapped),
    };
    let name = step.name();

    // An accessor taking the index or key directly wins over the plain one.
    if let Some(accessor) = record.find_accessor(name, shape) {
        if !accessor.is_readable() {
            return Err(PropertyError::not_readable(object, name));
        }
        return record.read(&accessor, arg).map(Pending::Done);
    }

    let value = read_plain(object, record, name)?;
    match arg {
        AccessArg::Index(index) => element_at(name, value, index).map(Pending::Done),
        AccessArg::Key(key) => expect_map(name, key, value).map(Pending::Key),
        AccessArg::None => Ok(Pending::Done(value)),
    }
}

// -----------------------------------------------------------------------------
// Write

/// Writes `value` to `step` of `object`, converting it to the declared type.
pub(crate) fn write_step(
    registry: &ConverterRegistry,
    object: &mut dyn Object,
    step: &Step<'_>,
    value: Value,
) -> Result<PendingWrite, PropertyError> {
    log::trace!("write `{step}` on {}", object.type_name());
    let type_name = object.type_name().to_string();
    match object.object_mut() {
        ObjectMut::Map(map) => write_map(map, step, value),
        ObjectMut::Bag(bag) => write_bag(registry, &type_name, bag, step, value),
        ObjectMut::Record(record) => write_record(registry, &type_name, record, step, value),
    }
}

fn write_map(
    map: &mut dyn MapLike,
    step: &Step<'_>,
    value: Value,
) -> Result<PendingWrite, PropertyError> {
    match step {
        Step::Simple { name } => {
            map.insert(name, value);
            Ok(PendingWrite::Done)
        }
        Step::Indexed { name, index } => {
            let mut seq = map.get(name).unwrap_or_default();
            store_in(name, &mut seq, *index, value, map.grows_on_index(name))?;
            map.insert(name, seq);
            Ok(PendingWrite::Done)
        }
        Step::Mapped { name, key } => {
            let handle = expect_map(name, key, map.get(name).unwrap_or_default())?;
            Ok(PendingWrite::Key(handle, value))
        }
    }
}

fn write_bag(
    registry: &ConverterRegistry,
    object: &str,
    bag: &mut dyn DynamicBag,
    step: &Step<'_>,
    value: Value,
) -> Result<PendingWrite, PropertyError> {
    let name = step.name();
    let desc = bag_descriptor(object, &*bag, step)?;
    // Values stored under a mapped property are untyped.
    let ty = match step {
        Step::Simple { .. } => Some(desc.ty().clone()),
        Step::Indexed { .. } => Some(desc.element_type().clone()),
        Step::Mapped { .. } => None,
    };
    let value = match ty {
        Some(ty) if keeps_value(&ty, &value) => return Ok(PendingWrite::Done),
        Some(ty) => convert_for_slot(registry, name, &ty, value)?,
        None => value,
    };
    match step {
        Step::Simple { name } => bag.set(name, value)?,
        Step::Indexed { name, index } => bag.set_indexed(name, *index, value)?,
        Step::Mapped { name, key } => bag.set_mapped(name, key, value)?,
    }
    Ok(PendingWrite::Done)
}

fn write_record(
    registry: &ConverterRegistry,
    object: &str,
    record: &mut dyn StructuredRecord,
    step: &Step<'_>,
    value: Value,
) -> Result<PendingWrite, PropertyError> {
    let name = step.name();
    let (arg, shape) = match step {
        Step::Simple { .. } => (AccessArg::None, ArgShape::Plain),
        Step::Indexed { index, .. } => (AccessArg::Index(*index), ArgShape::Indexed),
        Step::Mapped { key, .. } => (AccessArg::Key(key), ArgShape::Mapped),
    };

    if let Some(accessor) = record.find_accessor(name, shape) {
        if !accessor.is_writable() {
            return Err(PropertyError::not_writable(object, name));
        }
        if keeps_value(accessor.ty(), &value) {
            return Ok(PendingWrite::Done);
        }
        let value = convert_for_slot(registry, name, accessor.ty(), value)?;
        record.write(&accessor, arg, value)?;
        return Ok(PendingWrite::Done);
    }

    // No direct accessor: go through the whole value of the plain accessor.
    let accessor = plain_accessor(object, &*record, name)?;
    match arg {
        AccessArg::Index(index) => {
            if !accessor.is_writable() {
                return Err(PropertyError::not_writable(object, name));
            }
            if !accessor.is_readable() {
                return Err(PropertyError::not_readable(object, name));
            }
            let element_ty = accessor.ty().element_type().cloned().unwrap_or(ValueType::Any);
            if keeps_value(&element_ty, &value) {
                return Ok(PendingWrite::Done);
            }
            let value = convert_for_slot(registry, name, &element_ty, value)?;
            let mut seq = record.read(&accessor, AccessArg::None)?;
            store_in(name, &mut seq, index, value, record.grows_on_index(name))?;
            record.write(&accessor, AccessArg::None, seq)?;
            Ok(PendingWrite::Done)
        }
        AccessArg::Key(key) => {
            if !accessor.is_readable() {
                return Err(PropertyError::not_readable(object, name));
            }
            let current = record.read(&accessor, AccessArg::None)?;
            Ok(PendingWrite::Key(expect_map(name, key, current)?, value))
        }
        AccessArg::None => Err(PropertyError::no_such_property(object, name)),
    }
}
