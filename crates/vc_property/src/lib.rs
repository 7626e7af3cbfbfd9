#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

// Locks and lazy statics come from `std::sync`.
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod hash;

pub mod access;
pub mod convert;
pub mod copy;
pub mod object;
pub mod value;

#[cfg(test)]
mod testing;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use access::{PropertyAccessor, PropertyError};
pub use convert::{ConvertError, Converter, ConverterRegistry};
pub use copy::{CopyError, PropertyCopier};
pub use object::{Object, ObjectHandle};
pub use value::{Scalar, Value, ValueType};

// -----------------------------------------------------------------------------
// Process-wide entry points

/// Reads the property at `path` using the global converter registry.
///
/// See [`PropertyAccessor::get`].
pub fn get_property(root: &dyn Object, path: &str) -> Result<Value, PropertyError> {
    PropertyAccessor::new().get(root, path)
}

/// Writes `value` to the property at `path` using the global converter registry.
///
/// See [`PropertyAccessor::set`].
pub fn set_property(
    root: &mut dyn Object,
    path: &str,
    value: impl Into<Value>,
) -> Result<(), PropertyError> {
    PropertyAccessor::new().set(root, path, value)
}

/// Copies every readable property of `source` onto `target` using the
/// global converter registry.
///
/// See [`PropertyCopier::copy_properties`].
pub fn copy_properties(target: &mut dyn Object, source: &dyn Object) -> Result<(), CopyError> {
    PropertyCopier::new().copy_properties(target, source)
}

/// Registers `converter` for `target` in the global registry.
///
/// Returns the custom converter previously registered for `target`, if any.
pub fn register_converter(target: ValueType, converter: Converter) -> Option<Converter> {
    convert::global().register(target, converter)
}

/// Removes the custom converter for `target` from the global registry.
///
/// Default converters are unaffected.
pub fn deregister_converter(target: &ValueType) -> Option<Converter> {
    convert::global().deregister(target)
}

/// Drops every custom converter in the global registry.
pub fn reset_converters() {
    convert::global().reset_to_defaults();
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;

    use crate::testing::Person;
    use crate::{Converter, Scalar, Value, ValueType};

    // The only test touching the global registry.
    #[test]
    fn global_entry_points() {
        let target = ValueType::Nullable(Scalar::I16);
        let mut person = Person::default();
        crate::set_property(&mut person, "age", "41").unwrap();
        assert_eq!(crate::get_property(&person, "age").unwrap(), Value::I32(41));

        let mut copy = BTreeMap::<String, Value>::new();
        crate::copy_properties(&mut copy, &person).unwrap();
        assert_eq!(copy["age"], Value::I32(41));

        let previous =
            crate::register_converter(target.clone(), Converter::new(|_| Ok(Value::I16(1))));
        assert!(previous.is_none());
        let registry = crate::convert::global().snapshot();
        assert_eq!(registry.convert(&Value::from("9"), &target), Ok(Value::I16(1)));

        assert!(crate::deregister_converter(&target).is_some());
        crate::register_converter(target.clone(), Converter::new(|_| Ok(Value::Null)));
        crate::reset_converters();
        let registry = crate::convert::global().snapshot();
        assert_eq!(registry.convert(&Value::from("9"), &target), Ok(Value::I16(9)));
    }
}
