//! Provide bulk copying of properties between objects.
//!
//! [`PropertyCopier::copy_properties`] reads every readable property of a
//! source object and writes it onto a target object of any kind, converting
//! each value to the declared type of the target slot.
//!
//! ## Enumeration
//!
//! - maps: every key, in the map's key order;
//! - dynamic bags: every descriptor, in declaration order;
//! - structured records: every readable plain accessor, in declaration order.
//!
//! A dynamic bag never copies [`RESERVED_PROPERTY`], the pseudo-property
//! naming its class. Maps and records copy a `class` entry like any other.
//!
//! ## Failures
//!
//! A property the target does not have, or cannot write, is skipped. Any
//! other failure stops the copy: properties written before it stay written.
//!
//! Objects nested in values are copied by handle, source and target then
//! share them.

use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

use thiserror::Error;

use crate::access::{PropertyAccessor, PropertyError, PropertyPath, Step};
use crate::convert::ConverterRegistry;
use crate::object::{Object, ObjectRef};
use crate::value::Value;

/// The name of the pseudo-property describing a dynamic bag's class.
pub const RESERVED_PROPERTY: &str = "class";

// -----------------------------------------------------------------------------
// CopyError

/// An error that stopped [`PropertyCopier::copy_properties`].
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Cannot copy property `{property}`: {source}")]
pub struct CopyError {
    /// The property that failed.
    pub property: String,
    #[source]
    pub source: PropertyError,
}

// -----------------------------------------------------------------------------
// PropertyCopier

/// Copies properties between objects of any kind.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use vc_property::object::{BagClass, PropertyDescriptor};
/// use vc_property::{PropertyCopier, Scalar, Value, ValueType};
///
/// let mut source = BTreeMap::<String, Value>::new();
/// source.insert("x".into(), Value::from("1"));
/// source.insert("y".into(), Value::from("a"));
///
/// let class = BagClass::new("Point", [
///     PropertyDescriptor::new("x", ValueType::Primitive(Scalar::I32)),
/// ]);
/// let mut target = class.instantiate();
///
/// PropertyCopier::new().copy_properties(&mut target, &source).unwrap();
/// assert_eq!(vc_property::get_property(&target, "x").unwrap(), Value::I32(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertyCopier {
    accessor: PropertyAccessor,
}

impl PropertyCopier {
    /// Creates a copier using a snapshot of the [global](crate::convert::global) registry.
    pub fn new() -> Self {
        Self {
            accessor: PropertyAccessor::new(),
        }
    }

    /// Creates a copier using `registry`.
    pub fn with_registry(registry: impl Into<Arc<ConverterRegistry>>) -> Self {
        Self {
            accessor: PropertyAccessor::with_registry(registry),
        }
    }

    #[inline]
    pub fn accessor(&self) -> &PropertyAccessor {
        &self.accessor
    }

    /// Copies every readable property of `source` onto `target`.
    ///
    /// See the [module documentation](self) for skipped properties.
    pub fn copy_properties(
        &self,
        target: &mut dyn Object,
        source: &dyn Object,
    ) -> Result<(), CopyError> {
        for name in property_names(source) {
            let path = single_step(&name);
            let value = self
                .accessor
                .get_path(source, &path)
                .map_err(|err| abort(&name, err))?;
            self.write(target, &name, &path, value)?;
        }
        Ok(())
    }

    /// Copies `value` onto the property `name` of `target`.
    ///
    /// Returns `false` if the property was skipped.
    pub fn copy_property(
        &self,
        target: &mut dyn Object,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<bool, CopyError> {
        self.write(target, name, &single_step(name), value.into())
    }

    fn write(
        &self,
        target: &mut dyn Object,
        name: &str,
        path: &PropertyPath,
        value: Value,
    ) -> Result<bool, CopyError> {
        match self.accessor.set_path(target, path, value) {
            Ok(()) => Ok(true),
            Err(err) if err.is_missing_target() => {
                log::trace!("skip property `{name}`: {err}");
                Ok(false)
            }
            Err(err) => Err(abort(name, err)),
        }
    }
}

fn abort(name: &str, source: PropertyError) -> CopyError {
    log::debug!("copy aborted at property `{name}`: {source}");
    CopyError {
        property: name.to_string(),
        source,
    }
}

#[inline]
fn single_step(name: &str) -> PropertyPath {
    PropertyPath::single(Step::simple(Cow::Owned(name.to_string())))
}

/// The readable property names of `object`, in a stable order.
fn property_names(object: &dyn Object) -> Vec<String> {
    match object.object_ref() {
        ObjectRef::Map(map) => map.keys(),
        ObjectRef::Bag(bag) => bag
            .describe()
            .iter()
            .map(|desc| desc.name())
            .filter(|name| *name != RESERVED_PROPERTY)
            .map(ToString::to_string)
            .collect(),
        ObjectRef::Record(record) => record
            .accessor_names()
            .into_iter()
            .map(Cow::into_owned)
            .collect(),
    }
}
