//! Provide path-based property access.
//!
//! A property path addresses a value nested inside an [`Object`]. It is
//! resolved step by step, every step is resolved against the object the
//! previous one returned, whatever its capability ([`MapLike`],
//! [`DynamicBag`] or [`StructuredRecord`]).
//!
//! - [`PropertyPath`]: a parsed, reusable path.
//! - [`PropertyAccessor`]: reads and writes values through a path,
//!   converting written values with a [`ConverterRegistry`].
//!
//! # Syntax
//!
//! - Simple: `name`, the property `name`.
//! - Indexed: `name[3]`, element 3 of the array or list `name`.
//! - Mapped: `name(key)`, the value under `key` of the map `name`.
//! - Nested: `a.b[0].c(key)`, steps joined by `.`.
//!
//! A key may contain any character but `)`, including `.`.
//!
//! # Examples
//!
//! ```
//! use vc_property::object::{BagClass, PropertyDescriptor};
//! use vc_property::{PropertyAccessor, Scalar, Value, ValueType};
//!
//! let class = BagClass::new("Team", [
//!     PropertyDescriptor::new("size", ValueType::Primitive(Scalar::I16)),
//!     PropertyDescriptor::new("members", ValueType::List),
//! ]);
//! let mut team = class.instantiate();
//! let accessor = PropertyAccessor::new();
//!
//! accessor.set(&mut team, "size", "3").unwrap();
//! accessor.set(&mut team, "members", Value::list(["ann", "bo", "cy"])).unwrap();
//!
//! assert_eq!(accessor.get(&team, "size").unwrap(), Value::I16(3));
//! assert_eq!(accessor.get(&team, "members[1]").unwrap(), Value::from("bo"));
//! assert!(accessor.get(&team, "members[3]").is_err());
//! ```
//!
//! [`Object`]: crate::Object
//! [`MapLike`]: crate::object::MapLike
//! [`DynamicBag`]: crate::object::DynamicBag
//! [`StructuredRecord`]: crate::object::StructuredRecord
//! [`ConverterRegistry`]: crate::ConverterRegistry

// -----------------------------------------------------------------------------
// Modules

mod error;
mod path;
mod property_access;
mod resolve;

// -----------------------------------------------------------------------------
// Exports

pub use error::PropertyError;
pub use path::{OffsetStep, ParseError, PropertyPath, Step};
pub use property_access::PropertyAccessor;

pub(crate) use resolve::{read_key, store_element, write_key};
