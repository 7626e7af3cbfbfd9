//! Capability interfaces for the objects a property path walks through.
//!
//! ## Menu
//!
//! ### Interface
//!
//! Every object exposes exactly one capability, obtained through
//! [`Object::object_ref`] and [`Object::object_mut`]:
//!
//! - [`MapLike`]: key/value maps; a property name is a key.
//! - [`DynamicBag`]: objects describing their properties at runtime
//!   through [`PropertyDescriptor`]s.
//! - [`StructuredRecord`]: objects with fixed named accessors, looked up
//!   by name and [`ArgShape`].
//!
//! ### Adapters
//!
//! - `BTreeMap<String, Value>`, `HashMap<String, Value, S>` and
//!   `hashbrown::HashMap<String, Value, S>` implement [`MapLike`].
//! - [`BasicBag`]: a [`DynamicBag`] storing values for a shared [`BagClass`].
//! - [`impl_object!`](crate::impl_object): wires a user type implementing one
//!   capability into [`Object`].
//!
//! Objects nested inside values are shared through [`ObjectHandle`].

// -----------------------------------------------------------------------------
// Modules

mod bag;
mod basic_bag;
mod kind;
mod map;
mod record;

// -----------------------------------------------------------------------------
// Exports

pub use bag::{DynamicBag, PropertyDescriptor};
pub use basic_bag::{BagClass, BasicBag};
pub use kind::{Object, ObjectHandle, ObjectKind, ObjectMut, ObjectRef};
pub use map::MapLike;
pub use record::{AccessArg, ArgShape, RecordAccessor, StructuredRecord};
