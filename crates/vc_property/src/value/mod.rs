//! Dynamic values and their semantic type tags.
//!
//! ## Menu
//!
//! - [`Value`]: the dynamically typed value read from and written to properties.
//! - [`ValueType`]: the type a property declares, used to pick a converter.
//! - [`Scalar`]: the primitive kinds shared by [`Value`] and [`ValueType`].
//!
//! A [`ValueType`] decides whether a value can be assigned as-is through
//! [`ValueType::accepts`]; everything else goes through a
//! [`ConverterRegistry`](crate::convert::ConverterRegistry).

// -----------------------------------------------------------------------------
// Modules

mod value;
mod value_type;

// -----------------------------------------------------------------------------
// Exports

pub use value::Value;
pub use value_type::{Scalar, ValueType};
