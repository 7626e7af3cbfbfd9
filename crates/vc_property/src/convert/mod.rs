//! Provide the converter registry used to cross type boundaries.
//!
//! ## Menu
//!
//! - [`Converter`]: a function turning a [`Value`] into a value of a target [`ValueType`].
//! - [`ConverterRegistry`]: custom converters layered over the defaults.
//! - [`ConverterRegistryArc`]: a shared registry publishing immutable snapshots.
//! - [`global`]: the process-wide [`ConverterRegistryArc`].
//! - [`date_parser`]: a string → date converter, for explicit registration.
//!
//! ## Lookup order
//!
//! [`ConverterRegistry::convert`] resolves a conversion as follows:
//!
//! 1. null converts to null, except for primitive targets which fail;
//! 2. a custom converter registered for the target;
//! 3. the value unchanged, if the target already accepts it;
//! 4. the default converter for the target;
//! 5. the [`MissingConverterPolicy`].
//!
//! ## Defaults
//!
//! - numbers, `bool` and `char`, from numbers and from strings (locale independent);
//! - `string`, from every value, dates formatted with [`DEFAULT_DATE_FORMAT`];
//! - arrays and lists, element by element, strings split on commas.
//!
//! There is no default string → date converter.
//!
//! [`Value`]: crate::Value
//! [`ValueType`]: crate::ValueType

// -----------------------------------------------------------------------------
// Modules

mod converter;
mod defaults;
mod error;
mod registry;
mod shared;

// -----------------------------------------------------------------------------
// Exports

pub use converter::{ConvertContext, Converter};
pub use defaults::date_parser;
pub use error::ConvertError;
pub use registry::{ConverterRegistry, MissingConverterPolicy};
pub use shared::{ConverterRegistryArc, global};

/// The canonical date format used when a date is rendered as text.
///
/// Fractional seconds are only printed when non-zero.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
