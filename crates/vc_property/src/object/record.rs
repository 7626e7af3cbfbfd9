use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::fmt;

use crate::access::PropertyError;
use crate::value::{Value, ValueType};

// -----------------------------------------------------------------------------
// ArgShape

/// The argument an accessor takes besides the object itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgShape {
    /// `get_x()` / `set_x(value)`
    Plain,
    /// `get_x(index)` / `set_x(index, value)`
    Indexed,
    /// `get_x(key)` / `set_x(key, value)`
    Mapped,
}

/// The argument passed to an accessor, matching its [`ArgShape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessArg<'a> {
    None,
    Index(usize),
    Key(&'a str),
}

impl AccessArg<'_> {
    #[inline]
    pub const fn shape(&self) -> ArgShape {
        match self {
            Self::None => ArgShape::Plain,
            Self::Index(_) => ArgShape::Indexed,
            Self::Key(_) => ArgShape::Mapped,
        }
    }
}

impl fmt::Display for AccessArg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Index(index) => write!(f, "[{index}]"),
            Self::Key(key) => write!(f, "({key})"),
        }
    }
}

// -----------------------------------------------------------------------------
// RecordAccessor

/// A named getter/setter pair of a [`StructuredRecord`].
///
/// For [`ArgShape::Indexed`] and [`ArgShape::Mapped`] accessors, `ty` is the
/// type of a single element, not of the whole collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordAccessor {
    name: Cow<'static, str>,
    shape: ArgShape,
    ty: ValueType,
    readable: bool,
    writable: bool,
}

impl RecordAccessor {
    /// A readable and writable accessor.
    #[inline]
    pub const fn new(name: &'static str, shape: ArgShape, ty: ValueType) -> Self {
        Self {
            name: Cow::Borrowed(name),
            shape,
            ty,
            readable: true,
            writable: true,
        }
    }

    /// A readable and writable accessor with an owned name.
    pub fn named(name: impl Into<Cow<'static, str>>, shape: ArgShape, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            shape,
            ty,
            readable: true,
            writable: true,
        }
    }

    /// Removes the setter.
    #[inline]
    pub const fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Removes the getter.
    #[inline]
    pub const fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub const fn shape(&self) -> ArgShape {
        self.shape
    }

    #[inline]
    pub const fn ty(&self) -> &ValueType {
        &self.ty
    }

    #[inline]
    pub const fn is_readable(&self) -> bool {
        self.readable
    }

    #[inline]
    pub const fn is_writable(&self) -> bool {
        self.writable
    }
}

// -----------------------------------------------------------------------------
// StructuredRecord

/// An object with fixed, named accessors.
///
/// Accessor discovery belongs to the implementation: the engine only asks
/// for an accessor by exact name and [`ArgShape`], then calls [`read`] or
/// [`write`] with it. Values passed to [`write`] have already been
/// converted to the accessor's type.
///
/// Most implementations only provide [`accessors`] and the two dispatch
/// methods.
///
/// [`read`]: StructuredRecord::read
/// [`write`]: StructuredRecord::write
/// [`accessors`]: StructuredRecord::accessors
pub trait StructuredRecord: Send + Sync {
    /// Every accessor of the record, in declaration order.
    fn accessors(&self) -> &[RecordAccessor];

    /// Finds the accessor called `name` taking an argument of `shape`.
    fn find_accessor(&self, name: &str, shape: ArgShape) -> Option<RecordAccessor> {
        self.accessors()
            .iter()
            .find(|accessor| accessor.shape == shape && accessor.name() == name)
            .cloned()
    }

    /// Names of the readable plain accessors, in declaration order.
    fn accessor_names(&self) -> Vec<Cow<'static, str>> {
        self.accessors()
            .iter()
            .filter(|accessor| accessor.shape == ArgShape::Plain && accessor.readable)
            .map(|accessor| accessor.name.clone())
            .collect()
    }

    fn read(&self, accessor: &RecordAccessor, arg: AccessArg<'_>) -> Result<Value, PropertyError>;

    fn write(
        &mut self,
        accessor: &RecordAccessor,
        arg: AccessArg<'_>,
        value: Value,
    ) -> Result<(), PropertyError>;

    /// Whether writing `name[len]` appends to the list returned by the
    /// plain accessor `name`.
    #[inline]
    fn grows_on_index(&self, _name: &str) -> bool {
        false
    }
}
