use alloc::borrow::Cow;

use crate::access::PropertyError;
use crate::value::{Value, ValueType};

// -----------------------------------------------------------------------------
// PropertyDescriptor

/// Describes one property of a [`DynamicBag`].
///
/// # Examples
///
/// ```
/// use vc_property::object::PropertyDescriptor;
/// use vc_property::{Scalar, ValueType};
///
/// let plain = PropertyDescriptor::new("age", ValueType::Primitive(Scalar::I32));
/// assert!(!plain.is_indexed() && !plain.is_mapped());
///
/// let list = PropertyDescriptor::new("tags", ValueType::List);
/// assert!(list.is_indexed());
///
/// let map = PropertyDescriptor::new("attributes", ValueType::Map);
/// assert!(map.is_mapped());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    name: Cow<'static, str>,
    ty: ValueType,
    indexed: bool,
    mapped: bool,
}

impl PropertyDescriptor {
    /// Creates a descriptor whose access flags follow its type:
    /// arrays and lists are indexed, maps are mapped.
    pub fn new(name: impl Into<Cow<'static, str>>, ty: ValueType) -> Self {
        let indexed = ty.is_sequence();
        let mapped = ty == ValueType::Map;
        Self {
            name: name.into(),
            ty,
            indexed,
            mapped,
        }
    }

    /// Creates a descriptor with explicit access flags.
    pub fn with_flags(
        name: impl Into<Cow<'static, str>>,
        ty: ValueType,
        indexed: bool,
        mapped: bool,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed,
            mapped,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type of the whole property value.
    #[inline]
    pub fn ty(&self) -> &ValueType {
        &self.ty
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    #[inline]
    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    /// The type of one element reached through `name[index]`.
    pub fn element_type(&self) -> &ValueType {
        self.ty.element_type().unwrap_or(&self.ty)
    }
}

// -----------------------------------------------------------------------------
// DynamicBag

/// An object describing its properties at runtime.
///
/// The descriptor set is fixed for a bag's class and ordered by declaration.
/// Implementations fail with [`PropertyError::NoSuchProperty`] for names
/// outside the descriptor set and with [`PropertyError::InvalidPath`] for
/// indexed or mapped access to a property not declared as such.
///
/// Values given to the setters have already been converted to the declared
/// type by the caller; implementations may still reject unassignable values.
pub trait DynamicBag: Send + Sync {
    /// Every property of this bag, in declaration order.
    fn describe(&self) -> &[PropertyDescriptor];

    /// The descriptor of `name`, if the bag has such a property.
    fn descriptor(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.describe().iter().find(|desc| desc.name() == name)
    }

    fn get(&self, name: &str) -> Result<Value, PropertyError>;

    fn set(&mut self, name: &str, value: Value) -> Result<(), PropertyError>;

    fn get_indexed(&self, name: &str, index: usize) -> Result<Value, PropertyError>;

    fn set_indexed(&mut self, name: &str, index: usize, value: Value)
    -> Result<(), PropertyError>;

    fn get_mapped(&self, name: &str, key: &str) -> Result<Value, PropertyError>;

    fn set_mapped(&mut self, name: &str, key: &str, value: Value) -> Result<(), PropertyError>;

    /// Whether writing `name[len]` appends to the list stored under `name`.
    #[inline]
    fn grows_on_index(&self, _name: &str) -> bool {
        false
    }
}
