use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::access::PropertyError;
use crate::convert::ConvertError;
use crate::hash::HashMap;
use crate::object::{DynamicBag, Object, ObjectHandle, ObjectMut, ObjectRef, PropertyDescriptor};
use crate::value::{Scalar, Value, ValueType};

// -----------------------------------------------------------------------------
// BagClass

/// The shared, immutable shape of a family of [`BasicBag`]s.
///
/// # Examples
///
/// ```
/// use vc_property::object::{BagClass, PropertyDescriptor};
/// use vc_property::{Scalar, Value, ValueType};
///
/// let class = BagClass::new("Point", [
///     PropertyDescriptor::new("x", ValueType::Primitive(Scalar::I32)),
///     PropertyDescriptor::new("y", ValueType::Primitive(Scalar::I32)),
/// ]);
///
/// let mut point = class.instantiate();
/// vc_property::set_property(&mut point, "x", "12").unwrap();
///
/// assert_eq!(vc_property::get_property(&point, "x").unwrap(), Value::I32(12));
/// // Unset primitives read as zero.
/// assert_eq!(vc_property::get_property(&point, "y").unwrap(), Value::I32(0));
/// ```
pub struct BagClass {
    name: Cow<'static, str>,
    descriptors: Vec<PropertyDescriptor>,
    indices: HashMap<String, usize>,
    grows_on_index: bool,
}

impl BagClass {
    /// Creates a class from descriptors in declaration order.
    ///
    /// A later descriptor with the same name replaces the earlier one.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        descriptors: impl IntoIterator<Item = PropertyDescriptor>,
    ) -> Arc<Self> {
        Arc::new(Self::build(name.into(), descriptors, false))
    }

    /// Like [`BagClass::new`], but writing `list[len]` appends to the list.
    pub fn growable(
        name: impl Into<Cow<'static, str>>,
        descriptors: impl IntoIterator<Item = PropertyDescriptor>,
    ) -> Arc<Self> {
        Arc::new(Self::build(name.into(), descriptors, true))
    }

    fn build(
        name: Cow<'static, str>,
        descriptors: impl IntoIterator<Item = PropertyDescriptor>,
        grows_on_index: bool,
    ) -> Self {
        let mut list: Vec<PropertyDescriptor> = Vec::new();
        let mut indices: HashMap<String, usize> = HashMap::default();
        for desc in descriptors {
            match indices.get(desc.name()) {
                Some(&index) => list[index] = desc,
                None => {
                    indices.insert(desc.name().to_string(), list.len());
                    list.push(desc);
                }
            }
        }
        Self {
            name,
            descriptors: list,
            indices,
            grows_on_index,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn descriptors(&self) -> &[PropertyDescriptor] {
        &self.descriptors
    }

    #[inline]
    pub fn descriptor(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.indices.get(name).map(|&index| &self.descriptors[index])
    }

    /// Creates an empty bag of this class.
    #[inline]
    pub fn instantiate(self: &Arc<Self>) -> BasicBag {
        BasicBag::new(Arc::clone(self))
    }
}

impl fmt::Debug for BagClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BagClass")
            .field("name", &self.name)
            .field("descriptors", &self.descriptors)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// BasicBag

/// A [`DynamicBag`] storing one value per property of its [`BagClass`].
///
/// - Unset primitive properties read as zero (`false`, `'\0'`), other unset
///   properties read as null.
/// - Values are checked against the declared type, never converted.
/// - A mapped property holds a map handle, created on the first `name(key)` write.
/// - Indexed access requires the property to hold an array or a list.
pub struct BasicBag {
    class: Arc<BagClass>,
    values: HashMap<String, Value>,
}

impl BasicBag {
    pub fn new(class: Arc<BagClass>) -> Self {
        Self {
            class,
            values: HashMap::default(),
        }
    }

    #[inline]
    pub fn class(&self) -> &Arc<BagClass> {
        &self.class
    }

    fn lookup(&self, name: &str) -> Result<&PropertyDescriptor, PropertyError> {
        self.class
            .descriptor(name)
            .ok_or_else(|| PropertyError::no_such_property(self.class.name(), name))
    }

    fn lookup_indexed(
        &self,
        name: &str,
        index: usize,
    ) -> Result<&PropertyDescriptor, PropertyError> {
        let desc = self.lookup(name)?;
        if desc.is_indexed() {
            Ok(desc)
        } else {
            Err(PropertyError::invalid_path(
                format_args!("{name}[{index}]"),
                "property is not indexed",
            ))
        }
    }

    fn lookup_mapped(&self, name: &str, key: &str) -> Result<&PropertyDescriptor, PropertyError> {
        let desc = self.lookup(name)?;
        if desc.is_mapped() {
            Ok(desc)
        } else {
            Err(PropertyError::invalid_path(
                format_args!("{name}({key})"),
                "property is not mapped",
            ))
        }
    }

    fn check_assignable(name: &str, ty: &ValueType, value: &Value) -> Result<(), PropertyError> {
        if ty.accepts(value) {
            return Ok(());
        }
        let err = match ty {
            ValueType::Primitive(scalar) if value.is_null() => {
                ConvertError::NullToPrimitive(*scalar)
            }
            _ => ConvertError::unassignable(ty, value),
        };
        Err(PropertyError::conversion(name, err))
    }
}

fn zero(scalar: Scalar) -> Value {
    match scalar {
        Scalar::Bool => Value::Bool(false),
        Scalar::Char => Value::Char('\0'),
        Scalar::I8 => Value::I8(0),
        Scalar::I16 => Value::I16(0),
        Scalar::I32 => Value::I32(0),
        Scalar::I64 => Value::I64(0),
        Scalar::F32 => Value::F32(0.0),
        Scalar::F64 => Value::F64(0.0),
    }
}

impl DynamicBag for BasicBag {
    #[inline]
    fn describe(&self) -> &[PropertyDescriptor] {
        self.class.descriptors()
    }

    #[inline]
    fn descriptor(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.class.descriptor(name)
    }

    fn get(&self, name: &str) -> Result<Value, PropertyError> {
        let desc = self.lookup(name)?;
        match self.values.get(name) {
            Some(value) => Ok(value.clone()),
            None => match desc.ty() {
                ValueType::Primitive(scalar) => Ok(zero(*scalar)),
                _ => Ok(Value::Null),
            },
        }
    }

    fn set(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        let desc = self.lookup(name)?;
        Self::check_assignable(name, desc.ty(), &value)?;
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    fn get_indexed(&self, name: &str, index: usize) -> Result<Value, PropertyError> {
        self.lookup_indexed(name, index)?;
        match self.values.get(name) {
            Some(Value::Array(items) | Value::List(items)) => items
                .get(index)
                .cloned()
                .ok_or_else(|| PropertyError::out_of_bounds(name, index, items.len())),
            Some(Value::Null) | None => Err(PropertyError::NullIntermediate {
                path: name.to_string(),
                next: alloc::format!("{name}[{index}]"),
            }),
            Some(other) => Err(PropertyError::invalid_path(
                format_args!("{name}[{index}]"),
                alloc::format!("{} value is not a sequence", other.kind_name()),
            )),
        }
    }

    fn set_indexed(&mut self, name: &str, index: usize, value: Value) -> Result<(), PropertyError> {
        let desc = self.lookup_indexed(name, index)?;
        Self::check_assignable(name, desc.element_type(), &value)?;
        let grows = self.class.grows_on_index;
        match self.values.get_mut(name) {
            Some(Value::Array(items)) if index < items.len() => {
                items[index] = value;
                Ok(())
            }
            Some(Value::Array(items)) => {
                Err(PropertyError::out_of_bounds(name, index, items.len()))
            }
            Some(Value::List(items)) => {
                crate::access::store_element(name, items, index, value, grows)
            }
            Some(Value::Null) | None => Err(PropertyError::NullIntermediate {
                path: name.to_string(),
                next: alloc::format!("{name}[{index}]"),
            }),
            Some(other) => Err(PropertyError::invalid_path(
                format_args!("{name}[{index}]"),
                alloc::format!("{} value is not a sequence", other.kind_name()),
            )),
        }
    }

    fn get_mapped(&self, name: &str, key: &str) -> Result<Value, PropertyError> {
        self.lookup_mapped(name, key)?;
        match self.values.get(name) {
            Some(Value::Object(handle)) => crate::access::read_key(handle, name, key),
            // An untouched mapped property behaves like an empty map.
            Some(Value::Null) | None => Ok(Value::Null),
            Some(other) => Err(PropertyError::invalid_path(
                format_args!("{name}({key})"),
                alloc::format!("{} value is not a map", other.kind_name()),
            )),
        }
    }

    fn set_mapped(&mut self, name: &str, key: &str, value: Value) -> Result<(), PropertyError> {
        self.lookup_mapped(name, key)?;
        let slot = self.values.entry(name.to_string()).or_insert(Value::Null);
        if slot.is_null() {
            *slot = Value::Object(ObjectHandle::new(BTreeMap::<String, Value>::new()));
        }
        match slot {
            Value::Object(handle) => crate::access::write_key(handle, name, key, value),
            other => Err(PropertyError::invalid_path(
                format_args!("{name}({key})"),
                alloc::format!("{} value is not a map", other.kind_name()),
            )),
        }
    }

    #[inline]
    fn grows_on_index(&self, _name: &str) -> bool {
        self.class.grows_on_index
    }
}

impl Object for BasicBag {
    #[inline]
    fn type_name(&self) -> &str {
        self.class.name()
    }

    #[inline]
    fn object_ref(&self) -> ObjectRef<'_> {
        ObjectRef::Bag(self)
    }

    #[inline]
    fn object_mut(&mut self) -> ObjectMut<'_> {
        ObjectMut::Bag(self)
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl fmt::Debug for BasicBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for desc in self.class.descriptors() {
            if let Some(value) = self.values.get(desc.name()) {
                map.entry(&desc.name(), value);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    use super::{BagClass, BasicBag};
    use crate::access::PropertyError;
    use crate::object::{DynamicBag, PropertyDescriptor};
    use crate::value::{Scalar, Value, ValueType};

    fn class() -> Arc<BagClass> {
        BagClass::new("Order", [
            PropertyDescriptor::new("id", ValueType::Primitive(Scalar::I64)),
            PropertyDescriptor::new("note", ValueType::String),
            PropertyDescriptor::new("lines", ValueType::List),
            PropertyDescriptor::new("attrs", ValueType::Map),
        ])
    }

    #[test]
    fn describe_keeps_declaration_order() {
        let bag = class().instantiate();
        let names: Vec<&str> = bag.describe().iter().map(|desc| desc.name()).collect();
        assert_eq!(names, ["id", "note", "lines", "attrs"]);
    }

    #[test]
    fn duplicate_descriptor_replaces_earlier() {
        let class = BagClass::new("Dup", [
            PropertyDescriptor::new("a", ValueType::String),
            PropertyDescriptor::new("b", ValueType::String),
            PropertyDescriptor::new("a", ValueType::List),
        ]);
        assert_eq!(class.descriptors().len(), 2);
        assert!(class.descriptor("a").unwrap().is_indexed());
    }

    #[test]
    fn unset_values() {
        let bag = BasicBag::new(class());
        assert_eq!(bag.get("id").unwrap(), Value::I64(0));
        assert_eq!(bag.get("note").unwrap(), Value::Null);
        assert_eq!(bag.get_mapped("attrs", "k").unwrap(), Value::Null);
        assert!(matches!(
            bag.get("missing"),
            Err(PropertyError::NoSuchProperty { .. })
        ));
    }

    #[test]
    fn set_rejects_unassignable_values() {
        let mut bag = class().instantiate();
        assert!(matches!(
            bag.set("id", Value::from("1")),
            Err(PropertyError::Conversion { .. })
        ));
        assert!(matches!(
            bag.set("id", Value::Null),
            Err(PropertyError::NullToPrimitive { .. })
        ));
        bag.set("note", Value::Null).unwrap();
    }

    #[test]
    fn indexed_and_mapped_flags_are_enforced() {
        let mut bag = class().instantiate();
        assert!(matches!(
            bag.get_indexed("note", 0),
            Err(PropertyError::InvalidPath { .. })
        ));
        assert!(matches!(
            bag.set_mapped("lines", "k", Value::Null),
            Err(PropertyError::InvalidPath { .. })
        ));
    }

    #[test]
    fn mapped_property_is_created_on_write() {
        let mut bag = class().instantiate();
        bag.set_mapped("attrs", "color", Value::from("red")).unwrap();
        assert_eq!(bag.get_mapped("attrs", "color").unwrap(), Value::from("red"));
        assert_eq!(bag.get_mapped("attrs", "size").unwrap(), Value::Null);
    }

    #[test]
    fn list_growth_follows_class() {
        let mut fixed = class().instantiate();
        fixed.set("lines", Value::list(["a"])).unwrap();
        assert!(matches!(
            fixed.set_indexed("lines", 1, Value::from("b")),
            Err(PropertyError::InvalidPath { .. })
        ));

        let growable = BagClass::growable("Order", class().descriptors().to_vec());
        let mut bag = growable.instantiate();
        bag.set("lines", Value::list(["a"])).unwrap();
        bag.set_indexed("lines", 1, Value::from("b")).unwrap();
        assert_eq!(bag.get("lines").unwrap(), Value::list(["a", "b"]));
        assert!(matches!(
            bag.set_indexed("lines", 5, Value::from("c")),
            Err(PropertyError::IndexOutOfBounds { index: 5, len: 2, .. })
        ));
    }
}
