use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::access::resolve::{self, Pending, PendingWrite};
use crate::access::{OffsetStep, PropertyError, PropertyPath, Step};
use crate::convert::{self, ConverterRegistry};
use crate::object::{Object, ObjectHandle};
use crate::value::{Value, ValueType};

// -----------------------------------------------------------------------------
// Cursor

/// The object the next step is resolved against.
enum Cursor<'r> {
    Root(&'r dyn Object),
    Handle(ObjectHandle),
}

impl Cursor<'_> {
    fn read(&self, step: &Step<'_>) -> Result<Value, PropertyError> {
        // The lock of a handle is released before a pending key is read.
        let pending = match self {
            Self::Root(object) => resolve::read_step(*object, step)?,
            Self::Handle(handle) => resolve::read_step(&*handle.read(), step)?,
        };
        finish_read(pending, step)
    }
}

fn finish_read(pending: Pending, step: &Step<'_>) -> Result<Value, PropertyError> {
    match (pending, step) {
        (Pending::Done(value), _) => Ok(value),
        (Pending::Key(handle), Step::Mapped { name, key }) => resolve::read_key(&handle, name, key),
        (Pending::Key(_), _) => Ok(Value::Null),
    }
}

fn finish_write(pending: PendingWrite, step: &Step<'_>) -> Result<(), PropertyError> {
    match (pending, step) {
        (PendingWrite::Key(handle, value), Step::Mapped { name, key }) => {
            resolve::write_key(&handle, name, key, value)
        }
        _ => Ok(()),
    }
}

// -----------------------------------------------------------------------------
// PropertyAccessor

/// Reads and writes properties addressed by a [`PropertyPath`].
///
/// Every step but the last must resolve to an object; the last step reads
/// or writes the value. Written values are converted to the declared type
/// of their slot with the accessor's [`ConverterRegistry`]. Reads return
/// values as stored.
///
/// The registry is a snapshot taken at construction: converters registered
/// later are not seen by an existing accessor.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use vc_property::{ObjectHandle, PropertyAccessor, Value};
///
/// let accessor = PropertyAccessor::new();
///
/// let mut root = BTreeMap::<String, Value>::new();
/// let inner = ObjectHandle::new(BTreeMap::<String, Value>::new());
/// root.insert("inner".into(), Value::Object(inner.clone()));
///
/// accessor.set(&mut root, "inner.tags", Value::list(["a"])).unwrap();
/// accessor.set(&mut root, "inner.attrs", Value::Object(
///     ObjectHandle::new(BTreeMap::<String, Value>::new()),
/// )).unwrap();
/// accessor.set(&mut root, "inner.attrs(color)", "red").unwrap();
///
/// assert_eq!(accessor.get(&root, "inner.tags[0]").unwrap(), Value::from("a"));
/// assert_eq!(accessor.get(&root, "inner.attrs(color)").unwrap(), Value::from("red"));
/// assert_eq!(accessor.get(&root, "inner.attrs(size)").unwrap(), Value::Null);
/// ```
#[derive(Debug, Clone)]
pub struct PropertyAccessor {
    registry: Arc<ConverterRegistry>,
}

impl Default for PropertyAccessor {
    /// See [`PropertyAccessor::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyAccessor {
    /// Creates an accessor using a snapshot of the [global](convert::global) registry.
    pub fn new() -> Self {
        Self {
            registry: convert::global().snapshot(),
        }
    }

    /// Creates an accessor using `registry`.
    pub fn with_registry(registry: impl Into<Arc<ConverterRegistry>>) -> Self {
        Self {
            registry: registry.into(),
        }
    }

    #[inline]
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Parses `path` and reads the property it addresses.
    pub fn get(&self, root: &dyn Object, path: &str) -> Result<Value, PropertyError> {
        self.get_path(root, &PropertyPath::parse(path)?)
    }

    /// Parses `path` and writes `value` to the property it addresses.
    pub fn set(
        &self,
        root: &mut dyn Object,
        path: &str,
        value: impl Into<Value>,
    ) -> Result<(), PropertyError> {
        self.set_path(root, &PropertyPath::parse(path)?, value.into())
    }

    /// Reads the property addressed by `path`.
    pub fn get_path(&self, root: &dyn Object, path: &PropertyPath) -> Result<Value, PropertyError> {
        let (last, parent) = self.walk(Cursor::Root(root), path)?;
        parent.read(&last.step)
    }

    /// Writes `value` to the property addressed by `path`.
    ///
    /// Only the object owning the last step is modified. A failed write
    /// leaves it unchanged.
    pub fn set_path(
        &self,
        root: &mut dyn Object,
        path: &PropertyPath,
        value: Value,
    ) -> Result<(), PropertyError> {
        let steps = path.steps();
        let last = &steps[steps.len() - 1].step;

        let pending = if steps.len() == 1 {
            resolve::write_step(&self.registry, root, last, value)?
        } else {
            let (_, parent) = self.walk(Cursor::Root(&*root), path)?;
            let Cursor::Handle(handle) = parent else {
                return Err(PropertyError::invalid_path(last, "parent is not an object"));
            };
            resolve::write_step(&self.registry, &mut *handle.write(), last, value)?
        };
        finish_write(pending, last)
    }

    /// Reads the property at `path` as text.
    ///
    /// Non-string values are rendered with the registry's string converter;
    /// null reads as `None`.
    pub fn get_string(
        &self,
        root: &dyn Object,
        path: &str,
    ) -> Result<Option<String>, PropertyError> {
        let path = PropertyPath::parse(path)?;
        let value = self.get_path(root, &path)?;
        self.text_of(&path, value)
    }

    /// Reads the property at `path` as a sequence of texts.
    ///
    /// Arrays and lists convert element by element, keeping order and
    /// length; any other non-null value becomes a single element.
    pub fn get_string_array(
        &self,
        root: &dyn Object,
        path: &str,
    ) -> Result<Option<Vec<Option<String>>>, PropertyError> {
        let path = PropertyPath::parse(path)?;
        let items = match self.get_path(root, &path)? {
            Value::Null => return Ok(None),
            Value::Array(items) | Value::List(items) => items,
            other => alloc::vec![other],
        };
        items
            .into_iter()
            .map(|item| self.text_of(&path, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Reads the property at `path` and converts it to `target`.
    pub fn get_as(
        &self,
        root: &dyn Object,
        path: &str,
        target: &ValueType,
    ) -> Result<Value, PropertyError> {
        let path = PropertyPath::parse(path)?;
        let value = self.get_path(root, &path)?;
        self.registry
            .convert(&value, target)
            .map_err(|err| PropertyError::conversion(&path.to_string(), err))
    }

    fn text_of(&self, path: &PropertyPath, value: Value) -> Result<Option<String>, PropertyError> {
        let text = match value {
            Value::String(text) => Value::String(text),
            value => self
                .registry
                .convert(&value, &ValueType::String)
                .map_err(|err| PropertyError::conversion(&path.to_string(), err))?,
        };
        match text {
            Value::String(text) => Ok(Some(text)),
            _ => Ok(None),
        }
    }

    /// Resolves every step but the last, returning the last step and the
    /// object it applies to.
    fn walk<'p, 'r>(
        &self,
        root: Cursor<'r>,
        path: &'p PropertyPath,
    ) -> Result<(&'p OffsetStep<'static>, Cursor<'r>), PropertyError> {
        let steps = path.steps();
        let (last, parents) = match steps.split_last() {
            Some(split) => split,
            None => return Err(PropertyError::invalid_path(path, "empty path")),
        };

        let mut cursor = root;
        for (i, step) in parents.iter().enumerate() {
            let value = cursor.read(&step.step)?;
            cursor = match value {
                Value::Object(handle) => Cursor::Handle(handle),
                Value::Null => {
                    return Err(PropertyError::NullIntermediate {
                        path: path.prefix(i + 1),
                        next: steps[i + 1].step.to_string(),
                    });
                }
                other => {
                    return Err(PropertyError::invalid_path(
                        &steps[i + 1].step,
                        alloc::format!("{} value has no properties", other.kind_name()),
                    ));
                }
            };
        }
        Ok((last, cursor))
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::sync::Arc;
    use core::sync::atomic::Ordering;

    use super::PropertyAccessor;
    use crate::access::PropertyError;
    use crate::convert::{ConverterRegistry, DEFAULT_DATE_FORMAT, date_parser};
    use crate::object::{BagClass, DynamicBag, ObjectHandle, PropertyDescriptor};
    use crate::testing::{self, Person};
    use crate::value::{Scalar, Value, ValueType};

    fn accessor() -> PropertyAccessor {
        PropertyAccessor::with_registry(ConverterRegistry::new())
    }

    fn map() -> BTreeMap<String, Value> {
        BTreeMap::new()
    }

    #[test]
    fn map_round_trip() {
        let accessor = accessor();
        let mut root = map();
        accessor.set(&mut root, "name", "Ada").unwrap();
        accessor.set(&mut root, "age", 36_i32).unwrap();
        assert_eq!(accessor.get(&root, "name").unwrap(), Value::from("Ada"));
        assert_eq!(accessor.get(&root, "age").unwrap(), Value::I32(36));
        assert_eq!(accessor.get(&root, "missing").unwrap(), Value::Null);
    }

    #[test]
    fn record_round_trip_with_conversion() {
        let accessor = accessor();
        let mut person = Person::default();
        accessor.set(&mut person, "name", "Grace").unwrap();
        accessor.set(&mut person, "age", "85").unwrap();
        accessor.set(&mut person, "score", 2.5_f64).unwrap();

        assert_eq!(accessor.get(&person, "name").unwrap(), Value::from("Grace"));
        assert_eq!(accessor.get(&person, "age").unwrap(), Value::I32(85));
        assert_eq!(accessor.get(&person, "score").unwrap(), Value::F64(2.5));
        assert!(matches!(
            accessor.set(&mut person, "age", "old"),
            Err(PropertyError::Conversion { .. })
        ));
        assert_eq!(person.age, 85);
    }

    #[test]
    fn null_assignment() {
        let accessor = accessor();
        let mut person = Person::default();
        accessor.set(&mut person, "score", 1.0_f64).unwrap();
        accessor.set(&mut person, "score", Value::Null).unwrap();
        assert_eq!(person.score, Some(1.0));
        assert!(matches!(
            accessor.set(&mut person, "age", Value::Null),
            Err(PropertyError::NullToPrimitive { ty: Scalar::I32, .. })
        ));
    }

    #[test]
    fn unknown_and_read_only_properties() {
        let accessor = accessor();
        let mut person = Person::default();
        assert!(matches!(
            accessor.get(&person, "nickname"),
            Err(PropertyError::NoSuchProperty { .. })
        ));
        assert!(matches!(
            accessor.set(&mut person, "id", 3_i64),
            Err(PropertyError::NotWritable { .. })
        ));
        assert!(matches!(
            accessor.get(&person, "password"),
            Err(PropertyError::NotReadable { .. })
        ));
    }

    #[test]
    fn indexed_access() {
        let accessor = accessor();
        let mut person = Person::default();
        accessor
            .set(&mut person, "tags", Value::list(["a", "b", "c"]))
            .unwrap();
        accessor.set(&mut person, "tags[1]", "x").unwrap();
        assert_eq!(accessor.get(&person, "tags[1]").unwrap(), Value::from("x"));
        assert_eq!(
            accessor.get(&person, "tags[5]"),
            Err(PropertyError::out_of_bounds("tags", 5, 3))
        );

        // The record grows `tags` on `tags[len]`.
        accessor.set(&mut person, "tags[3]", "d").unwrap();
        assert_eq!(person.tags.len(), 4);
        assert_eq!(
            accessor.set(&mut person, "tags[9]", "z"),
            Err(PropertyError::out_of_bounds("tags", 9, 4))
        );
    }

    #[test]
    fn indexed_overload_is_preferred() {
        let accessor = accessor();
        let mut person = Person::default();
        person.scores = alloc::vec![1, 2, 3];
        accessor.set(&mut person, "scores[0]", "10").unwrap();
        assert_eq!(accessor.get(&person, "scores[0]").unwrap(), Value::I32(10));
        assert_eq!(person.overload_calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn fixed_arrays_do_not_grow() {
        let accessor = accessor();
        let mut root = map();
        accessor.set(&mut root, "xs", Value::array([1_i32, 2, 3])).unwrap();
        accessor.set(&mut root, "xs[0]", 7_i32).unwrap();
        assert_eq!(accessor.get(&root, "xs[0]").unwrap(), Value::I32(7));
        assert_eq!(
            accessor.set(&mut root, "xs[3]", 4_i32),
            Err(PropertyError::out_of_bounds("xs", 3, 3))
        );
        assert!(matches!(
            accessor.get(&root, "xs[0].y"),
            Err(PropertyError::InvalidPath { .. })
        ));
    }

    #[test]
    fn mapped_access() {
        let accessor = accessor();
        let mut person = Person::default();
        accessor.set(&mut person, "attributes(eyes)", "green").unwrap();
        assert_eq!(
            accessor.get(&person, "attributes(eyes)").unwrap(),
            Value::from("green")
        );
        assert_eq!(accessor.get(&person, "attributes(hair)").unwrap(), Value::Null);
        assert!(matches!(
            accessor.get(&person, "name(x)"),
            Err(PropertyError::InvalidPath { .. })
        ));
    }

    #[test]
    fn nested_writes_mutate_in_place() {
        let accessor = accessor();
        let mut person = Person::default();
        person.address = Some(testing::address("Main St"));
        accessor.set(&mut person, "address.city", "Springfield").unwrap();
        assert_eq!(
            accessor.get(&person, "address.city").unwrap(),
            Value::from("Springfield")
        );
        assert_eq!(
            accessor.get(&person, "address.street").unwrap(),
            Value::from("Main St")
        );
    }

    #[test]
    fn null_intermediate() {
        let accessor = accessor();
        let mut person = Person::default();
        let expected = PropertyError::NullIntermediate {
            path: "address".into(),
            next: "city".into(),
        };
        assert_eq!(accessor.get(&person, "address.city"), Err(expected.clone()));
        assert_eq!(accessor.set(&mut person, "address.city", "x"), Err(expected));
    }

    #[test]
    fn scalar_intermediate_is_invalid() {
        let accessor = accessor();
        let mut root = map();
        accessor.set(&mut root, "n", 1_i32).unwrap();
        assert!(matches!(
            accessor.set(&mut root, "n.m", 2_i32),
            Err(PropertyError::InvalidPath { .. })
        ));
    }

    /// A bag that trusts its caller to stay within its descriptors.
    struct Lenient {
        descriptors: [PropertyDescriptor; 2],
        writes: usize,
    }

    crate::impl_object!(bag Lenient);

    impl Lenient {
        fn new() -> Self {
            Self {
                descriptors: [
                    PropertyDescriptor::new("age", ValueType::Primitive(Scalar::I32)),
                    PropertyDescriptor::new("rank", ValueType::Nullable(Scalar::I32)),
                ],
                writes: 0,
            }
        }
    }

    impl DynamicBag for Lenient {
        fn describe(&self) -> &[PropertyDescriptor] {
            &self.descriptors
        }

        fn get(&self, _name: &str) -> Result<Value, PropertyError> {
            Ok(Value::from("whole"))
        }

        fn set(&mut self, _name: &str, _value: Value) -> Result<(), PropertyError> {
            self.writes += 1;
            Ok(())
        }

        fn get_indexed(&self, _name: &str, _index: usize) -> Result<Value, PropertyError> {
            Ok(Value::from("elem"))
        }

        fn set_indexed(
            &mut self,
            _name: &str,
            _index: usize,
            _value: Value,
        ) -> Result<(), PropertyError> {
            self.writes += 1;
            Ok(())
        }

        fn get_mapped(&self, _name: &str, _key: &str) -> Result<Value, PropertyError> {
            Ok(Value::from("keyed"))
        }

        fn set_mapped(
            &mut self,
            _name: &str,
            _key: &str,
            _value: Value,
        ) -> Result<(), PropertyError> {
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn bag_paths_follow_descriptors() {
        let accessor = accessor();
        let mut bag = Lenient::new();
        assert_eq!(accessor.get(&bag, "age").unwrap(), Value::from("whole"));
        assert!(matches!(
            accessor.get(&bag, "nope"),
            Err(PropertyError::NoSuchProperty { .. })
        ));
        assert!(matches!(
            accessor.get(&bag, "age[0]"),
            Err(PropertyError::InvalidPath { .. })
        ));
        assert!(matches!(
            accessor.get(&bag, "age(k)"),
            Err(PropertyError::InvalidPath { .. })
        ));
        assert!(matches!(
            accessor.set(&mut bag, "nope", 1_i32),
            Err(PropertyError::NoSuchProperty { .. })
        ));
        assert!(matches!(
            accessor.set(&mut bag, "age[0]", "x"),
            Err(PropertyError::InvalidPath { .. })
        ));
        assert!(matches!(
            accessor.set(&mut bag, "age(k)", "x"),
            Err(PropertyError::InvalidPath { .. })
        ));
        assert_eq!(bag.writes, 0);

        accessor.set(&mut bag, "age", "3").unwrap();
        assert_eq!(bag.writes, 1);
    }

    #[test]
    fn null_into_nullable_bag_slot_is_ignored() {
        let accessor = accessor();
        let mut bag = Lenient::new();
        accessor.set(&mut bag, "rank", Value::Null).unwrap();
        assert_eq!(bag.writes, 0);
        accessor.set(&mut bag, "rank", 2_i32).unwrap();
        assert_eq!(bag.writes, 1);
    }

    #[test]
    fn malformed_path() {
        let accessor = accessor();
        let root = map();
        assert!(matches!(
            accessor.get(&root, "a[b]"),
            Err(PropertyError::MalformedPath(_))
        ));
    }

    #[test]
    fn kind_agnostic_resolution() {
        let accessor = accessor();
        let class = BagClass::growable("Person", [
            PropertyDescriptor::new("name", ValueType::String),
            PropertyDescriptor::new("age", ValueType::Primitive(Scalar::I32)),
            PropertyDescriptor::new("tags", ValueType::List),
            PropertyDescriptor::new("attributes", ValueType::Map),
        ]);
        let mut bag = class.instantiate();
        let mut record = Person::default();
        // Maps hold untyped values and do not create nested maps.
        let mut map = map();
        map.insert(
            "attributes".into(),
            Value::Object(ObjectHandle::new(BTreeMap::<String, Value>::new())),
        );

        let objects: [&mut dyn crate::Object; 3] = [&mut bag, &mut record, &mut map];
        for object in objects {
            accessor.set(object, "name", "Lin").unwrap();
            accessor.set(object, "tags", Value::list(["-"])).unwrap();
            accessor.set(object, "tags[0]", "t").unwrap();
            accessor.set(object, "attributes(k)", "v").unwrap();

            assert_eq!(accessor.get(object, "name").unwrap(), Value::from("Lin"));
            assert_eq!(accessor.get(object, "tags[0]").unwrap(), Value::from("t"));
            assert_eq!(accessor.get(object, "attributes(k)").unwrap(), Value::from("v"));
            assert_eq!(accessor.get(object, "attributes(none)").unwrap(), Value::Null);
        }
    }

    #[test]
    fn string_reads() {
        let accessor = accessor();
        let mut person = Person::default();
        accessor.set(&mut person, "age", 7_i32).unwrap();
        accessor
            .set(&mut person, "tags", Value::list(["a", "b"]))
            .unwrap();

        assert_eq!(accessor.get_string(&person, "age").unwrap(), Some("7".into()));
        assert_eq!(accessor.get_string(&person, "score").unwrap(), None);
        assert_eq!(
            accessor.get_string_array(&person, "tags").unwrap(),
            Some(alloc::vec![Some("a".into()), Some("b".into())])
        );
        assert_eq!(
            accessor.get_string_array(&person, "age").unwrap(),
            Some(alloc::vec![Some("7".into())])
        );
        assert_eq!(accessor.get_string_array(&person, "score").unwrap(), None);
    }

    #[test]
    fn date_round_trip_through_text() {
        let mut registry = ConverterRegistry::new();
        registry.register(ValueType::Date, date_parser(DEFAULT_DATE_FORMAT));
        let accessor = PropertyAccessor::with_registry(Arc::new(registry));

        let mut person = Person::default();
        accessor.set(&mut person, "born", "1815-12-10T00:00:00").unwrap();
        let text = accessor.get_string(&person, "born").unwrap().unwrap();
        assert_eq!(text, "1815-12-10T00:00:00");

        let plain = self::accessor();
        assert!(matches!(
            plain.set(&mut person, "born", "1815-12-10T00:00:00"),
            Err(PropertyError::Conversion { .. })
        ));
    }

    #[test]
    fn get_as_converts_reads() {
        let accessor = accessor();
        let mut root = map();
        accessor.set(&mut root, "n", "12").unwrap();
        assert_eq!(
            accessor.get_as(&root, "n", &ValueType::Primitive(Scalar::I64)).unwrap(),
            Value::I64(12)
        );
    }
}
