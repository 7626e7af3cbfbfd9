//! Fixtures shared by the tests of this crate.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::LazyLock;

use chrono::NaiveDateTime;

use crate::access::PropertyError;
use crate::convert::ConvertError;
use crate::object::{
    AccessArg, ArgShape, BagClass, ObjectHandle, PropertyDescriptor, RecordAccessor,
    StructuredRecord,
};
use crate::value::{Scalar, Value, ValueType};

static PERSON_ACCESSORS: LazyLock<Vec<RecordAccessor>> = LazyLock::new(|| {
    use ArgShape::{Indexed, Mapped, Plain};

    alloc::vec![
        RecordAccessor::new("id", Plain, ValueType::Primitive(Scalar::I64)).read_only(),
        RecordAccessor::new("password", Plain, ValueType::String).write_only(),
        RecordAccessor::new("name", Plain, ValueType::String),
        RecordAccessor::new("age", Plain, ValueType::Primitive(Scalar::I32)),
        RecordAccessor::new("score", Plain, ValueType::Nullable(Scalar::F64)),
        RecordAccessor::new("born", Plain, ValueType::Date),
        RecordAccessor::new("tags", Plain, ValueType::List),
        RecordAccessor::new("scores", Plain, ValueType::array_of(Scalar::I32.into())),
        RecordAccessor::new("scores", Indexed, ValueType::Primitive(Scalar::I32)),
        RecordAccessor::new("attributes", Mapped, ValueType::String),
        RecordAccessor::new("address", Plain, ValueType::Object),
    ]
});

/// A structured record with one accessor of every shape.
///
/// - `id` is read-only, `password` write-only.
/// - `scores` has both a plain and an indexed accessor, the indexed one
///   counts its calls in `overload_calls`.
/// - `attributes` is only reachable by key.
/// - `tags[len]` appends.
#[derive(Debug, Default)]
pub(crate) struct Person {
    pub id: i64,
    pub password: String,
    pub name: String,
    pub age: i32,
    pub score: Option<f64>,
    pub born: Option<NaiveDateTime>,
    pub tags: Vec<String>,
    pub scores: Vec<i32>,
    pub attributes: BTreeMap<String, String>,
    pub address: Option<ObjectHandle>,
    pub overload_calls: AtomicUsize,
}

crate::impl_object!(record Person);

impl StructuredRecord for Person {
    fn accessors(&self) -> &[RecordAccessor] {
        &PERSON_ACCESSORS
    }

    fn read(&self, accessor: &RecordAccessor, arg: AccessArg<'_>) -> Result<Value, PropertyError> {
        let value = match (accessor.name(), arg) {
            ("id", AccessArg::None) => Value::I64(self.id),
            ("name", AccessArg::None) => Value::from(self.name.as_str()),
            ("age", AccessArg::None) => Value::I32(self.age),
            ("score", AccessArg::None) => self.score.into(),
            ("born", AccessArg::None) => self.born.into(),
            ("tags", AccessArg::None) => Value::list(self.tags.iter().map(String::as_str)),
            ("scores", AccessArg::None) => Value::array(self.scores.iter().copied()),
            ("scores", AccessArg::Index(index)) => {
                self.overload_calls.fetch_add(1, Ordering::Relaxed);
                match self.scores.get(index) {
                    Some(score) => Value::I32(*score),
                    None => {
                        let len = self.scores.len();
                        return Err(PropertyError::out_of_bounds("scores", index, len));
                    }
                }
            }
            ("attributes", AccessArg::Key(key)) => {
                self.attributes.get(key).map(String::as_str).into()
            }
            ("address", AccessArg::None) => self.address.clone().into(),
            (name, _) => return Err(PropertyError::not_readable("Person", name)),
        };
        Ok(value)
    }

    fn write(
        &mut self,
        accessor: &RecordAccessor,
        arg: AccessArg<'_>,
        value: Value,
    ) -> Result<(), PropertyError> {
        match (accessor.name(), arg, value) {
            ("password", AccessArg::None, Value::String(text)) => self.password = text,
            ("name", AccessArg::None, Value::String(text)) => self.name = text,
            ("name", AccessArg::None, Value::Null) => self.name.clear(),
            ("age", AccessArg::None, Value::I32(age)) => self.age = age,
            ("score", AccessArg::None, value) => self.score = value.as_f64(),
            ("born", AccessArg::None, value) => self.born = value.as_date().copied(),
            ("tags", AccessArg::None, Value::List(items) | Value::Array(items)) => {
                self.tags = items
                    .iter()
                    .map(|item| item.as_str().map_or_else(|| item.to_string(), String::from))
                    .collect();
            }
            ("tags", AccessArg::None, Value::Null) => self.tags.clear(),
            ("scores", AccessArg::None, Value::Array(items)) => {
                self.scores = items
                    .iter()
                    .filter_map(|item| item.as_i64())
                    .map(|n| n as i32)
                    .collect();
            }
            ("scores", AccessArg::Index(index), Value::I32(score)) => {
                self.overload_calls.fetch_add(1, Ordering::Relaxed);
                let len = self.scores.len();
                match self.scores.get_mut(index) {
                    Some(slot) => *slot = score,
                    None => return Err(PropertyError::out_of_bounds("scores", index, len)),
                }
            }
            ("attributes", AccessArg::Key(key), Value::String(text)) => {
                self.attributes.insert(key.into(), text);
            }
            ("attributes", AccessArg::Key(key), Value::Null) => {
                self.attributes.remove(key);
            }
            ("address", AccessArg::None, value) => self.address = value.as_object().cloned(),
            (name, _, value) => {
                return Err(PropertyError::conversion(
                    name,
                    ConvertError::unassignable(accessor.ty(), &value),
                ));
            }
        }
        Ok(())
    }

    fn grows_on_index(&self, name: &str) -> bool {
        name == "tags"
    }
}

/// A bag of class `Address` with `street` set.
pub(crate) fn address(street: &str) -> ObjectHandle {
    let class = BagClass::new("Address", [
        PropertyDescriptor::new("street", ValueType::String),
        PropertyDescriptor::new("city", ValueType::String),
        PropertyDescriptor::new("zip", ValueType::Nullable(Scalar::I32)),
    ]);
    let mut bag = class.instantiate();
    crate::object::DynamicBag::set(&mut bag, "street", Value::from(street))
        .unwrap_or_else(|err| panic!("{err}"));
    ObjectHandle::new(bag)
}
