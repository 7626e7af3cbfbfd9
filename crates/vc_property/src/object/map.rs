use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;
use core::hash::BuildHasher;
use std::collections::HashMap;

use crate::object::{Object, ObjectMut, ObjectRef};
use crate::value::Value;

// -----------------------------------------------------------------------------
// MapLike

/// A key/value map addressed by property paths.
///
/// A property name on a map is a key. Maps hold untyped values: writes
/// are stored as given, without conversion, and a missing key reads as null.
pub trait MapLike: Send + Sync {
    /// Returns a copy of the value stored under `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key`, returning the previous value.
    fn insert(&mut self, key: &str, value: Value) -> Option<Value>;

    /// Returns every key, in an order that is stable between calls.
    fn keys(&self) -> Vec<String>;

    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Whether writing `name[len]` appends to the list stored under `name`.
    ///
    /// Defaults to `false`, such a write then fails with
    /// [`PropertyError::InvalidPath`](crate::PropertyError::InvalidPath).
    #[inline]
    fn grows_on_index(&self, _name: &str) -> bool {
        false
    }
}

// -----------------------------------------------------------------------------
// BTreeMap

impl MapLike for BTreeMap<String, Value> {
    #[inline]
    fn get(&self, key: &str) -> Option<Value> {
        BTreeMap::get(self, key).cloned()
    }

    #[inline]
    fn insert(&mut self, key: &str, value: Value) -> Option<Value> {
        BTreeMap::insert(self, key.to_string(), value)
    }

    #[inline]
    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).cloned().collect()
    }

    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        BTreeMap::contains_key(self, key)
    }
}

crate::impl_object!(map BTreeMap<String, Value>);

// -----------------------------------------------------------------------------
// HashMap

macro_rules! impl_map_like_for_hash_map {
    ($($map:ident)::+, $name:literal) => {
        impl<S> MapLike for $($map)::+<String, Value, S>
        where
            S: BuildHasher + Send + Sync,
        {
            #[inline]
            fn get(&self, key: &str) -> Option<Value> {
                $($map)::+::get(self, key).cloned()
            }

            #[inline]
            fn insert(&mut self, key: &str, value: Value) -> Option<Value> {
                $($map)::+::insert(self, key.to_string(), value)
            }

            /// Keys are sorted, hash order is not stable.
            fn keys(&self) -> Vec<String> {
                let mut keys: Vec<String> = $($map)::+::keys(self).cloned().collect();
                keys.sort_unstable();
                keys
            }

            #[inline]
            fn contains_key(&self, key: &str) -> bool {
                $($map)::+::contains_key(self, key)
            }
        }

        impl<S> Object for $($map)::+<String, Value, S>
        where
            S: BuildHasher + Send + Sync + 'static,
        {
            #[inline]
            fn type_name(&self) -> &str {
                $name
            }

            #[inline]
            fn object_ref(&self) -> ObjectRef<'_> {
                ObjectRef::Map(self)
            }

            #[inline]
            fn object_mut(&mut self) -> ObjectMut<'_> {
                ObjectMut::Map(self)
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
    };
}

impl_map_like_for_hash_map!(HashMap, "HashMap<String, Value>");
impl_map_like_for_hash_map!(hashbrown::HashMap, "hashbrown::HashMap<String, Value>");

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use std::collections::HashMap;

    use crate::access::PropertyAccessor;
    use crate::convert::ConverterRegistry;
    use crate::hash::FixedHashState;
    use crate::object::{MapLike, Object, ObjectKind};
    use crate::value::Value;

    #[test]
    fn hash_map_keys_are_sorted() {
        let mut map: HashMap<String, Value> = HashMap::new();
        for key in ["delta", "alpha", "charlie", "bravo"] {
            MapLike::insert(&mut map, key, Value::Null);
        }
        assert_eq!(MapLike::keys(&map), ["alpha", "bravo", "charlie", "delta"]);
    }

    #[test]
    fn hashbrown_map_is_an_object() {
        let mut map: hashbrown::HashMap<String, Value, FixedHashState> =
            hashbrown::HashMap::default();
        let accessor = PropertyAccessor::with_registry(ConverterRegistry::new());
        accessor.set(&mut map, "b", 2_i32).unwrap();
        accessor.set(&mut map, "a", "x").unwrap();

        assert_eq!(MapLike::keys(&map), ["a", "b"]);
        assert_eq!(accessor.get(&map, "b").unwrap(), Value::I32(2));
        assert_eq!(accessor.get(&map, "c").unwrap(), Value::Null);
        assert_eq!((&map as &dyn Object).kind(), ObjectKind::Map);
    }

    #[test]
    fn maps_expose_map_capability() {
        let map: BTreeMap<String, Value> = BTreeMap::new();
        let object: &dyn Object = &map;
        assert_eq!(object.kind(), ObjectKind::Map);
        assert!(object.downcast_ref::<BTreeMap<String, Value>>().is_some());
    }
}
