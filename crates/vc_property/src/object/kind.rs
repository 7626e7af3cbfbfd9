use alloc::sync::Arc;
use core::any::Any;
use core::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};

use crate::object::{DynamicBag, MapLike, StructuredRecord};

// -----------------------------------------------------------------------------
// ObjectKind

/// The capability an [`Object`] exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Map,
    Bag,
    Record,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map => f.pad("Map"),
            Self::Bag => f.pad("Bag"),
            Self::Record => f.pad("Record"),
        }
    }
}

/// An immutable reference to the capability of an [`Object`].
pub enum ObjectRef<'a> {
    Map(&'a dyn MapLike),
    Bag(&'a dyn DynamicBag),
    Record(&'a dyn StructuredRecord),
}

/// A mutable reference to the capability of an [`Object`].
pub enum ObjectMut<'a> {
    Map(&'a mut dyn MapLike),
    Bag(&'a mut dyn DynamicBag),
    Record(&'a mut dyn StructuredRecord),
}

impl ObjectRef<'_> {
    #[inline]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Map(_) => ObjectKind::Map,
            Self::Bag(_) => ObjectKind::Bag,
            Self::Record(_) => ObjectKind::Record,
        }
    }
}

impl ObjectMut<'_> {
    #[inline]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Map(_) => ObjectKind::Map,
            Self::Bag(_) => ObjectKind::Bag,
            Self::Record(_) => ObjectKind::Record,
        }
    }
}

// -----------------------------------------------------------------------------
// Object

/// An object whose properties can be addressed by a property path.
///
/// An implementation must always return the same [`ObjectKind`] from
/// [`object_ref`](Object::object_ref) and [`object_mut`](Object::object_mut).
///
/// Implement one of [`MapLike`], [`DynamicBag`] or [`StructuredRecord`] and use
/// [`impl_object!`](crate::impl_object) instead of writing this by hand.
pub trait Object: Any + Send + Sync {
    /// A readable name of the object's type, used in error messages.
    fn type_name(&self) -> &str;

    fn object_ref(&self) -> ObjectRef<'_>;

    fn object_mut(&mut self) -> ObjectMut<'_>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Object {
    #[inline]
    pub fn kind(&self) -> ObjectKind {
        self.object_ref().kind()
    }

    #[inline]
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: Object>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Implements [`Object`] for a type implementing one capability trait.
///
/// # Examples
///
/// ```
/// use vc_property::impl_object;
/// use vc_property::object::MapLike;
/// use vc_property::Value;
///
/// #[derive(Default)]
/// struct Settings(Vec<(String, Value)>);
///
/// impl MapLike for Settings {
///     fn get(&self, key: &str) -> Option<Value> {
///         self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
///     }
///
///     fn insert(&mut self, key: &str, value: Value) -> Option<Value> {
///         match self.0.iter_mut().find(|(k, _)| k == key) {
///             Some((_, slot)) => Some(core::mem::replace(slot, value)),
///             None => {
///                 self.0.push((key.to_owned(), value));
///                 None
///             }
///         }
///     }
///
///     fn keys(&self) -> Vec<String> {
///         self.0.iter().map(|(k, _)| k.clone()).collect()
///     }
/// }
///
/// impl_object!(map Settings);
///
/// let mut settings = Settings::default();
/// vc_property::set_property(&mut settings, "volume", 7_i32).unwrap();
/// assert_eq!(vc_property::get_property(&settings, "volume").unwrap(), Value::I32(7));
/// ```
#[macro_export]
macro_rules! impl_object {
    (map $ty:ty) => {
        $crate::impl_object!(@impl $ty, Map);
    };
    (bag $ty:ty) => {
        $crate::impl_object!(@impl $ty, Bag);
    };
    (record $ty:ty) => {
        $crate::impl_object!(@impl $ty, Record);
    };
    (@impl $ty:ty, $kind:ident) => {
        impl $crate::object::Object for $ty {
            #[inline]
            fn type_name(&self) -> &str {
                ::core::any::type_name::<$ty>()
            }

            #[inline]
            fn object_ref(&self) -> $crate::object::ObjectRef<'_> {
                $crate::object::ObjectRef::$kind(self)
            }

            #[inline]
            fn object_mut(&mut self) -> $crate::object::ObjectMut<'_> {
                $crate::object::ObjectMut::$kind(self)
            }

            #[inline]
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            #[inline]
            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }
    };
}

// -----------------------------------------------------------------------------
// ObjectHandle

/// A shared, lock-protected [`Object`].
///
/// Handles are what [`Value::Object`](crate::Value::Object) carries: cloning a
/// handle clones the reference, not the object. Locks are only held while a
/// single path step is resolved.
///
/// Poisoned locks are recovered, the object is still returned.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use vc_property::{ObjectHandle, Value};
///
/// let handle = ObjectHandle::new(BTreeMap::<String, Value>::new());
/// let alias = handle.clone();
///
/// vc_property::set_property(&mut *handle.write(), "k", "v").unwrap();
/// assert_eq!(
///     vc_property::get_property(&*alias.read(), "k").unwrap(),
///     Value::from("v"),
/// );
/// assert!(handle.ptr_eq(&alias));
/// ```
#[derive(Clone)]
pub struct ObjectHandle {
    kind: ObjectKind,
    inner: Arc<RwLock<dyn Object>>,
}

impl ObjectHandle {
    pub fn new<T: Object>(object: T) -> Self {
        let kind = object.object_ref().kind();
        let inner: Arc<RwLock<dyn Object>> = Arc::new(RwLock::new(object));
        Self { kind, inner }
    }

    /// The capability of the wrapped object, without taking the lock.
    #[inline]
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Takes a read lock on the wrapped object.
    pub fn read(&self) -> RwLockReadGuard<'_, dyn Object> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the wrapped object.
    pub fn write(&self) -> RwLockWriteGuard<'_, dyn Object> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if both handles point to the same object.
    #[inline]
    pub fn ptr_eq(&self, other: &ObjectHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Runs `f` with the wrapped object downcast to `T`.
    ///
    /// Returns `None` if the object is not a `T`.
    pub fn with<T: Object, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.read();
        guard.downcast_ref::<T>().map(f)
    }

    // The Display and Debug impls must not block when the current thread
    // already holds the lock, they run while errors are built.
    fn fmt_type_name(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_read() {
            Ok(guard) => write!(f, "<{}>", guard.type_name()),
            Err(TryLockError::Poisoned(err)) => write!(f, "<{}>", err.into_inner().type_name()),
            Err(TryLockError::WouldBlock) => write!(f, "<locked {}>", self.kind),
        }
    }
}

impl fmt::Display for ObjectHandle {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_type_name(f)
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ObjectHandle(")?;
        self.fmt_type_name(f)?;
        f.write_str(")")
    }
}
