use alloc::sync::Arc;
use core::fmt;
use std::sync::{LazyLock, PoisonError, RwLock};

use crate::convert::{Converter, ConverterRegistry};
use crate::value::ValueType;

// -----------------------------------------------------------------------------
// ConverterRegistryArc

/// A [`ConverterRegistry`] shared between threads.
///
/// The registry itself is never mutated in place: every mutation clones the
/// current registry (if a snapshot is still in use), modifies the copy and
/// publishes it. A reader holding a [`snapshot`](Self::snapshot) keeps
/// seeing the registry as it was when the snapshot was taken.
///
/// # Examples
///
/// ```
/// use vc_property::convert::{ConverterRegistryArc, Converter};
/// use vc_property::{Value, ValueType};
///
/// let shared = ConverterRegistryArc::default();
/// let before = shared.snapshot();
///
/// shared.register(ValueType::Date, Converter::new(|_| Ok(Value::Null)));
///
/// assert!(!before.contains(&ValueType::Date));
/// assert!(shared.snapshot().contains(&ValueType::Date));
/// ```
#[derive(Clone, Default)]
pub struct ConverterRegistryArc {
    internal: Arc<RwLock<Arc<ConverterRegistry>>>,
}

impl ConverterRegistryArc {
    pub fn new(registry: ConverterRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// Returns the current registry.
    ///
    /// The lock is only held while the snapshot is cloned.
    pub fn snapshot(&self) -> Arc<ConverterRegistry> {
        let guard = self.internal.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Applies `f` to the registry and publishes the result.
    ///
    /// Mutations are serialized by the write lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut ConverterRegistry) -> R) -> R {
        let mut guard = self.internal.write().unwrap_or_else(PoisonError::into_inner);
        f(Arc::make_mut(&mut *guard))
    }

    /// See [`ConverterRegistry::register`].
    #[inline]
    pub fn register(&self, target: ValueType, converter: Converter) -> Option<Converter> {
        self.update(|registry| registry.register(target, converter))
    }

    /// See [`ConverterRegistry::deregister`].
    #[inline]
    pub fn deregister(&self, target: &ValueType) -> Option<Converter> {
        self.update(|registry| registry.deregister(target))
    }

    /// See [`ConverterRegistry::reset_to_defaults`].
    #[inline]
    pub fn reset_to_defaults(&self) {
        self.update(ConverterRegistry::reset_to_defaults);
    }
}

impl fmt::Debug for ConverterRegistryArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.snapshot(), f)
    }
}

// -----------------------------------------------------------------------------
// Global

static GLOBAL: LazyLock<ConverterRegistryArc> = LazyLock::new(ConverterRegistryArc::default);

/// The process-wide registry used by the free functions of this crate.
///
/// Prefer an explicit [`ConverterRegistry`] where the caller controls the
/// lifetime, registrations here are visible to every caller.
#[inline]
pub fn global() -> &'static ConverterRegistryArc {
    &GLOBAL
}
