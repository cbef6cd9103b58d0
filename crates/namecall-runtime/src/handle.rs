//! Typed handle table
//!
//! Objects created through the registry live in a [`HandleTable`] and are named
//! in text by an opaque integer [`Handle`]. A handle packs a slot index and a
//! generation; releasing an object bumps the generation so an old handle never
//! resolves to a newer object. Resolution also checks the concrete type, so a
//! handle taken from one constructor cannot be fed to another type's method.
//!
//! # Examples
//!
//! ```
//! use namecall_runtime::handle::HandleTable;
//!
//! let table = HandleTable::new();
//! let handle = table.insert(String::from("abc"));
//!
//! let object = table.get(handle).unwrap();
//! object.lock().push('d');
//! assert_eq!(*object.lock(), "abcd");
//!
//! table.remove(handle.raw()).unwrap();
//! assert!(table.get(handle).is_err());
//! ```

use crate::error::HandleError;
use crate::value::{parse_integer, ConversionError, Dynamic, FromDynamic, ToDynamic, HEX_PREFIX};
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Opaque, generation-checked name of an object of type `T`
pub struct Handle<T> {
    raw: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self::from_raw((u64::from(generation) << 32) | u64::from(index))
    }

    /// Reinterpret a raw value; nothing is checked until the handle is resolved
    pub fn from_raw(raw: u64) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    pub fn raw(&self) -> u64 {
        self.raw
    }

    pub fn index(&self) -> u32 {
        (self.raw & u64::from(u32::MAX)) as u32
    }

    pub fn generation(&self) -> u32 {
        (self.raw >> 32) as u32
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({}{:x})", type_name::<T>(), HEX_PREFIX, self.raw)
    }
}

impl<T> ToDynamic for Handle<T> {
    fn to_dynamic(self) -> Dynamic {
        Dynamic::from_text(format!("{}{:x}", HEX_PREFIX, self.raw))
    }
}

impl<T> FromDynamic for Handle<T> {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        let text = value.as_str();
        let wide = parse_integer(text, "handle")?;
        let raw = u64::try_from(wide).map_err(|_| ConversionError::OutOfRange {
            text: text.to_string(),
            expected: "handle",
        })?;
        Ok(Self::from_raw(raw))
    }
}

/// A resolved object: shared, individually locked
///
/// The lock is not re-entrant. A callable taking two `Object<T>` parameters
/// may receive the same handle twice; check [`Object::same_object`] before
/// holding both locks, or use [`Object::try_lock`].
pub struct Object<T> {
    handle: Handle<T>,
    cell: Arc<Mutex<T>>,
}

impl<T> Object<T> {
    pub fn handle(&self) -> Handle<T> {
        self.handle
    }

    /// Lock the object for reading or mutation
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.cell.lock()
    }

    /// Lock the object unless it is already locked
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        self.cell.try_lock()
    }

    /// Run `f` with the object locked
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.cell.lock())
    }

    /// True when both views share one table entry
    pub fn same_object(&self, other: &Object<T>) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T> Clone for Object<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle,
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> fmt::Debug for Object<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object").field("handle", &self.handle).finish()
    }
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Default)]
struct Slots {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

/// Arena of typed objects addressed by [`Handle`]s
#[derive(Default)]
pub struct HandleTable {
    inner: RwLock<Slots>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` and return its handle
    pub fn insert<T: Send + 'static>(&self, value: T) -> Handle<T> {
        let entry = Entry {
            value: Arc::new(Mutex::new(value)),
            type_name: type_name::<T>(),
        };

        let mut inner = self.inner.write();
        let index = match inner.free.pop() {
            Some(index) => index,
            None => {
                let index = u32::try_from(inner.slots.len()).unwrap_or(u32::MAX);
                inner.slots.push(Slot {
                    generation: 1,
                    entry: None,
                });
                index
            }
        };

        let slot = &mut inner.slots[index as usize];
        slot.entry = Some(entry);
        let handle = Handle::new(index, slot.generation);
        tracing::trace!(handle = handle.raw(), ty = type_name::<T>(), "object stored");
        handle
    }

    /// Resolve a handle to its object
    ///
    /// # Errors
    ///
    /// `Null` for the zero handle, `Stale` for unknown or released slots, and
    /// `TypeMismatch` when the object is not a `T`.
    pub fn get<T: Send + 'static>(&self, handle: Handle<T>) -> Result<Object<T>, HandleError> {
        if handle.raw() == 0 {
            return Err(HandleError::Null);
        }

        let inner = self.inner.read();
        let entry = inner
            .slots
            .get(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.entry.as_ref())
            .ok_or(HandleError::Stale(handle.raw()))?;

        let cell = Arc::clone(&entry.value)
            .downcast::<Mutex<T>>()
            .map_err(|_| HandleError::TypeMismatch {
                expected: type_name::<T>(),
                found: entry.type_name,
            })?;

        Ok(Object { handle, cell })
    }

    /// Release the object named by `raw`
    ///
    /// Outstanding [`Object`]s keep the value alive, but the handle no longer
    /// resolves.
    pub fn remove(&self, raw: u64) -> Result<(), HandleError> {
        if raw == 0 {
            return Err(HandleError::Null);
        }
        let handle = Handle::<()>::from_raw(raw);

        let mut inner = self.inner.write();
        let slot = inner
            .slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation() && slot.entry.is_some())
            .ok_or(HandleError::Stale(raw))?;

        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1).max(1);
        inner.free.push(handle.index());
        tracing::trace!(handle = raw, "object released");
        Ok(())
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .slots
            .iter()
            .filter(|slot| slot.entry.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for HandleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleTable")
            .field("live", &self.len())
            .finish()
    }
}
