//! Cached typed accessors.
//!
//! A [`Handle`] resolves a name once, at construction, and afterwards goes
//! straight to the entry's slot. Slots never move and are never reused, so a
//! handle stays valid across any number of later declarations. Handles do
//! not keep the registry alive: once it is dropped every access reports
//! [`Error::NotFound`].

use std::{fmt, marker::PhantomData, sync::Weak};

use crate::{
    descriptor::{CVarDef, EntryDescriptor},
    error::{Error, Result},
    flags::CVarFlags,
    registry::{Registry, SharedState},
    store::Slot,
    value::{Bound, CVarType, Value},
};

pub struct Handle<T: CVarType> {
    slot: Slot,
    registry: Weak<SharedState>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: CVarType> Handle<T> {
    /// Creates the entry described by `def`, or attaches to it if it exists.
    ///
    /// # Errors
    ///
    /// - [`Error::TypeMismatch`] if `def.initial` is not a `T`, or if the
    ///   name was already declared with another type
    /// - [`Error::CapacityExceeded`] if a new slot was needed and none is left
    pub fn declare(registry: &Registry, def: &CVarDef) -> Result<Self> {
        let found = def.initial.type_tag();
        if found != T::TAG {
            return Err(Error::type_mismatch(&def.name, T::TAG, found));
        }

        let mut state = registry.shared().write();
        let slot = state.create(def, def.flags.declarable())?;
        let (descriptor, _) = state.resolve_slot(slot)?;
        if descriptor.declared_type != T::TAG {
            return Err(Error::type_mismatch(
                &def.name,
                descriptor.declared_type,
                T::TAG,
            ));
        }
        Ok(Self::bound_to(registry, slot))
    }

    /// [`declare`](Handle::declare) from loose parts; used by `#[derive(CVarGroup)]`.
    pub fn declare_with(
        registry: &Registry,
        name: &str,
        initial: T,
        description: &str,
        flags: CVarFlags,
        min: Option<Bound>,
        max: Option<Bound>,
    ) -> Result<Self> {
        let def = CVarDef {
            name: name.to_string(),
            initial: initial.into_value(),
            description: description.to_string(),
            flags,
            min,
            max,
        };
        Self::declare(registry, &def)
    }

    /// Attaches to an entry that already exists.
    pub fn attach(registry: &Registry, name: &str) -> Result<Self> {
        let descriptor = registry.descriptor(name)?;
        if descriptor.declared_type != T::TAG {
            return Err(Error::type_mismatch(
                name,
                descriptor.declared_type,
                T::TAG,
            ));
        }
        Ok(Self::bound_to(registry, descriptor.slot))
    }

    fn bound_to(registry: &Registry, slot: Slot) -> Self {
        Self {
            slot,
            registry: registry.downgrade(),
            _marker: PhantomData,
        }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Returns the current value.
    pub fn get(&self) -> Result<T> {
        let shared = self.upgrade()?;
        let state = shared.read();
        let (descriptor, record) = state.resolve_slot(self.slot)?;
        stored(descriptor, &record.current)
    }

    /// Returns the current value, or `fallback` if the registry is gone.
    pub fn get_or(&self, fallback: T) -> T {
        self.get().unwrap_or(fallback)
    }

    /// Replaces the current value. Fails with [`Error::ReadOnly`] on
    /// read-only entries.
    pub fn set(&self, value: T) -> Result<()> {
        let shared = self.upgrade()?;
        let mut state = shared.write();
        state.set_slot(self.slot, value.into_value())
    }

    /// Mutates the value in place under the exclusive lock.
    ///
    /// The reference given to `f` is only valid for the duration of the call;
    /// this is the hot-path replacement for handing out raw pointers into the
    /// store. Read-only entries are rejected like [`set`](Handle::set).
    ///
    /// ```rust
    /// # use next_cvar::{CVarFlags, Registry};
    /// # fn main() -> Result<(), next_cvar::Error> {
    /// let registry = Registry::new();
    /// let offset = registry.declare("camera.offset", [0.0, 1.0, 0.0], "", CVarFlags::empty())?;
    /// offset.update(|v| v[1] += 0.5)?;
    /// assert_eq!(offset.get()?, [0.0, 1.5, 0.0]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let shared = self.upgrade()?;
        let mut state = shared.write();
        state.update_slot(self.slot, f)
    }

    /// Restores the declared default.
    pub fn reset(&self) -> Result<()> {
        let shared = self.upgrade()?;
        let mut state = shared.write();
        let initial = state.resolve_slot(self.slot)?.1.initial.clone();
        state.set_slot(self.slot, initial)
    }

    pub fn initial(&self) -> Result<T> {
        let shared = self.upgrade()?;
        let state = shared.read();
        let (descriptor, record) = state.resolve_slot(self.slot)?;
        stored(descriptor, &record.initial)
    }

    pub fn descriptor(&self) -> Result<EntryDescriptor> {
        let shared = self.upgrade()?;
        let state = shared.read();
        let (descriptor, _) = state.resolve_slot(self.slot)?;
        Ok(descriptor.clone())
    }

    fn upgrade(&self) -> Result<std::sync::Arc<SharedState>> {
        self.registry.upgrade().ok_or_else(|| self.detached())
    }

    fn detached(&self) -> Error {
        Error::NotFound(self.slot.to_string())
    }
}

/// Reads a stored value as `T`. Declared types never change, so a mismatch
/// here means the store no longer agrees with the handle.
fn stored<T: CVarType>(descriptor: &EntryDescriptor, value: &Value) -> Result<T> {
    T::from_value(value)
        .ok_or_else(|| Error::type_mismatch(&descriptor.name, T::TAG, value.type_tag()))
}

impl Handle<f64> {
    /// The current value narrowed to `f32`.
    pub fn get_f32(&self) -> Result<f32> {
        self.get().map(|v| v as f32)
    }
}

impl<T: CVarType> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot,
            registry: self.registry.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: CVarType> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("slot", &self.slot)
            .field("type", &T::TAG)
            .field("live", &(self.registry.strong_count() > 0))
            .finish()
    }
}

/// A struct of handles declared together, usually via `#[derive(CVarGroup)]`.
///
/// ```rust
/// use next_cvar::{CVarGroup, Handle, Registry};
///
/// #[derive(CVarGroup)]
/// #[cvar(prefix = "render")]
/// struct RenderSettings {
///     #[cvar(default = 90.0, description = "Field of view", archive, min = 30.0, max = 120.0)]
///     fov: Handle<f64>,
///     #[cvar(name = "render.vsync", default = true, archive)]
///     vsync: Handle<bool>,
/// }
///
/// # fn main() -> Result<(), next_cvar::Error> {
/// let registry = Registry::new();
/// let render = RenderSettings::bind(&registry)?;
/// render.fov.set(100.0)?;
/// assert_eq!(registry.get_as::<f64>("render.fov")?, 100.0);
/// assert!(render.vsync.get()?);
/// # Ok(())
/// # }
/// ```
pub trait CVarGroup: Sized {
    /// Declares every entry of the group in `registry`.
    fn bind(registry: &Registry) -> Result<Self>;
}
