//! The settings registry.
//!
//! This module provides [`Registry`], a process-wide store mapping entry names
//! to typed values. A registry owns two structures guarded by one
//! reader/writer lock:
//!
//! - a descriptor map keyed by [`NameHash`], holding each entry's declared
//!   type, policy flags, description and advisory bounds;
//! - a fixed-capacity value store holding each entry's initial and current
//!   value in a slot that never moves.
//!
//! Declarations run once through [`create`](Registry::create) (or a typed
//! [`Handle`]); hot code then reads and writes through the handle's cached
//! slot, while tooling resolves entries by name.
//!
//! # Example
//!
//! ```rust
//! use next_cvar::{CVarDef, CVarFlags, Registry, Value};
//!
//! # fn main() -> Result<(), next_cvar::Error> {
//! let registry = Registry::new();
//! let fov = registry.declare("render.fov", 90.0, "Field of view", CVarFlags::ARCHIVE)?;
//!
//! fov.set(75.0)?;
//! assert_eq!(registry.get("render.fov")?, Value::Float(75.0));
//! assert_eq!(registry.get_initial("render.fov")?, Value::Float(90.0));
//! # Ok(())
//! # }
//! ```
use std::{
    collections::HashMap,
    fmt::Write as _,
    path::{Path, PathBuf},
    sync::{Arc, Weak},
};

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::{
    atomic::AtomicFile,
    codec::{Format, LoadReport, Record, SavedEntry, ensure_extension},
    descriptor::{CVarDef, EntryDescriptor},
    error::{Error, Result},
    flags::CVarFlags,
    handle::Handle,
    hash::NameHash,
    select::PathSelector,
    store::{Slot, SlotRecord, ValueStore},
    value::{CVarType, Value},
};

/// Number of slots a registry created with [`Registry::new`] can hold.
pub const DEFAULT_CAPACITY: usize = 2048;

/// A read-only view of one entry, as handed to UI and console tooling.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySnapshot {
    pub descriptor: EntryDescriptor,
    pub initial: Value,
    pub current: Value,
}

/// Everything behind the registry lock.
#[derive(Debug)]
pub(crate) struct State {
    entries: HashMap<NameHash, EntryDescriptor>,
    store: ValueStore,
}

pub(crate) type SharedState = RwLock<State>;

/// A typed, persistent settings registry.
///
/// Cloning is cheap and yields another reference to the same registry.
/// Every mutating operation takes the lock exclusively; every read takes it
/// shared. Slots handed out by [`create`](Registry::create) stay valid for
/// the lifetime of the registry.
#[derive(Debug, Clone)]
pub struct Registry {
    state: Arc<SharedState>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry with [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty registry holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(State {
                entries: HashMap::with_capacity(capacity),
                store: ValueStore::with_capacity(capacity),
            })),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<SharedState> {
        Arc::downgrade(&self.state)
    }

    pub(crate) fn shared(&self) -> &SharedState {
        &self.state
    }

    pub fn capacity(&self) -> usize {
        self.state.read().store.capacity()
    }

    /// Number of entries, placeholders included.
    pub fn len(&self) -> usize {
        self.state.read().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.read().entries.contains_key(&NameHash::of(name))
    }

    /// Declares an entry and returns its slot.
    ///
    /// - Unknown name: a new slot is allocated holding `def.initial` as both
    ///   initial and current value; the declared type is the variant of
    ///   `def.initial`.
    /// - Placeholder (see [`CVarFlags::UNINITIALIZED`]): the declaration is
    ///   adopted. `def.initial` becomes the initial value, the flags, bounds
    ///   and description are applied, and the placeholder's current value is
    ///   kept when its type fits the declaration.
    /// - Already declared: the existing slot is returned and `def` is ignored.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityExceeded`] when a new slot is needed and the store is
    /// full. Existing entries are not affected.
    pub fn create(&self, def: &CVarDef) -> Result<Slot> {
        self.state.write().create(def, def.flags.declarable())
    }

    /// Declares a typed entry and returns a [`Handle`] to it.
    ///
    /// Shorthand for [`Handle::declare`] without bounds.
    pub fn declare<T: CVarType>(
        &self,
        name: &str,
        initial: T,
        description: &str,
        flags: CVarFlags,
    ) -> Result<Handle<T>> {
        Handle::declare_with(self, name, initial, description, flags, None, None)
    }

    /// Returns a [`Handle`] to an existing entry of type `T`.
    pub fn handle<T: CVarType>(&self, name: &str) -> Result<Handle<T>> {
        Handle::attach(self, name)
    }

    pub fn descriptor(&self, name: &str) -> Result<EntryDescriptor> {
        let state = self.state.read();
        let (descriptor, _) = state.resolve(name)?;
        Ok(descriptor.clone())
    }

    pub fn slot_of(&self, name: &str) -> Result<Slot> {
        let state = self.state.read();
        let (descriptor, _) = state.resolve(name)?;
        Ok(descriptor.slot)
    }

    /// Returns the current value of `name`.
    pub fn get(&self, name: &str) -> Result<Value> {
        let state = self.state.read();
        let (_, record) = state.resolve(name)?;
        Ok(record.current.clone())
    }

    /// Returns the current value stored at `slot`.
    pub fn get_slot(&self, slot: Slot) -> Result<Value> {
        let state = self.state.read();
        let (_, record) = state.resolve_slot(slot)?;
        Ok(record.current.clone())
    }

    /// Returns the value `name` was declared with.
    pub fn get_initial(&self, name: &str) -> Result<Value> {
        let state = self.state.read();
        let (_, record) = state.resolve(name)?;
        Ok(record.initial.clone())
    }

    /// Returns the current value of `name` as `T`.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] when the entry's declared type is not `T`.
    pub fn get_as<T: CVarType>(&self, name: &str) -> Result<T> {
        let state = self.state.read();
        let (descriptor, record) = state.resolve(name)?;
        typed(descriptor, &record.current)
    }

    pub fn get_slot_as<T: CVarType>(&self, slot: Slot) -> Result<T> {
        let state = self.state.read();
        let (descriptor, record) = state.resolve_slot(slot)?;
        typed(descriptor, &record.current)
    }

    /// Returns the current value of `name` as `T`, or `fallback` if the entry
    /// is missing or holds another type.
    pub fn get_or_default<T: CVarType>(&self, name: &str, fallback: T) -> T {
        match self.get_as(name) {
            Ok(value) => value,
            Err(err) if err.is_lookup_failure() => {
                debug!(name, %err, "using fallback value");
                fallback
            }
            Err(err) => {
                warn!(name, %err, "unexpected error, using fallback value");
                fallback
            }
        }
    }

    /// Replaces the current value of `name`.
    ///
    /// Bounds are descriptive only and are not applied here.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if there is no such entry
    /// - [`Error::ReadOnly`] if the entry is flagged [`CVarFlags::READ_ONLY`]
    /// - [`Error::TypeMismatch`] if `value` has another variant than the
    ///   declared type
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let mut state = self.state.write();
        let slot = state.resolve(name)?.0.slot;
        state.set_slot(slot, value.into())
    }

    /// Replaces the current value stored at `slot`. Same checks as [`set`](Registry::set).
    pub fn set_slot(&self, slot: Slot, value: impl Into<Value>) -> Result<()> {
        self.state.write().set_slot(slot, value.into())
    }

    /// Restores the current value of `name` to its initial value.
    pub fn reset(&self, name: &str) -> Result<()> {
        let mut state = self.state.write();
        let slot = state.resolve(name)?.0.slot;
        let initial = state.resolve_slot(slot)?.1.initial.clone();
        state.set_slot(slot, initial)
    }

    /// Snapshots every non-hidden entry in declaration order.
    pub fn snapshot(&self) -> Vec<EntrySnapshot> {
        let mut out = Vec::new();
        self.for_each_entry(|descriptor, record| {
            if !descriptor.flags.is_hidden() {
                out.push(EntrySnapshot {
                    descriptor: descriptor.clone(),
                    initial: record.initial.clone(),
                    current: record.current.clone(),
                });
            }
        });
        out
    }

    /// Visits every entry, hidden ones included, in declaration order while
    /// holding the shared lock.
    pub fn for_each_entry<F>(&self, mut f: F)
    where
        F: FnMut(&EntryDescriptor, &EntryValues<'_>),
    {
        let state = self.state.read();
        for (slot, record) in state.store.iter() {
            match state.descriptor_of(slot, record) {
                Ok(descriptor) => f(
                    descriptor,
                    &EntryValues {
                        initial: &record.initial,
                        current: &record.current,
                    },
                ),
                Err(err) => error!(%err, "skipping slot without descriptor"),
            }
        }
    }

    /// Renders every entry as `Property [category][key] = value` lines.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        self.for_each_entry(|descriptor, values| {
            let _ = writeln!(
                out,
                "Property [{}][{}] = {}",
                descriptor.category_or_default(),
                descriptor.key(),
                values.current.describe()
            );
        });
        out
    }

    /// Logs [`debug_dump`](Registry::debug_dump) line by line at info level.
    pub fn debug_print(&self) {
        for line in self.debug_dump().lines() {
            info!("{line}");
        }
    }

    /// Encodes all archived entries in `format`.
    pub fn save_to_string(&self, format: Format) -> Result<String> {
        let entries = self.archived_entries();
        format.codec().encode(&entries)
    }

    /// Decodes `text` in `format` and applies it to the registry.
    ///
    /// Individual entries that fail to parse or do not fit their declared
    /// type are logged and skipped; only a document that cannot be read at
    /// all is an error.
    pub fn load_from_str(&self, text: &str, format: Format) -> Result<LoadReport> {
        let records = format.codec().decode(text)?;
        Ok(self.apply_records(records))
    }

    /// Saves archived entries to `path`, appending the format's extension if
    /// missing. Returns the path actually written.
    pub fn save(&self, path: impl AsRef<Path>, format: Format) -> Result<PathBuf> {
        let path = ensure_extension(path.as_ref(), format);
        let contents = self.save_to_string(format)?;
        AtomicFile::new(&path).write(&contents)?;
        debug!(path = %path.display(), ?format, "saved registry");
        Ok(path)
    }

    /// Loads entries from `path`, appending the format's extension if missing.
    pub fn load(&self, path: impl AsRef<Path>, format: Format) -> Result<LoadReport> {
        let path = ensure_extension(path.as_ref(), format);
        let contents = AtomicFile::new(&path).read()?;
        let report = self.load_from_str(&contents, format)?;
        debug!(path = %path.display(), ?format, ?report, "loaded registry");
        Ok(report)
    }

    /// Saves to the file `selector` resolves for `name`.
    pub fn save_selected(
        &self,
        selector: &dyn PathSelector,
        name: &str,
        format: Format,
    ) -> Result<PathBuf> {
        let path = selected_path(selector, name)?;
        self.save(path, format)
    }

    /// Loads from the file `selector` resolves for `name`.
    pub fn load_selected(
        &self,
        selector: &dyn PathSelector,
        name: &str,
        format: Format,
    ) -> Result<LoadReport> {
        let path = selected_path(selector, name)?;
        self.load(path, format)
    }

    fn archived_entries(&self) -> Vec<SavedEntry> {
        let mut entries = Vec::new();
        self.for_each_entry(|descriptor, values| {
            if descriptor.flags.is_archived() {
                entries.push(SavedEntry {
                    descriptor: descriptor.clone(),
                    current: values.current.clone(),
                });
            }
        });
        entries
    }

    fn apply_records(&self, records: Vec<Record>) -> LoadReport {
        let mut state = self.state.write();
        let mut report = LoadReport::default();
        for record in records {
            let name = record.name.clone();
            match state.apply(record) {
                Ok(Applied::Updated) => report.updated += 1,
                Ok(Applied::Created) => report.created += 1,
                Err(err) => {
                    warn!(name = %name, %err, "skipping loaded entry");
                    report.skipped.push(name);
                }
            }
        }
        report
    }
}

/// Initial and current value of an entry, borrowed under the registry lock.
#[derive(Debug)]
pub struct EntryValues<'a> {
    pub initial: &'a Value,
    pub current: &'a Value,
}

fn selected_path(selector: &dyn PathSelector, name: &str) -> Result<PathBuf> {
    selector.select(name).ok_or_else(|| {
        Error::NotFound(format!(
            "{name} in {}",
            selector.current_path().display()
        ))
    })
}

fn typed<T: CVarType>(descriptor: &EntryDescriptor, value: &Value) -> Result<T> {
    T::from_value(value)
        .ok_or_else(|| Error::type_mismatch(&descriptor.name, descriptor.declared_type, T::TAG))
}

pub(crate) enum Applied {
    Updated,
    Created,
}

impl State {
    /// Inserts or adopts `def`. `flags` are stored as given.
    pub(crate) fn create(&mut self, def: &CVarDef, flags: CVarFlags) -> Result<Slot> {
        let hash = NameHash::of(&def.name);
        let len = self.store.len();

        if let Some(descriptor) = self.entries.get_mut(&hash) {
            if !descriptor.flags.is_placeholder() {
                debug!(name = %def.name, slot = %descriptor.slot, "attached to existing entry");
                return Ok(descriptor.slot);
            }

            let slot = descriptor.slot;
            let Some(record) = self.store.get_mut(slot) else {
                return Err(corrupted(descriptor, len));
            };
            let current = adopt_current(&record.current, &def.initial).unwrap_or_else(|| {
                warn!(
                    name = %def.name,
                    loaded = %record.current.type_tag(),
                    declared = %def.initial.type_tag(),
                    "placeholder value does not fit declaration, using default"
                );
                def.initial.clone()
            });
            record.initial = def.initial.clone();
            record.current = current;
            *descriptor = EntryDescriptor::new(def, flags, slot);
            debug!(name = %def.name, %slot, "adopted placeholder");
            return Ok(slot);
        }

        let slot = self
            .store
            .push(def.initial.clone(), hash)
            .ok_or_else(|| Error::CapacityExceeded {
                name: def.name.clone(),
                capacity: self.store.capacity(),
            })?;
        self.entries
            .insert(hash, EntryDescriptor::new(def, flags, slot));
        debug!(name = %def.name, %slot, ty = %def.initial.type_tag(), "created entry");
        Ok(slot)
    }

    pub(crate) fn resolve(&self, name: &str) -> Result<(&EntryDescriptor, &SlotRecord)> {
        let descriptor = self
            .entries
            .get(&NameHash::of(name))
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        let record = self
            .store
            .get(descriptor.slot)
            .ok_or_else(|| corrupted(descriptor, self.store.len()))?;
        Ok((descriptor, record))
    }

    pub(crate) fn resolve_slot(&self, slot: Slot) -> Result<(&EntryDescriptor, &SlotRecord)> {
        let record = self
            .store
            .get(slot)
            .ok_or_else(|| Error::NotFound(slot.to_string()))?;
        let descriptor = self.descriptor_of(slot, record)?;
        Ok((descriptor, record))
    }

    fn descriptor_of(&self, slot: Slot, record: &SlotRecord) -> Result<&EntryDescriptor> {
        match self.entries.get(&record.owner) {
            Some(descriptor) if descriptor.slot == slot => Ok(descriptor),
            Some(descriptor) => Err(corrupted(descriptor, self.store.len())),
            None => {
                error!(%slot, owner = %record.owner, "slot has no owning descriptor");
                debug_assert!(false, "slot {slot} has no owning descriptor");
                Err(Error::CorruptedIndex {
                    name: record.owner.to_string(),
                    slot: slot.index(),
                    len: self.store.len(),
                })
            }
        }
    }

    pub(crate) fn set_slot(&mut self, slot: Slot, value: Value) -> Result<()> {
        let (descriptor, _) = self.resolve_slot(slot)?;
        if descriptor.flags.is_read_only() {
            return Err(Error::ReadOnly(descriptor.name.clone()));
        }
        check_type(descriptor, &value)?;
        if let Some(record) = self.store.get_mut(slot) {
            record.current = value;
        }
        Ok(())
    }

    /// Runs `f` on the current value at `slot` in place.
    pub(crate) fn update_slot<T: CVarType, R>(
        &mut self,
        slot: Slot,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R> {
        let (descriptor, _) = self.resolve_slot(slot)?;
        if descriptor.flags.is_read_only() {
            return Err(Error::ReadOnly(descriptor.name.clone()));
        }
        let name = descriptor.name.clone();
        let record = self
            .store
            .get_mut(slot)
            .ok_or_else(|| Error::NotFound(slot.to_string()))?;
        let found = record.current.type_tag();
        let value = T::from_value_mut(&mut record.current)
            .ok_or_else(|| Error::type_mismatch(&name, T::TAG, found))?;
        Ok(f(value))
    }

    /// Applies one decoded record. Loading writes read-only entries too: a
    /// settings file is where read-only values come from.
    fn apply(&mut self, record: Record) -> Result<Applied> {
        if let Ok((descriptor, _)) = self.resolve(&record.name) {
            check_type(descriptor, &record.value)?;
            let slot = descriptor.slot;
            if let Some(slot_record) = self.store.get_mut(slot) {
                slot_record.current = record.value;
            }
            return Ok(Applied::Updated);
        }

        let (def, flags) = match record.meta {
            Some(meta) => {
                let flags = meta.flags;
                (
                    CVarDef {
                        name: record.name,
                        initial: record.value,
                        description: meta.description,
                        flags,
                        min: meta.min,
                        max: meta.max,
                    },
                    flags,
                )
            }
            None => (
                CVarDef::new(record.name, record.value),
                CVarFlags::ARCHIVE | CVarFlags::UNINITIALIZED,
            ),
        };
        self.create(&def, flags)?;
        Ok(Applied::Created)
    }
}

fn check_type(descriptor: &EntryDescriptor, value: &Value) -> Result<()> {
    let found = value.type_tag();
    if found != descriptor.declared_type {
        return Err(Error::type_mismatch(
            &descriptor.name,
            descriptor.declared_type,
            found,
        ));
    }
    Ok(())
}

/// The value a placeholder keeps when its declaration arrives: its own value
/// if the types agree, widened if it was read as an integer but declared as a
/// float, otherwise nothing.
fn adopt_current(current: &Value, declared: &Value) -> Option<Value> {
    match (current, declared) {
        (current, declared) if current.type_tag() == declared.type_tag() => Some(current.clone()),
        (Value::Int(i), Value::Float(_)) => Some(Value::Float(*i as f64)),
        _ => None,
    }
}

fn corrupted(descriptor: &EntryDescriptor, len: usize) -> Error {
    error!(
        name = %descriptor.name,
        slot = %descriptor.slot,
        len,
        "descriptor slot outside value store"
    );
    debug_assert!(
        descriptor.slot.index() < len,
        "descriptor {} points at slot {} of {len}",
        descriptor.name,
        descriptor.slot
    );
    Error::CorruptedIndex {
        name: descriptor.name.clone(),
        slot: descriptor.slot.index(),
        len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_reports_type_mismatch_when_store_disagrees() {
        let registry = Registry::new();
        let lives = registry
            .declare("game.lives", 3_i64, "", CVarFlags::empty())
            .expect("declare");

        // Bypass `set` to break the declared-type invariant.
        if let Some(record) = registry.state.write().store.get_mut(lives.slot()) {
            record.current = Value::Bool(true);
        }

        match lives.get() {
            Err(Error::TypeMismatch {
                name,
                expected,
                found,
            }) => {
                assert_eq!(name, "game.lives");
                assert_eq!(expected, crate::value::TypeTag::Int);
                assert_eq!(found, crate::value::TypeTag::Bool);
            }
            other => panic!("expected a type mismatch, got {other:?}"),
        }
        assert!(matches!(
            lives.update(|n| *n += 1),
            Err(Error::TypeMismatch { .. })
        ));
        assert_eq!(lives.initial().expect("initial untouched"), 3);
    }
}
