//! The process-wide registry.
//!
//! Libraries should take a [`Registry`] as a parameter; this module exists
//! for the outermost application layer, which needs one shared instance with
//! an explicit lifecycle:
//!
//! 1. [`init`] (or the first [`registry`] call) creates it and applies every
//!    [`submit_cvar!`](crate::submit_cvar) declaration;
//! 2. [`registry`] hands out clones of it;
//! 3. [`shutdown`] releases it, optionally saving first. Once the last clone
//!    is gone, handles into it report [`Error::NotFound`](crate::Error::NotFound).

use std::path::Path;

use parking_lot::RwLock;
use tracing::debug;

use crate::{
    codec::Format,
    error::Result,
    registry::{DEFAULT_CAPACITY, Registry},
};

static GLOBAL: RwLock<Option<Registry>> = parking_lot::const_rwlock(None);

/// Creates the global registry with `capacity` slots if it does not exist
/// yet, and returns it.
pub fn init(capacity: usize) -> Result<Registry> {
    let mut global = GLOBAL.write();
    if let Some(registry) = global.as_ref() {
        return Ok(registry.clone());
    }
    let registry = Registry::with_capacity(capacity);
    let declared = registry.register_all()?;
    debug!(capacity, declared, "initialized global registry");
    *global = Some(registry.clone());
    Ok(registry)
}

/// Returns the global registry, creating it with [`DEFAULT_CAPACITY`] on
/// first use.
pub fn registry() -> Result<Registry> {
    if let Some(registry) = GLOBAL.read().as_ref() {
        return Ok(registry.clone());
    }
    init(DEFAULT_CAPACITY)
}

pub fn is_initialized() -> bool {
    GLOBAL.read().is_some()
}

/// Drops the global registry. With `flush`, archived entries are saved to
/// the given path first; the registry is dropped even if saving fails.
pub fn shutdown(flush: Option<(&Path, Format)>) -> Result<()> {
    let Some(registry) = GLOBAL.write().take() else {
        return Ok(());
    };
    debug!("shutting down global registry");
    match flush {
        Some((path, format)) => registry.save(path, format).map(|_| ()),
        None => Ok(()),
    }
}
