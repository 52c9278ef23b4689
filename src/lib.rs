//! A typed, persistent settings registry.
//!
//! Entries ("console variables") are declared once with a name, a default
//! value, a description and policy [`CVarFlags`]; the default's variant fixes
//! the entry's type for good. Hot code keeps a [`Handle`] to skip name lookup,
//! tooling reads and writes by name, and archived entries round-trip through
//! ini, JSON or TOML files.
//!
//! ```rust
//! use next_cvar::{CVarFlags, Format, Registry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new();
//! let vsync = registry.declare("render.vsync", true, "Wait for vblank", CVarFlags::ARCHIVE)?;
//! vsync.set(false)?;
//!
//! let text = registry.save_to_string(Format::Ini)?;
//! assert_eq!(text, "[render]\nvsync = false\n");
//! # Ok(())
//! # }
//! ```
pub mod atomic;
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod flags;
pub mod global;
pub mod handle;
pub mod hash;
pub mod registration;
pub mod registry;
pub mod select;
pub mod store;
pub mod value;

pub use codec::{Codec, Format, LoadReport, guess_value};
pub use descriptor::{CVarDef, CVarDefBuilder, CVarDefBuilderError, EntryDescriptor};
pub use error::{Error, Result};
pub use flags::CVarFlags;
pub use handle::{CVarGroup, Handle};
pub use hash::NameHash;
pub use registration::RegisteredCVar;
pub use registry::{DEFAULT_CAPACITY, EntrySnapshot, EntryValues, Registry};
pub use select::{DirectorySelector, PathSelector};
pub use store::Slot;
pub use value::{Bound, CVarType, TypeTag, Value, Vec2, Vec3, Vec4};

// re-export macro
pub use next_cvar_macros::CVarGroup;

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}
