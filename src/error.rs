use thiserror::Error;

use crate::{descriptor::CVarDefBuilderError, value::TypeTag};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// No entry with this name, or no slot with this index.
    ///
    /// Slots are rendered as `#<index>`. A [`Handle`](crate::Handle) whose
    /// registry has been shut down also reports `NotFound`.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The requested or supplied type differs from the entry's declared type.
    ///
    /// Declared types never change, so this is always a caller error: the
    /// stored value is left untouched.
    #[error("Type mismatch for {name}: declared {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: TypeTag,
        found: TypeTag,
    },

    #[error("Entry is read-only: {0}")]
    ReadOnly(String),

    /// The value store is full. The declaration that hit the limit was not
    /// applied; existing entries are unaffected.
    #[error("Capacity exceeded creating {name}: store holds {capacity} entries")]
    CapacityExceeded { name: String, capacity: usize },

    /// A descriptor points past the end of the value store.
    ///
    /// Descriptors are never removed and slots are never reused, so this is
    /// an internal invariant violation; debug builds assert before returning it.
    #[error("Corrupted index for {name}: slot {slot} outside store of {len}")]
    CorruptedIndex {
        name: String,
        slot: usize,
        len: usize,
    },

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("Persist: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML Serialization: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    #[error("TOML Deserialization: {0}")]
    TomlDeserialization(#[from] toml::de::Error),

    #[error("Declaration: {0}")]
    Declaration(#[from] CVarDefBuilderError),
}

impl Error {
    pub(crate) fn type_mismatch(name: &str, expected: TypeTag, found: TypeTag) -> Self {
        Error::TypeMismatch {
            name: name.to_string(),
            expected,
            found,
        }
    }

    /// Whether this is one of the lookup failures `get_or_default` absorbs.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::TypeMismatch { .. } | Error::CorruptedIndex { .. }
        )
    }
}
