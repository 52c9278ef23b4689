//! On-disk formats.
//!
//! A [`Codec`] turns archived entries into text and text back into
//! [`Record`]s; applying records to a registry (type checks, placeholders)
//! is the registry's job. Three formats are available:
//!
//! - [`Format::Ini`]: `[category]` sections of `key = value` lines, with
//!   value types guessed from their text on load.
//! - [`Format::Json`]: one object per entry carrying its full metadata.
//! - [`Format::Toml`]: category tables with native TOML value types.

mod ini;
mod json;
mod toml;

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::{
    descriptor::{EntryDescriptor, DEFAULT_CATEGORY},
    error::Result,
    flags::CVarFlags,
    value::{Bound, Value},
};

pub use self::ini::{IniCodec, guess_value};
pub use self::json::JsonCodec;
pub use self::toml::TomlCodec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Ini,
    Json,
    Toml,
}

impl Format {
    pub const fn extension(self) -> &'static str {
        match self {
            Format::Ini => "ini",
            Format::Json => "json",
            Format::Toml => "toml",
        }
    }

    /// Picks a format by file extension, defaulting to JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("ini") => Format::Ini,
            Some("toml") => Format::Toml,
            _ => Format::Json,
        }
    }

    pub fn codec(self) -> &'static dyn Codec {
        match self {
            Format::Ini => &IniCodec,
            Format::Json => &JsonCodec,
            Format::Toml => &TomlCodec,
        }
    }
}

pub trait Codec: Send + Sync {
    /// Renders archived entries. Entries the format cannot represent are
    /// logged and left out.
    fn encode(&self, entries: &[SavedEntry]) -> Result<String>;

    /// Parses a document. Malformed individual entries are logged and
    /// skipped; an unreadable document is an error.
    fn decode(&self, text: &str) -> Result<Vec<Record>>;
}

/// An archived entry handed to [`Codec::encode`].
#[derive(Debug, Clone, PartialEq)]
pub struct SavedEntry {
    pub descriptor: EntryDescriptor,
    pub current: Value,
}

/// One decoded entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub value: Value,
    /// Present when the format stores full metadata; such records re-create
    /// missing entries exactly instead of as placeholders.
    pub meta: Option<RecordMeta>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordMeta {
    pub description: String,
    pub flags: CVarFlags,
    pub min: Option<Bound>,
    pub max: Option<Bound>,
}

/// Outcome of a load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Existing entries whose current value was replaced.
    pub updated: usize,
    /// Entries created by the load.
    pub created: usize,
    /// Names of records rejected by the registry (type mismatch, capacity).
    pub skipped: Vec<String>,
}

/// Appends `.ext` to `path` unless it already ends in the format's extension.
pub fn ensure_extension(path: &Path, format: Format) -> PathBuf {
    let ext = format.extension();
    if path.extension().and_then(|e| e.to_str()) == Some(ext) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// The section an entry is written under by the sectioned formats (ini,
/// TOML). Names without a category go to the default section, so a name whose
/// category is literally the default one would read back without its prefix;
/// such entries get `None` and are not written.
pub(crate) fn section_of(descriptor: &EntryDescriptor) -> Option<&str> {
    match descriptor.category.as_deref() {
        Some(DEFAULT_CATEGORY) => {
            warn!(
                name = %descriptor.name,
                "category collides with the default section, skipping"
            );
            None
        }
        Some(category) => Some(category),
        None => Some(DEFAULT_CATEGORY),
    }
}

/// Joins a section and key back into an entry name. The default section
/// holds names without a category.
pub(crate) fn join_name(section: &str, key: &str) -> String {
    if section == DEFAULT_CATEGORY {
        key.to_string()
    } else {
        format!("{section}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_missing_extension_only() {
        assert_eq!(
            ensure_extension(Path::new("cfg/settings"), Format::Ini),
            PathBuf::from("cfg/settings.ini")
        );
        assert_eq!(
            ensure_extension(Path::new("settings.json"), Format::Json),
            PathBuf::from("settings.json")
        );
        assert_eq!(
            ensure_extension(Path::new("settings.cfg"), Format::Toml),
            PathBuf::from("settings.cfg.toml")
        );
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(Format::from_path("a.ini"), Format::Ini);
        assert_eq!(Format::from_path("a.toml"), Format::Toml);
        assert_eq!(Format::from_path("a.json"), Format::Json);
        assert_eq!(Format::from_path("a"), Format::Json);
    }
}
