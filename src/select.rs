use std::path::{Component, Path, PathBuf};

/// Resolves the file a save or load should use.
///
/// The registry never lists directories itself; whatever file browser the
/// application has implements this to answer "where is `name`".
pub trait PathSelector {
    /// The directory selections are made in.
    fn current_path(&self) -> PathBuf;

    /// The full path for `name`, or `None` if it cannot be selected.
    fn select(&self, name: &str) -> Option<PathBuf>;
}

/// Selects plain file names inside one fixed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySelector {
    root: PathBuf,
}

impl DirectorySelector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PathSelector for DirectorySelector {
    fn current_path(&self) -> PathBuf {
        self.root.clone()
    }

    /// Only single, normal path components are accepted, so a selection can
    /// never leave the root directory.
    fn select(&self, name: &str) -> Option<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(file)), None) => Some(self.root.join(file)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_plain_names_only() {
        let selector = DirectorySelector::new("/etc/app");
        assert_eq!(
            selector.select("settings.ini"),
            Some(PathBuf::from("/etc/app/settings.ini"))
        );
        assert_eq!(selector.select("../secrets"), None);
        assert_eq!(selector.select("nested/file"), None);
        assert_eq!(selector.select(""), None);
    }
}
