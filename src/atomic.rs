use std::{
    ffi::OsString,
    fs::{File, OpenOptions},
    io::{ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use tempfile::NamedTempFile;

/// Advisory lock on a `<file>.lock` sibling. The settings file itself is
/// replaced by rename on write, so it cannot carry the lock.
struct FileLock {
    file: File,
}

impl FileLock {
    fn exclusive(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path(path))?;
        // Blocks until exclusive lock is acquired
        FileExt::lock_exclusive(&file)?;
        Ok(Self { file })
    }

    /// Shared lock on an existing sidecar. Without one no save has ever run
    /// here, so there is nothing to wait for and `None` is returned.
    fn shared(path: &Path) -> std::io::Result<Option<Self>> {
        let file = match File::open(lock_path(path)) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };
        FileExt::lock_shared(&file)?;
        Ok(Some(Self { file }))
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// A settings file that is read whole and replaced whole.
///
/// Writes serialize on a `<file>.lock` sidecar, which stays next to the file
/// after the first save: removing it would let a waiting writer lock a file
/// that a newer writer has already replaced. Reads never create it.
pub struct AtomicFile {
    path: PathBuf,
}

impl AtomicFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read(&self) -> std::io::Result<String> {
        let mut file = File::open(&self.path)?;
        let _lock = FileLock::shared(&self.path)?;

        let mut buf = String::new();
        file.read_to_string(&mut buf)?;

        Ok(buf)
    }

    /// Writes `contents` to a temporary file next to the target, syncs it
    /// and renames it over the target, so readers never see a partial file.
    pub fn write(&self, contents: &str) -> Result<(), crate::Error> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let _lock = FileLock::exclusive(&self.path)?;

        let mut tmp = NamedTempFile::new_in(dir)?;

        tmp.write_all(contents.as_bytes())?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;

        tmp.persist(&self.path)?;

        Ok(())
    }
}
