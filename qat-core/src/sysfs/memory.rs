//! In-memory [`Sysfs`] for tests.

use super::Sysfs;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tree {
    dirs: BTreeMap<PathBuf, BTreeSet<String>>,
    files: BTreeMap<PathBuf, String>,
    links: BTreeMap<PathBuf, PathBuf>,
    failing: HashSet<PathBuf>,
    writes: Vec<(PathBuf, String)>,
}

/// A sysfs tree held in memory.
///
/// Writes only succeed on files that were registered with [`MemorySysfs::add_file`],
/// the same way the kernel only exposes control files that exist. Every
/// successful write is recorded in order.
#[derive(Debug, Default)]
pub struct MemorySysfs {
    tree: Mutex<Tree>,
}

impl MemorySysfs {
    pub fn new() -> Self {
        Self::default()
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        // A poisoned lock only means another test thread panicked mid-update.
        self.tree.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create an empty directory (no-op if it exists).
    pub fn add_dir(&self, dir: impl Into<PathBuf>) {
        self.tree().dirs.entry(dir.into()).or_default();
    }

    /// Add a named entry to a directory, creating the directory if needed.
    pub fn add_entry(&self, dir: impl Into<PathBuf>, name: &str) {
        self.tree().dirs.entry(dir.into()).or_default().insert(name.to_string());
    }

    pub fn remove_entry(&self, dir: &Path, name: &str) {
        if let Some(entries) = self.tree().dirs.get_mut(dir) {
            entries.remove(name);
        }
    }

    /// Remove a directory, making it unreadable.
    pub fn remove_dir(&self, dir: &Path) {
        self.tree().dirs.remove(dir);
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, contents: &str) {
        self.tree().files.insert(path.into(), contents.to_string());
    }

    pub fn remove_file(&self, path: &Path) {
        self.tree().files.remove(path);
    }

    pub fn add_symlink(&self, path: impl Into<PathBuf>, target: impl Into<PathBuf>) {
        self.tree().links.insert(path.into(), target.into());
    }

    /// Make every write to `path` fail with `PermissionDenied`.
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.tree().failing.insert(path.into());
    }

    /// All successful writes, in order.
    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.tree().writes.clone()
    }

    /// Successful writes to one path, in order.
    pub fn writes_to(&self, path: &Path) -> Vec<String> {
        self.tree()
            .writes
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, value)| value.clone())
            .collect()
    }
}

impl Sysfs for MemorySysfs {
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<String>> {
        self.tree()
            .dirs
            .get(dir)
            .map(|entries| entries.iter().cloned().collect())
            .ok_or_else(|| not_found(dir))
    }

    fn read_attribute(&self, path: &Path) -> io::Result<String> {
        self.tree().files.get(path).cloned().ok_or_else(|| not_found(path))
    }

    fn write_attribute(&self, path: &Path, value: &str) -> io::Result<()> {
        let mut tree = self.tree();
        if tree.failing.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("write to {} rejected", path.display()),
            ));
        }
        match tree.files.get_mut(path) {
            Some(contents) => {
                *contents = value.to_string();
            }
            None => return Err(not_found(path)),
        }
        tree.writes.push((path.to_path_buf(), value.to_string()));
        Ok(())
    }

    fn resolve_symlink(&self, path: &Path) -> io::Result<PathBuf> {
        self.tree().links.get(path).cloned().ok_or_else(|| not_found(path))
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} does not exist", path.display()))
}
