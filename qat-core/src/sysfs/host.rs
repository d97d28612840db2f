//! [`Sysfs`] backed by the real filesystem.

use super::Sysfs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The host's sysfs tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSysfs;

impl Sysfs for HostSysfs {
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        // read_dir order is unspecified; the device cap depends on a stable order.
        names.sort();
        Ok(names)
    }

    fn read_attribute(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_attribute(&self, path: &Path, value: &str) -> io::Result<()> {
        fs::write(path, value)
    }

    fn resolve_symlink(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}
