//! Access to the PCI sysfs tree.
//!
//! The scanner never touches `std::fs` directly. Everything goes through the
//! [`Sysfs`] trait so the whole discovery and rebind path can run against
//! [`MemorySysfs`] in tests.
//!
//! # Layout
//!
//! ```text
//! /sys/bus/pci/drivers/<driver>/            listed by the scanner
//! /sys/bus/pci/drivers/<target>/new_id      "8086 <device-id>"
//! /sys/bus/pci/devices/<address>/device     "0x37c9"
//! /sys/bus/pci/devices/<address>/driver/unbind
//! /sys/bus/pci/devices/<address>/uio/uioN   (igb_uio)
//! /sys/bus/pci/devices/<address>/iommu_group -> /sys/kernel/iommu_groups/N (vfio-pci)
//! ```

mod host;
mod memory;

pub use host::HostSysfs;
pub use memory::MemorySysfs;

use std::io;
use std::path::{Path, PathBuf};

/// Sysfs path for PCI drivers.
pub const PCI_DRIVERS_PATH: &str = "/sys/bus/pci/drivers";

/// Sysfs path for PCI devices.
pub const PCI_DEVICES_PATH: &str = "/sys/bus/pci/devices";

/// Path to IOMMU groups in sysfs.
pub const IOMMU_GROUPS_PATH: &str = "/sys/kernel/iommu_groups";

/// Narrow capability interface over the sysfs tree.
pub trait Sysfs: Send + Sync {
    /// List the entry names of a directory, sorted by name.
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<String>>;

    /// Read an attribute file.
    fn read_attribute(&self, path: &Path) -> io::Result<String>;

    /// Write a value to an attribute or control file.
    fn write_attribute(&self, path: &Path, value: &str) -> io::Result<()>;

    /// Resolve a symbolic link to its final absolute target.
    fn resolve_symlink(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Root directories of the PCI sysfs tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsLayout {
    pub pci_driver_dir: PathBuf,
    pub pci_device_dir: PathBuf,
    pub iommu_groups_dir: PathBuf,
}

impl Default for SysfsLayout {
    fn default() -> Self {
        Self {
            pci_driver_dir: PathBuf::from(PCI_DRIVERS_PATH),
            pci_device_dir: PathBuf::from(PCI_DEVICES_PATH),
            iommu_groups_dir: PathBuf::from(IOMMU_GROUPS_PATH),
        }
    }
}

impl SysfsLayout {
    /// Directory listing the devices bound to `driver`.
    pub fn driver_dir(&self, driver: &str) -> PathBuf {
        self.pci_driver_dir.join(driver)
    }

    /// The `new_id` control file of `driver`.
    pub fn new_id_path(&self, driver: &str) -> PathBuf {
        self.driver_dir(driver).join("new_id")
    }

    pub fn device_dir(&self, address: &str) -> PathBuf {
        self.pci_device_dir.join(address)
    }

    /// The `device` ID attribute of a device.
    pub fn device_id_path(&self, address: &str) -> PathBuf {
        self.device_dir(address).join("device")
    }

    /// The `unbind` control file of the driver currently owning a device.
    pub fn unbind_path(&self, address: &str) -> PathBuf {
        self.device_dir(address).join("driver").join("unbind")
    }

    pub fn uio_dir(&self, address: &str) -> PathBuf {
        self.device_dir(address).join("uio")
    }

    pub fn iommu_group_link(&self, address: &str) -> PathBuf {
        self.device_dir(address).join("iommu_group")
    }
}
