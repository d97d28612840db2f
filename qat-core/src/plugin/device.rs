//! PCI device lookups: driver directories and device IDs.

use crate::error::{QatError, Result};
use crate::sysfs::{Sysfs, SysfsLayout};
use tracing::debug;

/// Intel's PCI vendor ID, prefixed to every `new_id` write.
pub const INTEL_VENDOR_ID: &str = "8086";

/// PCI domain every QAT VF lives in.
const PCI_DOMAIN_PREFIX: &str = "0000:";

/// Check whether a driver directory entry names a device.
///
/// Any entry in the QAT PCI domain counts. Driver directories also hold control
/// files (`bind`, `new_id`, `module`, ...), which never carry the prefix.
pub fn is_bus_address(entry: &str) -> bool {
    entry.starts_with(PCI_DOMAIN_PREFIX)
}

/// Bus address without the PCI domain (`0000:3d:01.0` -> `3d:01.0`).
pub fn short_address(address: &str) -> &str {
    address.strip_prefix(PCI_DOMAIN_PREFIX).unwrap_or(address)
}

/// List the raw entries of a driver's sysfs directory.
pub fn list_driver_devices(
    sysfs: &dyn Sysfs,
    layout: &SysfsLayout,
    driver: &str,
) -> Result<Vec<String>> {
    let path = layout.driver_dir(driver);
    let entries = sysfs.list_entries(&path).map_err(|e| QatError::Discovery {
        driver: driver.to_string(),
        path: path.clone(),
        source: e,
    })?;

    debug!(driver = %driver, entries = entries.len(), "Listed driver directory");
    Ok(entries)
}

/// Read the PCI device ID of `address`, without the `0x` prefix.
pub fn read_device_id(sysfs: &dyn Sysfs, layout: &SysfsLayout, address: &str) -> Result<String> {
    let path = layout.device_id_path(address);
    let raw = sysfs.read_attribute(&path).map_err(|e| QatError::Identifier {
        address: address.to_string(),
        path: path.clone(),
        source: e,
    })?;

    let trimmed = raw.trim();
    Ok(trimmed.strip_prefix("0x").unwrap_or(trimmed).to_string())
}
