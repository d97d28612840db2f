//! Device node and mount resolution for a rebound VF.

use crate::error::{QatError, Result};
use crate::plugin::driver::TargetDriver;
use crate::sysfs::{Sysfs, SysfsLayout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Path to UIO device nodes.
const UIO_DEV_PATH: &str = "/dev";

/// Path to VFIO device nodes.
const VFIO_DEV_PATH: &str = "/dev/vfio";

/// VFIO container node, shared by every group.
const VFIO_CONTAINER: &str = "vfio";

/// Path to the UIO device class.
const UIO_CLASS_PATH: &str = "/sys/class/uio";

/// What a container needs bound in to use one VF.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceNodes {
    pub nodes: Vec<PathBuf>,
    pub mounts: Vec<PathBuf>,
}

/// Resolves device nodes and mounts for the configured target driver.
#[derive(Clone)]
pub struct NodeResolver {
    sysfs: Arc<dyn Sysfs>,
    layout: SysfsLayout,
    target: TargetDriver,
}

impl NodeResolver {
    pub fn new(sysfs: Arc<dyn Sysfs>, layout: SysfsLayout, target: TargetDriver) -> Self {
        Self { sysfs, layout, target }
    }

    pub fn resolve(&self, address: &str) -> Result<DeviceNodes> {
        let nodes = match self.target {
            TargetDriver::IgbUio => self.resolve_uio(address)?,
            TargetDriver::VfioPci => self.resolve_vfio(address)?,
        };

        debug!(
            address = %address,
            nodes = ?nodes.nodes,
            mounts = ?nodes.mounts,
            "Resolved device nodes"
        );
        Ok(nodes)
    }

    /// `igb_uio` allocates a `uioN` index per device and lists it under `<device>/uio`.
    fn resolve_uio(&self, address: &str) -> Result<DeviceNodes> {
        let uio_dir = self.layout.uio_dir(address);
        let entries = self.sysfs.list_entries(&uio_dir).map_err(|e| QatError::NodeResolution {
            address: address.to_string(),
            reason: format!("cannot read {}: {}", uio_dir.display(), e),
        })?;

        let uio = entries.first().ok_or_else(|| QatError::NodeResolution {
            address: address.to_string(),
            reason: format!("no UIO device found in {}", uio_dir.display()),
        })?;

        Ok(DeviceNodes {
            nodes: vec![PathBuf::from(UIO_DEV_PATH).join(uio)],
            mounts: vec![PathBuf::from(UIO_CLASS_PATH).join(uio).join("device")],
        })
    }

    /// `vfio-pci` exposes the device through its IOMMU group node.
    fn resolve_vfio(&self, address: &str) -> Result<DeviceNodes> {
        let link = self.layout.iommu_group_link(address);
        let group = self.sysfs.resolve_symlink(&link).map_err(|e| QatError::NodeResolution {
            address: address.to_string(),
            reason: format!("cannot resolve {}: {}", link.display(), e),
        })?;

        let suffix = iommu_group_suffix(&self.layout.iommu_groups_dir, &group).ok_or_else(|| {
            QatError::NodeResolution {
                address: address.to_string(),
                reason: format!(
                    "{} is not an IOMMU group under {}",
                    group.display(),
                    self.layout.iommu_groups_dir.display()
                ),
            }
        })?;
        debug!(address = %address, group = %suffix, "Detected VFIO device group");

        let vfio = PathBuf::from(VFIO_DEV_PATH);
        Ok(DeviceNodes {
            nodes: vec![vfio.join(suffix.trim_start_matches('/')), vfio.join(VFIO_CONTAINER)],
            mounts: Vec::new(),
        })
    }
}

/// Strip the IOMMU group root from a resolved `iommu_group` link.
///
/// `/sys/kernel/iommu_groups/7` -> `/7`. Returns `None` when the target lies
/// outside the root or names no group.
pub fn iommu_group_suffix(groups_dir: &Path, group: &Path) -> Option<String> {
    let relative = group.strip_prefix(groups_dir).ok()?;
    let relative = relative.to_str()?;
    if relative.is_empty() {
        return None;
    }
    Some(format!("/{}", relative))
}
