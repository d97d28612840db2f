//! Moves QAT VFs from their kernel driver to the user-space target driver.

use crate::error::{BindStage, QatError, Result};
use crate::observability::metrics;
use crate::plugin::device::{read_device_id, INTEL_VENDOR_ID};
use crate::plugin::driver::{SourceDriver, TargetDriver};
use crate::sysfs::{Sysfs, SysfsLayout};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Performs the unbind + `new_id` driver transition for a single device.
#[derive(Clone)]
pub struct DriverRebinder {
    sysfs: Arc<dyn Sysfs>,
    layout: SysfsLayout,
    target: TargetDriver,
}

impl DriverRebinder {
    pub fn new(sysfs: Arc<dyn Sysfs>, layout: SysfsLayout, target: TargetDriver) -> Self {
        Self { sysfs, layout, target }
    }

    /// Move `address` from `source` to the target driver.
    ///
    /// # Process
    ///
    /// 1. Unbind from the kernel VF driver
    /// 2. Read the device ID
    /// 3. Register `8086 <device-id>` with the target driver, which then probes
    ///    and claims the now-unbound device
    ///
    /// There is no rollback: if step 3 fails the device stays unbound until the
    /// next successful run.
    #[instrument(skip(self), fields(target = %self.target))]
    pub fn rebind(&self, address: &str, source: SourceDriver) -> Result<()> {
        self.unbind_from_driver(address)?;

        let device_id = read_device_id(self.sysfs.as_ref(), &self.layout, address)?;
        self.register_device_id(address, &device_id)?;

        metrics::record_rebind(source.as_str(), self.target.as_str());
        info!(
            address = %address,
            source = %source,
            device_id = %device_id,
            "Device moved to target driver"
        );
        Ok(())
    }

    /// Unbind device from its current driver.
    fn unbind_from_driver(&self, address: &str) -> Result<()> {
        let unbind_path = self.layout.unbind_path(address);
        debug!(address = %address, path = ?unbind_path, "Unbinding from kernel driver");

        self.write(address, BindStage::Unbind, &unbind_path, address)
    }

    /// Register device ID with the target driver.
    fn register_device_id(&self, address: &str, device_id: &str) -> Result<()> {
        let new_id_path = self.layout.new_id_path(self.target.as_str());
        let id_string = format!("{} {}", INTEL_VENDOR_ID, device_id);
        debug!(address = %address, id = %id_string, "Registering device ID with target driver");

        self.write(address, BindStage::Bind, &new_id_path, &id_string)
    }

    fn write(&self, address: &str, stage: BindStage, path: &Path, value: &str) -> Result<()> {
        self.sysfs.write_attribute(path, value).map_err(|e| QatError::Bind {
            address: address.to_string(),
            stage,
            path: path.to_path_buf(),
            source: e,
        })
    }
}
