//! Shared fixtures: an in-memory host with QAT VFs.

#![allow(dead_code)]

use qat_core::sysfs::{MemorySysfs, SysfsLayout};
use qat_core::{PluginConfig, ValidatedConfig};
use std::sync::Arc;
use std::time::Duration;

/// In-memory sysfs populated the way the kernel lays out QAT VFs.
pub struct FakeHost {
    pub sysfs: Arc<MemorySysfs>,
    pub layout: SysfsLayout,
}

impl FakeHost {
    /// Create driver directories with their usual control files.
    pub fn new(drivers: &[&str]) -> Self {
        let host = Self { sysfs: Arc::new(MemorySysfs::new()), layout: SysfsLayout::default() };
        for driver in drivers {
            let dir = host.layout.driver_dir(driver);
            for control in ["bind", "unbind", "new_id", "remove_id", "uevent"] {
                host.sysfs.add_entry(dir.clone(), control);
            }
            host.sysfs.add_file(host.layout.new_id_path(driver), "");
        }
        host
    }

    /// Add a VF bound to `driver`. `index` picks its `uioN` name and IOMMU group.
    pub fn add_vf(&self, driver: &str, address: &str, index: usize) {
        self.add_vf_with_id(driver, address, index, "0x37c9\n");
    }

    pub fn add_vf_with_id(&self, driver: &str, address: &str, index: usize, device_id: &str) {
        self.sysfs.add_entry(self.layout.driver_dir(driver), address);
        self.sysfs.add_file(self.layout.device_id_path(address), device_id);
        self.sysfs.add_file(self.layout.unbind_path(address), "");
        self.sysfs.add_entry(self.layout.uio_dir(address), &format!("uio{}", index));
        self.sysfs.add_symlink(
            self.layout.iommu_group_link(address),
            format!("/sys/kernel/iommu_groups/{}", index),
        );
    }

    /// Move a VF's directory entry, as the kernel does once a rebind completes.
    pub fn move_vf(&self, address: &str, from: &str, to: &str) {
        self.sysfs.remove_entry(&self.layout.driver_dir(from), address);
        self.sysfs.add_entry(self.layout.driver_dir(to), address);
    }

    /// Unbind writes recorded so far, one per rebound device.
    pub fn unbound_devices(&self) -> Vec<String> {
        self.sysfs
            .writes()
            .into_iter()
            .filter(|(path, _)| path.ends_with("driver/unbind"))
            .map(|(_, value)| value)
            .collect()
    }
}

/// Validated config for `target` and `sources` with a fast poll interval.
pub fn config(target: &str, sources: &[&str], max_devices: usize) -> ValidatedConfig {
    let mut config = PluginConfig {
        dpdk_driver: target.to_string(),
        kernel_vf_drivers: sources.iter().map(|s| s.to_string()).collect(),
        max_num_devices: max_devices,
        ..Default::default()
    }
    .validate()
    .expect("test config should be valid");

    config.poll_interval = Duration::from_millis(1);
    config.retry_backoff = Duration::from_millis(1);
    config
}
