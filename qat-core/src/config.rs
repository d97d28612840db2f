//! Configuration management.
//!
//! [`PluginConfig`] is the raw, serializable form (JSON file plus command-line
//! overrides). [`PluginConfig::validate`] turns it into a [`ValidatedConfig`]
//! before any scanning begins.

use crate::error::{QatError, Result};
use crate::plugin::{SourceDriver, TargetDriver};
use crate::sysfs::{SysfsLayout, IOMMU_GROUPS_PATH, PCI_DEVICES_PATH, PCI_DRIVERS_PATH};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Persistent configuration for the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// User-space driver devices are moved to
    pub dpdk_driver: String,
    /// Kernel VF drivers devices are moved away from
    pub kernel_vf_drivers: Vec<String>,
    /// Device cap per driver
    pub max_num_devices: usize,
    pub poll_interval_secs: u64,
    /// Extra attempts for a failed scan before the poller gives up
    pub scan_retries: u32,
    pub retry_backoff_ms: u64,
    pub pci_driver_dir: PathBuf,
    pub pci_device_dir: PathBuf,
    pub iommu_groups_dir: PathBuf,
    pub log_level: String,
    /// Prometheus listener port, disabled when unset
    pub metrics_port: Option<u16>,
    /// Where to mirror each published inventory as JSON
    pub inventory_file: Option<PathBuf>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            dpdk_driver: TargetDriver::IgbUio.as_str().to_string(),
            kernel_vf_drivers: SourceDriver::ALL.iter().map(|d| d.as_str().to_string()).collect(),
            max_num_devices: 32,
            poll_interval_secs: 5,
            scan_retries: 0,
            retry_backoff_ms: 1000,
            pci_driver_dir: PathBuf::from(PCI_DRIVERS_PATH),
            pci_device_dir: PathBuf::from(PCI_DEVICES_PATH),
            iommu_groups_dir: PathBuf::from(IOMMU_GROUPS_PATH),
            log_level: "info".to_string(),
            metrics_port: None,
            inventory_file: None,
        }
    }
}

/// Configuration that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub target: TargetDriver,
    /// Scanned in this order, before the target driver
    pub sources: Vec<SourceDriver>,
    pub max_devices: NonZeroUsize,
    pub poll_interval: Duration,
    pub scan_retries: u32,
    pub retry_backoff: Duration,
    pub layout: SysfsLayout,
}

impl PluginConfig {
    /// Load configuration from a JSON file, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|e| {
            QatError::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| QatError::config(format!("Failed to parse config: {}", e)))
    }

    /// Check driver names against the allow-lists and the numeric limits.
    pub fn validate(&self) -> Result<ValidatedConfig> {
        let target: TargetDriver = self.dpdk_driver.parse()?;

        if self.kernel_vf_drivers.is_empty() {
            return Err(QatError::config("At least one kernel VF driver is required"));
        }
        let mut seen = HashSet::new();
        let mut sources = Vec::with_capacity(self.kernel_vf_drivers.len());
        for name in &self.kernel_vf_drivers {
            let driver: SourceDriver = name.trim().parse()?;
            if !seen.insert(driver) {
                return Err(QatError::config(format!("Kernel VF driver listed twice: {}", driver)));
            }
            sources.push(driver);
        }

        let max_devices = NonZeroUsize::new(self.max_num_devices)
            .ok_or_else(|| QatError::config("max_num_devices must be a positive integer"))?;

        if self.poll_interval_secs == 0 {
            return Err(QatError::config("poll_interval_secs must be a positive integer"));
        }

        Ok(ValidatedConfig {
            target,
            sources,
            max_devices,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            scan_retries: self.scan_retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            layout: SysfsLayout {
                pci_driver_dir: self.pci_driver_dir.clone(),
                pci_device_dir: self.pci_device_dir.clone(),
                iommu_groups_dir: self.iommu_groups_dir.clone(),
            },
        })
    }
}
