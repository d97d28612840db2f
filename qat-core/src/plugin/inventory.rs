//! Device inventory handed to the device manager after every scan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Device class every QAT VF is advertised under.
pub const DEVICE_CLASS: &str = "generic";

/// Device health as reported to the orchestrator.
///
/// The scanner only reports devices it found, so it always emits `Healthy`.
/// `Unhealthy` belongs to the inventory format the device manager reads, and
/// inventory files carrying it still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceHealth {
    Healthy,
    Unhealthy,
}

/// Everything a container needs to use one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub state: DeviceHealth,
    /// Device nodes to expose, in order
    pub nodes: Vec<PathBuf>,
    /// Host paths to bind-mount, in order
    pub mounts: Vec<PathBuf>,
    /// Environment variables identifying the device
    pub envs: BTreeMap<String, String>,
}

impl DeviceInfo {
    pub fn healthy(
        nodes: Vec<PathBuf>,
        mounts: Vec<PathBuf>,
        envs: BTreeMap<String, String>,
    ) -> Self {
        Self { state: DeviceHealth::Healthy, nodes, mounts, envs }
    }
}

/// Device class -> device ID -> device info.
///
/// Rebuilt from scratch on every scan; the device manager replaces its view
/// with each published inventory instead of merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceInventory {
    classes: BTreeMap<String, BTreeMap<String, DeviceInfo>>,
}

/// Devices that appeared or disappeared between two inventories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryDiff {
    /// `class/id` keys
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl InventoryDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl DeviceInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a device, returning the previous entry for the same ID.
    pub fn add_device(&mut self, class: &str, id: &str, info: DeviceInfo) -> Option<DeviceInfo> {
        self.classes.entry(class.to_string()).or_default().insert(id.to_string(), info)
    }

    pub fn device(&self, class: &str, id: &str) -> Option<&DeviceInfo> {
        self.classes.get(class)?.get(id)
    }

    pub fn contains(&self, class: &str, id: &str) -> bool {
        self.device(class, id).is_some()
    }

    /// Devices of one class, keyed by ID.
    pub fn class(&self, class: &str) -> Option<&BTreeMap<String, DeviceInfo>> {
        self.classes.get(class)
    }

    /// Total number of devices across all classes.
    pub fn len(&self) -> usize {
        self.classes.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate `(class, id, info)` in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &DeviceInfo)> {
        self.classes.iter().flat_map(|(class, devices)| {
            devices.iter().map(move |(id, info)| (class.as_str(), id.as_str(), info))
        })
    }

    /// Compare against the previously published inventory.
    pub fn diff(&self, previous: &DeviceInventory) -> InventoryDiff {
        let added = self
            .iter()
            .filter(|(class, id, _)| !previous.contains(class, id))
            .map(|(class, id, _)| format!("{}/{}", class, id))
            .collect();
        let removed = previous
            .iter()
            .filter(|(class, id, _)| !self.contains(class, id))
            .map(|(class, id, _)| format!("{}/{}", class, id))
            .collect();

        InventoryDiff { added, removed }
    }
}
