//! One discovery pass over the configured drivers.

use crate::config::ValidatedConfig;
use crate::error::{QatError, Result};
use crate::observability::metrics;
use crate::plugin::device::{is_bus_address, list_driver_devices, short_address};
use crate::plugin::driver::{SourceDriver, TargetDriver};
use crate::plugin::inventory::{DeviceInfo, DeviceInventory, DEVICE_CLASS};
use crate::plugin::nodes::{DeviceNodes, NodeResolver};
use crate::plugin::rebind::DriverRebinder;
use crate::sysfs::{Sysfs, SysfsLayout};
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Prefix of the per-device environment variable (`qat1`, `qat2`, ...).
pub const ENV_NAMESPACE: &str = "qat";

/// Devices accepted under one driver during the listing phase.
struct DriverListing {
    driver: &'static str,
    /// `None` for the target driver
    source: Option<SourceDriver>,
    /// Full bus addresses, capped, in listing order
    devices: Vec<String>,
}

/// Builds a [`DeviceInventory`] from the sysfs driver directories.
#[derive(Clone)]
pub struct Scanner {
    sysfs: Arc<dyn Sysfs>,
    layout: SysfsLayout,
    target: TargetDriver,
    sources: Vec<SourceDriver>,
    max_devices: NonZeroUsize,
    rebinder: DriverRebinder,
    resolver: NodeResolver,
}

impl Scanner {
    pub fn new(sysfs: Arc<dyn Sysfs>, config: &ValidatedConfig) -> Self {
        Self {
            rebinder: DriverRebinder::new(sysfs.clone(), config.layout.clone(), config.target),
            resolver: NodeResolver::new(sysfs.clone(), config.layout.clone(), config.target),
            sysfs,
            layout: config.layout.clone(),
            target: config.target,
            sources: config.sources.clone(),
            max_devices: config.max_devices,
        }
    }

    /// Drivers in scan order: every kernel VF driver, then the target driver.
    pub fn scan_order(&self) -> Vec<&'static str> {
        self.sources.iter().map(SourceDriver::as_str).chain([self.target.as_str()]).collect()
    }

    /// Run one scan.
    ///
    /// # Process
    ///
    /// 1. List every driver directory, keep bus-address entries up to the cap
    /// 2. For devices still on a kernel VF driver, move them to the target driver
    /// 3. Resolve device nodes and mounts for every accepted device
    ///
    /// All directories are listed before the first rebind, so an unreadable
    /// driver directory fails the scan without touching any device. Any error
    /// fails the whole scan; no partial inventory is returned.
    #[instrument(skip(self), fields(target = %self.target))]
    pub fn scan(&self) -> Result<DeviceInventory> {
        let started = Instant::now();

        let result = self.discover().and_then(|listings| self.build_inventory(listings));
        match &result {
            Ok(inventory) => {
                metrics::record_scan(started.elapsed().as_secs_f64(), inventory.len());
                debug!(devices = inventory.len(), "Device scan completed");
            }
            Err(e) => metrics::record_scan_failure(e.kind().as_str()),
        }
        result
    }

    fn discover(&self) -> Result<Vec<DriverListing>> {
        let drivers = self
            .sources
            .iter()
            .map(|source| (source.as_str(), Some(*source)))
            .chain([(self.target.as_str(), None)]);

        let mut owners: HashMap<String, &'static str> = HashMap::new();
        let mut listings = Vec::with_capacity(self.sources.len() + 1);

        for (driver, source) in drivers {
            let entries = list_driver_devices(self.sysfs.as_ref(), &self.layout, driver)?;
            let devices: Vec<String> = entries
                .into_iter()
                .filter(|entry| is_bus_address(entry))
                .take(self.max_devices.get())
                .collect();

            // sysfs never lists a device under two drivers; seeing it twice means
            // the tree changed under us and a rebind could hit the wrong driver.
            for device in &devices {
                if let Some(first) = owners.insert(device.clone(), driver) {
                    return Err(QatError::DuplicateDevice {
                        address: device.clone(),
                        first: first.to_string(),
                        second: driver.to_string(),
                    });
                }
            }

            debug!(driver = %driver, devices = devices.len(), "Accepted driver devices");
            listings.push(DriverListing { driver, source, devices });
        }

        Ok(listings)
    }

    fn build_inventory(&self, listings: Vec<DriverListing>) -> Result<DeviceInventory> {
        let mut inventory = DeviceInventory::new();

        for listing in listings {
            for (index, address) in listing.devices.iter().enumerate() {
                // Initialize newly found devices which aren't bound to the target driver yet
                if let Some(source) = listing.source {
                    self.rebinder.rebind(address, source)?;
                }

                let DeviceNodes { nodes, mounts } = self.resolver.resolve(address)?;
                let mut envs = BTreeMap::new();
                envs.insert(format!("{}{}", ENV_NAMESPACE, index + 1), address.clone());

                let info = DeviceInfo::healthy(nodes, mounts, envs);
                inventory.add_device(DEVICE_CLASS, short_address(address), info);
            }

            if !listing.devices.is_empty() {
                info!(
                    driver = %listing.driver,
                    devices = listing.devices.len(),
                    "Registered QAT devices"
                );
            }
        }

        Ok(inventory)
    }
}
