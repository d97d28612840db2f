//! QuickAssist virtual function discovery and driver rebinding.
//!
//! QAT virtual functions come up bound to a kernel VF driver (`c6xxvf` and
//! friends). DPDK workloads need them on a user-space driver instead, so the
//! plugin moves every VF it finds over to the configured target driver and
//! describes the resulting device nodes for the container runtime.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     QAT Device Plugin                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Poller                                                     │
//! │  └── scan, publish, sleep; stops on the first failed scan   │
//! │                                                             │
//! │  Scanner                                                    │
//! │  ├── list_driver_devices() - VFs per driver, capped         │
//! │  ├── DriverRebinder::rebind() - kernel driver -> target     │
//! │  └── NodeResolver::resolve() - /dev nodes + mounts          │
//! │                                                             │
//! │  Notifier                                                   │
//! │  └── hands the full DeviceInventory to the device manager   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use qat_core::plugin::{Poller, Scanner, WatchNotifier};
//! use qat_core::sysfs::HostSysfs;
//!
//! let config = PluginConfig::default().validate()?;
//! let scanner = Scanner::new(Arc::new(HostSysfs), &config);
//! let (notifier, inventory_rx) = WatchNotifier::new();
//!
//! Poller::new(scanner, notifier, &config).run().await?;
//! ```

mod device;
mod driver;
mod inventory;
mod nodes;
mod notify;
mod poller;
mod rebind;
mod scanner;

pub use device::{
    is_bus_address, list_driver_devices, read_device_id, short_address, INTEL_VENDOR_ID,
};
pub use driver::{SourceDriver, TargetDriver};
pub use inventory::{DeviceHealth, DeviceInfo, DeviceInventory, InventoryDiff, DEVICE_CLASS};
pub use nodes::{iommu_group_suffix, DeviceNodes, NodeResolver};
pub use notify::{Notifier, WatchNotifier};
pub use poller::Poller;
pub use rebind::DriverRebinder;
pub use scanner::{Scanner, ENV_NAMESPACE};
