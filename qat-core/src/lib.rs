//! QAT Device Plugin Core Library
//!
//! Discovers Intel QuickAssist virtual functions in sysfs, moves them from
//! their kernel VF driver to a DPDK-capable driver, and produces the device
//! inventory advertised to the container orchestrator.

pub mod config;
pub mod error;
pub mod observability;
pub mod plugin;
pub mod sysfs;

// Re-export commonly used items
pub use config::{PluginConfig, ValidatedConfig};
pub use error::{ErrorKind, QatError, Result};
pub use observability::init as init_observability;
pub use plugin::{DeviceInfo, DeviceInventory, Notifier, Poller, Scanner, WatchNotifier};
