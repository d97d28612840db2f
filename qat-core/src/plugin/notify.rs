//! Hand-off of scanned inventories to the device manager.

use crate::plugin::inventory::DeviceInventory;
use async_trait::async_trait;
use tokio::sync::watch;

/// Receives every successfully scanned inventory.
///
/// Publishing is fire-and-forget: implementations must not report errors back
/// to the poller and should not block for long.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Replace the manager's view with `inventory`.
    async fn notify(&self, inventory: DeviceInventory);
}

/// Publishes inventories on a `tokio::sync::watch` channel.
///
/// Receivers always observe the latest inventory; intermediate ones may be
/// skipped if a receiver falls behind.
#[derive(Debug)]
pub struct WatchNotifier {
    tx: watch::Sender<DeviceInventory>,
}

impl WatchNotifier {
    pub fn new() -> (Self, watch::Receiver<DeviceInventory>) {
        let (tx, rx) = watch::channel(DeviceInventory::new());
        (Self { tx }, rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<DeviceInventory> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl Notifier for WatchNotifier {
    async fn notify(&self, inventory: DeviceInventory) {
        // send_replace succeeds even with no receivers left.
        self.tx.send_replace(inventory);
    }
}
