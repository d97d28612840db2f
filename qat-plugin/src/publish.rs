//! Follows published inventories: logs device changes and mirrors them to disk.

use anyhow::{Context, Result};
use qat_core::DeviceInventory;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{info, warn};

/// Consume inventories until the poller drops its sender.
pub async fn follow_inventory(
    mut rx: watch::Receiver<DeviceInventory>,
    inventory_file: Option<PathBuf>,
) {
    let mut previous = DeviceInventory::new();

    while rx.changed().await.is_ok() {
        let inventory = rx.borrow_and_update().clone();

        let diff = inventory.diff(&previous);
        if !diff.is_empty() {
            info!(
                devices = inventory.len(),
                added = ?diff.added,
                removed = ?diff.removed,
                "Device inventory changed"
            );
        }

        if let Some(path) = &inventory_file {
            if let Err(e) = write_inventory_file(path, &inventory).await {
                warn!(path = %path.display(), error = %e, "Failed to write inventory file");
            }
        }

        previous = inventory;
    }
}

/// Write the inventory as JSON, replacing the file atomically.
pub async fn write_inventory_file(path: &Path, inventory: &DeviceInventory) -> Result<()> {
    let content = serde_json::to_vec_pretty(inventory).context("Failed to serialize inventory")?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, content)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to rename {} to {}", tmp.display(), path.display()))?;

    Ok(())
}
