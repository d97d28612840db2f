//! Scan-publish-sleep loop.

use crate::config::ValidatedConfig;
use crate::error::Result;
use crate::plugin::inventory::DeviceInventory;
use crate::plugin::notify::Notifier;
use crate::plugin::scanner::Scanner;
use std::time::Duration;
use tracing::{error, info, warn};

/// Repeatedly scans and publishes the device inventory.
pub struct Poller<N: Notifier> {
    scanner: Scanner,
    notifier: N,
    interval: Duration,
    retries: u32,
    backoff: Duration,
}

impl<N: Notifier> Poller<N> {
    pub fn new(scanner: Scanner, notifier: N, config: &ValidatedConfig) -> Self {
        Self {
            scanner,
            notifier,
            interval: config.poll_interval,
            retries: config.scan_retries,
            backoff: config.retry_backoff,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Poll until a scan fails.
    ///
    /// Only returns on error. The failed scan publishes nothing; the caller is
    /// expected to exit and let the supervisor restart the plugin.
    pub async fn run(&self) -> Result<()> {
        info!(
            interval = ?self.interval,
            drivers = ?self.scanner.scan_order(),
            "Starting device polling"
        );

        loop {
            if let Err(e) = self.poll_once().await {
                error!(error = %e, kind = e.kind().as_str(), "Device scan failed");
                return Err(e);
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Scan once and publish the result. Returns the number of devices published.
    pub async fn poll_once(&self) -> Result<usize> {
        let inventory = self.scan_with_retries().await?;
        let devices = inventory.len();
        self.notifier.notify(inventory).await;
        Ok(devices)
    }

    /// Each attempt is a full scan; a failed attempt is never published.
    async fn scan_with_retries(&self) -> Result<DeviceInventory> {
        let mut attempt = 0;
        let mut backoff = self.backoff;
        loop {
            match self.scanner.scan() {
                Ok(inventory) => return Ok(inventory),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        error = %e,
                        attempt,
                        retries = self.retries,
                        backoff = ?backoff,
                        "Device scan failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
