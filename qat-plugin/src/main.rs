use anyhow::{Context, Result};
use clap::Parser;
use qat_core::plugin::{Poller, Scanner, WatchNotifier};
use qat_core::sysfs::HostSysfs;
use qat_core::{init_observability, PluginConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

mod publish;

#[derive(Parser, Debug)]
#[command(name = "qat-plugin")]
#[command(about = "Intel QuickAssist device plugin", long_about = None)]
struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(long, env = "QAT_PLUGIN_CONFIG")]
    config: Option<PathBuf>,

    /// DPDK device driver for configuring the QAT device (igb_uio, vfio-pci)
    #[arg(long)]
    dpdk_driver: Option<String>,

    /// Comma separated VF device drivers of the QuickAssist devices in the system.
    /// Devices supported: DH895xCC, C62x, C3xxx and D15xx
    #[arg(long, value_delimiter = ',')]
    kernel_vf_drivers: Option<Vec<String>>,

    /// Maximum number of QAT devices to be provided per driver
    #[arg(long)]
    max_num_devices: Option<usize>,

    /// Seconds between device scans
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Log filter directive, used unless RUST_LOG is set
    #[arg(long)]
    log_level: Option<String>,

    /// Serve Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Mirror every published inventory to this JSON file
    #[arg(long)]
    inventory_file: Option<PathBuf>,
}

impl Args {
    fn apply(self, config: &mut PluginConfig) {
        if let Some(driver) = self.dpdk_driver {
            config.dpdk_driver = driver;
        }
        if let Some(drivers) = self.kernel_vf_drivers {
            config.kernel_vf_drivers = drivers;
        }
        if let Some(max) = self.max_num_devices {
            config.max_num_devices = max;
        }
        if let Some(secs) = self.poll_interval {
            config.poll_interval_secs = secs;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if self.metrics_port.is_some() {
            config.metrics_port = self.metrics_port;
        }
        if self.inventory_file.is_some() {
            config.inventory_file = self.inventory_file;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = PluginConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    init_observability(&config.log_level, config.metrics_port)
        .map_err(|e| anyhow::anyhow!("Failed to initialize observability: {}", e))?;

    info!("QAT device plugin started");

    let validated = match config.validate() {
        Ok(validated) => validated,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    info!(
        target_driver = %validated.target,
        kernel_vf_drivers = ?config.kernel_vf_drivers,
        max_num_devices = validated.max_devices.get(),
        "Configuration validated"
    );

    let scanner = Scanner::new(Arc::new(HostSysfs), &validated);
    let (notifier, inventory_rx) = WatchNotifier::new();
    let publisher =
        tokio::spawn(publish::follow_inventory(inventory_rx, config.inventory_file.clone()));
    let poller = Poller::new(scanner, notifier, &validated);

    let result = tokio::select! {
        result = poller.run() => result.context("Device scan failed"),
        signal = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            signal.context("Failed to listen for shutdown signal")
        }
    };

    publisher.abort();
    let _ = publisher.await;

    info!("QAT device plugin shutting down");
    result
}
