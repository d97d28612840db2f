//! Core metrics definitions.
//!
//! All metrics follow Prometheus naming conventions:
//! - `_total` suffix for counters
//! - `_seconds` suffix for histograms measuring duration

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Register all core metrics with descriptions.
///
/// This ensures metrics appear in `/metrics` with proper metadata.
pub fn register_core_metrics() {
    // Scan metrics
    describe_histogram!("qat_scan_duration_seconds", "Time taken by one full device scan");
    describe_counter!("qat_scans_total", "Total number of successful device scans");
    describe_counter!("qat_scan_failures_total", "Total number of failed device scans (by kind)");

    // Device metrics
    describe_gauge!("qat_devices", "Number of devices in the last published inventory");
    describe_counter!(
        "qat_devices_rebound_total",
        "Total number of devices moved to the target driver (by source, target)"
    );
}

pub fn record_scan(duration_secs: f64, devices: usize) {
    histogram!("qat_scan_duration_seconds").record(duration_secs);
    counter!("qat_scans_total").increment(1);
    gauge!("qat_devices").set(devices as f64);
}

pub fn record_scan_failure(kind: &str) {
    counter!("qat_scan_failures_total", "kind" => kind.to_string()).increment(1);
}

pub fn record_rebind(source: &str, target: &str) {
    counter!(
        "qat_devices_rebound_total",
        "source" => source.to_string(),
        "target" => target.to_string()
    )
    .increment(1);
}
