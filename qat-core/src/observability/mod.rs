//! Observability infrastructure: tracing and metrics.

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod metrics;

/// Initialize the global observability infrastructure.
///
/// `log_level` is the filter (`info`, `qat_core=debug`, ...) used when `RUST_LOG`
/// is unset or empty; a non-empty `RUST_LOG` replaces it. A Prometheus listener
/// is started when `metrics_port` is set; that requires a running tokio runtime.
///
/// Must be called once, at startup.
pub fn init(log_level: &str, metrics_port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let rust_log = std::env::var("RUST_LOG").ok();

    tracing_subscriber::registry()
        .with(env_filter(log_level, rust_log.as_deref())?)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_level(true))
        .try_init()?;

    if let Some(port) = metrics_port {
        PrometheusBuilder::new().with_http_listener(([0, 0, 0, 0], port)).install()?;
        tracing::info!("Prometheus metrics listening on port {}", port);
    }

    metrics::register_core_metrics();

    Ok(())
}

/// Build the log filter. `RUST_LOG` wins over the configured level.
fn env_filter(log_level: &str, rust_log: Option<&str>) -> Result<EnvFilter, ParseError> {
    let directives = rust_log.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(log_level);
    EnvFilter::try_new(directives)
}
