//! Prometheus metrics for Apio.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `apio_dispatch_total` | Counter | `operation`, `outcome` | Dispatched requests |
//! | `apio_dispatch_duration_seconds` | Histogram | `operation` | Dispatch latency |
//! | `apio_registered_resources` | Gauge | - | Resources in the registry |
//!
//! Recording functions work whether or not a recorder is installed; without
//! one the `metrics` facade discards the values.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Counter of dispatched requests.
pub const DISPATCH_TOTAL: &str = "apio_dispatch_total";

/// Histogram of dispatch latency.
pub const DISPATCH_DURATION: &str = "apio_dispatch_duration_seconds";

/// Gauge of registered resources.
pub const REGISTERED_RESOURCES: &str = "apio_registered_resources";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for dispatch duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_buckets: vec![
                0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0,
            ],
        }
    }
}

/// Renders installed metrics in Prometheus text format.
#[derive(Debug)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Wraps a Prometheus handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Returns the registry for the globally installed recorder, if any.
    #[must_use]
    pub fn global() -> Option<Self> {
        METRICS_HANDLE.get().cloned().map(Self::new)
    }

    /// Renders all metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the Prometheus recorder and describes the standard metrics.
///
/// The transport layer decides how to expose the rendered text; no listener
/// is started here.
///
/// # Errors
///
/// Returns [`TelemetryError::MetricsInit`] if the buckets are invalid or a
/// recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            metrics_exporter_prometheus::Matcher::Full(DISPATCH_DURATION.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);

    describe_metrics();

    Ok(())
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Registers descriptions for the standard metrics.
pub fn describe_metrics() {
    describe_counter!(DISPATCH_TOTAL, "Total number of dispatched resource requests");
    describe_histogram!(DISPATCH_DURATION, "Resource request dispatch duration in seconds");
    describe_gauge!(REGISTERED_RESOURCES, "Number of resources in the registry");
}

/// Records one dispatch.
///
/// `operation` names the dispatcher entry point and `outcome` is `success`
/// or the error category of the failure.
pub fn record_dispatch(operation: &'static str, outcome: &'static str, duration: Duration) {
    counter!(DISPATCH_TOTAL, "operation" => operation, "outcome" => outcome).increment(1);
    histogram!(DISPATCH_DURATION, "operation" => operation).record(duration.as_secs_f64());
}

/// Records the number of registered resources.
#[allow(clippy::cast_precision_loss)]
pub fn record_registered_resources(count: usize) {
    gauge!(REGISTERED_RESOURCES).set(count as f64);
}
