//! Prometheus metrics for the custody ledger.
//!
//! All metrics live in one process-wide registry. Counters are updated even
//! before [`register_metrics`] runs; registration only controls what
//! [`encode_metrics`] exports.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // OPERATION METRICS
    // =========================================================================

    /// Dispatched operations by canonical name and outcome (`ok` or error kind)
    pub static ref LEDGER_OPERATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("cc_ledger_operations_total", "Ledger operations by name and outcome"),
        &["operation", "outcome"]
    ).expect("metric creation failed");

    /// Time spent decoding, validating and committing one operation
    pub static ref OPERATION_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new("cc_ledger_operation_duration_seconds", "Ledger operation latency")
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["operation"]
    ).expect("metric creation failed");

    // =========================================================================
    // QUANTITY METRICS
    // =========================================================================

    /// Units entered into the ledger by collections
    pub static ref QUANTITY_COLLECTED: IntCounter = IntCounter::new(
        "cc_quantity_collected_total",
        "Units of material collected"
    ).expect("metric creation failed");

    /// Units moved between agents
    pub static ref QUANTITY_TRANSFERRED: IntCounter = IntCounter::new(
        "cc_quantity_transferred_total",
        "Units of material transferred"
    ).expect("metric creation failed");

    /// Units removed from the ledger by processing
    pub static ref QUANTITY_PROCESSED: IntCounter = IntCounter::new(
        "cc_quantity_processed_total",
        "Units of material processed"
    ).expect("metric creation failed");

    // =========================================================================
    // STORAGE METRICS
    // =========================================================================

    /// Write plans that failed after some writes were applied
    pub static ref PARTIAL_WRITES: IntCounter = IntCounter::new(
        "cc_partial_writes_total",
        "Operations that left the store partially updated"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(LEDGER_OPERATIONS.clone()),
        Box::new(OPERATION_DURATION.clone()),
        Box::new(QUANTITY_COLLECTED.clone()),
        Box::new(QUANTITY_TRANSFERRED.clone()),
        Box::new(QUANTITY_PROCESSED.clone()),
        Box::new(PARTIAL_WRITES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Count one operation and observe its latency.
pub fn record_operation(operation: &str, outcome: &str, seconds: f64) {
    LEDGER_OPERATIONS
        .with_label_values(&[operation, outcome])
        .inc();
    OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(seconds);
}

/// Encode all registered metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
