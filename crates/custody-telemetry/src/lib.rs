//! # Custody Telemetry
//!
//! Logging and metrics shared by the Custody-Chain ledger and its tools.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with an env filter and JSON or
//!   human-readable output on stderr
//! - **Metrics**: Prometheus counters and histograms in a process-wide
//!   registry, exported as text
//!
//! ## Usage
//!
//! ```rust,no_run
//! use custody_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry init");
//! custody_telemetry::metrics::record_operation("Collect", "ok", 0.001);
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CC_SERVICE_NAME` | `custody-chain` | Service name in log lines |
//! | `CC_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `CC_CONSOLE_OUTPUT` | `true` | Write logs at all |
//! | `CC_JSON_LOGS` | `false` (`true` in containers) | JSON log format |
//! | `CC_NETWORK` | `devnet` | Deployment name |

mod config;
mod logging;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{encode_metrics, record_operation, register_metrics};
pub use tracing_setup::{env_filter, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics and install the tracing subscriber.
///
/// Returns a guard to hold for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    if config.service_name.trim().is_empty() {
        return Err(TelemetryError::Config("service name is empty".to_string()));
    }

    register_metrics()?;
    init_tracing(&config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}
