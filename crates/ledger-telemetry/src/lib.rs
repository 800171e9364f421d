//! # Ledger Telemetry
//!
//! Logging bootstrap shared by every Stakeshard binary, plus Prometheus text
//! export when built with the `metrics` feature.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `stakeshard` | Service name in log lines |
//! | `SS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `SS_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `SS_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `SS_NETWORK` | `devnet` | Network name |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Telemetry already initialized")]
    AlreadyInitialized,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to encode metrics: {0}")]
    MetricsEncode(String),
}

/// Initialize logging for the process.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    init_logging(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Render every registered Prometheus metric in text exposition format.
#[cfg(feature = "metrics")]
pub fn render_metrics() -> Result<String, TelemetryError> {
    use prometheus::{Encoder, TextEncoder};

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| TelemetryError::MetricsEncode(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsEncode(e.to_string()))
}
