use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use serde::{Deserialize, Serialize};

use crate::core::{Estimate, EstimatorError};

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub log_level: LogLevel,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: LogLevel::Info,
        }
    }
}

/// Log levels matching tracing's levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Performance tracking for operations
pub struct PerformanceTracker {
    start_time: Instant,
    operation_name: &'static str,
}

impl PerformanceTracker {
    pub fn new(operation_name: &'static str) -> Self {
        Self {
            start_time: Instant::now(),
            operation_name,
        }
    }
}

impl Drop for PerformanceTracker {
    fn drop(&mut self) {
        let duration = self.start_time.elapsed();
        debug!(
            operation = %self.operation_name,
            duration_us = %duration.as_micros(),
            "Operation completed"
        );
    }
}

/// Owns the subscriber setup and the structured events the app emits.
#[derive(Debug, Clone)]
pub struct TelemetryManager {
    config: TelemetryConfig,
}

impl TelemetryManager {
    /// Install the global tracing subscriber. `RUST_LOG` overrides the configured level.
    /// Installing twice is not an error; the first subscriber stays.
    pub fn init(config: TelemetryConfig) -> Self {
        if config.enabled {
            let env_filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter()));

            let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init();
        }

        Self { config }
    }

    /// Log a completed prediction
    pub fn log_prediction(&self, surface: &str, estimate: &Estimate) {
        if !self.config.enabled {
            return;
        }

        let event_data = serde_json::json!({
            "event_type": "prediction",
            "surface": surface,
            "features": estimate.features.as_slice(),
            "prediction": estimate.prediction.value,
            "advisory": estimate.prediction.band.as_str(),
        });

        info!(event = %event_data, "Prediction Event");
    }

    /// Capture and log errors with context
    pub fn log_error(&self, error: &EstimatorError, context: &str) {
        if !self.config.enabled {
            return;
        }

        error!(
            error = %error,
            context = context,
            fatal = error.is_fatal(),
            "An error occurred"
        );
    }
}
