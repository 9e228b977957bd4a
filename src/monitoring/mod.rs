mod telemetry;

pub use telemetry::{
    TelemetryManager,
    TelemetryConfig,
    LogLevel,
    PerformanceTracker,
};

/// Initialize telemetry from the configured log level name.
/// Unknown names fall back to `info`.
pub fn init_telemetry(log_level: &str) -> TelemetryManager {
    let log_level = log_level.parse().unwrap_or(LogLevel::Info);
    TelemetryManager::init(TelemetryConfig {
        enabled: true,
        log_level,
    })
}

/// Convenience macro for performance tracking
#[macro_export]
macro_rules! track_performance {
    ($name:expr) => {
        let _tracker = $crate::monitoring::PerformanceTracker::new($name);
    };
}
