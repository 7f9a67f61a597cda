//! Metrics Sink - extraction telemetry interface
//!
//! Extractors report how long they ran and which features they produced
//! through this interface instead of logging ambiently. The API layer can
//! plug in its own recorder; the engine itself only ships a no-op sink
//! and a thin `log`-backed one.

use std::time::Duration;

/// Receiver for per-extractor telemetry.
pub trait MetricsSink {
    /// One extractor finished: name, wall time, number of features produced,
    /// number of features excluded.
    fn record_extraction(&self, extractor: &str, elapsed: Duration, produced: usize, excluded: usize);
}

/// Discards everything. Default when the caller does not care.
#[derive(Debug, Default, Clone, Copy)]
pub struct NopMetrics;

impl MetricsSink for NopMetrics {
    fn record_extraction(&self, _: &str, _: Duration, _: usize, _: usize) {}
}

/// Emits telemetry through the `log` facade at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMetrics;

impl MetricsSink for LogMetrics {
    fn record_extraction(&self, extractor: &str, elapsed: Duration, produced: usize, excluded: usize) {
        log::debug!(
            "extractor {} finished in {}us: {} features, {} excluded",
            extractor,
            elapsed.as_micros(),
            produced,
            excluded
        );
    }
}
