use tracing::info;

/// Observer for discrete pipeline progress events.
///
/// The report pipeline emits 0/80/90/100 as it moves through fetch,
/// aggregation and export; the delivery mechanism is the caller's concern.
pub trait ProgressObserver: Send + Sync {
    fn update(&self, percent: u8);
}

/// Logs progress updates through the tracing subscriber
#[derive(Debug, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn update(&self, percent: u8) {
        info!(percent, "report generation progress");
    }
}

/// Discards progress updates
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn update(&self, _percent: u8) {}
}
