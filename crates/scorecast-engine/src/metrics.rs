//! Stream telemetry collection.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::trace;

use scorecast_ipc::TelemetrySample;

/// How long bitrate samples are retained.
pub const TELEMETRY_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Bounded, time-trimmed history of bitrate samples.
///
/// Samples are kept in insertion order. After every insert, nothing older
/// than the window (measured from the newest sample) remains.
#[derive(Debug, Clone)]
pub struct TelemetryWindow {
    samples: VecDeque<TelemetrySample>,
    window_ms: u64,
}

impl TelemetryWindow {
    /// Create a window with the standard five-minute retention.
    pub fn new() -> Self {
        Self::with_window(TELEMETRY_WINDOW)
    }

    /// Create a window with a custom retention.
    pub fn with_window(window: Duration) -> Self {
        Self {
            samples: VecDeque::new(),
            window_ms: window.as_millis() as u64,
        }
    }

    /// Record a sample and trim everything that fell out of the window.
    pub fn insert(&mut self, sample: TelemetrySample) {
        let now = sample.timestamp_ms;
        self.samples.push_back(sample);

        let window_ms = self.window_ms;
        let before = self.samples.len();
        // Samples are not assumed sorted; a backwards clock step must not
        // leave stale entries behind the newest one.
        self.samples
            .retain(|s| now.saturating_sub(s.timestamp_ms) < window_ms);

        let trimmed = before - self.samples.len();
        if trimmed > 0 {
            trace!(trimmed, retained = self.samples.len(), "Trimmed telemetry window");
        }
    }

    /// Retained samples in insertion order.
    pub fn snapshot(&self) -> Vec<TelemetrySample> {
        self.samples.iter().copied().collect()
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if no samples are retained.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for TelemetryWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(timestamp_ms: u64, bitrate_kbps: f64) -> TelemetrySample {
        TelemetrySample {
            timestamp_ms,
            bitrate_kbps,
        }
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut window = TelemetryWindow::new();
        window.insert(sample(1_000, 1.0));
        window.insert(sample(2_000, 2.0));
        window.insert(sample(3_000, 3.0));

        let kept: Vec<f64> = window.snapshot().iter().map(|s| s.bitrate_kbps).collect();
        assert_eq!(kept, vec![1.0, 2.0, 3.0]);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn test_trims_at_exact_window_boundary() {
        let mut window = TelemetryWindow::new();
        window.insert(sample(0, 1.0));
        window.insert(sample(1, 2.0));
        window.insert(sample(300_000, 3.0));

        // 300000 - 0 is not < 300000, 300000 - 1 is.
        let kept: Vec<u64> = window.snapshot().iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(kept, vec![1, 300_000]);
    }

    #[test]
    fn test_every_retained_sample_is_inside_window() {
        let mut window = TelemetryWindow::new();
        let mut now = 0u64;

        for step in 0..2_000u64 {
            now += 1_000 + (step % 7) * 250;
            window.insert(sample(now, step as f64));

            for s in window.snapshot() {
                assert!(now - s.timestamp_ms < 300_000);
            }
        }
        assert!(window.len() <= 300);
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut window = TelemetryWindow::with_window(Duration::from_secs(1));
        window.insert(sample(10, 1.0));

        let first = window.snapshot();
        let second = window.snapshot();
        assert_eq!(first, second);
        assert_eq!(window.len(), 1);

        window.clear();
        assert!(window.is_empty());
    }
}
