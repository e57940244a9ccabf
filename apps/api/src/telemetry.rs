//! Rolling-window latency recorder.
//!
//! Diagnostics only: nothing in the pipeline branches on these numbers.
//! Constructed once in `main` and injected; never a global.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

/// Per-operation statistics over the current window.
#[derive(Debug, Clone, Serialize)]
pub struct OperationStats {
    pub operation: String,
    pub samples: usize,
    pub mean_ms: f64,
    pub p95_ms: f64,
    pub max_ms: f64,
}

pub struct PerformanceMonitor {
    windows: Mutex<HashMap<String, VecDeque<Duration>>>,
    window_size: usize,
}

impl PerformanceMonitor {
    pub fn new(window_size: usize) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            window_size: window_size.max(1),
        }
    }

    /// Records one latency sample, dropping the oldest when the window
    /// is full.
    pub fn record(&self, operation: &str, elapsed: Duration) {
        let mut windows = self.windows.lock().unwrap();
        let window = windows.entry(operation.to_string()).or_default();
        if window.len() == self.window_size {
            window.pop_front();
        }
        window.push_back(elapsed);
    }

    /// Current statistics for every operation seen so far, sorted by name.
    pub fn snapshot(&self) -> Vec<OperationStats> {
        let windows = self.windows.lock().unwrap();
        let mut stats: Vec<OperationStats> = windows
            .iter()
            .filter(|(_, w)| !w.is_empty())
            .map(|(operation, window)| {
                let mut millis: Vec<f64> =
                    window.iter().map(|d| d.as_secs_f64() * 1000.0).collect();
                millis.sort_by(|a, b| a.total_cmp(b));
                let sum: f64 = millis.iter().sum();
                let p95_index =
                    ((millis.len() as f64 * 0.95).ceil() as usize).clamp(1, millis.len()) - 1;
                OperationStats {
                    operation: operation.clone(),
                    samples: millis.len(),
                    mean_ms: sum / millis.len() as f64,
                    p95_ms: millis[p95_index],
                    max_ms: *millis.last().unwrap(),
                }
            })
            .collect();
        stats.sort_by(|a, b| a.operation.cmp(&b.operation));
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_snapshot() {
        let monitor = PerformanceMonitor::new(16);
        monitor.record("cache_lookup", Duration::from_millis(2));
        monitor.record("cache_lookup", Duration::from_millis(4));
        let stats = monitor.snapshot();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].operation, "cache_lookup");
        assert_eq!(stats[0].samples, 2);
        assert!((stats[0].mean_ms - 3.0).abs() < 0.5);
        assert!((stats[0].max_ms - 4.0).abs() < 0.5);
    }

    #[test]
    fn test_window_is_bounded() {
        let monitor = PerformanceMonitor::new(4);
        for i in 0..10 {
            monitor.record("op", Duration::from_millis(i));
        }
        let stats = monitor.snapshot();
        assert_eq!(stats[0].samples, 4);
        // Only the newest four samples (6..=9ms) remain.
        assert!(stats[0].mean_ms >= 6.0);
    }

    #[test]
    fn test_p95_tracks_tail() {
        let monitor = PerformanceMonitor::new(100);
        for _ in 0..99 {
            monitor.record("op", Duration::from_millis(10));
        }
        monitor.record("op", Duration::from_millis(500));
        let stats = monitor.snapshot();
        assert!(stats[0].p95_ms <= 10.5, "p95 was {}", stats[0].p95_ms);
        assert!((stats[0].max_ms - 500.0).abs() < 1.0);
    }

    #[test]
    fn test_operations_sorted_by_name() {
        let monitor = PerformanceMonitor::new(8);
        monitor.record("zeta", Duration::from_millis(1));
        monitor.record("alpha", Duration::from_millis(1));
        let names: Vec<_> = monitor
            .snapshot()
            .into_iter()
            .map(|s| s.operation)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
