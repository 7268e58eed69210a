//! Bounded metric history store
//!
//! Keeps the most recent samples for every (entity, signal) pair. Series are
//! created lazily on first observation and live for the process lifetime; an
//! entity that stops reporting simply goes stale. Stale keys are never
//! reaped (see DESIGN.md).

use crate::models::Signal;
use crate::sources::coerce_sample;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::VecDeque;

/// Default number of samples retained per series
pub const DEFAULT_CAPACITY: usize = 20;

/// One bounded, ordered series of samples, oldest first
#[derive(Debug, Clone)]
pub struct MetricSeries {
    capacity: usize,
    samples: VecDeque<f64>,
}

impl MetricSeries {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, evicting the oldest when at capacity
    fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    fn snapshot(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Store of bounded series keyed by (entity, signal)
///
/// Writers to different keys do not block each other; the append-and-evict
/// for a single key happens atomically under its shard lock, and every read
/// is a point-in-time copy of the window.
pub struct HistoryStore {
    series: DashMap<(String, Signal), MetricSeries>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            series: DashMap::new(),
            capacity,
        }
    }

    /// Record a raw sample and return the retained window after the append
    ///
    /// Unparsable values are coerced to 0.0 so a bad scrape cannot corrupt
    /// the series. Unknown keys start a fresh series.
    pub fn record(&self, entity: &str, signal: Signal, raw: &Value) -> Vec<f64> {
        let value = coerce_sample(raw, 0.0);
        let mut entry = self
            .series
            .entry((entity.to_string(), signal))
            .or_insert_with(|| MetricSeries::new(self.capacity));
        entry.push(value);
        entry.snapshot()
    }

    /// Current window for a series; empty for keys never observed
    pub fn get(&self, entity: &str, signal: Signal) -> Vec<f64> {
        self.series
            .get(&(entity.to_string(), signal))
            .map(|s| s.snapshot())
            .unwrap_or_default()
    }

    /// Number of (entity, signal) series currently tracked
    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
