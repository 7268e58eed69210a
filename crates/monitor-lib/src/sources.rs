//! Collaborator contracts for telemetry and log collection
//!
//! The engine never talks to Prometheus, Docker or Kubernetes directly. It is
//! constructed with implementations of these traits and treats every call as
//! potentially slow or failing; the scheduler wraps each one in a bounded
//! timeout.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Latest CPU/memory reading for one entity, as delivered by the backend
///
/// Values stay raw JSON because backends occasionally hand back placeholders
/// such as "N/A" instead of numbers; [`coerce_sample`] normalizes them at the
/// ingestion boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentSample {
    pub cpu_usage: Value,
    pub memory_usage: Value,
}

/// One point of a range-query result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangePoint {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    pub value: Value,
}

/// Source of resource telemetry for monitored entities
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// List the entities the backend currently has metrics for
    async fn list_entities(&self) -> Result<Vec<String>>;

    /// Fetch the latest CPU/memory sample for one entity
    async fn current_sample(&self, entity: &str) -> Result<CurrentSample>;

    /// Evaluate a range query, returning timestamped values at `step` resolution
    async fn query_range(
        &self,
        expr: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: &str,
    ) -> Result<Vec<RangePoint>>;
}

/// Source of log-derived error signals
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Count of recent log lines matching the case-insensitive pattern set
    /// `error|failed|exception|crash|timeout`, over the last `tail_lines`
    /// lines. Pattern matching is the collaborator's job.
    async fn recent_errors(&self, entity: &str, tail_lines: u32) -> Result<u64>;
}

/// Coerce a raw telemetry value to a finite f64, falling back to `default`
///
/// Numbers and numeric strings pass through; anything else, including
/// non-finite parses, becomes the default. Malformed upstream data must never
/// crash an evaluation pass.
pub fn coerce_sample(value: &Value, default: f64) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v,
        _ => default,
    }
}
