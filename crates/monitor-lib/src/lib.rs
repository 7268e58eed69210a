//! Predictive health monitoring for containerized workloads
//!
//! This crate provides the core engine for:
//! - Bounded per-entity metric history
//! - Rolling z-score anomaly detection
//! - Least-squares trend forecasting
//! - Multi-signal risk scoring and alerting
//! - Periodic and on-demand evaluation scheduling
//!
//! Telemetry collection, log shipping and alert delivery are collaborator
//! traits the host process implements.

pub mod alert;
pub mod anomaly;
pub mod config;
pub mod forecast;
pub mod health;
pub mod history;
pub mod models;
pub mod observability;
pub mod risk;
pub mod scheduler;
pub mod sources;

pub use alert::{Alert, AlertKind, AlertSink, CooldownAlerter, SpikeAlert};
pub use anomaly::{AnomalyDetector, AnomalyVerdict};
pub use crate::config::MonitorConfig;
pub use health::{ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse};
pub use history::{HistoryStore, MetricSeries};
pub use models::*;
pub use observability::{MonitorMetrics, StructuredLogger};
pub use risk::RiskScorer;
pub use scheduler::{EvaluateError, EvaluationScheduler, SweepStats};
pub use sources::{coerce_sample, CurrentSample, LogSource, RangePoint, TelemetrySource};
