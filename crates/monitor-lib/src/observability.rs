//! Observability infrastructure for the health monitor
//!
//! Provides:
//! - Prometheus metrics (sweep latency, tracked entities, anomaly and alert
//!   totals, last risk per entity)
//! - Structured logging for the significant domain events

use crate::models::RiskAssessment;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_gauge, GaugeVec, Histogram, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for sweep latency (in seconds)
const SWEEP_LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<MonitorMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct MonitorMetricsInner {
    sweep_latency_seconds: Histogram,
    entities_monitored: IntGauge,
    series_tracked: IntGauge,
    anomalies_detected: IntGauge,
    evaluations_completed: IntGauge,
    collaborator_errors: IntGauge,
    alerts_emitted: IntGauge,
    alert_failures: IntGauge,
    last_risk_percent: GaugeVec,
}

impl MonitorMetricsInner {
    fn new() -> Self {
        Self {
            sweep_latency_seconds: register_histogram!(
                "health_monitor_sweep_latency_seconds",
                "Time spent on one periodic anomaly sweep",
                SWEEP_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register sweep_latency_seconds"),

            entities_monitored: register_int_gauge!(
                "health_monitor_entities_monitored",
                "Number of entities seen by the most recent sweep"
            )
            .expect("Failed to register entities_monitored"),

            series_tracked: register_int_gauge!(
                "health_monitor_series_tracked",
                "Number of (entity, signal) series retained in the history store"
            )
            .expect("Failed to register series_tracked"),

            anomalies_detected: register_int_gauge!(
                "health_monitor_anomalies_detected_total",
                "Total number of spike anomalies detected"
            )
            .expect("Failed to register anomalies_detected"),

            evaluations_completed: register_int_gauge!(
                "health_monitor_evaluations_completed_total",
                "Total number of on-demand evaluations completed"
            )
            .expect("Failed to register evaluations_completed"),

            collaborator_errors: register_int_gauge!(
                "health_monitor_collaborator_errors_total",
                "Total number of failed or timed-out collaborator calls"
            )
            .expect("Failed to register collaborator_errors"),

            alerts_emitted: register_int_gauge!(
                "health_monitor_alerts_emitted_total",
                "Total number of alerts delivered to the sink"
            )
            .expect("Failed to register alerts_emitted"),

            alert_failures: register_int_gauge!(
                "health_monitor_alert_failures_total",
                "Total number of alert deliveries that failed"
            )
            .expect("Failed to register alert_failures"),

            last_risk_percent: register_gauge_vec!(
                "health_monitor_last_risk_percent",
                "Most recent composite risk percentage per entity",
                &["entity"]
            )
            .expect("Failed to register last_risk_percent"),
        }
    }
}

/// Monitor metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct MonitorMetrics {
    _private: (),
}

impl Default for MonitorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(MonitorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &MonitorMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_sweep_latency(&self, duration_secs: f64) {
        self.inner().sweep_latency_seconds.observe(duration_secs);
    }

    pub fn set_entities_monitored(&self, count: i64) {
        self.inner().entities_monitored.set(count);
    }

    pub fn set_series_tracked(&self, count: i64) {
        self.inner().series_tracked.set(count);
    }

    pub fn inc_anomalies_detected(&self) {
        self.inner().anomalies_detected.inc();
    }

    pub fn inc_evaluations_completed(&self) {
        self.inner().evaluations_completed.inc();
    }

    pub fn inc_collaborator_errors(&self) {
        self.inner().collaborator_errors.inc();
    }

    pub fn inc_alerts_emitted(&self) {
        self.inner().alerts_emitted.inc();
    }

    pub fn inc_alert_failures(&self) {
        self.inner().alert_failures.inc();
    }

    pub fn set_last_risk(&self, entity: &str, percent: f64) {
        self.inner()
            .last_risk_percent
            .with_label_values(&[entity])
            .set(percent);
    }
}

/// Structured logger for monitor events
///
/// Provides consistent logging for anomalies, risk assessments and
/// lifecycle events.
#[derive(Clone, Default)]
pub struct StructuredLogger;

impl StructuredLogger {
    pub fn new() -> Self {
        Self
    }

    /// Log engine startup
    pub fn log_startup(&self, version: &str, sweep_interval_secs: u64) {
        info!(
            event = "monitor_started",
            version = %version,
            sweep_interval_secs = sweep_interval_secs,
            "Health monitor started"
        );
    }

    /// Log engine shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "monitor_shutdown",
            reason = %reason,
            "Health monitor shutting down"
        );
    }

    /// Log a spike anomaly
    pub fn log_anomaly(
        &self,
        entity: &str,
        signal: &str,
        current: f64,
        expected: f64,
        z_score: f64,
    ) {
        warn!(
            event = "anomaly_detected",
            entity = %entity,
            signal = %signal,
            current = current,
            expected = expected,
            z_score = z_score,
            "Spike anomaly detected"
        );
    }

    /// Log a risk assessment; anything above NORMAL is logged as a warning
    pub fn log_risk(&self, assessment: &RiskAssessment) {
        if assessment.should_alert() {
            warn!(
                event = "risk_assessed",
                entity = %assessment.entity,
                level = %assessment.level,
                total_risk = assessment.total_risk,
                cpu_predicted_pct = assessment.cpu_predicted_pct,
                mem_predicted_mb = assessment.mem_predicted_mb,
                recent_errors = assessment.recent_errors,
                "Elevated risk assessed"
            );
        } else {
            info!(
                event = "risk_assessed",
                entity = %assessment.entity,
                level = %assessment.level,
                total_risk = assessment.total_risk,
                "Risk assessed"
            );
        }
    }

    /// Log the outcome of one periodic sweep
    pub fn log_sweep(
        &self,
        entities: usize,
        evaluated: usize,
        errors: usize,
        anomalies: usize,
        elapsed_ms: u64,
    ) {
        info!(
            event = "sweep_complete",
            entities = entities,
            evaluated = evaluated,
            errors = errors,
            anomalies = anomalies,
            elapsed_ms = elapsed_ms,
            "Anomaly sweep complete"
        );
    }
}
