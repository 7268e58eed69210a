//! Evaluation scheduling
//!
//! Orchestrates the two evaluation paths over the collaborator traits:
//!
//! - a periodic anomaly sweep across every known entity, and
//! - an on-demand, horizon-parameterized prediction for a single entity.
//!
//! Every collaborator call runs under a bounded timeout so one slow backend
//! cannot stall a pass, and a failure for one entity never aborts the rest.

use crate::alert::{Alert, AlertSink, CooldownAlerter, SpikeAlert};
use crate::anomaly::AnomalyDetector;
use crate::config::MonitorConfig;
use crate::forecast;
use crate::health::{components, HealthRegistry};
use crate::history::HistoryStore;
use crate::models::{
    round2, EvaluationReport, ForecastResult, LogReport, Signal, SignalReport,
};
use crate::observability::{MonitorMetrics, StructuredLogger};
use crate::risk::RiskScorer;
use crate::sources::{coerce_sample, LogSource, RangePoint, TelemetrySource};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::time::{interval, timeout};
use tracing::{debug, info, warn};

/// Forecast steps per hour (one-minute sampling granularity)
const STEPS_PER_HOUR: usize = 60;

/// Inclusive bounds for the on-demand forecast horizon, in hours
pub const MIN_HORIZON_HOURS: u32 = 1;
pub const MAX_HORIZON_HOURS: u32 = 24;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Errors surfaced by the on-demand evaluation path
///
/// Degraded conditions (partial query results, a failing log source) are
/// absorbed into lower-confidence output instead; only an unusable request
/// or a telemetry source with no data at all is an error.
#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error("no metrics found for entity {0}")]
    NoData(String),
    #[error("forecast horizon must be between 1 and 24 hours, got {0}")]
    InvalidHorizon(u32),
}

/// Outcome counts for one periodic sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    /// Entities the telemetry source listed
    pub entities: usize,
    /// Entities whose samples were recorded and evaluated
    pub evaluated: usize,
    /// Entities skipped because a collaborator call failed or timed out
    pub errors: usize,
    /// Spike verdicts across all signals
    pub anomalies: usize,
}

/// Orchestrates evaluation passes over all tracked entities
pub struct EvaluationScheduler {
    telemetry: Arc<dyn TelemetrySource>,
    logs: Arc<dyn LogSource>,
    alerts: Arc<dyn AlertSink>,
    history: Arc<HistoryStore>,
    detector: AnomalyDetector,
    scorer: RiskScorer,
    config: MonitorConfig,
    health: HealthRegistry,
    metrics: MonitorMetrics,
    logger: StructuredLogger,
}

impl EvaluationScheduler {
    /// Wire the engine together from its collaborators and configuration
    ///
    /// When `alert_cooldown_secs` is non-zero the sink is wrapped in a
    /// [`CooldownAlerter`]; otherwise every threshold crossing notifies.
    pub fn new(
        telemetry: Arc<dyn TelemetrySource>,
        logs: Arc<dyn LogSource>,
        alerts: Arc<dyn AlertSink>,
        config: MonitorConfig,
    ) -> Self {
        let alerts: Arc<dyn AlertSink> = match config.alert_cooldown() {
            Some(window) => Arc::new(CooldownAlerter::new(alerts, window)),
            None => alerts,
        };

        Self {
            telemetry,
            logs,
            alerts,
            history: Arc::new(HistoryStore::new(config.history_capacity)),
            detector: AnomalyDetector::new(config.min_samples, config.z_score_threshold),
            scorer: RiskScorer,
            config,
            health: HealthRegistry::new(),
            metrics: MonitorMetrics::new(),
            logger: StructuredLogger::new(),
        }
    }

    /// Shared history store, for ad-hoc window reads by the host
    pub fn history(&self) -> Arc<HistoryStore> {
        Arc::clone(&self.history)
    }

    /// Component health as currently known
    pub fn health_registry(&self) -> HealthRegistry {
        self.health.clone()
    }

    /// Run periodic sweeps until shutdown
    ///
    /// The shutdown signal only stops new ticks from being accepted; an
    /// in-flight sweep always completes, so recorded history is never lost
    /// mid-append.
    pub async fn run(self: Arc<Self>, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
        info!(
            interval_secs = self.config.sweep_interval_secs,
            "Starting evaluation scheduler"
        );
        self.health.set_healthy(components::SCHEDULER).await;

        let mut ticker = interval(self.config.sweep_interval());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let start = Instant::now();
                    let stats = self.sweep().await;
                    self.metrics.observe_sweep_latency(start.elapsed().as_secs_f64());
                    self.logger.log_sweep(
                        stats.entities,
                        stats.evaluated,
                        stats.errors,
                        stats.anomalies,
                        start.elapsed().as_millis() as u64,
                    );
                }
                _ = shutdown.recv() => {
                    info!("Shutting down evaluation scheduler");
                    self.logger.log_shutdown("shutdown signal received");
                    break;
                }
            }
        }
    }

    /// One anomaly-surveillance pass over every known entity
    ///
    /// Also serves as the manual run-now trigger; passes are idempotent
    /// apart from appending the freshly pulled samples.
    pub async fn sweep(&self) -> SweepStats {
        let mut stats = SweepStats::default();

        let entities = match self.with_timeout(self.telemetry.list_entities()).await {
            Ok(entities) => {
                self.health.set_healthy(components::TELEMETRY).await;
                entities
            }
            Err(e) => {
                warn!(error = %e, "Failed to list entities, skipping sweep");
                self.health
                    .set_degraded(components::TELEMETRY, e.to_string())
                    .await;
                self.metrics.inc_collaborator_errors();
                return stats;
            }
        };

        stats.entities = entities.len();
        self.metrics.set_entities_monitored(entities.len() as i64);

        for entity in &entities {
            match self.sweep_entity(entity).await {
                Ok(anomalies) => {
                    stats.evaluated += 1;
                    stats.anomalies += anomalies;
                }
                Err(e) => {
                    stats.errors += 1;
                    self.metrics.inc_collaborator_errors();
                    debug!(entity = %entity, error = %e, "Skipping entity for this pass");
                }
            }
        }

        self.metrics
            .set_series_tracked(self.history.series_count() as i64);
        stats
    }

    /// Record the current sample for one entity and test both signals
    async fn sweep_entity(&self, entity: &str) -> Result<usize> {
        let sample = self.with_timeout(self.telemetry.current_sample(entity)).await?;

        let mut anomalies = 0;
        for (signal, raw) in [
            (Signal::Cpu, &sample.cpu_usage),
            (Signal::Memory, &sample.memory_usage),
        ] {
            let latest = coerce_sample(raw, 0.0);
            let window = self.history.record(entity, signal, raw);
            let verdict = self.detector.evaluate(&window, latest);

            if verdict.is_anomaly {
                anomalies += 1;
                self.metrics.inc_anomalies_detected();
                self.logger.log_anomaly(
                    entity,
                    &signal.to_string(),
                    latest,
                    verdict.baseline_mean,
                    verdict.z_score,
                );
                let alert = Alert::Spike(SpikeAlert {
                    entity: entity.to_string(),
                    signal,
                    current: latest,
                    expected: verdict.baseline_mean,
                    z_score: verdict.z_score,
                });
                self.emit(entity, &alert).await;
            }
        }

        Ok(anomalies)
    }

    /// Forecast one entity's next hours and score the composite risk
    ///
    /// Returns the structured report synchronously and, when the risk
    /// percentage crosses the alert threshold, notifies the sink exactly as
    /// the periodic path would.
    pub async fn predict(
        &self,
        entity: &str,
        horizon_hours: u32,
    ) -> Result<EvaluationReport, EvaluateError> {
        if !(MIN_HORIZON_HOURS..=MAX_HORIZON_HOURS).contains(&horizon_hours) {
            return Err(EvaluateError::InvalidHorizon(horizon_hours));
        }

        let end = Utc::now();
        let start = end - chrono::Duration::hours(horizon_hours as i64);

        let cpu_points = self
            .range_query(&self.config.cpu_range_query, entity, start, end)
            .await;
        let mem_points = self
            .range_query(&self.config.memory_range_query, entity, start, end)
            .await;
        if cpu_points.is_empty() || mem_points.is_empty() {
            return Err(EvaluateError::NoData(entity.to_string()));
        }

        // CPU arrives as a per-second usage rate, memory as bytes
        let cpu_series: Vec<f64> = cpu_points
            .iter()
            .map(|p| coerce_sample(&p.value, 0.0) * 100.0)
            .collect();
        let mem_series: Vec<f64> = mem_points
            .iter()
            .map(|p| coerce_sample(&p.value, 0.0) / BYTES_PER_MIB)
            .collect();
        let (cpu_window, mem_window) = forecast::align(&cpu_series, &mem_series);

        let steps = STEPS_PER_HOUR * horizon_hours as usize;
        let cpu_predictions = forecast::predict(cpu_window, steps, Some(0.0), Some(100.0));
        let mem_predictions = forecast::predict(mem_window, steps, Some(0.0), None);

        let cpu = ForecastResult::new(
            cpu_window.last().copied().unwrap_or(0.0),
            cpu_predictions.last().copied().unwrap_or(0.0),
        );
        let mem = ForecastResult::new(
            mem_window.last().copied().unwrap_or(0.0),
            mem_predictions.last().copied().unwrap_or(0.0),
        );

        let recent_errors = match self
            .with_timeout(self.logs.recent_errors(entity, self.config.log_tail_lines))
            .await
        {
            Ok(count) => {
                self.health.set_healthy(components::LOGS).await;
                count
            }
            Err(e) => {
                warn!(entity = %entity, error = %e, "Log source unavailable, assuming zero recent errors");
                self.health.set_degraded(components::LOGS, e.to_string()).await;
                self.metrics.inc_collaborator_errors();
                0
            }
        };

        let assessment = self
            .scorer
            .score(entity, cpu.predicted, mem.predicted, recent_errors);
        self.metrics.set_last_risk(entity, assessment.total_risk);
        self.metrics.inc_evaluations_completed();
        self.logger.log_risk(&assessment);

        let overall_risk = format!("{} ({:.2}%)", assessment.level, assessment.total_risk);
        if assessment.should_alert() {
            self.emit(entity, &Alert::Risk(assessment)).await;
        }

        Ok(EvaluationReport {
            entity: entity.to_string(),
            prediction_window: format!("next {} hour(s)", horizon_hours),
            cpu: SignalReport {
                current: round2(cpu.current),
                predicted: round2(cpu.predicted),
                trend: cpu.trend,
            },
            memory: SignalReport {
                current: round2(mem.current),
                predicted: round2(mem.predicted),
                trend: mem.trend,
            },
            logs: LogReport { recent_errors },
            overall_risk,
        })
    }

    /// Range query with timeout; degraded results collapse to "no data"
    async fn range_query(
        &self,
        template: &str,
        entity: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<RangePoint> {
        let expr = template.replace("{entity}", entity);
        match self
            .with_timeout(self.telemetry.query_range(&expr, start, end, "1m"))
            .await
        {
            Ok(points) => points,
            Err(e) => {
                warn!(entity = %entity, error = %e, "Range query failed");
                self.health
                    .set_degraded(components::TELEMETRY, e.to_string())
                    .await;
                self.metrics.inc_collaborator_errors();
                Vec::new()
            }
        }
    }

    /// Hand an alert to the sink; delivery failures are logged and dropped
    async fn emit(&self, entity: &str, alert: &Alert) {
        match self.with_timeout(self.alerts.notify(entity, alert)).await {
            Ok(()) => {
                self.metrics.inc_alerts_emitted();
                self.health.set_healthy(components::ALERT_SINK).await;
            }
            Err(e) => {
                warn!(entity = %entity, kind = %alert.kind(), error = %e, "Alert delivery failed");
                self.metrics.inc_alert_failures();
                self.health
                    .set_degraded(components::ALERT_SINK, e.to_string())
                    .await;
            }
        }
    }

    /// Bound a collaborator call so one stalled backend cannot stall a pass
    async fn with_timeout<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match timeout(self.config.collaborator_timeout(), fut).await {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!(
                "collaborator call timed out after {}s",
                self.config.collaborator_timeout_secs
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertKind;
    use crate::models::Trend;
    use crate::sources::CurrentSample;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Telemetry stub: replays scripted per-call current samples and fixed
    /// range-query series
    struct MockTelemetry {
        entities: Vec<String>,
        /// Successive (cpu, memory) samples, one pair per sweep
        samples: Mutex<Vec<(Value, Value)>>,
        call_index: AtomicUsize,
        /// Raw CPU rate fractions returned for CPU range queries
        cpu_range: Vec<f64>,
        /// Raw byte values returned for memory range queries
        mem_range: Vec<f64>,
        fail_entity: Option<String>,
    }

    impl MockTelemetry {
        fn new(entities: &[&str]) -> Self {
            Self {
                entities: entities.iter().map(|e| e.to_string()).collect(),
                samples: Mutex::new(Vec::new()),
                call_index: AtomicUsize::new(0),
                cpu_range: Vec::new(),
                mem_range: Vec::new(),
                fail_entity: None,
            }
        }

        fn with_samples(mut self, samples: Vec<(Value, Value)>) -> Self {
            self.samples = Mutex::new(samples);
            self
        }

        fn with_ranges(mut self, cpu: Vec<f64>, mem: Vec<f64>) -> Self {
            self.cpu_range = cpu;
            self.mem_range = mem;
            self
        }

        fn failing_for(mut self, entity: &str) -> Self {
            self.fail_entity = Some(entity.to_string());
            self
        }
    }

    #[async_trait]
    impl TelemetrySource for MockTelemetry {
        async fn list_entities(&self) -> Result<Vec<String>> {
            Ok(self.entities.clone())
        }

        async fn current_sample(&self, entity: &str) -> Result<CurrentSample> {
            if self.fail_entity.as_deref() == Some(entity) {
                anyhow::bail!("scrape failed for {entity}");
            }
            let index = self.call_index.fetch_add(1, Ordering::SeqCst);
            let samples = self.samples.lock().unwrap();
            let (cpu, mem) = samples
                .get(index.min(samples.len().saturating_sub(1)))
                .cloned()
                .unwrap_or((json!(0.0), json!(0.0)));
            Ok(CurrentSample {
                cpu_usage: cpu,
                memory_usage: mem,
            })
        }

        async fn query_range(
            &self,
            expr: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _step: &str,
        ) -> Result<Vec<RangePoint>> {
            let values = if expr.contains("cpu") {
                &self.cpu_range
            } else {
                &self.mem_range
            };
            Ok(values
                .iter()
                .enumerate()
                .map(|(i, v)| RangePoint {
                    timestamp: i as i64 * 60,
                    value: json!(v),
                })
                .collect())
        }
    }

    struct MockLogs {
        count: u64,
        fail: bool,
    }

    #[async_trait]
    impl LogSource for MockLogs {
        async fn recent_errors(&self, _entity: &str, _tail_lines: u32) -> Result<u64> {
            if self.fail {
                anyhow::bail!("log source unavailable");
            }
            Ok(self.count)
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        alerts: Mutex<Vec<Alert>>,
    }

    impl RecordingSink {
        fn kinds(&self) -> Vec<AlertKind> {
            self.alerts.lock().unwrap().iter().map(|a| a.kind()).collect()
        }
    }

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn notify(&self, _entity: &str, alert: &Alert) -> Result<()> {
            self.alerts.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }

    fn scheduler_with(
        telemetry: MockTelemetry,
        logs: MockLogs,
        sink: Arc<RecordingSink>,
    ) -> EvaluationScheduler {
        EvaluationScheduler::new(
            Arc::new(telemetry),
            Arc::new(logs),
            sink,
            MonitorConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_sweep_detects_cpu_spike_but_not_flat_memory() {
        let samples = vec![
            (json!(10.0), json!(100.0)),
            (json!(12.0), json!(100.0)),
            (json!(11.0), json!(100.0)),
            (json!(13.0), json!(100.0)),
            (json!(90.0), json!(100.0)),
        ];
        let telemetry = MockTelemetry::new(&["web-1"]).with_samples(samples);
        let sink = Arc::new(RecordingSink::default());
        let scheduler = scheduler_with(telemetry, MockLogs { count: 0, fail: false }, sink.clone());

        let mut last = SweepStats::default();
        for _ in 0..5 {
            last = scheduler.sweep().await;
        }

        assert_eq!(last.entities, 1);
        assert_eq!(last.evaluated, 1);
        assert_eq!(last.anomalies, 1);
        assert_eq!(sink.kinds(), vec![AlertKind::CpuSpike]);

        match &sink.alerts.lock().unwrap()[0] {
            Alert::Spike(spike) => {
                assert_eq!(spike.entity, "web-1");
                assert_eq!(spike.signal, Signal::Cpu);
                assert_eq!(spike.current, 90.0);
                assert!(spike.z_score > 3.0);
            }
            other => panic!("expected spike alert, got {other:?}"),
        };
    }

    #[tokio::test]
    async fn test_sweep_continues_past_failing_entity() {
        let telemetry = MockTelemetry::new(&["bad-1", "web-1"])
            .with_samples(vec![(json!(10.0), json!(100.0))])
            .failing_for("bad-1");
        let sink = Arc::new(RecordingSink::default());
        let scheduler = scheduler_with(telemetry, MockLogs { count: 0, fail: false }, sink);

        let stats = scheduler.sweep().await;

        assert_eq!(stats.entities, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.evaluated, 1);
        assert_eq!(scheduler.history().get("web-1", Signal::Cpu), vec![10.0]);
        assert!(scheduler.history().get("bad-1", Signal::Cpu).is_empty());
    }

    #[tokio::test]
    async fn test_sweep_coerces_malformed_samples() {
        let telemetry =
            MockTelemetry::new(&["web-1"]).with_samples(vec![(json!("N/A"), json!(null))]);
        let sink = Arc::new(RecordingSink::default());
        let scheduler = scheduler_with(telemetry, MockLogs { count: 0, fail: false }, sink);

        let stats = scheduler.sweep().await;

        assert_eq!(stats.evaluated, 1);
        assert_eq!(scheduler.history().get("web-1", Signal::Cpu), vec![0.0]);
        assert_eq!(scheduler.history().get("web-1", Signal::Memory), vec![0.0]);
    }

    #[tokio::test]
    async fn test_predict_rejects_bad_horizons() {
        let telemetry = MockTelemetry::new(&["web-1"]);
        let sink = Arc::new(RecordingSink::default());
        let scheduler = scheduler_with(telemetry, MockLogs { count: 0, fail: false }, sink);

        assert!(matches!(
            scheduler.predict("web-1", 0).await,
            Err(EvaluateError::InvalidHorizon(0))
        ));
        assert!(matches!(
            scheduler.predict("web-1", 25).await,
            Err(EvaluateError::InvalidHorizon(25))
        ));
    }

    #[tokio::test]
    async fn test_predict_no_data_is_an_error() {
        let telemetry = MockTelemetry::new(&["web-1"]).with_ranges(Vec::new(), Vec::new());
        let sink = Arc::new(RecordingSink::default());
        let scheduler = scheduler_with(telemetry, MockLogs { count: 0, fail: false }, sink);

        assert!(matches!(
            scheduler.predict("web-1", 1).await,
            Err(EvaluateError::NoData(entity)) if entity == "web-1"
        ));
    }

    #[tokio::test]
    async fn test_predict_builds_report_and_alerts_on_elevated_risk() {
        // CPU rate fractions 0.20..0.28 -> 20%..28%, rising 2%/minute;
        // memory flat at 100 MiB
        let telemetry = MockTelemetry::new(&["web-1"]).with_ranges(
            vec![0.20, 0.22, 0.24, 0.26, 0.28],
            vec![100.0 * BYTES_PER_MIB; 5],
        );
        let sink = Arc::new(RecordingSink::default());
        let scheduler =
            scheduler_with(telemetry, MockLogs { count: 10, fail: false }, sink.clone());

        let report = scheduler.predict("web-1", 1).await.unwrap();

        assert_eq!(report.entity, "web-1");
        assert_eq!(report.prediction_window, "next 1 hour(s)");
        assert_eq!(report.cpu.current, 28.0);
        // The 2%/minute slope saturates the [0, 100] bound inside the hour
        assert_eq!(report.cpu.predicted, 100.0);
        assert_eq!(report.cpu.trend, Trend::Increasing);
        assert_eq!(report.memory.current, 100.0);
        assert_eq!(report.memory.predicted, 100.0);
        assert_eq!(report.memory.trend, Trend::Stable);
        assert_eq!(report.logs.recent_errors, 10);
        // cpu 0.6 + mem 0.3 + logs 0.05 -> 95%
        assert_eq!(report.overall_risk, "CRITICAL (95.00%)");

        assert_eq!(sink.kinds(), vec![AlertKind::RiskThreshold]);
        match &sink.alerts.lock().unwrap()[0] {
            Alert::Risk(assessment) => {
                assert!((assessment.total_risk - 95.0).abs() < 1e-9);
                assert_eq!(assessment.recent_errors, 10);
            }
            other => panic!("expected risk alert, got {other:?}"),
        };
    }

    #[tokio::test]
    async fn test_predict_quiet_entity_reports_normal_without_alert() {
        // Flat 10% CPU, tiny memory, no errors -> well under the threshold
        let telemetry = MockTelemetry::new(&["web-1"])
            .with_ranges(vec![0.10; 10], vec![10.0 * BYTES_PER_MIB; 10]);
        let sink = Arc::new(RecordingSink::default());
        let scheduler =
            scheduler_with(telemetry, MockLogs { count: 0, fail: false }, sink.clone());

        let report = scheduler.predict("web-1", 2).await.unwrap();

        assert_eq!(report.prediction_window, "next 2 hour(s)");
        assert_eq!(report.cpu.trend, Trend::Stable);
        assert!(report.overall_risk.starts_with("NORMAL"));
        assert!(sink.alerts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_predict_failing_log_source_contributes_zero() {
        let telemetry = MockTelemetry::new(&["web-1"])
            .with_ranges(vec![0.50; 10], vec![0.0; 10]);
        let sink = Arc::new(RecordingSink::default());
        let scheduler =
            scheduler_with(telemetry, MockLogs { count: 99, fail: true }, sink.clone());

        let report = scheduler.predict("web-1", 1).await.unwrap();

        assert_eq!(report.logs.recent_errors, 0);
        // cpu 50% -> 30 total, below the alert threshold
        assert!(report.overall_risk.starts_with("NORMAL"));
        assert!(sink.alerts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_predict_aligns_unequal_series() {
        // CPU has 6 points, memory only 4; both must truncate to 4
        let telemetry = MockTelemetry::new(&["web-1"]).with_ranges(
            vec![0.10, 0.20, 0.30, 0.40, 0.50, 0.60],
            vec![100.0 * BYTES_PER_MIB; 4],
        );
        let sink = Arc::new(RecordingSink::default());
        let scheduler = scheduler_with(telemetry, MockLogs { count: 0, fail: false }, sink);

        let report = scheduler.predict("web-1", 1).await.unwrap();

        // Current CPU comes from the truncated window: index 3 -> 40%
        assert_eq!(report.cpu.current, 40.0);
    }

    #[tokio::test]
    async fn test_run_shuts_down_cleanly() {
        let telemetry = MockTelemetry::new(&[]);
        let sink = Arc::new(RecordingSink::default());
        let config = MonitorConfig {
            sweep_interval_secs: 3600,
            ..MonitorConfig::default()
        };
        let scheduler = Arc::new(EvaluationScheduler::new(
            Arc::new(telemetry),
            Arc::new(MockLogs { count: 0, fail: false }),
            sink,
            config,
        ));

        let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
        let handle = tokio::spawn(scheduler.clone().run(shutdown_rx));

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("scheduler did not shut down")
            .unwrap();
    }

    #[tokio::test]
    async fn test_timeout_treated_as_no_data() {
        /// Telemetry that never answers range queries
        struct StalledTelemetry;

        #[async_trait]
        impl TelemetrySource for StalledTelemetry {
            async fn list_entities(&self) -> Result<Vec<String>> {
                Ok(vec!["web-1".to_string()])
            }

            async fn current_sample(&self, _entity: &str) -> Result<CurrentSample> {
                anyhow::bail!("unused")
            }

            async fn query_range(
                &self,
                _expr: &str,
                _start: DateTime<Utc>,
                _end: DateTime<Utc>,
                _step: &str,
            ) -> Result<Vec<RangePoint>> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }

        let config = MonitorConfig {
            collaborator_timeout_secs: 1,
            ..MonitorConfig::default()
        };
        let scheduler = EvaluationScheduler::new(
            Arc::new(StalledTelemetry),
            Arc::new(MockLogs { count: 0, fail: false }),
            Arc::new(RecordingSink::default()),
            config,
        );

        tokio::time::pause();
        let prediction = tokio::spawn(async move { scheduler.predict("web-1", 1).await });
        tokio::time::advance(Duration::from_secs(5)).await;

        assert!(matches!(
            prediction.await.unwrap(),
            Err(EvaluateError::NoData(_))
        ));
    }
}
