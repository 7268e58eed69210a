//! Monitor configuration

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

/// Engine configuration, loaded from `MONITOR_`-prefixed environment
/// variables with per-field defaults
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between periodic anomaly sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Samples retained per (entity, signal) series
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Minimum retained samples before anomaly verdicts are attempted
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    /// Standard deviations from baseline that count as a spike
    #[serde(default = "default_z_threshold")]
    pub z_score_threshold: f64,

    /// Per-call timeout for telemetry/log/sink collaborators, in seconds
    #[serde(default = "default_collaborator_timeout")]
    pub collaborator_timeout_secs: u64,

    /// Log lines fetched when counting recent errors
    #[serde(default = "default_log_tail_lines")]
    pub log_tail_lines: u32,

    /// Repeat-alert suppression window in seconds; 0 notifies on every
    /// threshold crossing
    #[serde(default)]
    pub alert_cooldown_secs: u64,

    /// Range-query template for CPU usage; `{entity}` expands to the entity key
    #[serde(default = "default_cpu_range_query")]
    pub cpu_range_query: String,

    /// Range-query template for memory usage; `{entity}` expands to the entity key
    #[serde(default = "default_memory_range_query")]
    pub memory_range_query: String,
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_history_capacity() -> usize {
    20
}

fn default_min_samples() -> usize {
    5
}

fn default_z_threshold() -> f64 {
    3.0
}

fn default_collaborator_timeout() -> u64 {
    5
}

fn default_log_tail_lines() -> u32 {
    100
}

fn default_cpu_range_query() -> String {
    r#"rate(container_cpu_usage_seconds_total{name="{entity}"}[1m])"#.to_string()
}

fn default_memory_range_query() -> String {
    r#"container_memory_usage_bytes{name="{entity}"}"#.to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            history_capacity: default_history_capacity(),
            min_samples: default_min_samples(),
            z_score_threshold: default_z_threshold(),
            collaborator_timeout_secs: default_collaborator_timeout(),
            log_tail_lines: default_log_tail_lines(),
            alert_cooldown_secs: 0,
            cpu_range_query: default_cpu_range_query(),
            memory_range_query: default_memory_range_query(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("MONITOR"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs)
    }

    /// Cooldown window, or None when every crossing should notify
    pub fn alert_cooldown(&self) -> Option<Duration> {
        if self.alert_cooldown_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.alert_cooldown_secs))
        }
    }
}
