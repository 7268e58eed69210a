//! Core data models for the health monitor

use serde::{Deserialize, Serialize};

/// Numeric signal tracked per entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Cpu,
    Memory,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Cpu => write!(f, "cpu"),
            Signal::Memory => write!(f, "memory"),
        }
    }
}

/// Direction of a forecast relative to the last observation
///
/// There is no decreasing category: anything not growing is reported stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Increasing => write!(f, "increasing"),
            Trend::Stable => write!(f, "stable"),
        }
    }
}

/// Forecast output for one signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Last observed value
    pub current: f64,
    /// Value at the end of the forecast horizon
    pub predicted: f64,
    pub trend: Trend,
}

impl ForecastResult {
    /// Build a result, classifying the trend from the two endpoint values
    pub fn new(current: f64, predicted: f64) -> Self {
        let trend = if predicted > current {
            Trend::Increasing
        } else {
            Trend::Stable
        };
        Self {
            current,
            predicted,
            trend,
        }
    }
}

/// Coarse risk classification derived from the composite risk percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Normal,
    Warning,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Normal => write!(f, "NORMAL"),
            RiskLevel::Warning => write!(f, "WARNING"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Composite risk assessment for one entity
///
/// Immutable once built; consumed by the alert decision and then discarded.
/// Carries the raw inputs alongside the weighted components so a sink can
/// render a complete picture without re-querying anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub entity: String,
    /// Weighted CPU contribution, capped at 0.6
    pub cpu_component: f64,
    /// Weighted memory contribution, capped at 0.3
    pub mem_component: f64,
    /// Weighted log-error contribution, capped at 0.1
    pub log_component: f64,
    /// Composite risk percentage in [0, 100]
    pub total_risk: f64,
    pub level: RiskLevel,
    pub cpu_predicted_pct: f64,
    pub mem_predicted_mb: f64,
    pub recent_errors: u64,
}

/// Per-signal section of an evaluation report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalReport {
    pub current: f64,
    pub predicted: f64,
    pub trend: Trend,
}

/// Log section of an evaluation report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogReport {
    pub recent_errors: u64,
}

/// Structured report returned by an on-demand evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub entity: String,
    /// Human-readable horizon, e.g. "next 2 hour(s)"
    pub prediction_window: String,
    pub cpu: SignalReport,
    pub memory: SignalReport,
    pub logs: LogReport,
    /// "<LEVEL> (<percentage>%)"
    pub overall_risk: String,
}

/// Round to two decimal places for report output
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_classification() {
        assert_eq!(ForecastResult::new(10.0, 12.0).trend, Trend::Increasing);
        assert_eq!(ForecastResult::new(10.0, 10.0).trend, Trend::Stable);
        assert_eq!(ForecastResult::new(10.0, 8.0).trend, Trend::Stable);
    }

    #[test]
    fn test_risk_level_display() {
        assert_eq!(RiskLevel::Normal.to_string(), "NORMAL");
        assert_eq!(RiskLevel::Warning.to_string(), "WARNING");
        assert_eq!(RiskLevel::Critical.to_string(), "CRITICAL");
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Critical > RiskLevel::Warning);
        assert!(RiskLevel::Warning > RiskLevel::Normal);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(60.004), 60.0);
        assert_eq!(round2(60.006), 60.01);
        assert_eq!(round2(27.199_999), 27.2);
    }

    #[test]
    fn test_report_serialization_shape() {
        let report = EvaluationReport {
            entity: "web-1".to_string(),
            prediction_window: "next 1 hour(s)".to_string(),
            cpu: SignalReport {
                current: 28.0,
                predicted: 32.0,
                trend: Trend::Increasing,
            },
            memory: SignalReport {
                current: 100.0,
                predicted: 100.0,
                trend: Trend::Stable,
            },
            logs: LogReport { recent_errors: 3 },
            overall_risk: "NORMAL (49.70%)".to_string(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entity"], "web-1");
        assert_eq!(json["cpu"]["trend"], "increasing");
        assert_eq!(json["memory"]["trend"], "stable");
        assert_eq!(json["logs"]["recent_errors"], 3);
        assert!(json["overall_risk"].as_str().unwrap().starts_with("NORMAL"));
    }
}
