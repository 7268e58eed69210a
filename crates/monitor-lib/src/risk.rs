//! Multi-signal risk fusion
//!
//! Combines predicted CPU, predicted memory and recent log errors into a
//! single 0-100 risk percentage with a coarse level classification. The
//! scorer is stateless: every call is independent and ignores prior levels.

use crate::models::{RiskAssessment, RiskLevel};

/// Predicted CPU utilization contributes up to 60% of total risk
pub const CPU_WEIGHT: f64 = 0.6;

/// Predicted memory contributes up to 30% of total risk
///
/// Memory in MB is compared against the same 0-100 scale as CPU percent
/// rather than a calibrated ceiling. Deliberately kept; see DESIGN.md before
/// tuning.
pub const MEM_WEIGHT: f64 = 0.3;

/// Recent log errors contribute up to 10% of total risk
pub const LOG_WEIGHT: f64 = 0.1;

/// Error-line count at which the log component saturates
pub const LOG_SATURATION: f64 = 20.0;

/// Risk percentage above which the alert sink is notified
pub const ALERT_THRESHOLD: f64 = 50.0;

/// Stateless weighted risk scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer;

impl RiskScorer {
    /// Fuse the three signals into an assessment for one entity
    pub fn score(
        &self,
        entity: &str,
        cpu_predicted_pct: f64,
        mem_predicted_mb: f64,
        recent_errors: u64,
    ) -> RiskAssessment {
        let cpu_component = (cpu_predicted_pct / 100.0 * CPU_WEIGHT).min(CPU_WEIGHT);
        let mem_component = (mem_predicted_mb / 100.0 * MEM_WEIGHT).min(MEM_WEIGHT);
        let log_component = (recent_errors as f64 / LOG_SATURATION * LOG_WEIGHT).min(LOG_WEIGHT);
        let total_risk = (cpu_component + mem_component + log_component) * 100.0;

        RiskAssessment {
            entity: entity.to_string(),
            cpu_component,
            mem_component,
            log_component,
            total_risk,
            level: classify(total_risk),
            cpu_predicted_pct,
            mem_predicted_mb,
            recent_errors,
        }
    }
}

/// First match wins: CRITICAL above 80, WARNING above 50, NORMAL otherwise
///
/// Both comparisons are strict, so exactly 50 is still NORMAL and exactly 80
/// is still WARNING.
pub fn classify(total_risk: f64) -> RiskLevel {
    if total_risk > 80.0 {
        RiskLevel::Critical
    } else if total_risk > 50.0 {
        RiskLevel::Warning
    } else {
        RiskLevel::Normal
    }
}

impl RiskAssessment {
    /// Whether this assessment warrants notifying the alert sink
    pub fn should_alert(&self) -> bool {
        self.total_risk > ALERT_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturated_cpu_alone_is_warning() {
        let assessment = RiskScorer.score("web-1", 100.0, 0.0, 0);

        assert!((assessment.total_risk - 60.0).abs() < 1e-9);
        assert_eq!(assessment.level, RiskLevel::Warning);
        assert!(assessment.should_alert());
    }

    #[test]
    fn test_components_saturate_at_their_caps() {
        let assessment = RiskScorer.score("web-1", 250.0, 1000.0, 100);

        assert!((assessment.cpu_component - 0.6).abs() < 1e-9);
        assert!((assessment.mem_component - 0.3).abs() < 1e-9);
        assert!((assessment.log_component - 0.1).abs() < 1e-9);
        assert!((assessment.total_risk - 100.0).abs() < 1e-9);
        assert_eq!(assessment.level, RiskLevel::Critical);
    }

    #[test]
    fn test_level_boundaries_are_strict() {
        assert_eq!(classify(50.0), RiskLevel::Normal);
        assert_eq!(classify(50.0001), RiskLevel::Warning);
        assert_eq!(classify(80.0), RiskLevel::Warning);
        assert_eq!(classify(80.0001), RiskLevel::Critical);
        assert_eq!(classify(0.0), RiskLevel::Normal);
        assert_eq!(classify(100.0), RiskLevel::Critical);
    }

    #[test]
    fn test_quiet_inputs_score_normal() {
        let assessment = RiskScorer.score("web-1", 0.0, 0.0, 0);

        assert_eq!(assessment.total_risk, 0.0);
        assert_eq!(assessment.level, RiskLevel::Normal);
        assert!(!assessment.should_alert());
    }

    #[test]
    fn test_monotonic_in_each_input() {
        let scorer = RiskScorer;
        let base = scorer.score("web-1", 40.0, 50.0, 5).total_risk;

        for cpu in [41.0, 60.0, 100.0, 500.0] {
            assert!(scorer.score("web-1", cpu, 50.0, 5).total_risk >= base);
        }
        for mem in [51.0, 80.0, 100.0, 10_000.0] {
            assert!(scorer.score("web-1", 40.0, mem, 5).total_risk >= base);
        }
        for errors in [6, 10, 20, 500] {
            assert!(scorer.score("web-1", 40.0, 50.0, errors).total_risk >= base);
        }
    }

    #[test]
    fn test_log_component_scaling() {
        let assessment = RiskScorer.score("web-1", 0.0, 0.0, 10);

        // 10 of 20 errors -> half of the 0.1 cap
        assert!((assessment.log_component - 0.05).abs() < 1e-9);
        assert!((assessment.total_risk - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_assessment_carries_raw_inputs() {
        let assessment = RiskScorer.score("db-1", 37.5, 420.0, 7);

        assert_eq!(assessment.entity, "db-1");
        assert_eq!(assessment.cpu_predicted_pct, 37.5);
        assert_eq!(assessment.mem_predicted_mb, 420.0);
        assert_eq!(assessment.recent_errors, 7);
    }
}
