//! Statistical spike detection
//!
//! Flags the latest sample of a series as anomalous when it sits more than a
//! threshold number of standard deviations from the rolling baseline. Run
//! independently per signal, so one sweep can yield separate CPU and memory
//! verdicts for the same entity.

/// Default minimum retained samples before a verdict is attempted
pub const DEFAULT_MIN_SAMPLES: usize = 5;

/// Default z-score threshold (3 sigma)
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Verdict for one signal evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyVerdict {
    pub is_anomaly: bool,
    /// Standard deviations between the latest sample and the baseline mean
    pub z_score: f64,
    /// Mean of the baseline the latest sample was tested against
    pub baseline_mean: f64,
}

impl AnomalyVerdict {
    /// Quiet verdict used when there is not enough history to judge
    fn quiet() -> Self {
        Self {
            is_anomaly: false,
            z_score: 0.0,
            baseline_mean: 0.0,
        }
    }
}

/// Rolling z-score spike detector
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    /// Minimum retained samples (latest included) before judging
    pub min_samples: usize,
    /// Standard deviations from baseline that count as a spike
    pub z_threshold: f64,
}

impl AnomalyDetector {
    pub fn new(min_samples: usize, z_threshold: f64) -> Self {
        Self {
            min_samples,
            z_threshold,
        }
    }

    /// Evaluate the latest sample against its retained window
    ///
    /// `window` is the series ending with `latest`, exactly as returned by
    /// `HistoryStore::record`. Baseline statistics cover the samples
    /// preceding the latest observation, so a spike cannot inflate its own
    /// baseline; non-finite entries are excluded rather than failing. Below
    /// `min_samples` the verdict is always quiet, and a flat baseline counts
    /// as one standard deviation so constant series never divide by zero.
    pub fn evaluate(&self, window: &[f64], latest: f64) -> AnomalyVerdict {
        if window.is_empty() || window.len() < self.min_samples {
            return AnomalyVerdict::quiet();
        }

        let baseline: Vec<f64> = window[..window.len() - 1]
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        if baseline.is_empty() {
            return AnomalyVerdict::quiet();
        }

        let mean = baseline.iter().sum::<f64>() / baseline.len() as f64;
        let std_dev = sample_std_dev(&baseline, mean);
        let std_dev = if std_dev < f64::EPSILON { 1.0 } else { std_dev };

        let z_score = (latest - mean).abs() / std_dev;
        AnomalyVerdict {
            is_anomaly: z_score > self.z_threshold,
            z_score,
            baseline_mean: mean,
        }
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SAMPLES, DEFAULT_Z_THRESHOLD)
    }
}

/// Sample standard deviation with Bessel's correction
fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}
