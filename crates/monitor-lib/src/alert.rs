//! Alert payloads and emission
//!
//! The engine hands threshold decisions to an [`AlertSink`]; physical
//! delivery (email, webhook, message queue) is the host's concern and is
//! fire-and-forget from the engine's point of view. [`CooldownAlerter`] is an
//! opt-in wrapper that suppresses repeats; without it every crossing
//! notifies again.

use crate::models::{RiskAssessment, Signal};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

/// Alert classification for routing and suppression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    CpuSpike,
    MemorySpike,
    RiskThreshold,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::CpuSpike => write!(f, "CpuSpike"),
            AlertKind::MemorySpike => write!(f, "MemorySpike"),
            AlertKind::RiskThreshold => write!(f, "RiskThreshold"),
        }
    }
}

/// Spike alert emitted by the periodic anomaly sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeAlert {
    pub entity: String,
    pub signal: Signal,
    /// Sample that triggered the spike
    pub current: f64,
    /// Baseline mean it was tested against
    pub expected: f64,
    pub z_score: f64,
}

/// Payload handed to the sink
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Alert {
    Spike(SpikeAlert),
    Risk(RiskAssessment),
}

impl Alert {
    /// Entity the alert concerns
    pub fn entity(&self) -> &str {
        match self {
            Alert::Spike(spike) => &spike.entity,
            Alert::Risk(assessment) => &assessment.entity,
        }
    }

    pub fn kind(&self) -> AlertKind {
        match self {
            Alert::Spike(spike) => match spike.signal {
                Signal::Cpu => AlertKind::CpuSpike,
                Signal::Memory => AlertKind::MemorySpike,
            },
            Alert::Risk(_) => AlertKind::RiskThreshold,
        }
    }
}

/// Boundary the engine notifies when thresholds are crossed
///
/// Fire-and-forget: the engine logs delivery failures and moves on. It never
/// retries, and a failed delivery never aborts an evaluation pass.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn notify(&self, entity: &str, alert: &Alert) -> Result<()>;
}

/// Suppresses repeat alerts for the same (entity, kind) within a window
///
/// Opt-in: the stock pipeline re-notifies on every threshold crossing, and
/// installing this wrapper is a deliberate behavior change selected through
/// configuration. Suppression starts only after a successful delivery, so a
/// failed send does not open a silent window.
pub struct CooldownAlerter {
    inner: Arc<dyn AlertSink>,
    window: Duration,
    recent: RwLock<HashMap<(String, AlertKind), Instant>>,
}

impl CooldownAlerter {
    pub fn new(inner: Arc<dyn AlertSink>, window: Duration) -> Self {
        Self {
            inner,
            window,
            recent: RwLock::new(HashMap::new()),
        }
    }

    fn should_suppress(&self, entity: &str, kind: AlertKind) -> bool {
        let recent = self.recent.read().unwrap();
        match recent.get(&(entity.to_string(), kind)) {
            Some(last) => last.elapsed() < self.window,
            None => false,
        }
    }

    fn record(&self, entity: &str, kind: AlertKind) {
        let mut recent = self.recent.write().unwrap();
        recent.insert((entity.to_string(), kind), Instant::now());
        recent.retain(|_, last| last.elapsed() < self.window);
    }
}

#[async_trait]
impl AlertSink for CooldownAlerter {
    async fn notify(&self, entity: &str, alert: &Alert) -> Result<()> {
        let kind = alert.kind();
        if self.should_suppress(entity, kind) {
            debug!(entity = %entity, kind = %kind, "Alert suppressed within cooldown window");
            return Ok(());
        }

        self.inner.notify(entity, alert).await?;
        self.record(entity, kind);
        Ok(())
    }
}
