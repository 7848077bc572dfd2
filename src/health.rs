use crate::domain::payment::ProcessorKind;
use crate::processors::ProcessorApi;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const PROBE_INTERVAL: Duration = Duration::from_secs(5);
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Live health hint for one downstream processor. Written by the monitor on
/// each probe and by the dispatcher on send failure; last writer wins. Both
/// fields are hints, so relaxed atomics are enough.
pub struct ProcessorState {
    pub kind: ProcessorKind,
    healthy: AtomicBool,
    min_latency_ms: AtomicU64,
}

impl ProcessorState {
    pub fn new(kind: ProcessorKind) -> Self {
        Self {
            kind,
            healthy: AtomicBool::new(true),
            min_latency_ms: AtomicU64::new(0),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    pub fn min_latency_ms(&self) -> u64 {
        self.min_latency_ms.load(Ordering::Relaxed)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Relaxed);
    }

    /// Applies one successful probe reading. A failed probe goes through
    /// `set_healthy(false)` instead and leaves the latency untouched.
    pub fn apply_probe(&self, failing: bool, min_response_time: u64) {
        self.healthy.store(!failing, Ordering::Relaxed);
        self.min_latency_ms.store(min_response_time, Ordering::Relaxed);
    }
}

pub struct HealthMonitor {
    pub state: Arc<ProcessorState>,
    pub client: Arc<dyn ProcessorApi>,
}

impl HealthMonitor {
    /// Probe loop for one processor. The downstream rate-limits the health
    /// endpoint; the 5 second cadence must not be shortened.
    pub async fn run(self) {
        loop {
            tokio::time::sleep(PROBE_INTERVAL).await;
            self.tick().await;
        }
    }

    async fn tick(&self) {
        match self.client.check_health(PROBE_TIMEOUT).await {
            Ok(reading) => {
                self.state.apply_probe(reading.failing, reading.min_response_time);
            }
            Err(err) => {
                tracing::warn!("{} health probe failed: {}", self.state.kind.name(), err);
                self.state.set_healthy(false);
            }
        }
    }
}
