use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod http;

/// Wire payload for the downstream POST /payments call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorPayment {
    pub correlation_id: String,
    pub amount: f64,
    pub requested_at: String,
}

/// Body of the downstream GET /payments/service-health call.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReading {
    pub failing: bool,
    pub min_response_time: u64,
}

/// Outcome of one downstream POST. `Accepted` and `Rejected` are terminal:
/// the processor has counted the payment and it must be recorded locally.
/// `Failed` covers everything else and is retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Accepted,
    Rejected,
    Failed,
}

impl SendOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SendOutcome::Failed)
    }
}

pub fn classify_status(status: u16) -> SendOutcome {
    if (200..300).contains(&status) {
        SendOutcome::Accepted
    } else if status == 422 {
        SendOutcome::Rejected
    } else {
        SendOutcome::Failed
    }
}

#[async_trait::async_trait]
pub trait ProcessorApi: Send + Sync {
    async fn send_payment(&self, payment: &ProcessorPayment, timeout: Duration) -> SendOutcome;

    async fn check_health(&self, timeout: Duration) -> Result<HealthReading>;
}
