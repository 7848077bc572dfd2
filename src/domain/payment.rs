use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorKind {
    Default,
    Fallback,
}

impl ProcessorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProcessorKind::Default => "default",
            ProcessorKind::Fallback => "fallback",
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            ProcessorKind::Default => 0,
            ProcessorKind::Fallback => 1,
        }
    }

    pub fn from_i64(value: i64) -> Self {
        if value == 1 {
            ProcessorKind::Fallback
        } else {
            ProcessorKind::Default
        }
    }
}

/// Intake payload as posted by the client. Fields are optional so that
/// shape errors surface as validation failures, not deserialization errors.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub correlation_id: Option<String>,
    pub amount: Option<f64>,
}

/// In-flight message on the intake queue. The dispatch timestamp is stamped
/// immediately before the downstream POST, not here.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub correlation_id: String,
    pub amount_cents: i64,
}

#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub correlation_id: String,
    pub amount_cents: i64,
    pub requested_at_ms: i64,
    pub processor: ProcessorKind,
}

/// Converts a decimal amount into cents. Rejects non-finite, non-positive
/// and sub-cent values.
pub fn amount_to_cents(amount: f64) -> Option<i64> {
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }
    let cents = (amount * 100.0).round();
    if cents < 1.0 || cents > i64::MAX as f64 {
        return None;
    }
    Some(cents as i64)
}

pub fn cents_to_amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketTotals {
    pub requests: i64,
    pub amount_cents: i64,
}

impl BucketTotals {
    pub fn add(&mut self, other: BucketTotals) {
        self.requests += other.requests;
        self.amount_cents += other.amount_cents;
    }
}

/// Per-shard or merged aggregation result, kept in cents until the edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryTotals {
    pub default: BucketTotals,
    pub fallback: BucketTotals,
}

impl SummaryTotals {
    pub fn merge(mut self, other: SummaryTotals) -> SummaryTotals {
        self.default.add(other.default);
        self.fallback.add(other.fallback);
        self
    }
}

impl From<SummaryTotals> for PaymentsSummary {
    fn from(totals: SummaryTotals) -> Self {
        PaymentsSummary {
            default: ProcessorTotals {
                total_requests: totals.default.requests,
                total_amount: cents_to_amount(totals.default.amount_cents),
            },
            fallback: ProcessorTotals {
                total_requests: totals.fallback.requests,
                total_amount: cents_to_amount(totals.fallback.amount_cents),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorTotals {
    pub total_requests: i64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PaymentsSummary {
    pub default: ProcessorTotals,
    pub fallback: ProcessorTotals,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

pub fn err(code: &str, message: &str) -> ErrorEnvelope {
    ErrorEnvelope {
        error: ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
        },
    }
}
