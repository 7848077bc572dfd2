use crate::domain::payment::{cents_to_amount, PaymentRecord, PaymentRequest};
use crate::health::ProcessorState;
use crate::processors::{ProcessorApi, ProcessorPayment, SendOutcome};
use crate::queue::{IntakeReceiver, IntakeSender};
use crate::repo::ledger_repo::LedgerRepo;
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Duration;

const BOTH_DOWN_BACKOFF: Duration = Duration::from_millis(10);
const SEND_TIMEOUT_MARGIN_MS: u64 = 500;
const COMMIT_ATTEMPTS: u32 = 3;
const COMMIT_BACKOFF: Duration = Duration::from_millis(50);

pub struct ProcessorRoute {
    pub state: Arc<ProcessorState>,
    pub client: Arc<dyn ProcessorApi>,
}

/// Single consumer of the intake queue. Tries processors in fixed preference
/// order (default first, fallback second) and requeues at the tail when no
/// attempted processor returns a terminal response.
pub struct Dispatcher {
    pub queue: IntakeReceiver,
    pub requeue: IntakeSender,
    pub routes: [ProcessorRoute; 2],
    pub ledger: LedgerRepo,
}

enum AttemptOutcome {
    Settled,
    Failed,
}

impl Dispatcher {
    pub async fn run(mut self) {
        loop {
            // Hold off dequeueing while both processors are down; the queue
            // keeps order and the handlers keep accepting.
            if self.routes.iter().all(|r| !r.state.is_healthy()) {
                tokio::time::sleep(BOTH_DOWN_BACKOFF).await;
                continue;
            }

            let Some(request) = self.queue.recv().await else {
                break;
            };

            if !self.attempt_routes(&request).await && !self.requeue.enqueue(request) {
                break;
            }
        }
        tracing::info!("dispatcher stopped");
    }

    async fn attempt_routes(&self, request: &PaymentRequest) -> bool {
        for route in &self.routes {
            if !route.state.is_healthy() {
                continue;
            }
            match self.attempt(route, request).await {
                AttemptOutcome::Settled => return true,
                AttemptOutcome::Failed => {
                    // Negative hint only; the next health probe is authoritative.
                    route.state.set_healthy(false);
                    tracing::warn!(
                        "send via {} failed for {}",
                        route.state.kind.name(),
                        request.correlation_id
                    );
                }
            }
        }
        false
    }

    async fn attempt(&self, route: &ProcessorRoute, request: &PaymentRequest) -> AttemptOutcome {
        let pace_ms = route.state.min_latency_ms();
        if pace_ms > 0 {
            tokio::time::sleep(Duration::from_millis(pace_ms)).await;
        }

        // Stamped at dispatch, not intake: the downstream scores against the
        // timestamp it receives.
        let requested_at = Utc::now();
        let payload = ProcessorPayment {
            correlation_id: request.correlation_id.clone(),
            amount: cents_to_amount(request.amount_cents),
            requested_at: requested_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let timeout = Duration::from_millis(pace_ms + SEND_TIMEOUT_MARGIN_MS);

        match route.client.send_payment(&payload, timeout).await {
            SendOutcome::Accepted | SendOutcome::Rejected => {
                let record = PaymentRecord {
                    correlation_id: request.correlation_id.clone(),
                    amount_cents: request.amount_cents,
                    requested_at_ms: requested_at.timestamp_millis(),
                    processor: route.state.kind,
                };
                self.commit_with_retry(&record).await;
                AttemptOutcome::Settled
            }
            SendOutcome::Failed => AttemptOutcome::Failed,
        }
    }

    /// The processor has already counted the payment at this point, so a
    /// commit failure must not requeue it: re-posting would double-count.
    async fn commit_with_retry(&self, record: &PaymentRecord) {
        for attempt in 1..=COMMIT_ATTEMPTS {
            match self.ledger.insert(record).await {
                Ok(()) => return,
                Err(err) if attempt < COMMIT_ATTEMPTS => {
                    tracing::warn!(
                        "ledger insert for {} failed (attempt {}): {:#}",
                        record.correlation_id,
                        attempt,
                        err
                    );
                    tokio::time::sleep(COMMIT_BACKOFF * attempt).await;
                }
                Err(err) => {
                    tracing::error!(
                        "dropping settled payment {}: {:#}",
                        record.correlation_id,
                        err
                    );
                }
            }
        }
    }
}
