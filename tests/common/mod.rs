#![allow(dead_code)]

use anyhow::Result;
use intake_gateway::dispatcher::{Dispatcher, ProcessorRoute};
use intake_gateway::domain::payment::{PaymentRequest, ProcessorKind, SummaryTotals};
use intake_gateway::health::ProcessorState;
use intake_gateway::processors::{HealthReading, ProcessorApi, ProcessorPayment, SendOutcome};
use intake_gateway::queue::{intake_queue, IntakeSender};
use intake_gateway::repo::ledger_repo::{init_schema, LedgerRepo};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Processor double that replays a scripted prefix of outcomes, then keeps
/// answering with a fixed outcome. Captures every payload it was sent.
pub struct ScriptedProcessor {
    script: Mutex<VecDeque<SendOutcome>>,
    then: SendOutcome,
    sent: Mutex<Vec<ProcessorPayment>>,
}

impl ScriptedProcessor {
    pub fn always(outcome: SendOutcome) -> Arc<Self> {
        Self::sequence(vec![], outcome)
    }

    pub fn sequence(script: Vec<SendOutcome>, then: SendOutcome) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            then,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<ProcessorPayment> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ProcessorApi for ScriptedProcessor {
    async fn send_payment(&self, payment: &ProcessorPayment, _timeout: Duration) -> SendOutcome {
        self.sent.lock().unwrap().push(payment.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.then)
    }

    async fn check_health(&self, _timeout: Duration) -> Result<HealthReading> {
        Ok(HealthReading {
            failing: false,
            min_response_time: 0,
        })
    }
}

pub async fn mem_pool() -> SqlitePool {
    // One connection, or each pool checkout would see a fresh in-memory db.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    init_schema(&pool).await.expect("schema");
    pool
}

pub async fn mem_ledger() -> LedgerRepo {
    LedgerRepo {
        own: Some(mem_pool().await),
        peer: None,
    }
}

pub struct Harness {
    pub intake: IntakeSender,
    pub default_state: Arc<ProcessorState>,
    pub fallback_state: Arc<ProcessorState>,
    pub ledger: LedgerRepo,
}

impl Harness {
    pub fn enqueue(&self, correlation_id: &str, amount_cents: i64) {
        assert!(self.intake.enqueue(PaymentRequest {
            correlation_id: correlation_id.to_string(),
            amount_cents,
        }));
    }
}

pub async fn spawn_dispatcher(
    default: Arc<ScriptedProcessor>,
    fallback: Arc<ScriptedProcessor>,
) -> Harness {
    let ledger = mem_ledger().await;
    let (intake, queue_rx) = intake_queue();
    let default_state = Arc::new(ProcessorState::new(ProcessorKind::Default));
    let fallback_state = Arc::new(ProcessorState::new(ProcessorKind::Fallback));

    let dispatcher = Dispatcher {
        queue: queue_rx,
        requeue: intake.clone(),
        routes: [
            ProcessorRoute {
                state: default_state.clone(),
                client: default,
            },
            ProcessorRoute {
                state: fallback_state.clone(),
                client: fallback,
            },
        ],
        ledger: ledger.clone(),
    };
    tokio::spawn(dispatcher.run());

    Harness {
        intake,
        default_state,
        fallback_state,
        ledger,
    }
}

pub async fn wait_for_settled(ledger: &LedgerRepo, expected: i64) -> SummaryTotals {
    for _ in 0..300 {
        let totals = ledger.summary(0, i64::MAX).await;
        if totals.default.requests + totals.fallback.requests >= expected {
            return totals;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {expected} settled payments");
}
