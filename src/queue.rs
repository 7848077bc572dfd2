use crate::domain::payment::PaymentRequest;
use tokio::sync::mpsc;

/// Unbounded FIFO between the HTTP handlers and the dispatcher. Entries are
/// not persisted; whatever is still queued at shutdown is lost.
pub fn intake_queue() -> (IntakeSender, IntakeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (IntakeSender { tx }, IntakeReceiver { rx })
}

#[derive(Clone)]
pub struct IntakeSender {
    tx: mpsc::UnboundedSender<PaymentRequest>,
}

impl IntakeSender {
    /// Appends at the tail. Returns false only when the dispatcher is gone.
    pub fn enqueue(&self, request: PaymentRequest) -> bool {
        self.tx.send(request).is_ok()
    }
}

pub struct IntakeReceiver {
    rx: mpsc::UnboundedReceiver<PaymentRequest>,
}

impl IntakeReceiver {
    pub async fn recv(&mut self) -> Option<PaymentRequest> {
        self.rx.recv().await
    }
}
