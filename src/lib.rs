pub mod config;
pub mod dispatcher;
pub mod domain {
    pub mod payment;
}
pub mod health;
pub mod http {
    pub mod handlers {
        pub mod payments;
    }
}
pub mod processors;
pub mod queue;
pub mod repo {
    pub mod ledger_repo;
}

#[derive(Clone)]
pub struct AppState {
    pub intake: queue::IntakeSender,
    pub ledger: repo::ledger_repo::LedgerRepo,
}
