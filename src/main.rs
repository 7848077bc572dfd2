use axum::routing::{get, post};
use axum::Router;
use intake_gateway::config::AppConfig;
use intake_gateway::dispatcher::{Dispatcher, ProcessorRoute};
use intake_gateway::domain::payment::ProcessorKind;
use intake_gateway::health::{HealthMonitor, ProcessorState};
use intake_gateway::processors::http::HttpProcessor;
use intake_gateway::processors::ProcessorApi;
use intake_gateway::queue::intake_queue;
use intake_gateway::repo::ledger_repo::LedgerRepo;
use intake_gateway::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let ledger = LedgerRepo::open(&cfg.own_db_path, &cfg.peer_db_path).await?;

    let client = reqwest::Client::new();
    let default_state = Arc::new(ProcessorState::new(ProcessorKind::Default));
    let fallback_state = Arc::new(ProcessorState::new(ProcessorKind::Fallback));
    let default_client: Arc<dyn ProcessorApi> = Arc::new(HttpProcessor {
        base_url: cfg.processor_default_url.clone(),
        client: client.clone(),
    });
    let fallback_client: Arc<dyn ProcessorApi> = Arc::new(HttpProcessor {
        base_url: cfg.processor_fallback_url.clone(),
        client,
    });

    tokio::spawn(
        HealthMonitor {
            state: default_state.clone(),
            client: default_client.clone(),
        }
        .run(),
    );
    tokio::spawn(
        HealthMonitor {
            state: fallback_state.clone(),
            client: fallback_client.clone(),
        }
        .run(),
    );

    let (intake, queue_rx) = intake_queue();
    let dispatcher = Dispatcher {
        queue: queue_rx,
        requeue: intake.clone(),
        routes: [
            ProcessorRoute {
                state: default_state,
                client: default_client,
            },
            ProcessorRoute {
                state: fallback_state,
                client: fallback_client,
            },
        ],
        ledger: ledger.clone(),
    };
    tokio::spawn(dispatcher.run());

    let state = AppState { intake, ledger };

    let app = Router::new()
        .route("/health", get(intake_gateway::http::handlers::payments::health))
        .route("/payments", post(intake_gateway::http::handlers::payments::create_payment))
        .route(
            "/payments-summary",
            get(intake_gateway::http::handlers::payments::payments_summary),
        )
        .route(
            "/purge-payments",
            post(intake_gateway::http::handlers::payments::purge_payments),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("backend {} listening on {}", cfg.backend_id, cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
