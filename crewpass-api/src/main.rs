use std::net::SocketAddr;
use std::sync::Arc;

use crewpass_api::{app, AppState};
use crewpass_core::engine::VoucherEngine;
use crewpass_store::{DbClient, PgVoucherStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "crewpass_api=debug,crewpass_core=debug,crewpass_store=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = crewpass_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting CrewPass API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .expect("Failed to connect to database");
    db.migrate().await.expect("Failed to run migrations");

    let store = Arc::new(PgVoucherStore::new(db.pool.clone()));
    let engine = VoucherEngine::new(store, config.assignment.rules());

    let app = app(AppState { engine });

    tracing::info!("Available endpoints:");
    tracing::info!("  POST /api/check - Check if vouchers exist");
    tracing::info!("  POST /api/generate - Generate new vouchers");
    tracing::info!("  GET /api/health - Health check");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
