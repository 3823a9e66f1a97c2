mod config;

use crate::config::AppConfig;
use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wager_api::{app, AppState};
use wager_services::{AnalyticsService, SettlementService};
use wager_store::{BetStore, DatabaseConnection};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wager_rs=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Wager-RS Betting Ledger");

    // Load configuration
    let cfg = AppConfig::new()?;
    info!("✅ Configuration loaded successfully");
    info!("📊 Database: {}", cfg.database_url());
    info!("🌐 Server will bind to: {}", cfg.server_addr());

    // Database
    let connection =
        DatabaseConnection::new(cfg.database_url(), cfg.database.max_connections).await?;
    connection.run_migrations().await?;
    if !connection.health_check().await? {
        warn!("⚠️ Database health check did not return 1");
    }

    // Services
    let store = Arc::new(BetStore::new(connection.pool().clone()));
    let analytics = Arc::new(AnalyticsService::new(
        Arc::clone(&store),
        cfg.metrics_config(),
    ));
    let settlement = Arc::new(SettlementService::new(Arc::clone(&store)));

    // Background refresh of the unfiltered snapshot
    let shutdown = CancellationToken::new();
    let refresher = Arc::clone(&analytics).spawn_periodic(
        Duration::from_secs(cfg.analytics.refresh_interval_seconds),
        shutdown.clone(),
    );

    let state = AppState {
        store,
        analytics,
        settlement,
    };

    let listener = TcpListener::bind(cfg.server_addr()).await?;
    info!("✅ All services started successfully");
    info!("⌨️  Press Ctrl+C to stop");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("👋 Shutting down gracefully");
    shutdown.cancel();
    refresher.await.ok();

    Ok(())
}
