use std::sync::Arc;

use campus_arena::{
    api::{self, AppState},
    config::Config,
    db::Repository,
    error::AppError,
    logging,
    riot::RiotClient,
    sync::{MatchHistorySynchronizer, Pacing, StalenessGate, SyncWorker},
};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    logging::init()?;

    info!("🎮 Starting...");

    let config = Config::from_env()?;

    let repo = Repository::connect(&config.database_url).await?;
    let riot = RiotClient::new(
        config.riot_api_key.clone(),
        config.riot_base_url.clone(),
        config.riot_rate_limit_per_second,
        config.riot_request_timeout,
    )?;
    info!(base_url = riot.base_url(), "🌍 Riot client ready");

    let synchronizer = Arc::new(MatchHistorySynchronizer::new(
        Arc::new(riot),
        Arc::new(repo.clone()),
        Pacing::FixedDelay(config.match_fetch_delay),
    ));

    let (worker, queue) = SyncWorker::new(synchronizer.clone(), config.sync_queue_capacity);
    let worker = worker.start();

    let state = AppState {
        repo,
        synchronizer,
        queue,
        gate: StalenessGate::new(config.stats_freshness),
    };

    let listener = TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    info!(port = config.http_port, "🌐 HTTP server listening");

    let served = axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    worker.abort();

    if let Err(e) = &served {
        error!(error = %e, "🌐 ❌ HTTP server stopped unexpectedly");
    }
    info!("👋 Shutting down");

    Ok(served?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "❌ Unable to listen for shutdown signal");
    }
}
