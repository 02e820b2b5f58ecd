//! HTTP surface of the service.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::db::Repository;
use crate::sync::{MatchHistorySynchronizer, StalenessGate, SyncQueue};

mod error;
mod routes;

pub use routes::{
    AccountsByGame, GameAccountsResponse, HandleInput, MatchHistoryQuery, MatchHistoryResponse,
    RefreshRequest, SaveAccountsRequest, StatsQuery, StatsResponse,
};

/// Shared data accessible in all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub repo: Repository,
    pub synchronizer: Arc<MatchHistorySynchronizer>,
    pub queue: SyncQueue,
    pub gate: StalenessGate,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/riot/match-history", post(routes::refresh_match_history))
        .route("/profile/:owner_id/stats", get(routes::get_profile_stats))
        .route(
            "/profile/:owner_id/match-history",
            get(routes::get_match_history),
        )
        .route(
            "/profile/:owner_id/game-accounts",
            get(routes::get_game_accounts).post(routes::save_game_accounts),
        )
        .with_state(state)
}
