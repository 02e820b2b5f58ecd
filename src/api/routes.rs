use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use super::AppState;
use crate::db::{Game, LinkedGameAccount, MatchSummary, PlayerStatsRecord};
use crate::error::AppError;
use crate::sync::{MATCH_WINDOW, SyncJob, SyncOutcome};

const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub tag_line: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub success: bool,
    pub stats: Option<PlayerStatsRecord>,
    pub refresh_scheduled: bool,
}

/// `limit` is read leniently: missing, zero or unparsable means the default.
#[derive(Debug, Default, Deserialize)]
pub struct MatchHistoryQuery {
    pub limit: Option<String>,
}

impl MatchHistoryQuery {
    fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|&limit| limit > 0)
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .min(MATCH_WINDOW)
    }
}

#[derive(Debug, Serialize)]
pub struct MatchHistoryResponse {
    pub success: bool,
    pub matches: Vec<MatchSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleInput {
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub tag_line: String,
}

impl HandleInput {
    fn is_blank(&self) -> bool {
        self.game_name.trim().is_empty() && self.tag_line.trim().is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SaveAccountsRequest {
    pub league: Option<HandleInput>,
    pub valorant: Option<HandleInput>,
}

#[derive(Debug, Default, Serialize)]
pub struct AccountsByGame {
    pub league: Option<LinkedGameAccount>,
    pub valorant: Option<LinkedGameAccount>,
}

impl From<Vec<LinkedGameAccount>> for AccountsByGame {
    fn from(accounts: Vec<LinkedGameAccount>) -> Self {
        let mut by_game = Self::default();
        for account in accounts {
            match account.game {
                Game::League => by_game.league = Some(account),
                Game::Valorant => by_game.valorant = Some(account),
            }
        }
        by_game
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAccountsResponse {
    pub success: bool,
    pub accounts: AccountsByGame,
    pub refresh_scheduled: bool,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Explicit refresh: runs the synchronization inline and reports its result.
pub async fn refresh_match_history(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> (StatusCode, Json<SyncOutcome>) {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            let err = AppError::InvalidInput(rejection.body_text());
            return (err.status_code(), Json(SyncOutcome::failure(&err)));
        }
    };

    info!(
        owner_id = body.owner_id,
        riot_id = %format!("{}#{}", body.game_name, body.tag_line),
        "🔄 Manual update requested"
    );

    let result = state
        .synchronizer
        .try_synchronize(&body.owner_id, &body.game_name, &body.tag_line)
        .await;

    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.source.status_code(),
    };

    (status, Json(result.into()))
}

/// Stored stats, plus a background refresh when they are stale.
#[instrument(skip(state, query))]
pub async fn get_profile_stats(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<StatsResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let stats = state.repo.get_stats_record(&owner_id, Game::League).await?;
    let (current, force) = (stats.as_ref(), query.force_refresh);
    let refresh_scheduled = schedule_if_stale(&state, &owner_id, current, force).await?;

    Ok(Json(StatsResponse {
        success: true,
        stats,
        refresh_scheduled,
    }))
}

pub async fn get_match_history(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
    Query(query): Query<MatchHistoryQuery>,
) -> Result<Json<MatchHistoryResponse>, AppError> {
    let limit = query.limit();

    let matches = state
        .repo
        .get_stats_record(&owner_id, Game::League)
        .await?
        .map(|record| record.match_summaries.into_iter().take(limit).collect())
        .unwrap_or_default();

    Ok(Json(MatchHistoryResponse {
        success: true,
        matches,
    }))
}

#[instrument(skip(state))]
pub async fn get_game_accounts(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<Json<GameAccountsResponse>, AppError> {
    let accounts = AccountsByGame::from(state.repo.get_game_accounts(&owner_id).await?);

    let refresh_scheduled = if accounts.league.is_some() {
        let stats = state.repo.get_stats_record(&owner_id, Game::League).await?;
        let current = stats.as_ref();
        schedule_if_stale(&state, &owner_id, current, false).await?
    } else {
        false
    };

    Ok(Json(GameAccountsResponse {
        success: true,
        accounts,
        refresh_scheduled,
    }))
}

#[instrument(skip(state, body))]
pub async fn save_game_accounts(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
    body: Result<Json<SaveAccountsRequest>, JsonRejection>,
) -> Result<Json<GameAccountsResponse>, AppError> {
    let Json(body) = body.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let handles: Vec<(Game, HandleInput)> = [
        (Game::League, body.league),
        (Game::Valorant, body.valorant),
    ]
    .into_iter()
    .filter_map(|(game, handle)| handle.filter(|h| !h.is_blank()).map(|h| (game, h)))
    .collect();

    if handles.is_empty() {
        return Err(AppError::InvalidInput(
            "At least one game account needs a game name or tag".into(),
        ));
    }

    for (game, handle) in &handles {
        let account = state
            .repo
            .upsert_game_account(
                &owner_id,
                *game,
                handle.game_name.trim(),
                handle.tag_line.trim(),
            )
            .await?;
        info!(game = %game, riot_id = %account.riot_id(), "🎮 Game account saved");
    }

    let accounts = AccountsByGame::from(state.repo.get_game_accounts(&owner_id).await?);

    Ok(Json(GameAccountsResponse {
        success: true,
        accounts,
        refresh_scheduled: false,
    }))
}

/// Enqueue a sync of the owner's League history when the gate says so.
///
/// The handle comes from the linked League account, falling back to the
/// identity of the stored record. Returns whether a job was queued.
async fn schedule_if_stale(
    state: &AppState,
    owner_id: &str,
    stats: Option<&PlayerStatsRecord>,
    force_refresh: bool,
) -> Result<bool, AppError> {
    if !state
        .gate
        .should_sync(stats.map(|s| s.last_synced_at), force_refresh)
    {
        return Ok(false);
    }

    let linked = state.repo.get_game_account(owner_id, Game::League).await?;
    let (display_name, tag_line) = match (linked, stats) {
        (Some(account), _) => (account.display_name, account.tag_line),
        (None, Some(record)) => (record.display_name.clone(), record.tag_line.clone()),
        (None, None) => {
            debug!(owner_id, "🔄 No League handle known, refresh skipped");
            return Ok(false);
        }
    };

    if display_name.trim().is_empty() || tag_line.trim().is_empty() {
        debug!(owner_id, "🔄 Incomplete League handle, refresh skipped");
        return Ok(false);
    }

    let queued = state.queue.enqueue(SyncJob {
        owner_id: owner_id.to_string(),
        display_name,
        tag_line,
    });
    if queued {
        debug!(owner_id, "🔄 Background refresh scheduled");
    }

    Ok(queued)
}
