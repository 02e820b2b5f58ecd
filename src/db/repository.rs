use std::time::Duration;

use chrono::Utc;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

use super::migrations::run_migrations;
use super::models::{
    Game, GameAccountRow, LinkedGameAccount, MatchSummary, PlayerStatsRecord, StatsRow,
};
use crate::error::AppError;

const GAME_ACCOUNT_COLUMNS: &str = "owner_id, game, display_name, tag_line, created_at, updated_at";
const STATS_COLUMNS: &str =
    "owner_id, game, display_name, tag_line, puid, match_summaries, last_synced_at";

#[derive(Clone, Debug)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool on `database_url` and bring the schema up to date.
    ///
    /// An in-memory database lives as long as its connection, so it gets a
    /// single connection that is never recycled.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = options.connect(database_url).await?;
        run_migrations(&pool).await?;

        Ok(Self::new(pool))
    }

    // === Linked game accounts ===

    pub async fn upsert_game_account(
        &self,
        owner_id: &str,
        game: Game,
        display_name: &str,
        tag_line: &str,
    ) -> Result<LinkedGameAccount, AppError> {
        let now = Utc::now().timestamp_millis();
        let query = format!(
            r#"
            INSERT INTO game_accounts (owner_id, game, display_name, tag_line, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(owner_id, game) DO UPDATE SET
                display_name = excluded.display_name,
                tag_line = excluded.tag_line,
                updated_at = excluded.updated_at
            RETURNING {GAME_ACCOUNT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, GameAccountRow>(&query)
            .bind(owner_id)
            .bind(game.as_str())
            .bind(display_name)
            .bind(tag_line)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    pub async fn get_game_account(
        &self,
        owner_id: &str,
        game: Game,
    ) -> Result<Option<LinkedGameAccount>, AppError> {
        let row = sqlx::query_as::<_, GameAccountRow>(&format!(
            "SELECT {GAME_ACCOUNT_COLUMNS} FROM game_accounts WHERE owner_id = ? AND game = ?"
        ))
        .bind(owner_id)
        .bind(game.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(LinkedGameAccount::try_from).transpose()
    }

    pub async fn get_game_accounts(
        &self,
        owner_id: &str,
    ) -> Result<Vec<LinkedGameAccount>, AppError> {
        let rows = sqlx::query_as::<_, GameAccountRow>(&format!(
            "SELECT {GAME_ACCOUNT_COLUMNS} FROM game_accounts WHERE owner_id = ? ORDER BY game"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LinkedGameAccount::try_from).collect()
    }

    // === Player stats ===

    pub async fn get_stats_record(
        &self,
        owner_id: &str,
        game: Game,
    ) -> Result<Option<PlayerStatsRecord>, AppError> {
        let row = sqlx::query_as::<_, StatsRow>(&format!(
            "SELECT {STATS_COLUMNS} FROM player_stats WHERE owner_id = ? AND game = ?"
        ))
        .bind(owner_id)
        .bind(game.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(PlayerStatsRecord::try_from).transpose()
    }

    /// Create or fully overwrite the stats record of `(owner_id, game)`.
    ///
    /// Single statement, so a failure leaves the previous record intact.
    /// `last_synced_at` never moves backwards.
    pub async fn replace_stats_record(
        &self,
        record: &PlayerStatsRecord,
    ) -> Result<PlayerStatsRecord, AppError> {
        let summaries = encode_summaries(&record.match_summaries)?;
        let query = format!(
            r#"
            INSERT INTO player_stats (owner_id, game, display_name, tag_line, puid, match_summaries, last_synced_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(owner_id, game) DO UPDATE SET
                display_name = excluded.display_name,
                tag_line = excluded.tag_line,
                puid = excluded.puid,
                match_summaries = excluded.match_summaries,
                last_synced_at = MAX(player_stats.last_synced_at, excluded.last_synced_at)
            RETURNING {STATS_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, StatsRow>(&query)
            .bind(&record.owner_id)
            .bind(record.game.as_str())
            .bind(&record.display_name)
            .bind(&record.tag_line)
            .bind(&record.puid)
            .bind(summaries)
            .bind(record.last_synced_at.timestamp_millis())
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }
}

fn encode_summaries(summaries: &[MatchSummary]) -> Result<String, AppError> {
    Ok(serde_json::to_string(summaries)?)
}
