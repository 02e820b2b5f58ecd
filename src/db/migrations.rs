use sqlx::SqlitePool;
use tracing::info;

use crate::error::AppError;

// Timestamps are unix milliseconds.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS game_accounts (
    owner_id TEXT NOT NULL,
    game TEXT NOT NULL,
    display_name TEXT NOT NULL,
    tag_line TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (owner_id, game)
);

CREATE TABLE IF NOT EXISTS player_stats (
    owner_id TEXT NOT NULL,
    game TEXT NOT NULL,
    display_name TEXT NOT NULL,
    tag_line TEXT NOT NULL,
    puid TEXT NOT NULL,
    match_summaries TEXT NOT NULL DEFAULT '[]',
    last_synced_at INTEGER NOT NULL,
    PRIMARY KEY (owner_id, game)
);

CREATE INDEX IF NOT EXISTS idx_player_stats_puid ON player_stats(puid);
"#;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    info!("🗄️ Database migrations completed");
    Ok(())
}
