use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::AppError;

mod migrations;
mod models;
mod repository;

pub use migrations::run_migrations;
pub use models::{Game, LinkedGameAccount, MatchSummary, PlayerStatsRecord};
pub use repository::Repository;

/// Storage seam of the match-history synchronizer.
#[async_trait]
pub trait StatsStore: Send + Sync + Debug {
    async fn get_stats_record(
        &self,
        owner_id: &str,
        game: Game,
    ) -> Result<Option<PlayerStatsRecord>, AppError>;

    /// Atomically create or overwrite the record; nothing is written on error.
    async fn replace_stats_record(
        &self,
        record: &PlayerStatsRecord,
    ) -> Result<PlayerStatsRecord, AppError>;
}

#[async_trait]
impl StatsStore for Repository {
    async fn get_stats_record(
        &self,
        owner_id: &str,
        game: Game,
    ) -> Result<Option<PlayerStatsRecord>, AppError> {
        Repository::get_stats_record(self, owner_id, game).await
    }

    async fn replace_stats_record(
        &self,
        record: &PlayerStatsRecord,
    ) -> Result<PlayerStatsRecord, AppError> {
        Repository::replace_stats_record(self, record).await
    }
}
