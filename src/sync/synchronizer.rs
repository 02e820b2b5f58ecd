use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{Span, debug, error, info, instrument};

use super::enricher::{EnrichmentFailure, MatchEnricher, Pacing};
use super::fetcher::fetch_match_ids;
use super::resolver::resolve_identity;
use crate::db::{Game, PlayerStatsRecord, StatsStore};
use crate::error::AppError;
use crate::riot::RiotApi;

/// Progress of a single synchronization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncStage {
    Idle,
    ResolvingIdentity,
    FetchingMatchIds,
    EnrichingMatches,
    Persisting,
    Done,
    /// Terminal state of a failed run. [`SyncError::stage`] keeps the stage
    /// that failed.
    Error,
}

impl SyncStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ResolvingIdentity => "resolving identity",
            Self::FetchingMatchIds => "fetching match ids",
            Self::EnrichingMatches => "enriching matches",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("match history sync failed at stage `{stage}`: {source}")]
pub struct SyncError {
    pub stage: SyncStage,
    #[source]
    pub source: AppError,
}

impl SyncError {
    fn at(stage: SyncStage) -> impl FnOnce(AppError) -> Self {
        move |source| Self { stage, source }
    }

    /// Upstream data was fetched but could not be stored.
    pub fn is_persistence_failure(&self) -> bool {
        self.stage == SyncStage::Persisting
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub record: PlayerStatsRecord,
    pub match_count: usize,
    pub failed_matches: Vec<EnrichmentFailure>,
    pub last_updated: DateTime<Utc>,
}

/// Serializable result handed to callers of [`MatchHistorySynchronizer::synchronize`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
    /// Matches left out because their details could not be fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<SyncReport, SyncError>> for SyncOutcome {
    fn from(value: Result<SyncReport, SyncError>) -> Self {
        match value {
            Ok(report) => Self {
                success: true,
                match_count: Some(report.match_count),
                failed_count: Some(report.failed_matches.len()),
                last_updated: Some(report.last_updated),
                message: Some(format!("{} matches updated", report.match_count)),
                error: None,
            },
            Err(e) => Self::failure(&e.source),
        }
    }
}

impl SyncOutcome {
    pub fn failure(error: &AppError) -> Self {
        Self {
            success: false,
            match_count: None,
            failed_count: None,
            last_updated: None,
            message: None,
            error: Some(error.to_string()),
        }
    }
}

/// Resolves a Riot handle, pulls its recent matches and replaces the
/// owner's League stats record with the result.
#[derive(Debug, Clone)]
pub struct MatchHistorySynchronizer {
    api: Arc<dyn RiotApi>,
    store: Arc<dyn StatsStore>,
    enricher: MatchEnricher,
}

impl MatchHistorySynchronizer {
    pub fn new(api: Arc<dyn RiotApi>, store: Arc<dyn StatsStore>, pacing: Pacing) -> Self {
        Self {
            enricher: MatchEnricher::new(api.clone(), pacing),
            api,
            store,
        }
    }

    pub async fn synchronize(
        &self,
        owner_id: &str,
        display_name: &str,
        tag_line: &str,
    ) -> SyncOutcome {
        self.try_synchronize(owner_id, display_name, tag_line)
            .await
            .into()
    }

    /// Run the whole pipeline.
    ///
    /// Identity and match id failures abort the run. Individual match
    /// failures only shorten the stored history. The record is written in a
    /// single replace at the end, so a failed run leaves the previous record
    /// untouched.
    #[instrument(skip(self), fields(stage))]
    pub async fn try_synchronize(
        &self,
        owner_id: &str,
        display_name: &str,
        tag_line: &str,
    ) -> Result<SyncReport, SyncError> {
        let (owner_id, display_name, tag_line) =
            (owner_id.trim(), display_name.trim(), tag_line.trim());
        let invalid = if owner_id.is_empty() {
            Some("Owner id must be provided")
        } else if display_name.is_empty() || tag_line.is_empty() {
            Some("Game name and tag must be entered")
        } else {
            None
        };
        if let Some(reason) = invalid {
            return Err(SyncError {
                stage: SyncStage::Idle,
                source: AppError::InvalidInput(reason.into()),
            })
            .inspect_err(log_failure);
        }

        enter(SyncStage::ResolvingIdentity);
        let identity = resolve_identity(self.api.as_ref(), display_name, tag_line)
            .await
            .map_err(SyncError::at(SyncStage::ResolvingIdentity))
            .inspect_err(log_failure)?;

        enter(SyncStage::FetchingMatchIds);
        let match_ids = fetch_match_ids(self.api.as_ref(), &identity.puid)
            .await
            .map_err(SyncError::at(SyncStage::FetchingMatchIds))
            .inspect_err(log_failure)?;

        enter(SyncStage::EnrichingMatches);
        let enrichment = self.enricher.enrich(&match_ids, &identity.puid).await;

        enter(SyncStage::Persisting);
        let record = PlayerStatsRecord {
            owner_id: owner_id.to_string(),
            game: Game::League,
            display_name: identity.display_name,
            tag_line: identity.tag_line,
            puid: identity.puid,
            match_summaries: enrichment.summaries,
            last_synced_at: Utc::now(),
        };
        let stored = self
            .store
            .replace_stats_record(&record)
            .await
            .map_err(SyncError::at(SyncStage::Persisting))
            .inspect_err(log_failure)?;

        enter(SyncStage::Done);
        info!(
            match_count = stored.match_summaries.len(),
            failed = enrichment.failures.len(),
            "🔁 ✅ Match history synchronized"
        );

        Ok(SyncReport {
            match_count: stored.match_summaries.len(),
            last_updated: stored.last_synced_at,
            failed_matches: enrichment.failures,
            record: stored,
        })
    }
}

fn enter(stage: SyncStage) {
    Span::current().record("stage", stage.as_str());
    debug!("🔁 {stage}");
}

fn log_failure(e: &SyncError) {
    Span::current().record("stage", SyncStage::Error.as_str());
    error!(error = %e.source, stage = %e.stage, "🔁 ❌ Match history sync failed");
}
