//! Riot match-history synchronization pipeline.
//!
//! Identity resolution, match id paging and paced match enrichment feed a
//! single all-or-nothing write of the owner's stats record. Read paths use
//! the [`StalenessGate`] to decide when to schedule a run on the
//! [`SyncWorker`].

mod enricher;
mod fetcher;
mod resolver;
mod staleness;
mod synchronizer;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use enricher::{EnrichmentFailure, EnrichmentReport, MatchEnricher, Pacing, summarize};
pub use fetcher::{MATCH_WINDOW, fetch_match_ids};
pub use resolver::{PlayerIdentity, resolve_identity};
pub use staleness::{DEFAULT_FRESHNESS, StalenessGate, should_sync};
pub use synchronizer::{MatchHistorySynchronizer, SyncError, SyncOutcome, SyncReport, SyncStage};
pub use worker::{SyncJob, SyncQueue, SyncWorker};
