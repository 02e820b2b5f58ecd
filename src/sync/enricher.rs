use std::{fmt, num::NonZeroU32, sync::Arc, time::Duration};

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tracing::{debug, instrument, warn};

use crate::db::MatchSummary;
use crate::riot::{InfoDto, RiotApi};

const UNKNOWN: &str = "Unknown";

/// Pause applied between two consecutive match detail requests.
#[derive(Clone, Default)]
pub enum Pacing {
    #[default]
    None,
    FixedDelay(Duration),
    /// Token bucket shared by every enricher holding a clone.
    RateLimited(Arc<DefaultDirectRateLimiter>),
}

impl Pacing {
    pub fn per_second(requests: NonZeroU32) -> Self {
        Self::RateLimited(Arc::new(RateLimiter::direct(Quota::per_second(requests))))
    }

    async fn wait(&self) {
        match self {
            Self::None => {}
            Self::FixedDelay(delay) => tokio::time::sleep(*delay).await,
            Self::RateLimited(limiter) => limiter.until_ready().await,
        }
    }
}

impl fmt::Debug for Pacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::FixedDelay(delay) => f.debug_tuple("FixedDelay").field(delay).finish(),
            Self::RateLimited(_) => f.write_str("RateLimited"),
        }
    }
}

/// A match whose details could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentFailure {
    pub match_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    /// Same order as the requested ids, failed ones left out.
    pub summaries: Vec<MatchSummary>,
    pub failures: Vec<EnrichmentFailure>,
}

impl EnrichmentReport {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Turns match ids into box scores of one player.
#[derive(Debug, Clone)]
pub struct MatchEnricher {
    api: Arc<dyn RiotApi>,
    pacing: Pacing,
}

impl MatchEnricher {
    pub fn new(api: Arc<dyn RiotApi>, pacing: Pacing) -> Self {
        Self { api, pacing }
    }

    /// Fetch every match in order, one request at a time.
    ///
    /// A failed match is recorded in the report and skipped, it never aborts
    /// the remaining ones.
    #[instrument(skip(self, match_ids), fields(requested = match_ids.len()))]
    pub async fn enrich(&self, match_ids: &[String], puid: &str) -> EnrichmentReport {
        let mut report = EnrichmentReport::default();

        for (index, match_id) in match_ids.iter().enumerate() {
            if index > 0 {
                self.pacing.wait().await;
            }

            match self.api.get_match(match_id).await {
                Ok(data) => report.summaries.push(summarize(match_id, &data.info, puid)),
                Err(e) => {
                    warn!(
                        error = %e,
                        match_id,
                        transient = e.is_transient(),
                        "🧩 ⚠️ Skipping match, details unavailable"
                    );
                    report.failures.push(EnrichmentFailure {
                        match_id: match_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(
            enriched = report.summaries.len(),
            failed = report.failures.len(),
            "🧩 Enrichment finished"
        );
        report
    }
}

/// Box score of `puid` in the match.
///
/// A player missing from the participants list gets a neutral summary
/// instead of failing the match.
pub fn summarize(match_id: &str, info: &InfoDto, puid: &str) -> MatchSummary {
    let base = MatchSummary {
        match_id: match_id.to_string(),
        game_mode: info.game_mode.clone(),
        duration_seconds: info.duration_seconds(),
        champion: UNKNOWN.to_string(),
        kills: 0,
        deaths: 0,
        assists: 0,
        win: false,
        gold_earned: 0,
        creep_score: 0,
        role: UNKNOWN.to_string(),
    };

    let Some(player) = info.participant(puid) else {
        debug!(match_id, "🧩 Player missing from participants");
        return base;
    };

    MatchSummary {
        champion: player.champion_name.clone(),
        kills: player.kills,
        deaths: player.deaths,
        assists: player.assists,
        win: player.win,
        gold_earned: player.gold_earned,
        creep_score: player.cs_total(),
        role: player.team_position.clone(),
        ..base
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroU32, sync::Arc, time::Duration};

    use super::{MatchEnricher, Pacing};
    use crate::sync::testing::{FakeRiotApi, match_dto, participant};

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|id| id.to_string()).collect()
    }

    #[tokio::test]
    async fn extracts_target_player_box_score() {
        let api = FakeRiotApi::new().with_match(
            "m1",
            match_dto(vec![
                participant("someone", "Zed", 9, false),
                participant("abc123", "Ahri", 5, true),
            ]),
        );
        let enricher = MatchEnricher::new(Arc::new(api), Pacing::None);

        let report = enricher.enrich(&ids(&["m1"]), "abc123").await;

        let summary = &report.summaries[0];
        assert_eq!(summary.match_id, "m1");
        assert_eq!(summary.champion, "Ahri");
        assert_eq!(summary.kills, 5);
        assert!(summary.win);
        assert_eq!(summary.creep_score, 196);
        assert_eq!(summary.duration_seconds, 1_865);
        assert_eq!(summary.role, "MIDDLE");
        assert!(!report.is_partial());
    }

    #[tokio::test]
    async fn missing_participant_yields_neutral_summary() {
        let api = FakeRiotApi::new().with_match(
            "m1",
            match_dto(vec![participant("someone", "Zed", 9, true)]),
        );
        let enricher = MatchEnricher::new(Arc::new(api), Pacing::None);

        let report = enricher.enrich(&ids(&["m1"]), "abc123").await;

        assert!(report.failures.is_empty());
        let summary = &report.summaries[0];
        assert_eq!(summary.champion, "Unknown");
        assert_eq!(summary.role, "Unknown");
        assert_eq!(
            (summary.kills, summary.deaths, summary.assists, summary.creep_score),
            (0, 0, 0, 0)
        );
        assert_eq!(summary.gold_earned, 0);
        assert!(!summary.win);
        assert_eq!(summary.game_mode, "CLASSIC");
    }

    #[tokio::test]
    async fn failed_matches_are_skipped_and_reported() {
        let all: Vec<String> = (0..20).map(|i| format!("m{i}")).collect();
        let mut api = FakeRiotApi::new();
        for id in all
            .iter()
            .filter(|id| !["m3", "m7", "m11"].contains(&id.as_str()))
        {
            api = api.with_match(id, match_dto(vec![participant("abc123", "Ahri", 1, true)]));
        }
        let enricher = MatchEnricher::new(Arc::new(api), Pacing::None);

        let report = enricher.enrich(&all, "abc123").await;

        assert_eq!(report.summaries.len(), 17);
        let failed: Vec<_> = report
            .failures
            .iter()
            .map(|f| f.match_id.as_str())
            .collect();
        assert_eq!(failed, vec!["m3", "m7", "m11"]);
        assert!(report.failures[0].reason.contains("500"));
    }

    #[tokio::test]
    async fn preserves_requested_order() {
        let api = FakeRiotApi::new()
            .with_match("m3", match_dto(vec![]))
            .with_match("m1", match_dto(vec![]))
            .with_match("m2", match_dto(vec![]));
        let api = Arc::new(api);
        let enricher = MatchEnricher::new(api.clone(), Pacing::None);

        let report = enricher.enrich(&ids(&["m3", "m1", "m2"]), "abc123").await;

        let order: Vec<_> = report
            .summaries
            .iter()
            .map(|s| s.match_id.as_str())
            .collect();
        assert_eq!(order, vec!["m3", "m1", "m2"]);
        assert_eq!(api.calls(), vec!["match:m3", "match:m1", "match:m2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_delay_runs_between_requests() {
        let api = FakeRiotApi::new()
            .with_match("m1", match_dto(vec![]))
            .with_match("m2", match_dto(vec![]))
            .with_match("m3", match_dto(vec![]));
        let enricher = MatchEnricher::new(
            Arc::new(api),
            Pacing::FixedDelay(Duration::from_secs(1)),
        );

        let started = tokio::time::Instant::now();
        enricher.enrich(&ids(&["m1", "m2", "m3"]), "abc123").await;
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn rate_limited_pacing_completes() {
        let api = FakeRiotApi::new()
            .with_match("m1", match_dto(vec![]))
            .with_match("m2", match_dto(vec![]));
        let enricher = MatchEnricher::new(
            Arc::new(api),
            Pacing::per_second(NonZeroU32::new(1_000).unwrap()),
        );

        let report = enricher.enrich(&ids(&["m1", "m2"]), "abc123").await;

        assert_eq!(report.summaries.len(), 2);
    }

    #[tokio::test]
    async fn empty_input_makes_no_request() {
        let api = Arc::new(FakeRiotApi::new());
        let enricher = MatchEnricher::new(api.clone(), Pacing::FixedDelay(Duration::from_secs(5)));

        let report = enricher.enrich(&[], "abc123").await;

        assert!(report.summaries.is_empty());
        assert!(api.calls().is_empty());
    }
}
