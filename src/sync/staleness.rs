use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Default age after which stored stats are refreshed.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(60 * 60);

/// Decides whether a read should schedule a new synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessGate {
    freshness: TimeDelta,
}

impl Default for StalenessGate {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS)
    }
}

impl StalenessGate {
    pub fn new(freshness: Duration) -> Self {
        Self {
            freshness: TimeDelta::from_std(freshness).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn should_sync(&self, last_synced_at: Option<DateTime<Utc>>, force_refresh: bool) -> bool {
        self.should_sync_at(last_synced_at, force_refresh, Utc::now())
    }

    /// Same as [`Self::should_sync`] with an explicit clock.
    pub fn should_sync_at(
        &self,
        last_synced_at: Option<DateTime<Utc>>,
        force_refresh: bool,
        now: DateTime<Utc>,
    ) -> bool {
        if force_refresh {
            return true;
        }

        match last_synced_at {
            None => true,
            Some(last) => now - last > self.freshness,
        }
    }
}

/// [`StalenessGate::should_sync`] with the default one hour freshness.
pub fn should_sync(last_synced_at: Option<DateTime<Utc>>, force_refresh: bool) -> bool {
    StalenessGate::default().should_sync(last_synced_at, force_refresh)
}
