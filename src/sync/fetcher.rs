use tracing::{debug, instrument};

use crate::error::AppError;
use crate::riot::RiotApi;

/// Number of most recent matches kept per player.
pub const MATCH_WINDOW: usize = 20;

/// Ids of the [`MATCH_WINDOW`] most recent matches of `puid`, most recent
/// first. The window is fixed: always `start=0`, `count=20`.
#[instrument(skip(api))]
pub async fn fetch_match_ids(api: &dyn RiotApi, puid: &str) -> Result<Vec<String>, AppError> {
    let mut ids = api.get_match_ids(puid, 0, MATCH_WINDOW as u32).await?;
    ids.truncate(MATCH_WINDOW);

    debug!(count = ids.len(), "📋 Match ids fetched");
    Ok(ids)
}
