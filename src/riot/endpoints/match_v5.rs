use crate::error::AppError;
use crate::riot::client::RiotClient;
use crate::riot::types::MatchDto;

impl RiotClient {
    /// Get list of match IDs by PUUID, most recent first
    /// Uses regional routing (americas, europe, asia, sea)
    pub async fn get_match_ids(
        &self,
        puuid: &str,
        start: u32,
        count: u32,
    ) -> Result<Vec<String>, AppError> {
        let url = format!(
            "{}/lol/match/v5/matches/by-puuid/{}/ids",
            self.base_url(),
            urlencoding::encode(puuid)
        );
        let start = start.to_string();
        let count = count.to_string();

        self.get(&url, &[("start", start.as_str()), ("count", count.as_str())])
            .await
    }

    /// Get match details by match ID
    /// Uses regional routing (americas, europe, asia, sea)
    pub async fn get_match(&self, match_id: &str) -> Result<MatchDto, AppError> {
        let url = format!(
            "{}/lol/match/v5/matches/{}",
            self.base_url(),
            urlencoding::encode(match_id)
        );

        self.get(&url, &[]).await
    }
}
