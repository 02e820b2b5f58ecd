use serde::Deserialize;

// ============================================================================
// Errors
// ============================================================================

/// Body Riot attaches to non-2xx answers.
#[derive(Debug, Clone, Deserialize)]
pub struct RiotErrorDto {
    pub status: RiotErrorStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiotErrorStatus {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status_code: u16,
}

// ============================================================================
// Account-v1
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: String,
    pub game_name: Option<String>,
    pub tag_line: Option<String>,
}

// ============================================================================
// Match-v5
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDto {
    pub info: InfoDto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoDto {
    #[serde(default)]
    pub game_mode: String,
    pub game_duration: i64,
    /// Only present on matches played since patch 11.20.
    #[serde(default)]
    pub game_end_timestamp: Option<i64>,
    #[serde(default)]
    pub participants: Vec<ParticipantDto>,
}

impl InfoDto {
    /// Match length in seconds.
    ///
    /// Before patch 11.20 `gameDuration` was expressed in milliseconds, those
    /// matches are recognizable by the missing `gameEndTimestamp`.
    pub fn duration_seconds(&self) -> i64 {
        if self.game_end_timestamp.is_some() {
            self.game_duration
        } else {
            self.game_duration / 1_000
        }
    }

    pub fn participant(&self, puuid: &str) -> Option<&ParticipantDto> {
        self.participants.iter().find(|p| p.puuid == puuid)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub puuid: String,
    pub champion_name: String,
    #[serde(default)]
    pub team_position: String,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub gold_earned: i64,
    pub total_minions_killed: i32,
    pub neutral_minions_killed: i32,
    pub win: bool,
}

impl ParticipantDto {
    pub fn cs_total(&self) -> i32 {
        self.total_minions_killed + self.neutral_minions_killed
    }
}
