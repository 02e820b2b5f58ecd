use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

/// Games a user can link an account for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    League,
    Valorant,
}

impl Game {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::League => "league",
            Self::Valorant => "valorant",
        }
    }
}

impl FromStr for Game {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "league" => Ok(Self::League),
            "valorant" => Ok(Self::Valorant),
            _ => Err(AppError::InvalidInput(format!("unknown game: {s}"))),
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-game handle a user saved for one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedGameAccount {
    pub owner_id: String,
    pub game: Game,
    pub display_name: String,
    pub tag_line: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkedGameAccount {
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.display_name, self.tag_line)
    }
}

/// Box score of one player in one finished match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub match_id: String,
    pub game_mode: String,
    pub duration_seconds: i64,
    pub champion: String,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub win: bool,
    pub gold_earned: i64,
    pub creep_score: i32,
    pub role: String,
}

/// Cached match history of one user for one game, replaced wholesale on
/// every successful synchronization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatsRecord {
    pub owner_id: String,
    pub game: Game,
    pub display_name: String,
    pub tag_line: String,
    pub puid: String,
    /// Most recent first.
    pub match_summaries: Vec<MatchSummary>,
    pub last_synced_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct GameAccountRow {
    pub owner_id: String,
    pub game: String,
    pub display_name: String,
    pub tag_line: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<GameAccountRow> for LinkedGameAccount {
    type Error = AppError;

    fn try_from(row: GameAccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            game: decode_game(&row.game)?,
            created_at: decode_millis(row.created_at)?,
            updated_at: decode_millis(row.updated_at)?,
            owner_id: row.owner_id,
            display_name: row.display_name,
            tag_line: row.tag_line,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct StatsRow {
    pub owner_id: String,
    pub game: String,
    pub display_name: String,
    pub tag_line: String,
    pub puid: String,
    pub match_summaries: String,
    pub last_synced_at: i64,
}

impl TryFrom<StatsRow> for PlayerStatsRecord {
    type Error = AppError;

    fn try_from(row: StatsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            game: decode_game(&row.game)?,
            match_summaries: serde_json::from_str(&row.match_summaries)?,
            last_synced_at: decode_millis(row.last_synced_at)?,
            owner_id: row.owner_id,
            display_name: row.display_name,
            tag_line: row.tag_line,
            puid: row.puid,
        })
    }
}

fn decode_game(raw: &str) -> Result<Game, AppError> {
    raw.parse()
        .map_err(|_| decode_error(format!("invalid game column: {raw}")))
}

fn decode_millis(ms: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| decode_error(format!("invalid timestamp: {ms}")))
}

fn decode_error(message: String) -> AppError {
    AppError::Database(sqlx::Error::Decode(message.into()))
}
