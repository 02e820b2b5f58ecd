//! In-memory Riot API used by the pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AppError;
use crate::riot::{AccountDto, InfoDto, MatchDto, ParticipantDto, RiotApi};

#[derive(Debug, Default)]
pub(crate) struct FakeRiotApi {
    /// `None` answers 404.
    pub account: Option<AccountDto>,
    pub account_unavailable: bool,
    /// Answers every account lookup with this status.
    pub account_status: Option<u16>,
    pub match_ids: Vec<String>,
    pub match_ids_status: Option<u16>,
    /// Ids without an entry answer 500.
    pub matches: HashMap<String, MatchDto>,
    calls: Mutex<Vec<String>>,
}

impl FakeRiotApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, puuid: &str, game_name: &str, tag_line: &str) -> Self {
        self.account = Some(AccountDto {
            puuid: puuid.to_string(),
            game_name: Some(game_name.to_string()),
            tag_line: Some(tag_line.to_string()),
        });
        self
    }

    pub fn with_match_ids(mut self, ids: &[&str]) -> Self {
        self.match_ids = ids.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_match(mut self, match_id: &str, data: MatchDto) -> Self {
        self.matches.insert(match_id.to_string(), data);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RiotApi for FakeRiotApi {
    async fn get_account_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<AccountDto, AppError> {
        self.record(format!("account:{game_name}#{tag_line}"));
        if self.account_unavailable {
            return Err(AppError::UpstreamUnavailable("connection reset".into()));
        }
        if let Some(status) = self.account_status {
            return Err(AppError::RiotApi {
                status,
                message: format!("Upstream answered {status}"),
            });
        }
        self.account.clone().ok_or_else(|| AppError::RiotApi {
            status: 404,
            message: "Data not found".into(),
        })
    }

    async fn get_match_ids(
        &self,
        puuid: &str,
        start: u32,
        count: u32,
    ) -> Result<Vec<String>, AppError> {
        self.record(format!("ids:{puuid}:{start}:{count}"));
        match self.match_ids_status {
            Some(status) => Err(AppError::RiotApi {
                status,
                message: "Rate limit exceeded".into(),
            }),
            None => Ok(self.match_ids.clone()),
        }
    }

    async fn get_match(&self, match_id: &str) -> Result<MatchDto, AppError> {
        self.record(format!("match:{match_id}"));
        self.matches
            .get(match_id)
            .cloned()
            .ok_or_else(|| AppError::RiotApi {
                status: 500,
                message: "Internal server error".into(),
            })
    }
}

pub(crate) fn participant(puuid: &str, champion: &str, kills: i32, win: bool) -> ParticipantDto {
    ParticipantDto {
        puuid: puuid.to_string(),
        champion_name: champion.to_string(),
        team_position: "MIDDLE".to_string(),
        kills,
        deaths: 2,
        assists: 7,
        gold_earned: 12_300,
        total_minions_killed: 180,
        neutral_minions_killed: 16,
        win,
    }
}

pub(crate) fn match_dto(participants: Vec<ParticipantDto>) -> MatchDto {
    MatchDto {
        info: InfoDto {
            game_mode: "CLASSIC".to_string(),
            game_duration: 1_865,
            game_end_timestamp: Some(1_700_000_000_000),
            participants,
        },
    }
}
