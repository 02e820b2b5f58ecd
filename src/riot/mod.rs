//! Riot REST API access.
//!
//! [`RiotClient`] is the concrete HTTP client; [`RiotApi`] is the seam the
//! synchronization pipeline depends on so it can run against fakes.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::AppError;

pub mod client;
mod endpoints;
pub mod region;
pub mod types;

pub use client::RiotClient;
pub use region::Region;
pub use types::{AccountDto, InfoDto, MatchDto, ParticipantDto};

/// Riot endpoints used by the match-history pipeline.
#[async_trait]
pub trait RiotApi: Send + Sync + Debug {
    async fn get_account_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<AccountDto, AppError>;

    async fn get_match_ids(
        &self,
        puuid: &str,
        start: u32,
        count: u32,
    ) -> Result<Vec<String>, AppError>;

    async fn get_match(&self, match_id: &str) -> Result<MatchDto, AppError>;
}

#[async_trait]
impl RiotApi for RiotClient {
    async fn get_account_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<AccountDto, AppError> {
        RiotClient::get_account_by_riot_id(self, game_name, tag_line).await
    }

    async fn get_match_ids(
        &self,
        puuid: &str,
        start: u32,
        count: u32,
    ) -> Result<Vec<String>, AppError> {
        RiotClient::get_match_ids(self, puuid, start, count).await
    }

    async fn get_match(&self, match_id: &str) -> Result<MatchDto, AppError> {
        RiotClient::get_match(self, match_id).await
    }
}
