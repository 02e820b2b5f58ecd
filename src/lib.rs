//! Match-history sync service for the university esports platform.
//!
//! Pulls a player's recent League of Legends matches from the Riot API,
//! reduces them to per-player box scores and keeps one stats record per
//! profile in SQLite. The [`api`] module serves those records over HTTP and
//! schedules background refreshes through [`sync::SyncWorker`].

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod riot;
pub mod sync;
