use std::env;
use std::num::NonZeroU32;
use std::time::Duration;

use crate::error::AppError;
use crate::riot::Region;

#[derive(Debug, Clone)]
pub struct Config {
    pub riot_api_key: String,
    pub riot_base_url: String,
    pub riot_rate_limit_per_second: NonZeroU32,
    pub riot_request_timeout: Duration,
    pub database_url: String,
    pub http_port: u16,
    pub match_fetch_delay: Duration,
    pub stats_freshness: Duration,
    pub sync_queue_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        const DEFAULT_HTTP_PORT: u16 = 3001;
        const DEFAULT_RIOT_RATE_LIMIT_PER_SECOND: u32 = 20;
        const DEFAULT_RIOT_REQUEST_TIMEOUT_SECS: u64 = 10;
        const DEFAULT_MATCH_FETCH_DELAY_MS: u64 = 10;
        const DEFAULT_STATS_FRESHNESS_SECS: u64 = 60 * 60;
        const DEFAULT_SYNC_QUEUE_CAPACITY: usize = 100;

        let riot_api_key = env::var("RIOT_API_KEY")
            .map_err(|_| AppError::Config("RIOT_API_KEY must be set".into()))?;

        // An explicit base URL wins over the routing region.
        let riot_base_url = match env::var("RIOT_BASE_URL") {
            Ok(url) => url.trim_end_matches('/').to_string(),
            Err(_) => {
                let region: Region = env::var("RIOT_REGION")
                    .unwrap_or_else(|_| "europe".into())
                    .parse()?;
                region.base_url()
            }
        };

        let riot_rate_limit_per_second = env::var("RIOT_RATE_LIMIT_PER_SECOND")
            .ok()
            .and_then(|v| v.parse().ok())
            .and_then(NonZeroU32::new)
            .unwrap_or_else(|| {
                NonZeroU32::new(DEFAULT_RIOT_RATE_LIMIT_PER_SECOND).unwrap_or(NonZeroU32::MIN)
            });

        let riot_request_timeout = Duration::from_secs(parse_or(
            "RIOT_REQUEST_TIMEOUT_SECS",
            DEFAULT_RIOT_REQUEST_TIMEOUT_SECS,
        ));

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:campus_arena.db?mode=rwc".into());

        let http_port = parse_or("HTTP_PORT", DEFAULT_HTTP_PORT);

        let match_fetch_delay =
            Duration::from_millis(parse_or("MATCH_FETCH_DELAY_MS", DEFAULT_MATCH_FETCH_DELAY_MS));

        let stats_freshness =
            Duration::from_secs(parse_or("STATS_FRESHNESS_SECS", DEFAULT_STATS_FRESHNESS_SECS));

        let sync_queue_capacity =
            parse_or("SYNC_QUEUE_CAPACITY", DEFAULT_SYNC_QUEUE_CAPACITY).max(1);

        Ok(Self {
            riot_api_key,
            riot_base_url,
            riot_rate_limit_per_second,
            riot_request_timeout,
            database_url,
            http_port,
            match_fetch_delay,
            stats_freshness,
            sync_queue_capacity,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
