use std::{fmt, num::NonZeroU32, sync::Arc, time::Duration};

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::de::DeserializeOwned;

use super::types::RiotErrorDto;
use crate::error::AppError;

/// HTTP client for the Riot REST API.
///
/// Every request waits on a shared rate limiter and runs under the client
/// timeout. Cloning is cheap and keeps the same limiter.
#[derive(Clone)]
pub struct RiotClient {
    http: reqwest::Client,
    limiter: Arc<DefaultDirectRateLimiter>,
    /// Riot API Key
    api_key: String,
    base_url: String,
}

impl fmt::Debug for RiotClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiotClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl RiotClient {
    pub fn new(
        api_key: String,
        base_url: String,
        rate_limit_per_second: NonZeroU32,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let quota = Quota::per_second(rate_limit_per_second);

        Ok(Self {
            http,
            limiter: Arc::new(RateLimiter::direct(quota)),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared GET logic: rate limiting, key injection and status mapping.
    ///
    /// Transport failures (including timeouts) become
    /// [`AppError::UpstreamUnavailable`], non-2xx answers become
    /// [`AppError::RiotApi`] carrying Riot's own error message when present.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        self.limiter.until_ready().await;
        tracing::trace!(url, "🛰️ Riot API request");

        let res = self
            .http
            .get(url)
            .query(query)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let fallback = status.canonical_reason().unwrap_or("Unknown error");
            let message = match res.json::<RiotErrorDto>().await {
                Ok(body) => body.status.message,
                Err(_) => fallback.to_string(),
            };
            return Err(AppError::RiotApi {
                status: status.as_u16(),
                message,
            });
        }

        res.json().await.map_err(body_error)
    }
}

/// A body that stops arriving is an outage, a body that does not decode is not.
fn body_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() || e.is_connect() {
        AppError::UpstreamUnavailable(e.to_string())
    } else {
        AppError::Http(e)
    }
}
