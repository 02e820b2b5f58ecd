use tracing::{debug, instrument};

use crate::error::AppError;
use crate::riot::RiotApi;

/// Riot identity behind a `gameName#tagLine` handle.
///
/// Resolved again on every synchronization since the handle can be renamed
/// on Riot's side while the stored account stays the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub display_name: String,
    pub tag_line: String,
    pub puid: String,
}

impl PlayerIdentity {
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.display_name, self.tag_line)
    }
}

/// Look up the PUUID of `display_name#tag_line`.
///
/// A 404 or 400 from the account service means the handle does not resolve
/// and becomes [`AppError::PlayerNotFound`]. Other statuses (bad key, rate
/// limit, outages) stay [`AppError::RiotApi`] and transport failures stay
/// [`AppError::UpstreamUnavailable`]. Never retries.
#[instrument(skip(api))]
pub async fn resolve_identity(
    api: &dyn RiotApi,
    display_name: &str,
    tag_line: &str,
) -> Result<PlayerIdentity, AppError> {
    let account = api
        .get_account_by_riot_id(display_name, tag_line)
        .await
        .map_err(|e| match e {
            AppError::RiotApi {
                status: status @ (400 | 404),
                message,
            } => {
                debug!(status, reason = %message, "🔎 Riot ID did not resolve");
                AppError::PlayerNotFound {
                    game_name: display_name.to_string(),
                    tag_line: tag_line.to_string(),
                }
            }
            other => other,
        })?;

    Ok(PlayerIdentity {
        display_name: account
            .game_name
            .unwrap_or_else(|| display_name.to_string()),
        tag_line: account
            .tag_line
            .unwrap_or_else(|| tag_line.to_string()),
        puid: account.puuid,
    })
}

#[cfg(test)]
mod tests {
    use super::resolve_identity;
    use crate::error::AppError;
    use crate::riot::AccountDto;
    use crate::sync::testing::FakeRiotApi;

    #[tokio::test]
    async fn resolves_puid_and_canonical_handle() {
        let api = FakeRiotApi::new().with_account("abc123", "Faker", "KR1");

        let identity = resolve_identity(&api, "faker", "kr1").await.unwrap();

        assert_eq!(identity.puid, "abc123");
        assert_eq!(identity.riot_id(), "Faker#KR1");
    }

    #[tokio::test]
    async fn keeps_requested_handle_when_upstream_omits_it() {
        let mut api = FakeRiotApi::new();
        api.account = Some(AccountDto {
            puuid: "abc123".into(),
            game_name: None,
            tag_line: None,
        });

        let identity = resolve_identity(&api, "Faker", "KR1").await.unwrap();

        assert_eq!(identity.display_name, "Faker");
        assert_eq!(identity.tag_line, "KR1");
    }

    #[tokio::test]
    async fn unknown_handle_is_not_found() {
        let api = FakeRiotApi::new();

        let res = resolve_identity(&api, "Nobody", "0000").await;

        assert!(matches!(
            res,
            Err(AppError::PlayerNotFound { ref game_name, .. }) if game_name == "Nobody"
        ));
    }

    #[tokio::test]
    async fn transport_failure_stays_unavailable() {
        let mut api = FakeRiotApi::new().with_account("abc123", "Faker", "KR1");
        api.account_unavailable = true;

        let res = resolve_identity(&api, "Faker", "KR1").await;

        assert!(matches!(res, Err(AppError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn rejected_key_and_rate_limit_are_not_reported_as_unknown_player() {
        for status in [403, 429] {
            let mut api = FakeRiotApi::new().with_account("abc123", "Faker", "KR1");
            api.account_status = Some(status);

            let err = resolve_identity(&api, "Faker", "KR1").await.unwrap_err();

            assert!(
                matches!(err, AppError::RiotApi { status: s, .. } if s == status),
                "{status}: {err}"
            );
            assert!(err.is_transient());
        }
    }

    #[tokio::test]
    async fn bad_request_is_not_found() {
        let mut api = FakeRiotApi::new();
        api.account_status = Some(400);

        let res = resolve_identity(&api, "Faker", "").await;

        assert!(matches!(res, Err(AppError::PlayerNotFound { .. })));
    }
}
