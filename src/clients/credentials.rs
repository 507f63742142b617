use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{KeeperError, Result};

/// Tokens are refreshed this long before the provider says they expire.
const EXPIRY_MARGIN_SECONDS: i64 = 60;

/// Supplies bearer tokens for calendar requests.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }
}

/// OAuth2 refresh-token grant with an in-memory access token cache.
pub struct RefreshTokenCredentials {
    http: reqwest::Client,
    token_uri: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    cached: Mutex<Option<CachedToken>>,
}

impl RefreshTokenCredentials {
    pub fn new(
        http: reqwest::Client,
        token_uri: String,
        client_id: String,
        client_secret: String,
        refresh_token: String,
    ) -> Self {
        Self {
            http,
            token_uri,
            client_id,
            client_secret,
            refresh_token,
            cached: Mutex::new(None),
        }
    }

    async fn refresh(&self) -> Result<TokenResponse> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
        ];
        let response = self
            .http
            .post(&self.token_uri)
            .form(&form)
            .send()
            .await
            .map_err(|e| KeeperError::remote("refresh token", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| KeeperError::remote("refresh token", e))?;
        if !status.is_success() {
            return Err(KeeperError::remote(
                "refresh token",
                format!("request failed with status {}: {}", status, text),
            ));
        }
        parse_token_response(&text)
    }
}

fn parse_token_response(body: &str) -> Result<TokenResponse> {
    serde_json::from_str(body)
        .map_err(|e| KeeperError::remote("refresh token", format!("failed to parse JSON: {}", e)))
}

#[async_trait]
impl CredentialProvider for RefreshTokenCredentials {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh(now)) {
            return Ok(token.token.clone());
        }

        let response = self.refresh().await?;
        debug!(expires_in = ?response.expires_in, "refreshed access token");
        let expires_at = response
            .expires_in
            .map(|secs| now + Duration::seconds(secs - EXPIRY_MARGIN_SECONDS));
        let token = response.access_token;
        *cached = Some(CachedToken {
            token: token.clone(),
            expires_at,
        });
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_is_returned_as_is() {
        let provider = StaticToken::new("abc".to_string());
        assert_eq!(provider.access_token().await.unwrap(), "abc");
    }

    #[test]
    fn parses_token_payload() {
        let parsed = parse_token_response(
            r#"{"access_token":"ya29.x","expires_in":3599,"scope":"calendar","token_type":"Bearer"}"#,
        )
        .unwrap();
        assert_eq!(parsed.access_token, "ya29.x");
        assert_eq!(parsed.expires_in, Some(3599));

        assert!(matches!(
            parse_token_response("{}"),
            Err(KeeperError::RemoteStore { operation: "refresh token", .. })
        ));
    }

    #[test]
    fn cached_token_expires() {
        let now = Utc::now();
        let token = CachedToken {
            token: "t".to_string(),
            expires_at: Some(now + Duration::seconds(10)),
        };
        assert!(token.is_fresh(now));
        assert!(!token.is_fresh(now + Duration::seconds(10)));
        assert!(CachedToken { expires_at: None, ..token }.is_fresh(now));
    }
}
