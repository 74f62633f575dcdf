//! Credential provider backed by the OIDC token endpoint.

use async_trait::async_trait;
use photon_core::{CredentialProvider, Result};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::client::OidcClient;
use crate::models::OidcTokens;

/// Tokens are renewed this long before they expire.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    access_token: SecretString,
    refresh_token: Option<SecretString>,
    renew_at: Instant,
}

fn duplicate(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

/// Logs in with a user name and password and keeps the access token fresh.
pub struct OidcCredentialProvider {
    client: OidcClient,
    username: String,
    password: SecretString,
    refresh_margin: Duration,
    cache: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for OidcCredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OidcCredentialProvider")
            .field("client", &self.client)
            .field("username", &self.username)
            .field("refresh_margin", &self.refresh_margin)
            .finish_non_exhaustive()
    }
}

impl OidcCredentialProvider {
    /// Create a provider that logs in as `username`.
    #[must_use]
    pub fn new(client: OidcClient, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            client,
            username: username.into(),
            password,
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            cache: Mutex::new(None),
        }
    }

    /// Renew tokens this long before they expire.
    #[must_use]
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Drop the cached token; the next request logs in again.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    async fn fetch(&self, refresh_token: Option<SecretString>) -> Result<OidcTokens> {
        if let Some(refresh_token) = refresh_token {
            match self
                .client
                .get_token_by_refresh_token_grant(&refresh_token)
                .await
            {
                Ok(tokens) => return Ok(tokens),
                Err(err) => {
                    debug!(code = err.error_code(), "Refresh grant rejected, logging in again");
                }
            }
        }

        debug!(username = %self.username, "Requesting token with password grant");
        self.client
            .get_token_by_password_grant(&self.username, &self.password)
            .await
    }
}

#[async_trait]
impl CredentialProvider for OidcCredentialProvider {
    async fn access_token(&self) -> Result<Option<SecretString>> {
        let refresh_token = {
            let cache = self.cache.lock().await;
            match cache.as_ref() {
                Some(cached) if Instant::now() < cached.renew_at => {
                    return Ok(Some(duplicate(&cached.access_token)));
                }
                Some(cached) => cached.refresh_token.as_ref().map(duplicate),
                None => None,
            }
        };

        let tokens = self.fetch(refresh_token).await?;
        let lifetime = Duration::from_secs(tokens.expires_in).saturating_sub(self.refresh_margin);
        let access_token = duplicate(&tokens.access_token);

        let mut cache = self.cache.lock().await;
        let refresh_token = match tokens.refresh_token {
            Some(token) => Some(token),
            None => cache
                .as_ref()
                .and_then(|cached| cached.refresh_token.as_ref().map(duplicate)),
        };
        *cache = Some(CachedToken {
            access_token: tokens.access_token,
            refresh_token,
            renew_at: Instant::now() + lifetime,
        });

        Ok(Some(access_token))
    }
}
