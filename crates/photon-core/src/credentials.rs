//! Bearer token sources.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use crate::error::Result;

/// Supplies the bearer token attached to each request.
///
/// Called once per HTTP exchange; implementations that refresh tokens must not
/// hold locks across their own network calls.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Current access token, or `None` for unauthenticated requests.
    async fn access_token(&self) -> Result<Option<SecretString>>;
}

/// Sends requests without an `Authorization` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

#[async_trait]
impl CredentialProvider for NoCredentials {
    async fn access_token(&self) -> Result<Option<SecretString>> {
        Ok(None)
    }
}

/// A fixed access token.
pub struct StaticToken {
    token: SecretString,
}

impl StaticToken {
    /// Wrap an access token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticToken").finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn access_token(&self) -> Result<Option<SecretString>> {
        Ok(Some(SecretString::from(
            self.token.expose_secret().to_owned(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_is_returned() {
        let provider = StaticToken::new("abc");
        let token = provider.access_token().await.unwrap().unwrap();
        assert_eq!(token.expose_secret(), "abc");
        assert!(!format!("{provider:?}").contains("abc"));
    }

    #[tokio::test]
    async fn no_credentials_yields_none() {
        assert!(NoCredentials.access_token().await.unwrap().is_none());
    }
}
