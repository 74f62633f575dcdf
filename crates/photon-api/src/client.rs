//! Entry point bundling every Photon resource API over one transport.

use photon_core::client::ClientConfig;
use photon_core::{ClientOptions, CredentialProvider, RestClient, RestClientBuilder, StaticToken};
use std::sync::Arc;
use tracing::Dispatch;

use crate::deployments::DeploymentsApi;
use crate::hosts::InfraHostsApi;
use crate::routers::RoutersApi;
use crate::services::ServicesApi;
use crate::tasks::TasksApi;
use crate::Result;

const USER_AGENT: &str = concat!("photon-api/", env!("CARGO_PKG_VERSION"));

/// Builder for [`PhotonClient`].
#[derive(Debug, Clone)]
pub struct PhotonClientBuilder {
    inner: RestClientBuilder,
}

impl PhotonClientBuilder {
    /// Create a builder for the specified endpoint with default options.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self::from_options(ClientOptions::new(endpoint)?))
    }

    /// Create a builder from pre-built options.
    #[must_use]
    pub fn from_options(options: ClientOptions) -> Self {
        Self {
            inner: RestClient::builder(options).with_user_agent(USER_AGENT),
        }
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Supply bearer tokens from a credential provider.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.inner = self.inner.with_credentials(credentials);
        self
    }

    /// Authenticate every request with a fixed access token.
    #[must_use]
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.with_credentials(Arc::new(StaticToken::new(token)))
    }

    /// Trust an additional root certificate.
    #[must_use]
    pub fn with_root_certificate(mut self, certificate: reqwest::Certificate) -> Self {
        self.inner = self.inner.with_root_certificate(certificate);
        self
    }

    /// Route client log events to `dispatch`.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: impl Into<Dispatch>) -> Self {
        self.inner = self.inner.with_dispatch(dispatch);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<PhotonClient> {
        let rest = self.inner.build()?;
        Ok(PhotonClient { rest })
    }
}

/// Asynchronous Photon client.
///
/// Cheap to clone; every resource API handed out shares the same transport.
#[derive(Debug, Clone)]
pub struct PhotonClient {
    rest: RestClient,
}

impl PhotonClient {
    /// Construct a client directly from an endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        PhotonClientBuilder::new(endpoint)?.build()
    }

    /// Start a builder for `endpoint`.
    pub fn builder(endpoint: impl Into<String>) -> Result<PhotonClientBuilder> {
        PhotonClientBuilder::new(endpoint)
    }

    /// Endpoint requests are sent to, without trailing `/`.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.rest.endpoint()
    }

    /// Underlying transport.
    #[must_use]
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// Task API.
    #[must_use]
    pub fn tasks(&self) -> TasksApi {
        TasksApi::new(self.rest.clone())
    }

    /// Deployment API.
    #[must_use]
    pub fn deployments(&self) -> DeploymentsApi {
        DeploymentsApi::new(self.rest.clone())
    }

    /// Infrastructure host API.
    #[must_use]
    pub fn hosts(&self) -> InfraHostsApi {
        InfraHostsApi::new(self.rest.clone())
    }

    /// Router API.
    #[must_use]
    pub fn routers(&self) -> RoutersApi {
        RoutersApi::new(self.rest.clone())
    }

    /// Service API.
    #[must_use]
    pub fn services(&self) -> ServicesApi {
        ServicesApi::new(self.rest.clone())
    }
}
