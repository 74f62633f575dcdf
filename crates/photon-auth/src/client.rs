//! OIDC token client for the Lightwave identity service.

use photon_core::config::normalize_endpoint;
use photon_core::{translate_error, ApiError, Error, Result};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use tracing::{debug, warn};

use crate::models::{EncodedCert, OidcErrorBody, OidcTokens, TokenResponse};

const USER_AGENT: &str = concat!("photon-auth/", env!("CARGO_PKG_VERSION"));

/// Scope requested when none is configured.
pub const DEFAULT_TOKEN_SCOPE: &str = "openid offline_access";

const CERT_DOWNLOAD_PATH: &str = "/afd/vecs/ssl";
const TOKEN_PATH: &str = "/openidconnect/token";

/// Root certificates published by the identity service in one PEM entry.
///
/// An entry may carry a chain; every certificate in it is kept and trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootCertificate {
    pem: String,
    certificates: Vec<Vec<u8>>,
}

impl RootCertificate {
    /// Parse every certificate in a PEM entry.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let mut reader = pem.as_bytes();
        let certificates = rustls_pemfile::certs(&mut reader)
            .map(|cert| cert.map(|der| der.to_vec()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|err| Error::MalformedResponse(format!("Invalid PEM certificate: {err}")))?;
        if certificates.is_empty() {
            return Err(Error::MalformedResponse("No PEM certificate found".into()));
        }

        Ok(Self {
            pem: pem.to_string(),
            certificates,
        })
    }

    /// PEM text as served.
    #[must_use]
    pub fn pem(&self) -> &str {
        &self.pem
    }

    /// DER bytes of each certificate, in PEM order.
    #[must_use]
    pub fn der_certificates(&self) -> &[Vec<u8>] {
        &self.certificates
    }

    /// Convert into certificates the HTTP client can trust.
    pub fn to_reqwest(&self) -> Result<Vec<reqwest::Certificate>> {
        self.certificates
            .iter()
            .map(|der| {
                reqwest::Certificate::from_der(der)
                    .map_err(|err| Error::ConfigError(format!("Invalid root certificate: {err}")))
            })
            .collect()
    }
}

/// Options for [`OidcClient`].
#[derive(Debug, Clone)]
pub struct OidcClientOptions {
    /// Skip TLS certificate verification
    pub ignore_certificate: bool,
    /// Additional trusted roots
    pub root_certificates: Vec<RootCertificate>,
    /// Scope requested by the password grant
    pub token_scope: String,
}

impl OidcClientOptions {
    /// Default options: verify TLS, default scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ignore_certificate: false,
            root_certificates: Vec::new(),
            token_scope: DEFAULT_TOKEN_SCOPE.to_string(),
        }
    }

    /// Skip TLS certificate verification.
    #[must_use]
    pub fn with_ignore_certificate(mut self, ignore: bool) -> Self {
        self.ignore_certificate = ignore;
        self
    }

    /// Trust an additional root certificate.
    #[must_use]
    pub fn with_root_certificate(mut self, certificate: RootCertificate) -> Self {
        self.root_certificates.push(certificate);
        self
    }

    /// Request a different scope. An empty scope keeps the default.
    #[must_use]
    pub fn with_token_scope(mut self, scope: impl Into<String>) -> Self {
        let scope = scope.into();
        if !scope.is_empty() {
            self.token_scope = scope;
        }
        self
    }
}

impl Default for OidcClientOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the OIDC endpoints of the identity service.
#[derive(Clone)]
pub struct OidcClient {
    http: Client,
    endpoint: String,
    options: OidcClientOptions,
}

impl fmt::Debug for OidcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OidcClient")
            .field("endpoint", &self.endpoint)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl OidcClient {
    /// Create a client for `endpoint`; trailing `/` are stripped.
    pub fn new(endpoint: impl AsRef<str>, options: OidcClientOptions) -> Result<Self> {
        let endpoint = normalize_endpoint(endpoint.as_ref());
        url::Url::parse(&endpoint)?;

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if options.ignore_certificate {
            warn!(endpoint = %endpoint, "TLS verification disabled for OIDC client");
            builder = builder.danger_accept_invalid_certs(true);
        }
        for entry in &options.root_certificates {
            for cert in entry.to_reqwest()? {
                builder = builder.add_root_certificate(cert);
            }
        }
        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            endpoint,
            options,
        })
    }

    /// Endpoint without trailing `/`.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Options in effect.
    #[must_use]
    pub fn options(&self) -> &OidcClientOptions {
        &self.options
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    /// Download the identity service's root certificates.
    ///
    /// This is the trust bootstrap: the certificates are not known yet, so the
    /// download uses a one-off connection that does not verify the server.
    pub async fn get_root_certs(&self) -> Result<Vec<RootCertificate>> {
        let url = self.url_for(CERT_DOWNLOAD_PATH);
        warn!(url = %url, "Fetching root certificates without TLS verification");

        let bootstrap = Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        let response = bootstrap
            .get(&url)
            .send()
            .await
            .map_err(|err| Error::TransportUnavailable(format!("GET {url} failed: {err}")))?;
        let status = response.status();
        let body = read_body(response, CERT_DOWNLOAD_PATH).await?;

        if status != StatusCode::OK {
            return Err(Error::Api(translate_error(status, &body)));
        }

        let entries: Vec<EncodedCert> = serde_json::from_str(&body).map_err(|err| {
            Error::MalformedResponse(format!("Failed to parse root certificate list: {err}"))
        })?;

        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                RootCertificate::from_pem(&entry.encoded).map_err(|err| {
                    Error::MalformedResponse(format!(
                        "Unexpected response format in certificate {index}: {err}"
                    ))
                })
            })
            .collect()
    }

    /// Exchange user credentials for tokens.
    pub async fn get_token_by_password_grant(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<OidcTokens> {
        let form = [
            ("grant_type", "password"),
            ("username", username),
            ("password", password.expose_secret()),
            ("scope", self.options.token_scope.as_str()),
        ];
        self.request_token(&form).await
    }

    /// Exchange a refresh token for a new access token.
    pub async fn get_token_by_refresh_token_grant(
        &self,
        refresh_token: &SecretString,
    ) -> Result<OidcTokens> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose_secret()),
        ];
        self.request_token(&form).await
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<OidcTokens> {
        let url = self.url_for(TOKEN_PATH);
        debug!(url = %url, "Requesting OIDC token");

        let response = self
            .http
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(|err| Error::TransportUnavailable(format!("POST {url} failed: {err}")))?;
        let status = response.status();
        let body = read_body(response, TOKEN_PATH).await?;

        if !status.is_success() {
            return Err(Error::Api(translate_oidc_error(status, &body)));
        }

        let wire: TokenResponse = serde_json::from_str(&body).map_err(|err| {
            Error::MalformedResponse(format!("Failed to parse token response: {err}"))
        })?;
        Ok(wire.into())
    }
}

async fn read_body(response: reqwest::Response, path: &str) -> Result<String> {
    response.text().await.map_err(|err| {
        Error::TransportUnavailable(format!("Failed to read response body for `{path}`: {err}"))
    })
}

/// Translate an OIDC error response into an [`ApiError`].
#[must_use]
pub fn translate_oidc_error(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<OidcErrorBody>(body) {
        Ok(error) => ApiError::new(error.error, error.error_description, status.as_u16()),
        Err(err) => ApiError::malformed(status, body, err),
    }
}
