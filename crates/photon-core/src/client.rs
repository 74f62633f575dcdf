//! HTTP transport, resource operation executor and poll timing policy.
//!
//! [`RestClient`] is the only component that talks to the network. It injects the
//! bearer token, hands non-2xx responses to [`translate_error`], decodes 2xx bodies
//! and follows `nextPageLink` for collection endpoints. It never retries: the task
//! poller is the only loop in the core, and it re-reads task status rather than
//! re-issuing requests.

use reqwest::{Client, ClientBuilder, Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument::WithSubscriber;
use tracing::{debug, trace, warn, Dispatch};
use url::Url;
use validator::Validate;

use crate::config::{normalize_endpoint, ClientOptions};
use crate::credentials::{CredentialProvider, NoCredentials};
use crate::error::{translate_error, Error, Result};
use crate::page::Page;
use crate::task::Task;

const USER_AGENT: &str = concat!("photon-core/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

// Task polling settings

/// Default delay between task polls in milliseconds
pub const DEFAULT_TASK_POLL_INTERVAL_MS: u64 = 1000;

/// Default cap on the delay between task polls in milliseconds
pub const DEFAULT_TASK_POLL_MAX_INTERVAL_MS: u64 = 30_000;

/// Default time to wait for a task to finish, in milliseconds
pub const DEFAULT_TASK_POLL_TIMEOUT_MS: u64 = 30 * 60 * 1000;

/// Shortest delay between task polls
pub const MIN_TASK_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Timing policy for task polling.
///
/// The wait before poll `n + 1` is `min(interval * multiplier^(n-1), max_interval)`.
/// With the default multiplier of 1 this is a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay after the first non-terminal poll
    pub interval: Duration,

    /// Maximum delay between polls (cap for exponential backoff)
    pub max_interval: Duration,

    /// Backoff multiplier applied after each poll
    pub backoff_multiplier: u32,

    /// Overall bound on polling; `None` polls until a terminal state
    pub timeout: Option<Duration>,
}

impl PollPolicy {
    /// Create a poll policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_TASK_POLL_INTERVAL_MS),
            max_interval: Duration::from_millis(DEFAULT_TASK_POLL_MAX_INTERVAL_MS),
            backoff_multiplier: 1,
            timeout: Some(Duration::from_millis(DEFAULT_TASK_POLL_TIMEOUT_MS)),
        }
    }

    /// Set the poll interval. Intervals below [`MIN_TASK_POLL_INTERVAL`] are raised to it.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = if interval.is_zero() {
            MIN_TASK_POLL_INTERVAL
        } else {
            interval
        };
        self
    }

    /// Set the maximum interval.
    #[must_use]
    pub const fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    /// Set the backoff multiplier.
    #[must_use]
    pub const fn with_backoff_multiplier(mut self, multiplier: u32) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set the polling timeout. A zero duration means no bound.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = if timeout.is_zero() { None } else { Some(timeout) };
        self
    }

    /// Poll until a terminal state is observed, however long it takes.
    #[must_use]
    pub const fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Calculate the delay that follows poll number `attempt` (1-based).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_secs(0);
        }

        let multiplier = self.backoff_multiplier.max(1).saturating_pow(attempt - 1);
        let interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX);
        let delay = Duration::from_millis(interval_ms.saturating_mul(u64::from(multiplier)));

        std::cmp::min(delay, self.max_interval).max(MIN_TASK_POLL_INTERVAL)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP connection settings.
///
/// The per-request timeout is not part of this struct; it comes from
/// [`ClientOptions::request_timeout`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_compression: true,
        }
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`RestClient`].
#[derive(Clone)]
pub struct RestClientBuilder {
    options: ClientOptions,
    http_config: ClientConfig,
    credentials: Arc<dyn CredentialProvider>,
    root_certificates: Vec<reqwest::Certificate>,
    user_agent: String,
    dispatch: Option<Dispatch>,
}

impl fmt::Debug for RestClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClientBuilder")
            .field("options", &self.options)
            .field("http_config", &self.http_config)
            .field("root_certificates", &self.root_certificates.len())
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl RestClientBuilder {
    /// Create a builder from client options.
    #[must_use]
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options,
            http_config: ClientConfig::new(),
            credentials: Arc::new(NoCredentials),
            root_certificates: Vec::new(),
            user_agent: USER_AGENT.to_string(),
            dispatch: None,
        }
    }

    /// Override the HTTP connection settings.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Supply bearer tokens from a credential provider.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Trust an additional root certificate.
    #[must_use]
    pub fn with_root_certificate(mut self, certificate: reqwest::Certificate) -> Self {
        self.root_certificates.push(certificate);
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Route this client's log events to `dispatch` instead of the ambient subscriber.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: impl Into<Dispatch>) -> Self {
        self.dispatch = Some(dispatch.into());
        self
    }

    /// Finalise the builder and create the [`RestClient`].
    pub fn build(self) -> Result<RestClient> {
        let mut options = self.options;
        options.endpoint = normalize_endpoint(&options.endpoint);
        options.validate()?;
        Url::parse(&options.endpoint)?;

        let http_config = self.http_config;

        let mut builder = ClientBuilder::new()
            .user_agent(self.user_agent)
            .timeout(options.request_timeout())
            .pool_idle_timeout(http_config.pool_idle_timeout)
            .pool_max_idle_per_host(http_config.pool_max_idle_per_host)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT));

        if !http_config.enable_compression {
            builder = builder.no_gzip();
        }

        if options.ignore_certificate {
            let endpoint = options.endpoint.as_str();
            let log = || warn!(endpoint, "TLS verification disabled for Photon client");
            match &self.dispatch {
                Some(dispatch) => tracing::dispatcher::with_default(dispatch, log),
                None => log(),
            }
            builder = builder.danger_accept_invalid_certs(true);
        }

        for ca_cert in &options.root_ca_paths {
            debug!("loading Photon CA certificate from {}", ca_cert.display());
            let bytes = std::fs::read(ca_cert).map_err(|err| {
                Error::ConfigError(format!(
                    "Failed to read CA certificate {}: {err}",
                    ca_cert.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&bytes)
                .map_err(|err| Error::ConfigError(format!("Invalid CA certificate: {err}")))?;
            builder = builder.add_root_certificate(cert);
        }

        for cert in self.root_certificates {
            builder = builder.add_root_certificate(cert);
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(RestClient {
            inner: Arc::new(Inner {
                http,
                endpoint: options.endpoint.clone(),
                credentials: self.credentials,
                dispatch: self.dispatch,
                options,
            }),
        })
    }
}

struct Inner {
    http: Client,
    endpoint: String,
    credentials: Arc<dyn CredentialProvider>,
    dispatch: Option<Dispatch>,
    options: ClientOptions,
}

/// Raw HTTP exchange result: status plus unread-as-JSON body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Response status
    pub status: StatusCode,
    /// Response body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Body as lossy UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Asynchronous client for the Photon REST API.
///
/// Cloning is cheap; clones share one immutable configuration snapshot and one
/// connection pool, so a single client can serve concurrent callers.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<Inner>,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("endpoint", &self.inner.endpoint)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Construct a client for `endpoint` with default options and no credentials.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        RestClientBuilder::new(ClientOptions::new(endpoint)?).build()
    }

    /// Start a builder pre-populated with the provided options.
    #[must_use]
    pub fn builder(options: ClientOptions) -> RestClientBuilder {
        RestClientBuilder::new(options)
    }

    /// Base endpoint, never ending in `/`.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Options the client was built with.
    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    /// Poll policy derived from the client options.
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        self.inner.options.poll_policy()
    }

    /// Run `future` with this client's log dispatcher, if one was injected.
    pub async fn scoped<F>(&self, future: F) -> F::Output
    where
        F: Future,
    {
        match &self.inner.dispatch {
            Some(dispatch) => future.with_subscriber(dispatch.clone()).await,
            None => future.await,
        }
    }

    /// Resolve a resource path or server-supplied link against the endpoint.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.inner.endpoint)
        } else {
            format!("{}/{path}", self.inner.endpoint)
        }
    }

    /// Perform one HTTP exchange without interpreting the status code.
    ///
    /// Fails only when no response was received.
    pub async fn request<B>(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        let payload = body
            .map(|payload| {
                serde_json::to_vec(payload).map_err(|err| {
                    Error::InvalidRequest(format!("Failed to serialize body for `{path}`: {err}"))
                })
            })
            .transpose()?;
        self.exchange(method, path, params, payload).await
    }

    /// Perform an exchange and translate any non-2xx response into [`Error::Api`].
    pub async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        check_status(self.request(method, path, params, body).await?)
    }

    // A `Some` payload is sent with a JSON content type, even when empty.
    async fn exchange(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        payload: Option<Vec<u8>>,
    ) -> Result<RawResponse> {
        let url = self.url_for(path);
        let mut request = self
            .inner
            .http
            .request(method.clone(), &url)
            .header("Accept", "application/json");

        if !params.is_empty() {
            request = request.query(params);
        }

        if let Some(token) = self.inner.credentials.access_token().await? {
            request = request.bearer_auth(token.expose_secret());
        }

        if let Some(bytes) = payload {
            request = request
                .header("Content-Type", "application/json")
                .body(bytes);
        }

        debug!(%method, url = %url, "Sending Photon request");

        let response = request.send().await.map_err(|err| {
            Error::TransportUnavailable(format!("{method} {url} failed: {err}"))
        })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            Error::TransportUnavailable(format!("Failed to read response body for `{path}`: {err}"))
        })?;

        trace!(%status, bytes = body.len(), "Received Photon response");

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }

    /// Send a request and decode the JSON response.
    pub async fn send_json<B, R>(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.scoped(async {
            let response = self.execute(method, path, params, body).await?;
            decode(path, &response.body)
        })
        .await
    }

    /// `GET` a single resource.
    pub async fn get_json<R>(&self, path: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        self.send_json::<(), R>(Method::GET, path, &[], None).await
    }

    /// `GET` every item of a collection, following `nextPageLink` until it is empty.
    ///
    /// Items are returned in the order the server listed them, page after page.
    pub async fn get_list<T>(&self, path: &str, params: &[(&'static str, String)]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.scoped(async {
            let first = self.execute::<()>(Method::GET, path, params, None).await?;
            let mut page: Page<T> = decode(path, &first.body)?;
            let mut items = Vec::new();

            loop {
                let next = page.next_link().map(str::to_owned);
                items.append(&mut page.items);

                let Some(link) = next else {
                    break;
                };

                trace!(link = %link, "Following next page link");
                let response = self.execute::<()>(Method::GET, &link, &[], None).await?;
                page = decode(&link, &response.body)?;
            }

            Ok(items)
        })
        .await
    }

    /// `POST` to a collection or action path and decode the returned task.
    pub async fn post_task<B>(&self, path: &str, body: Option<&B>) -> Result<Task>
    where
        B: Serialize + ?Sized,
    {
        match body {
            Some(payload) => self.send_json(Method::POST, path, &[], Some(payload)).await,
            None => self.send_empty(Method::POST, path).await,
        }
    }

    /// `PATCH` a resource and decode the returned task.
    pub async fn patch_task<B>(&self, path: &str, body: &B) -> Result<Task>
    where
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PATCH, path, &[], Some(body)).await
    }

    /// `DELETE` a resource and decode the returned task.
    pub async fn delete_task(&self, path: &str) -> Result<Task> {
        self.send_json::<(), Task>(Method::DELETE, path, &[], None)
            .await
    }

    // Action endpoints take an empty body with a JSON content type.
    async fn send_empty(&self, method: Method, path: &str) -> Result<Task> {
        self.scoped(async {
            let response = self.exchange(method, path, &[], Some(Vec::new())).await?;
            let response = check_status(response)?;
            decode(path, &response.body)
        })
        .await
    }
}

fn check_status(response: RawResponse) -> Result<RawResponse> {
    if response.status.is_success() {
        Ok(response)
    } else {
        Err(Error::Api(translate_error(response.status, &response.text())))
    }
}

fn decode<R>(path: &str, body: &[u8]) -> Result<R>
where
    R: DeserializeOwned,
{
    serde_json::from_slice(body).map_err(|err| {
        Error::MalformedResponse(format!("Failed to parse response for `{path}`: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticToken;
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> RestClient {
        RestClient::new(server.uri()).unwrap()
    }

    #[test]
    fn test_poll_policy_new() {
        let policy = PollPolicy::new();
        assert_eq!(policy.interval, Duration::from_millis(DEFAULT_TASK_POLL_INTERVAL_MS));
        assert_eq!(
            policy.max_interval,
            Duration::from_millis(DEFAULT_TASK_POLL_MAX_INTERVAL_MS)
        );
        assert_eq!(policy.backoff_multiplier, 1);
        assert_eq!(
            policy.timeout,
            Some(Duration::from_millis(DEFAULT_TASK_POLL_TIMEOUT_MS))
        );
    }

    #[test]
    fn test_poll_policy_fixed_interval() {
        let policy = PollPolicy::new();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(0));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(50), Duration::from_secs(1));
    }

    #[test]
    fn test_poll_policy_exponential_backoff() {
        let policy = PollPolicy::new()
            .with_interval(Duration::from_millis(100))
            .with_backoff_multiplier(2)
            .with_max_interval(Duration::from_secs(1));

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(800));

        // Capped at max_interval
        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_secs(1));
    }

    #[test]
    fn test_poll_policy_zero_timeout_is_unbounded() {
        let policy = PollPolicy::new().with_timeout(Duration::ZERO);
        assert_eq!(policy.timeout, None);
        assert_eq!(PollPolicy::new().without_timeout().timeout, None);
        assert_eq!(
            PollPolicy::new().with_timeout(Duration::from_secs(5)).timeout,
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_poll_policy_zero_interval_is_raised() {
        let policy = PollPolicy::new().with_interval(Duration::ZERO);
        assert_eq!(policy.interval, MIN_TASK_POLL_INTERVAL);
        assert_eq!(policy.delay_for_attempt(1), MIN_TASK_POLL_INTERVAL);

        let policy = PollPolicy {
            interval: Duration::ZERO,
            max_interval: Duration::ZERO,
            ..PollPolicy::new()
        };
        assert_eq!(policy.delay_for_attempt(3), MIN_TASK_POLL_INTERVAL);
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_pool_idle_timeout(Duration::from_secs(120))
            .with_pool_max_idle(20)
            .with_compression(false);

        assert_eq!(config.pool_idle_timeout, Duration::from_secs(120));
        assert_eq!(config.pool_max_idle_per_host, 20);
        assert!(!config.enable_compression);
    }

    #[test]
    fn endpoint_trailing_slashes_are_stripped() {
        for endpoint in ["http://10.146.1.0/", "http://10.146.1.0///", "http://10.146.1.0"] {
            let client = RestClient::new(endpoint).unwrap();
            assert_eq!(client.endpoint(), "http://10.146.1.0");
        }
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        assert!(RestClient::new("not-a-url").is_err());
    }

    #[test]
    fn url_for_resolves_paths_and_links() {
        let client = RestClient::new("https://photon.example.com:9000/").unwrap();
        assert_eq!(
            client.url_for("/deployments"),
            "https://photon.example.com:9000/deployments"
        );
        assert_eq!(
            client.url_for("tasks/t-1"),
            "https://photon.example.com:9000/tasks/t-1"
        );
        assert_eq!(
            client.url_for("https://other.example.com/hosts?pageLink=2"),
            "https://other.example.com/hosts?pageLink=2"
        );
    }

    #[tokio::test]
    async fn bearer_token_is_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/routers/r-1"))
            .and(header("Authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "r-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = RestClient::builder(ClientOptions::new(server.uri()).unwrap())
            .with_credentials(Arc::new(StaticToken::new("secret-token")))
            .build()
            .unwrap();

        let router: serde_json::Value = client.get_json("/routers/r-1").await.unwrap();
        assert_eq!(router["id"], "r-1");
    }

    #[tokio::test]
    async fn non_success_is_translated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": "TaskNotFound",
                "message": "Task missing not found"
            })))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .get_json::<Task>("/tasks/missing")
            .await
            .unwrap_err();

        let api = err.api_error().expect("api error");
        assert_eq!(api.code, "TaskNotFound");
        assert_eq!(api.http_status_code, 404);
    }

    #[tokio::test]
    async fn malformed_success_body_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks/t-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .get_json::<Task>("/tasks/t-1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn connection_failure_is_transport_unavailable() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let err = RestClient::new(uri)
            .unwrap()
            .get_json::<Task>("/tasks/t-1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TransportUnavailable(_)));
    }

    #[tokio::test]
    async fn get_list_follows_pages_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/deployments"))
            .and(query_param("pageLink", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": ["c", "d"],
                "nextPageLink": "/deployments?pageLink=p3"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/deployments"))
            .and(query_param("pageLink", "p3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": ["e"],
                "nextPageLink": ""
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/deployments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": ["a", "b"],
                "nextPageLink": "/deployments?pageLink=p2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let items: Vec<String> = test_client(&server)
            .get_list("/deployments", &[])
            .await
            .unwrap();
        assert_eq!(items, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn get_list_surfaces_errors_on_later_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hosts"))
            .and(query_param("pageLink", "p2"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/hosts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [1],
                "nextPageLink": "/hosts?pageLink=p2"
            })))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .get_list::<u32>("/hosts", &[])
            .await
            .unwrap_err();
        let api = err.api_error().unwrap();
        assert!(api.is_malformed());
        assert!(api.message.contains("Body: boom"));
    }

    #[tokio::test]
    async fn action_without_payload_sends_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/infrastructure/hosts/h-1/suspend"))
            .and(header("Content-Type", "application/json"))
            .and(body_string(""))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "t-5",
                "operation": "SUSPEND_HOST",
                "state": "QUEUED"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let task = test_client(&server)
            .post_task::<()>("/infrastructure/hosts/h-1/suspend", None)
            .await
            .unwrap();
        assert_eq!(task.operation, "SUSPEND_HOST");
    }

    #[tokio::test]
    async fn action_without_payload_shares_auth_and_error_handling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/infrastructure/hosts/h-1/resume"))
            .and(header("Authorization", "Bearer secret-token"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "InvalidHostState",
                "message": "Host h-1 is not suspended"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = RestClient::builder(ClientOptions::new(server.uri()).unwrap())
            .with_credentials(Arc::new(StaticToken::new("secret-token")))
            .build()
            .unwrap();

        let err = client
            .post_task::<()>("/infrastructure/hosts/h-1/resume", None)
            .await
            .unwrap_err();
        let api = err.api_error().unwrap();
        assert_eq!(api.code, "InvalidHostState");
        assert_eq!(api.http_status_code, 400);
    }

    #[tokio::test]
    async fn request_timeout_comes_from_options() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks/t-slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "t-slow", "state": "QUEUED"}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let options = ClientOptions::new(server.uri())
            .unwrap()
            .with_request_timeout(Duration::from_secs(1));
        let client = RestClient::builder(options)
            .with_http_config(ClientConfig::new().with_pool_max_idle(1))
            .build()
            .unwrap();

        let started = std::time::Instant::now();
        let err = client.get_json::<Task>("/tasks/t-slow").await.unwrap_err();
        assert!(matches!(err, Error::TransportUnavailable(_)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
