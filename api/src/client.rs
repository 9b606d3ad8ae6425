use crate::params::Params;
use flate2::read::GzDecoder;
use log::{Level, Log, Metadata, Record};
use reqwest::Client;
use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_ENCODING, HeaderMap,
    HeaderName, HeaderValue, ORIGIN, PRAGMA, REFERER, USER_AGENT,
};
use serde::de::{DeserializeOwned, IgnoredAny};
use std::fmt;
use std::future::Future;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub type ApiResult<T> = Result<T, ApiError>;

/// Marker in a base URL that the endpoint fragment replaces.
pub const ENDPOINT_PLACEHOLDER: &str = "{endpoint}";
pub const STATS_BASE_URL: &str = "https://stats.nba.com/stats/{endpoint}";
pub const LIVE_BASE_URL: &str = "https://cdn.nba.com/static/json/liveData/{endpoint}";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const LOG_TARGET: &str = "nba_api";

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:126.0) Gecko/20100101 Firefox/126.0";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Could not build request for {1}: {0}")]
    Request(#[source] reqwest::Error, String),
    #[error("Could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Network error for {1}: {0}")]
    Network(#[source] reqwest::Error, String),
    #[error("Request cancelled: {0}")]
    Cancelled(String),
    #[error("Could not decompress gzip body from {1}: {0}")]
    Decompress(#[source] std::io::Error, String),
    #[error("Could not read response body from {1}: {0}")]
    Body(#[source] reqwest::Error, String),
    #[error("Invalid JSON from {0}")]
    InvalidJson(String),
    #[error("Parse error for {1}: {0}")]
    Decode(#[source] serde_json::Error, String),
    #[error("Could not encode {1}: {0}")]
    Encode(#[source] serde_json::Error, String),
    #[error("Data set not found: {0}")]
    DataSetNotFound(String),
    #[error("Row index {index} out of range for {len} rows")]
    RowOutOfRange { index: usize, len: usize },
    #[error("Missing required parameter {param} for {endpoint}")]
    MissingParameter { endpoint: String, param: String },
    #[error("Invalid value {value:?} for parameter {param} of {endpoint}")]
    InvalidParameter {
        endpoint: String,
        param: String,
        value: String,
    },
}

/// Per-call deadline and cancellation. The default has neither: the
/// client's own timeout applies and nothing can cancel the call early.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    timeout: Option<Duration>,
    cancellation: Option<CancellationToken>,
}

impl RequestContext {
    pub fn background() -> Self {
        Self::default()
    }

    /// Override the client's timeout for this call only.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Abort the in-flight request once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    async fn run<F: Future>(&self, url: &str, fut: F) -> ApiResult<F::Output> {
        match &self.cancellation {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(ApiError::Cancelled(url.to_owned())),
                output = fut => Ok(output),
            },
            None => Ok(fut.await),
        }
    }
}

/// Everything a client needs to know before its first request.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// May contain one `{endpoint}` placeholder.
    pub base_url: String,
    /// Sent with every request.
    pub headers: HeaderMap,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// stats.nba.com with the browser-like headers it insists on.
    pub fn stats() -> Self {
        Self {
            headers: stats_headers(),
            ..Self::new(STATS_BASE_URL)
        }
    }

    /// cdn.nba.com live data feeds.
    pub fn live() -> Self {
        Self {
            headers: live_headers(),
            ..Self::new(LIVE_BASE_URL)
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Headers for the live CDN. Plain requests without a browser user agent get
/// blocked there as well.
pub fn live_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    // Only gzip is decoded here, so it is the only encoding offered.
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

pub fn stats_headers() -> HeaderMap {
    let mut headers = live_headers();
    headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
    headers.insert(
        HeaderName::from_static("x-nba-stats-origin"),
        HeaderValue::from_static("stats"),
    );
    headers.insert(
        HeaderName::from_static("x-nba-stats-token"),
        HeaderValue::from_static("true"),
    );
    headers
}

/// Forwards to whatever logger the host application installed with the
/// `log` crate. Used when no logger is injected.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostLogger;

impl Log for HostLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            log::logger().log(record);
        }
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// NBA Stats / Live Data client.
///
/// One client talks to one base URL; use [`NbaApi::stats`] for the tabular
/// stats endpoints and [`NbaApi::live`] for the live feeds. Cloning is cheap
/// and clones share the connection pool.
#[derive(Clone)]
pub struct NbaApi {
    client: Client,
    base_url: String,
    headers: HeaderMap,
    timeout: Duration,
    logger: Arc<dyn Log>,
}

impl Default for NbaApi {
    fn default() -> Self {
        Self::stats()
    }
}

impl fmt::Debug for NbaApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NbaApi")
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl NbaApi {
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialised. Use
    /// [`NbaApi::try_from_config`] to get that failure as an error.
    pub fn from_config(config: ClientConfig) -> Self {
        Self::with_parts(Client::new(), config)
    }

    pub fn try_from_config(config: ClientConfig) -> ApiResult<Self> {
        let client = Client::builder().build().map_err(ApiError::Client)?;
        Ok(Self::with_parts(client, config))
    }

    fn with_parts(client: Client, config: ClientConfig) -> Self {
        Self {
            client,
            base_url: config.base_url,
            headers: config.headers,
            timeout: config.timeout,
            logger: Arc::new(HostLogger),
        }
    }

    pub fn stats() -> Self {
        Self::from_config(ClientConfig::stats())
    }

    pub fn live() -> Self {
        Self::from_config(ClientConfig::live())
    }

    /// Send this client's log records to `logger` instead of the global one.
    pub fn with_logger(mut self, logger: Arc<dyn Log>) -> Self {
        self.logger = logger;
        self
    }

    /// Reuse an existing reqwest client (and its connection pool).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Issue exactly one GET for `endpoint` and return the body as text.
    ///
    /// The status code is not inspected; a 4xx/5xx with a readable body is
    /// still `Ok`.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        endpoint: &str,
        params: &Params,
    ) -> ApiResult<RawResponse> {
        let url = build_url(&self.base_url, endpoint, params);
        self.emit(Level::Debug, format_args!("GET {url}"), &[("url", url.as_str())]);

        let request = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .timeout(ctx.timeout.unwrap_or(self.timeout))
            .build()
            .map_err(|e| ApiError::Request(e, url.clone()))?;

        let response = ctx
            .run(&url, self.client.execute(request))
            .await?
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        let status = response.status().as_u16();
        let gzipped = is_gzip_encoded(response.headers());

        let bytes = ctx
            .run(&url, response.bytes())
            .await?
            .map_err(|e| ApiError::Body(e, url.clone()))?;
        let body = decode_body(&bytes, gzipped).map_err(|e| ApiError::Decompress(e, url.clone()))?;

        let status_text = status.to_string();
        self.emit(
            Level::Debug,
            format_args!("received {} bytes", body.len()),
            &[("url", url.as_str()), ("status", status_text.as_str())],
        );

        Ok(RawResponse { body, status, url })
    }

    /// Fetch `endpoint`, reject non-JSON bodies, then decode into `T`.
    /// Failures are logged here; the caller logs start and success.
    pub(crate) async fn fetch_json<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        name: &str,
        endpoint: &str,
        params: &Params,
    ) -> ApiResult<T> {
        let result = match self.get(ctx, endpoint, params).await {
            Ok(response) => response.decode::<T>(),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            self.log_failure(name, e);
        }
        result
    }

    pub(crate) fn log_start(&self, name: &str) {
        self.emit(Level::Info, format_args!("fetching {name}"), &[("endpoint", name)]);
    }

    pub(crate) fn log_success(&self, name: &str, what: &str, count: usize) {
        let count = count.to_string();
        self.emit(
            Level::Info,
            format_args!("{name} returned {count} {what}"),
            &[("endpoint", name), (what, count.as_str())],
        );
    }

    pub(crate) fn log_failure(&self, name: &str, error: &ApiError) {
        let detail = error.to_string();
        self.emit(
            Level::Error,
            format_args!("{name} failed: {detail}"),
            &[("endpoint", name), ("error", detail.as_str())],
        );
    }

    pub(crate) fn emit(&self, level: Level, message: fmt::Arguments<'_>, fields: &[(&str, &str)]) {
        let metadata = Metadata::builder().level(level).target(LOG_TARGET).build();
        if !self.logger.enabled(&metadata) {
            return;
        }
        self.logger.log(
            &Record::builder()
                .metadata(metadata)
                .args(message)
                .module_path_static(Some(module_path!()))
                .file_static(Some(file!()))
                .key_values(&fields)
                .build(),
        );
    }
}

/// Raw result of one request: body text, final status and the URL hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    body: String,
    status: u16,
    url: String,
}

impl RawResponse {
    pub fn new(body: impl Into<String>, status: u16, url: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            status,
            url: url.into(),
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True when the body parses as any JSON value.
    pub fn is_valid_json(&self) -> bool {
        serde_json::from_str::<IgnoredAny>(&self.body).is_ok()
    }

    /// JSON-validity gate, then structural decode.
    pub fn decode<T: DeserializeOwned>(&self) -> ApiResult<T> {
        if !self.is_valid_json() {
            return Err(ApiError::InvalidJson(self.url.clone()));
        }
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode(e, self.url.clone()))
    }
}

/// Substitute `endpoint` into `base_url` and append the encoded query.
///
/// An empty fragment leaves the base untouched. A base without a
/// placeholder gets the fragment joined on with `/`.
pub fn build_url(base_url: &str, endpoint: &str, params: &Params) -> String {
    let mut url = if endpoint.is_empty() {
        base_url.to_owned()
    } else if base_url.contains(ENDPOINT_PLACEHOLDER) {
        base_url.replacen(ENDPOINT_PLACEHOLDER, endpoint, 1)
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    };

    let query = params.to_query_string();
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }
    url
}

fn is_gzip_encoded(headers: &HeaderMap) -> bool {
    headers.get_all(CONTENT_ENCODING).iter().any(|value| {
        value
            .to_str()
            .is_ok_and(|v| v.to_ascii_lowercase().contains("gzip"))
    })
}

/// Turn body bytes into text, gunzipping first when the response said so.
/// A broken gzip stream is an error, never passed through as-is.
pub fn decode_body(bytes: &[u8], gzipped: bool) -> std::io::Result<String> {
    if !gzipped {
        return Ok(String::from_utf8_lossy(bytes).into_owned());
    }
    let mut decoded = Vec::with_capacity(bytes.len() * 4);
    GzDecoder::new(bytes).read_to_end(&mut decoded)?;
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}
