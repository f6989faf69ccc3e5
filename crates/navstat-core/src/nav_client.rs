//! Retry-fetch client for per-ISIN NAV history.
//!
//! Each attempt issues one GET to `<base>/<ISIN>.json` carrying a fixed set
//! of browser identification headers plus the authentication token, then
//! validates the payload shape. Failures are retried under the configured
//! [`RetryPolicy`] unless the transport reports them as permanent; once the
//! policy gives up the last error is handed back with its attempt count.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{
    ACCEPT, CSRF_HEADER, NAV_BASE_URL, REFERER, REQUEST_TIMEOUT_MS, SEC_CH_UA, SEC_CH_UA_MOBILE,
    SEC_CH_UA_PLATFORM, USER_AGENT,
};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::retry::{RetryPolicy, Retryable};
use crate::Isin;

/// Classification of a single failed fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The request never produced a response.
    Transport,
    /// The upstream answered with a non-2xx status.
    Status,
    /// The body is not JSON.
    Decode,
    /// JSON without a success indicator or without a `data` field.
    InvalidPayload,
}

/// Structured fetch failure, carrying how many attempts were spent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    retryable: bool,
    attempts: u32,
}

impl FetchError {
    fn new(kind: FetchErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            attempts: 1,
        }
    }

    pub fn transport(message: impl Into<String>, retryable: bool) -> Self {
        Self::new(FetchErrorKind::Transport, message, retryable)
    }

    pub fn status(status: u16) -> Self {
        Self::new(
            FetchErrorKind::Status,
            format!("upstream returned status {status}"),
            true,
        )
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Decode, message, true)
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::InvalidPayload, message, true)
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::Transport => "fetch.transport",
            FetchErrorKind::Status => "fetch.status",
            FetchErrorKind::Decode => "fetch.decode",
            FetchErrorKind::InvalidPayload => "fetch.invalid_payload",
        }
    }
}

impl Retryable for FetchError {
    fn retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, after {} attempt(s))",
            self.message,
            self.code(),
            self.attempts
        )
    }
}

impl std::error::Error for FetchError {}

/// Validated upstream document: success indicator plus raw `data` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct NavPayload {
    pub data: Value,
}

impl NavPayload {
    /// Accept a response body only if it is JSON with `status == "success"`
    /// and a `data` field.
    pub fn parse(isin: &Isin, body: &str) -> Result<Self, FetchError> {
        let mut document: Value = serde_json::from_str(body)
            .map_err(|e| FetchError::decode(format!("response for {isin} is not JSON: {e}")))?;

        let succeeded = document.get("status").and_then(Value::as_str) == Some("success");
        if !succeeded {
            return Err(FetchError::invalid_payload(format!(
                "invalid response format for ISIN {isin}: status is not success"
            )));
        }

        let data = document
            .get_mut("data")
            .map(Value::take)
            .ok_or_else(|| {
                FetchError::invalid_payload(format!(
                    "invalid response format for ISIN {isin}: missing data field"
                ))
            })?;

        Ok(Self { data })
    }
}

/// Source of validated NAV payloads, the seam the orchestrator depends on.
pub trait NavSource: Send + Sync {
    fn fetch_nav<'a>(
        &'a self,
        isin: &'a Isin,
    ) -> Pin<Box<dyn Future<Output = Result<NavPayload, FetchError>> + Send + 'a>>;
}

/// Authentication header expected by the upstream NAV host.
pub fn csrf_auth(token: impl Into<String>) -> HttpAuth {
    HttpAuth::Header {
        name: String::from(CSRF_HEADER),
        value: token.into(),
    }
}

/// HTTP-backed [`NavSource`] with bounded, jittered retries.
pub struct NavClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    headers: BTreeMap<String, String>,
    retry_policy: RetryPolicy,
}

impl NavClient {
    pub fn new(http_client: Arc<dyn HttpClient>, auth: HttpAuth) -> Self {
        Self {
            http_client,
            base_url: String::from(NAV_BASE_URL),
            headers: identification_headers(&auth),
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Headers sent with every attempt.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn url_for(&self, isin: &Isin) -> String {
        format!(
            "{}/{}.json",
            self.base_url,
            urlencoding::encode(isin.as_str())
        )
    }

    async fn fetch_once(&self, isin: &Isin) -> Result<NavPayload, FetchError> {
        let request = HttpRequest::get(self.url_for(isin))
            .with_headers(&self.headers)
            .with_timeout_ms(REQUEST_TIMEOUT_MS);

        debug!(%isin, url = %request.url, "requesting nav history");
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| FetchError::transport(e.message(), e.retryable()))?;

        if !response.is_success() {
            return Err(FetchError::status(response.status));
        }

        NavPayload::parse(isin, &response.body)
    }

    /// Fetch with up to `max_attempts` tries, sleeping a jittered delay
    /// between them.
    pub async fn fetch_with_retry(&self, isin: &Isin) -> Result<NavPayload, FetchError> {
        let max_attempts = self.retry_policy.max_attempts();
        let mut attempt = 1;

        loop {
            match self.fetch_once(isin).await {
                Ok(payload) => {
                    if attempt > 1 {
                        debug!(%isin, attempt, "nav fetch recovered after retry");
                    }
                    return Ok(payload);
                }
                Err(error) if self.retry_policy.should_retry(attempt, &error) => {
                    let delay = self.retry_policy.delay();
                    warn!(
                        %isin,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error.message(),
                        code = error.code(),
                        "nav fetch attempt failed, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(error) => return Err(error.with_attempts(attempt)),
            }
        }
    }
}

impl NavSource for NavClient {
    fn fetch_nav<'a>(
        &'a self,
        isin: &'a Isin,
    ) -> Pin<Box<dyn Future<Output = Result<NavPayload, FetchError>> + Send + 'a>> {
        Box::pin(self.fetch_with_retry(isin))
    }
}

fn identification_headers(auth: &HttpAuth) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    for (name, value) in [
        ("sec-ch-ua-platform", SEC_CH_UA_PLATFORM),
        ("referer", REFERER),
        ("user-agent", USER_AGENT),
        ("accept", ACCEPT),
        ("sec-ch-ua", SEC_CH_UA),
        ("sec-ch-ua-mobile", SEC_CH_UA_MOBILE),
    ] {
        headers.insert(name.to_owned(), value.to_owned());
    }
    auth.apply(&mut headers);
    headers
}
