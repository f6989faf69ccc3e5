//! Behavior-driven tests for the retry-fetch client
//!
//! These tests verify HOW NAV retrieval reacts to flaky upstream behavior:
//! how many attempts are spent, which failures are retried, and what the
//! caller sees once the attempt cap is reached.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use navstat_core::{
    csrf_auth, FetchErrorKind, HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, Isin,
    NavClient, NavSource, RetryPolicy,
};

const VALID_BODY: &str = r#"{"status":"success","data":[[1704067200,10.0],[1704153600,10.5]]}"#;

/// Transport that replays a fixed script of outcomes and records requests.
#[derive(Default)]
struct ScriptedHttpClient {
    script: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    fn new(script: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().expect("lock").len()
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests.lock().expect("lock").push(request);
        let next = self
            .script
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::non_retryable("script exhausted")));
        Box::pin(async move { next })
    }
}

fn isin() -> Isin {
    Isin::parse("INF209K01YN0").expect("valid isin")
}

fn client(http: Arc<ScriptedHttpClient>) -> NavClient {
    NavClient::new(http, csrf_auth("csrf-token")).with_retry_policy(RetryPolicy::immediate(5))
}

fn invalid_payload() -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::ok_json(r#"{"status":"error","message":"throttled"}"#))
}

// =============================================================================
// Retry: Attempt Cap
// =============================================================================

#[tokio::test]
async fn when_first_four_attempts_fail_validation_fifth_attempt_succeeds() {
    // Given: An upstream that rejects four times, then answers properly
    let http = ScriptedHttpClient::new(vec![
        invalid_payload(),
        invalid_payload(),
        invalid_payload(),
        invalid_payload(),
        Ok(HttpResponse::ok_json(VALID_BODY)),
    ]);
    let client = client(http.clone());

    // When: The NAV history is fetched
    let payload = client.fetch_nav(&isin()).await;

    // Then: The fifth attempt's payload is returned
    let payload = payload.expect("fifth attempt should succeed");
    assert_eq!(payload.data.as_array().map(Vec::len), Some(2));
    assert_eq!(http.calls(), 5);
}

#[tokio::test]
async fn when_all_five_attempts_fail_caller_receives_last_error() {
    // Given: An upstream that keeps failing, with a good answer queued after the cap
    let http = ScriptedHttpClient::new(vec![
        Err(HttpError::new("connection reset")),
        Ok(HttpResponse { status: 503, body: String::new() }),
        invalid_payload(),
        Ok(HttpResponse::ok_json("not json")),
        Ok(HttpResponse::ok_json(r#"{"status":"success"}"#)),
        Ok(HttpResponse::ok_json(VALID_BODY)),
    ]);
    let client = client(http.clone());

    // When: The NAV history is fetched
    let error = client.fetch_nav(&isin()).await.expect_err("cap must be enforced");

    // Then: Exactly five attempts were made and the fifth failure surfaces
    assert_eq!(http.calls(), 5, "no sixth attempt may be made");
    assert_eq!(error.attempts(), 5);
    assert_eq!(error.kind(), FetchErrorKind::InvalidPayload);
    assert!(error.message().contains("missing data"), "{}", error.message());
}

#[tokio::test]
async fn when_first_attempt_succeeds_no_retry_is_made() {
    // Given: A healthy upstream
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(VALID_BODY))]);
    let client = client(http.clone());

    // When: The NAV history is fetched
    let result = client.fetch_nav(&isin()).await;

    // Then: One request suffices
    assert!(result.is_ok());
    assert_eq!(http.calls(), 1);
}

// =============================================================================
// Retry: Failure Classification
// =============================================================================

#[tokio::test]
async fn when_upstream_returns_error_status_it_is_retried() {
    // Given: A rate-limited upstream that recovers
    let http = ScriptedHttpClient::new(vec![
        Ok(HttpResponse { status: 429, body: String::from("slow down") }),
        Ok(HttpResponse::ok_json(VALID_BODY)),
    ]);
    let client = client(http.clone());

    // When: The NAV history is fetched
    let result = client.fetch_nav(&isin()).await;

    // Then: The status failure was retried
    assert!(result.is_ok());
    assert_eq!(http.calls(), 2);
}

#[tokio::test]
async fn when_transport_error_is_permanent_fetch_stops_immediately() {
    // Given: A transport that cannot even build the request
    let http = ScriptedHttpClient::new(vec![
        Err(HttpError::non_retryable("invalid request: bad url")),
        Ok(HttpResponse::ok_json(VALID_BODY)),
    ]);
    let client = client(http.clone());

    // When: The NAV history is fetched
    let error = client.fetch_nav(&isin()).await.expect_err("must fail");

    // Then: No further attempts are spent
    assert_eq!(http.calls(), 1);
    assert_eq!(error.kind(), FetchErrorKind::Transport);
    assert_eq!(error.attempts(), 1);
}

#[tokio::test]
async fn when_attempt_cap_is_one_validation_failures_are_final() {
    // Given: A client configured for a single attempt
    let http = ScriptedHttpClient::new(vec![invalid_payload(), Ok(HttpResponse::ok_json(VALID_BODY))]);
    let client = NavClient::new(http.clone(), csrf_auth("t")).with_retry_policy(RetryPolicy::immediate(1));

    // When: The NAV history is fetched
    let error = client.fetch_nav(&isin()).await.expect_err("must fail");

    // Then: The first failure is returned as-is
    assert_eq!(error.kind(), FetchErrorKind::InvalidPayload);
    assert_eq!(http.calls(), 1);
}

// =============================================================================
// Request Shape
// =============================================================================

#[tokio::test]
async fn every_attempt_carries_the_same_identification_headers() {
    // Given: An upstream that needs one retry
    let http = ScriptedHttpClient::new(vec![invalid_payload(), Ok(HttpResponse::ok_json(VALID_BODY))]);
    let client = client(http.clone());

    // When: The NAV history is fetched
    client.fetch_nav(&isin()).await.expect("second attempt succeeds");

    // Then: Both requests hit the ISIN url with identical static headers
    let requests = http.requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(
            request.url,
            "https://staticassets.zerodha.com/coin/historical-nav/INF209K01YN0.json"
        );
        assert_eq!(
            request.headers.get("x-csrftoken").map(String::as_str),
            Some("csrf-token")
        );
        assert_eq!(
            request.headers.get("referer").map(String::as_str),
            Some("https://coin.zerodha.com/")
        );
        assert!(request.headers.contains_key("user-agent"));
        assert!(request.headers.contains_key("sec-ch-ua"));
    }
    assert_eq!(requests[0].headers, requests[1].headers);
}

#[tokio::test]
async fn bearer_auth_can_replace_the_csrf_header() {
    // Given: A client authenticated with a bearer token
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(VALID_BODY))]);
    let client = NavClient::new(http.clone(), HttpAuth::BearerToken(String::from("tok")))
        .with_retry_policy(RetryPolicy::immediate(5));

    // When: The NAV history is fetched
    client.fetch_nav(&isin()).await.expect("fetch succeeds");

    // Then: The authorization header is used instead
    let request = &http.requests()[0];
    assert_eq!(
        request.headers.get("authorization").map(String::as_str),
        Some("Bearer tok")
    );
    assert!(!request.headers.contains_key("x-csrftoken"));
}
