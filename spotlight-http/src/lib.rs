//! Minimal HTTP client with safe logging, retries, and browser-like defaults.
//!
//! - Request options: headers, query params, timeout, retries
//! - Default `User-Agent` / `Accept-Language` so profile pages render their embedded state
//! - Retries 429/5xx and transport failures with exponential backoff and `Retry-After` support
//! - Optional *raw* request/response logging via `SPOTLIGHT_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), spotlight_http::HttpError> {
//! let client = spotlight_http::HttpClient::new("https://www.instagram.com")?;
//! let html = client
//!     .get_text("alice/", spotlight_http::RequestOpts::default())
//!     .await?;
//! # let _ = html;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! headers, body snippets (truncated), retries, final errors, and (optionally)
//! raw request/response lines (target `http.raw`) when `SPOTLIGHT_HTTP_RAW=1`.

use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use std::borrow::Cow;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "SPOTLIGHT_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with cookies redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (key, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", key, val.replace('\'', r"'\''")));
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if matches!(
                key.to_ascii_lowercase().as_str(),
                "authorization" | "cookie" | "set-cookie"
            ) {
                val = "<redacted>".into();
            }
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

// ==============================
// Request Options
// ==============================

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use spotlight_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     retries: Some(1),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.allow_absolute == false);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>, // e.g. [("__a", "1".into())]
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL with browser-like default headers.
    ///
    /// ```no_run
    /// use spotlight_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://www.instagram.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.max_retries, 2);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        Self::with_identity(base, DEFAULT_USER_AGENT, DEFAULT_ACCEPT_LANGUAGE)
    }

    /// Like [`HttpClient::new`] but with a caller-chosen `User-Agent` and `Accept-Language`.
    pub fn with_identity(
        base: &str,
        user_agent: &str,
        accept_language: &str,
    ) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;

        let mut defaults = HeaderMap::new();
        defaults.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent.trim())
                .map_err(|e| HttpError::Build(format!("invalid user agent: {e}")))?,
        );
        defaults.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(accept_language.trim())
                .map_err(|e| HttpError::Build(format!("invalid accept-language: {e}")))?,
        );

        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .default_headers(defaults)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
            max_retries: 2,
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    ///
    /// ```no_run
    /// use spotlight_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://www.instagram.com")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Override the default retry budget returned by [`HttpClient::new`].
    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    /// GET a page body as text (lossy UTF-8).
    pub async fn get_text(&self, path: &str, opts: RequestOpts<'_>) -> Result<String, HttpError> {
        let bytes = self.send_with_retries(Method::GET, path, opts).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        self.base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    /// Run `opts`' request until it succeeds, fails for good, or the retry budget is spent.
    async fn send_with_retries(
        &self,
        method: Method,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<Vec<u8>, HttpError> {
        let url = self.resolve(path, opts.allow_absolute)?;
        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let mut attempt = 0usize;

        loop {
            let req_id = next_request_id();
            let failure = match self.send_once(&method, &url, &opts, &req_id).await {
                Ok(bytes) => return Ok(bytes),
                Err(failure) => failure,
            };

            if !failure.is_retryable() || attempt >= max_retries {
                tracing::warn!(%req_id, attempt, error = %failure, "http.failed");
                return Err(failure.into_error());
            }

            attempt += 1;
            let delay = failure.backoff(attempt);
            tracing::warn!(
                %req_id,
                attempt,
                max_retries,
                backoff_ms = delay.as_millis() as u64,
                reason = %failure,
                "http.retrying"
            );
            sleep(delay).await;
        }
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        opts: &RequestOpts<'_>,
        req_id: &str,
    ) -> Result<Vec<u8>, AttemptFailure> {
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let mut rb = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(timeout);
        if let Some(q) = &opts.query {
            let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }
        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }

        tracing::debug!(
            %req_id,
            %method,
            host_path = %format!("{}{}", url.domain().unwrap_or("-"), url.path()),
            timeout_ms = timeout.as_millis() as u64,
            "http.request.start"
        );
        if raw_enabled() {
            let empty = HeaderMap::new();
            let curl = make_curl(method, url, opts.headers.as_ref().unwrap_or(&empty));
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        let started = std::time::Instant::now();
        let resp = rb.send().await.map_err(|e| AttemptFailure::Transport {
            stage: "send",
            message: e.to_string(),
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AttemptFailure::Transport {
                stage: "body",
                message: e.to_string(),
            })?
            .to_vec();
        let duration_ms = started.elapsed().as_millis() as u64;

        let request_id = headers
            .get("x-fb-trace-id")
            .or_else(|| headers.get("x-request-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        tracing::debug!(
            %req_id,
            %status,
            duration_ms,
            body_len = bytes.len(),
            x_request_id = %request_id,
            "http.response.headers"
        );
        if raw_enabled() {
            let truncated = bytes.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target: "http.raw",
                %req_id,
                %status,
                duration_ms,
                headers = ?redact_headers(&headers),
                body = %text,
                truncated
            );
        }
        tracing::trace!(%req_id, body_snippet = %snip_body(&bytes), "http.response.body_snippet");

        if status.is_success() {
            return Ok(bytes);
        }
        Err(AttemptFailure::Status {
            status,
            message: extract_error_message(&bytes),
            request_id,
            retry_after: retry_after_delay_secs(&headers),
        })
    }
}

/// Why a single attempt produced no usable body.
#[derive(Debug)]
enum AttemptFailure {
    Transport {
        stage: &'static str,
        message: String,
    },
    Status {
        status: StatusCode,
        message: String,
        request_id: String,
        retry_after: Option<u64>,
    },
}

impl AttemptFailure {
    /// Transport failures, 429 and 5xx are worth another try; other statuses are final.
    fn is_retryable(&self) -> bool {
        match self {
            AttemptFailure::Transport { .. } => true,
            AttemptFailure::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
        }
    }

    fn backoff(&self, attempt: usize) -> Duration {
        match self {
            AttemptFailure::Transport { .. } => backoff_delay(attempt, false, None),
            AttemptFailure::Status {
                status, retry_after, ..
            } => backoff_delay(
                attempt,
                *status == StatusCode::TOO_MANY_REQUESTS,
                *retry_after,
            ),
        }
    }

    fn into_error(self) -> HttpError {
        match self {
            AttemptFailure::Transport { message, .. } => HttpError::Network(message),
            AttemptFailure::Status {
                status,
                message,
                request_id,
                ..
            } => HttpError::Api {
                status,
                message,
                request_id,
            },
        }
    }
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptFailure::Transport { stage, message } => write!(f, "{stage}: {message}"),
            AttemptFailure::Status {
                status, message, ..
            } => write!(f, "{status}: {message}"),
        }
    }
}

fn next_request_id() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("r{nanos:x}")
}

// ==============================
// Helpers
// ==============================

/// Exponential backoff from 200ms; `Retry-After` wins, and 429 never waits less than 1.1s.
fn backoff_delay(attempt: usize, is_429: bool, retry_after_secs: Option<u64>) -> Duration {
    if let Some(secs) = retry_after_secs {
        return Duration::from_secs(secs);
    }
    let shift = attempt.saturating_sub(1).min(16) as u32;
    let exp = Duration::from_millis(200u64.saturating_mul(1u64 << shift));
    if is_429 {
        exp.max(Duration::from_millis(1100))
    } else {
        exp
    }
}

fn extract_error_message(body: &[u8]) -> String {
    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        for candidate in [m.message, m.detail, m.error] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn retry_after_delay_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .trim()
        .parse()
        .ok()
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        let mut cut = 500;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_and_respects_retry_after() {
        assert_eq!(backoff_delay(1, false, None), Duration::from_millis(200));
        assert_eq!(backoff_delay(3, false, None), Duration::from_millis(800));
        assert_eq!(backoff_delay(1, true, None), Duration::from_millis(1100));
        assert_eq!(backoff_delay(2, true, Some(7)), Duration::from_secs(7));
    }

    #[test]
    fn only_transient_failures_are_retried() {
        let status = |code: u16| AttemptFailure::Status {
            status: StatusCode::from_u16(code).unwrap(),
            message: String::new(),
            request_id: "-".into(),
            retry_after: None,
        };
        assert!(status(429).is_retryable());
        assert!(status(503).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(
            AttemptFailure::Transport {
                stage: "send",
                message: "reset".into()
            }
            .is_retryable()
        );
        assert!(matches!(
            status(404).into_error(),
            HttpError::Api { status, .. } if status == StatusCode::NOT_FOUND
        ));
        assert_eq!(status(429).backoff(1), Duration::from_millis(1100));
    }

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(
            extract_error_message(br#"{"message":"Please wait a few minutes"}"#),
            "Please wait a few minutes"
        );
        assert_eq!(extract_error_message(br#"{"error":"login_required"}"#), "login_required");
        assert_eq!(extract_error_message(b"<html>nope</html>"), "<html>nope</html>");
    }

    #[test]
    fn snip_body_truncates_on_char_boundary() {
        let body = "é".repeat(400);
        let snip = snip_body(body.as_bytes());
        assert!(snip.ends_with("..."));
        assert!(snip.len() <= 503);
    }

    #[test]
    fn retry_after_parses_seconds_only() {
        let mut h = HeaderMap::new();
        h.insert(RETRY_AFTER, HeaderValue::from_static(" 12 "));
        assert_eq!(retry_after_delay_secs(&h), Some(12));
        h.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after_delay_secs(&h), None);
    }

    #[test]
    fn cookies_are_redacted() {
        let mut h = HeaderMap::new();
        h.insert("cookie", HeaderValue::from_static("sessionid=secret"));
        h.insert("accept", HeaderValue::from_static("text/html"));
        let redacted = redact_headers(&h);
        assert!(redacted.contains(&("cookie".into(), "<redacted>".into())));
        assert!(redacted.contains(&("accept".into(), "text/html".into())));
    }

    #[test]
    fn resolves_relative_and_absolute_paths() {
        let client = HttpClient::new("https://www.instagram.com").unwrap();
        assert_eq!(
            client.resolve("alice/", false).unwrap().as_str(),
            "https://www.instagram.com/alice/"
        );
        assert_eq!(
            client
                .resolve("https://example.com/x", true)
                .unwrap()
                .as_str(),
            "https://example.com/x"
        );
    }

    #[test]
    fn rejects_header_unsafe_user_agent() {
        let err = HttpClient::with_identity("https://www.instagram.com", "bad\nagent", "en")
            .err()
            .expect("newline is not a valid header value");
        assert!(matches!(err, HttpError::Build(_)));
    }
}
