//! Minimal JSON-over-HTTP client with safe logging and typed errors.
//!
//! - Request options: bearer auth, query params, timeout
//! - Never logs secret values; auth is reported only by kind
//! - Decodes XRPC-style error bodies (`{"error": "...", "message": "..."}`)
//! - Optional *raw* response logging via `GRAPHSNAP_HTTP_RAW=1`
//!
//! Every call is a single attempt. Retrying throttled calls is the caller's job; the
//! error type implements [`RateLimited`] so a backoff layer can classify it.
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), graphsnap_http::HttpError> {
//! let client = graphsnap_http::HttpClient::new("https://bsky.social")?;
//! let got: serde_json::Value = client
//!     .get_json("xrpc/_health", graphsnap_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```

use graphsnap_common::RateLimited;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

const RAW_ENV: &str = "GRAPHSNAP_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

fn raw_enabled() -> bool {
    matches!(
        std::env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}")]
    Api {
        status: StatusCode,
        /// XRPC error name (`RateLimitExceeded`, `AuthenticationRequired`, ...), if any.
        error: Option<String>,
        message: String,
    },
}

impl HttpError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl RateLimited for HttpError {
    fn is_rate_limited(&self) -> bool {
        self.status() == Some(StatusCode::TOO_MANY_REQUESTS)
    }
}

/// Authentication strategies supported by the client.
///
/// ```
/// use graphsnap_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// assert_eq!(bearer.kind(), "bearer");
/// assert_eq!(Auth::None.kind(), "none");
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    None,
}

impl Auth<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::None => "none",
        }
    }
}

/// Per-request tuning knobs.
///
/// ```
/// use graphsnap_http::{Auth, RequestOpts};
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     auth: Some(Auth::Bearer("jwt")),
///     query: Some(vec![("limit", "100".into())]),
/// };
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// A trailing slash is added to the base so relative paths resolve beneath it.
    /// Requests time out after 15 s unless [`RequestOpts::timeout`] says otherwise.
    ///
    /// ```no_run
    /// use graphsnap_http::{HttpClient, HttpError};
    ///
    /// let client = HttpClient::new("https://bsky.social")?;
    /// assert_eq!(client.base().as_str(), "https://bsky.social/");
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(base.trim()).map_err(|e| HttpError::Url(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("graphsnap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// GET JSON with per-request options.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json::<(), T>(Method::GET, path, None, opts).await
    }

    /// POST a JSON body with per-request options.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(Method::POST, path, Some(body), opts).await
    }

    async fn request_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(e.to_string()))?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);

        let mut rb = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(timeout);

        if let Some(q) = &opts.query {
            let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }
        if let Some(b) = body {
            let bytes = serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string()))?;
            rb = rb
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes);
        }
        if let Some(Auth::Bearer(tok)) = &opts.auth {
            rb = rb.bearer_auth(sanitize_token(tok)?);
        }

        let req_id = format!("r{}", REQUEST_SEQ.fetch_add(1, Ordering::Relaxed));
        let auth_kind = opts.auth.as_ref().map(Auth::kind).unwrap_or("none");

        // Query values here are actor DIDs, cursors and limits; none are secret.
        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            query=?opts.query,
            timeout_ms=timeout.as_millis() as u64,
            auth_kind,
            has_body=%body.is_some(),
            "http.request.start"
        );

        let t0 = Instant::now();
        let resp = rb.send().await.map_err(|err| {
            tracing::warn!(req_id=%req_id, message=%err, "http.network_error.send");
            HttpError::Network(err.to_string())
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            tracing::warn!(req_id=%req_id, message=%err, "http.network_error.body");
            HttpError::Network(err.to_string())
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            rate_limit.limit=?header_str(&headers, "ratelimit-limit"),
            rate_limit.remaining=?header_str(&headers, "ratelimit-remaining"),
            rate_limit.reset=?header_str(&headers, "ratelimit-reset"),
            "http.response.headers"
        );

        if raw_enabled() {
            let truncated = bytes.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
            tracing::debug!(
                target: "http.raw",
                %req_id,
                %status,
                body=%text,
                truncated,
                "response"
            );
        }

        let snippet = snip_body(&bytes);

        if status.is_success() {
            return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                tracing::warn!(
                    req_id=%req_id,
                    serde_line=%e.line(),
                    serde_col=%e.column(),
                    serde_err=%e,
                    body_snippet=%snippet,
                    "http.response.decode_error"
                );
                HttpError::Decode(e.to_string(), snippet)
            });
        }

        let (error, message) = extract_xrpc_error(&bytes);
        tracing::warn!(
            req_id=%req_id,
            %status,
            error=?error,
            message=%message,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            error,
            message,
        })
    }
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn extract_xrpc_error(body: &[u8]) -> (Option<String>, String) {
    #[derive(Deserialize)]
    struct XrpcErrorBody {
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        message: Option<String>,
    }

    match serde_json::from_slice::<XrpcErrorBody>(body) {
        Ok(XrpcErrorBody { error, message }) => {
            let message = message
                .filter(|m| !m.is_empty())
                .or_else(|| error.clone())
                .unwrap_or_else(|| snip_body(body));
            (error, message)
        }
        Err(_) => (None, snip_body(body)),
    }
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        let mut cut = SNIPPET_MAX;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

fn sanitize_token(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if !s.is_ascii() {
        return Err(HttpError::Build("token contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build("token contains control characters".into()));
    }
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn only_429_is_rate_limited() {
        let throttled = HttpError::Api {
            status: StatusCode::TOO_MANY_REQUESTS,
            error: Some("RateLimitExceeded".into()),
            message: "slow down".into(),
        };
        let unavailable = HttpError::Api {
            status: StatusCode::SERVICE_UNAVAILABLE,
            error: None,
            message: "down".into(),
        };
        assert!(throttled.is_rate_limited());
        assert!(!unavailable.is_rate_limited());
        assert!(!HttpError::Network("reset".into()).is_rate_limited());
    }

    #[test]
    fn xrpc_error_body_is_extracted() {
        let body = br#"{"error":"InvalidRequest","message":"actor must be a did"}"#;
        let (error, message) = extract_xrpc_error(body);
        assert_eq!(error.as_deref(), Some("InvalidRequest"));
        assert_eq!(message, "actor must be a did");

        let (error, message) = extract_xrpc_error(br#"{"error":"ExpiredToken"}"#);
        assert_eq!(error.as_deref(), Some("ExpiredToken"));
        assert_eq!(message, "ExpiredToken");

        let (error, message) = extract_xrpc_error(b"<html>bad gateway</html>");
        assert!(error.is_none());
        assert_eq!(message, "<html>bad gateway</html>");
    }

    #[test]
    fn snippets_are_truncated_on_char_boundaries() {
        let long = "é".repeat(400);
        let snip = snip_body(long.as_bytes());
        assert!(snip.ends_with("..."));
        assert!(snip.len() <= SNIPPET_MAX + 3);
    }

    #[test]
    fn tokens_are_trimmed_and_validated() {
        assert_eq!(sanitize_token(" \"abc.def\"\n").unwrap(), "abc.def");
        assert!(sanitize_token("tok\u{7f}").is_err());
        assert!(sanitize_token("tøken").is_err());
    }

    #[test]
    fn base_gets_trailing_slash() {
        let client = HttpClient::new("https://pds.example.com/prefix").unwrap();
        assert_eq!(client.base().as_str(), "https://pds.example.com/prefix/");
    }

    #[tokio::test]
    async fn get_json_sends_query_and_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/xrpc/app.bsky.actor.getProfile"))
            .and(query_param("actor", "did:plc:alice"))
            .and(bearer_token("jwt-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri()).unwrap();
        let got: serde_json::Value = client
            .get_json(
                "xrpc/app.bsky.actor.getProfile",
                RequestOpts {
                    auth: Some(Auth::Bearer("jwt-123")),
                    query: Some(vec![("actor", "did:plc:alice".into())]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(got, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn throttled_response_is_single_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_json(
                json!({ "error": "RateLimitExceeded", "message": "Rate Limit Exceeded" }),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri()).unwrap();
        let err = client
            .get_json::<serde_json::Value>("xrpc/app.bsky.graph.getBlocks", RequestOpts::default())
            .await
            .unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
    }
}
