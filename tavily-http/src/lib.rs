//! Minimal JSON-over-HTTP transport with safe logging.
//!
//! - One request per call: no retries, no caching
//! - Connect timeout plus a per-request timeout (overridable)
//! - Secrets carried in JSON bodies (`api_key`, `token`, ...) are redacted
//!   before anything is logged
//! - Optional *raw* request/response logging via `TAVILY_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), tavily_http::HttpError> {
//! let client = tavily_http::HttpClient::new("https://api.tavily.com")?;
//! let got: serde_json::Value = client
//!     .post_json("search", &serde_json::json!({ "query": "rust" }))
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines (target `http.raw`).

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "TAVILY_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const SNIPPET_MAX: usize = 500;
const REDACTED: &str = "<redacted>";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_key(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "api_key"
            | "apikey"
            | "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "token"
            | "secret"
            | "client_secret"
            | "bearer"
    )
}

/// Replace secret-looking fields of a JSON value, at any depth.
fn redact_value(v: &mut Value) {
    match v {
        Value::Object(map) => {
            for (k, val) in map.iter_mut() {
                if is_secret_key(k) {
                    *val = Value::String(REDACTED.into());
                } else {
                    redact_value(val);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {}
    }
}

/// Render a request body for logs. Non-JSON bodies are never echoed.
fn redacted_body(bytes: &[u8]) -> String {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(mut v) => {
            redact_value(&mut v);
            let mut s = v.to_string();
            if s.len() > RAW_MAX_BODY {
                s = truncate_at_boundary(s, RAW_MAX_BODY);
                s.push('…');
            }
            s
        }
        Err(_) => format!("<{} bytes>", bytes.len()),
    }
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, body: Option<&[u8]>) -> String {
    let mut parts = vec![
        "curl".to_string(),
        format!("-X{method}"),
        "-H 'Content-Type: application/json'".to_string(),
    ];
    if let Some(bytes) = body {
        parts.push(format!("-d '{}'", redacted_body(bytes).replace('\'', r"'\''")));
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

/// Header pairs for logging; credential-bearing headers are masked.
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if key.eq_ignore_ascii_case("authorization") || key.eq_ignore_ascii_case("set-cookie")
            {
                REDACTED.to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
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
    #[error("network error: {message}")]
    Network { message: String, timeout: bool },
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    fn network(err: reqwest::Error) -> Self {
        Self::Network {
            timeout: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

// ==============================
// Client
// ==============================

/// A base-URL-anchored JSON client. Cloning shares the connection pool.
#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use tavily_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.tavily.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(30));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Self::with_client(base, inner)
    }

    /// Anchor a caller-built `reqwest::Client` (proxies, TLS roots, ...) to a base URL.
    pub fn with_client(base: &str, inner: Client) -> Result<Self, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(HttpError::Url(format!("{base} cannot be used as a base URL")));
        }
        // Url::join drops the last path segment unless it ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            inner,
            default_timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the per-request timeout.
    ///
    /// ```no_run
    /// use tavily_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.tavily.com")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// POST `body` as JSON to `path` (relative to the base) and decode the reply.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;
        let bytes = serde_json::to_vec(body).map_err(|e| HttpError::Build(e.to_string()))?;
        self.send_json(Method::POST, url, Some(bytes)).await
    }

    // FIXME(observability): consider emitting a dedicated `tracing` span with
    // standardized `http.*` fields so callers can attach their own context.
    async fn send_json<T>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let req_id = Uuid::new_v4().simple().to_string();
        let timeout = self.default_timeout;

        let mut rb = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(timeout);
        if let Some(bytes) = &body {
            rb = rb
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes.clone());
        }

        // ----- Safe request logging (pre-send) -----
        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            timeout_ms=timeout.as_millis() as u64,
            body_len=body.as_ref().map_or(0, Vec::len),
            "http.request.start"
        );
        if raw_enabled() {
            let curl = make_curl(&method, &url, body.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = Instant::now();
        let resp = rb.send().await.map_err(|err| {
            let err = HttpError::network(err);
            tracing::warn!(req_id=%req_id, error=%err, "http.network_error.send");
            err
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            let err = HttpError::network(err);
            tracing::warn!(req_id=%req_id, %status, error=%err, "http.network_error.body");
            err
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let upstream_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%upstream_id,
            "http.response.headers"
        );

        if raw_enabled() {
            let mut body_snip = bytes.to_vec();
            let truncated = body_snip.len() > RAW_MAX_BODY;
            if truncated {
                body_snip.truncate(RAW_MAX_BODY);
            }
            tracing::info!(
                target: "http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?redact_headers(&headers),
                body=%String::from_utf8_lossy(&body_snip),
                truncated
            );
        }

        let snippet = snip_body(&bytes);
        tracing::trace!(req_id=%req_id, body_snippet=%snippet, "http.response.body_snippet");

        if status.is_success() {
            // FIXME(content-type): validate content-type before the JSON decode.
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

        let message = extract_error_message(&bytes);
        tracing::warn!(
            req_id=%req_id,
            %status,
            message=%message,
            x_request_id=%upstream_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id: upstream_id,
        })
    }
}

// ==============================
// Helpers
// ==============================

/// Pull a human message out of an error body.
///
/// Understands `{"detail":{"error":"..."}}`, `{"detail":"..."}`,
/// `{"error":{"message":"..."}}`, `{"error":"..."}` and `{"message":"..."}`.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field {
        Text(String),
        Nested {
            #[serde(default)]
            error: Option<String>,
            #[serde(default)]
            message: Option<String>,
        },
    }

    #[derive(Deserialize)]
    struct Envelope {
        #[serde(default)]
        detail: Option<Field>,
        #[serde(default)]
        error: Option<Field>,
        #[serde(default)]
        message: Option<String>,
    }

    fn field_text(f: Field) -> Option<String> {
        match f {
            Field::Text(s) => Some(s),
            Field::Nested { error, message } => error.or(message),
        }
    }

    if let Ok(env) = serde_json::from_slice::<Envelope>(body) {
        let found = env
            .detail
            .and_then(field_text)
            .or_else(|| env.error.and_then(field_text))
            .or(env.message)
            .filter(|m| !m.trim().is_empty());
        if let Some(m) = found {
            return m;
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        let mut s = truncate_at_boundary(snip, SNIPPET_MAX);
        s.push_str("...");
        s
    } else {
        snip
    }
}

fn truncate_at_boundary(mut s: String, max: usize) -> String {
    if s.len() > max {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
    }
    s
}
