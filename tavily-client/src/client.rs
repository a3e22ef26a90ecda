//! Tavily search client.
//!
//! Every public operation funnels into [`TavilyClient::search_request`]:
//! validate → serialize with the effective key → one POST to `search` →
//! classify failures → normalize keys → [`SearchResponse`].
use crate::context::build_context;
use crate::types::{
    CONTEXT_MAX_RESULTS, ContextOptions, QnaOptions, SearchOptions, SearchRequest, SearchResponse,
};
use crate::wire::{self, SEARCH_PATH, WireRequest};
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};
use tavily_common::{Result, TavilyError};
use tavily_config::{DEFAULT_BASE_URL, TavilyConfig};
use tavily_http::{HttpClient, HttpError};

/// Returned by [`TavilyClient::qna`] when the service sends no answer.
pub const NO_ANSWER: &str = "No answer found.";

const QUERY_LOG_MAX: usize = 160;

/// What a [`TavilyClient`] is built from.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_key: String,
    /// Pre-configured transport; a default one bound to the public endpoint
    /// is built when absent.
    pub http: Option<HttpClient>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: None,
        }
    }

    pub fn with_http(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }
}

/// Client for the Tavily search API. Clones share one connection pool.
#[derive(Clone)]
pub struct TavilyClient {
    http: HttpClient,
    api_key: String,
}

impl fmt::Debug for TavilyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TavilyClient")
            .field("base_url", &self.http.base_url().as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl TavilyClient {
    /// Client bound to `https://api.tavily.com/`.
    ///
    /// ```
    /// use tavily_client::TavilyClient;
    /// use tavily_common::TavilyError;
    ///
    /// assert!(TavilyClient::new("tvly-your-key").is_ok());
    /// assert!(matches!(TavilyClient::new(""), Err(TavilyError::MissingApiKey)));
    /// ```
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_key))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let api_key = config.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(TavilyError::MissingApiKey);
        }
        let http = match config.http {
            Some(http) => http,
            None => HttpClient::new(DEFAULT_BASE_URL)
                .map_err(|e| TavilyError::Config(format!("HttpClient init failed: {e}")))?,
        };
        Ok(Self { http, api_key })
    }

    /// Build a client from loaded settings (key, base URL, timeout).
    pub fn from_settings(settings: &TavilyConfig) -> Result<Self> {
        let api_key = settings.api_key().ok_or(TavilyError::MissingApiKey)?;
        if settings.timeout_secs == 0 {
            return Err(TavilyError::Config("timeout_secs must be positive".into()));
        }
        let http = HttpClient::new(&settings.base_url)
            .map_err(|e| TavilyError::Config(format!("base_url {}: {e}", settings.base_url)))?
            .with_timeout(Duration::from_secs(settings.timeout_secs));
        Self::with_config(ClientConfig::new(api_key).with_http(http))
    }

    /// Run a search.
    ///
    /// ```no_run
    /// use tavily_client::{SearchOptions, TavilyClient};
    ///
    /// # async fn demo() -> tavily_common::Result<()> {
    /// let client = TavilyClient::new("tvly-your-key")?;
    /// let response = client
    ///     .search("Who is Captain Jean-Luc Picard?", SearchOptions::default())
    ///     .await?;
    /// for result in &response.results {
    ///     println!("{}: {}", result.title, result.url);
    /// }
    /// # Ok(()) }
    /// ```
    pub async fn search(&self, query: &str, options: SearchOptions) -> Result<SearchResponse> {
        let (request, api_key) = options.into_request(query);
        self.search_request(&request, api_key.as_deref()).await
    }

    /// Ask a question; the answer is always requested from the service.
    pub async fn qna(&self, query: &str, options: QnaOptions) -> Result<String> {
        let mut request = SearchRequest::new(query);
        request.search_depth = options.search_depth;
        request.max_results = options.max_results;
        request.include_answer = true;

        let response = self
            .search_request(&request, options.api_key.as_deref())
            .await?;
        // Only a missing or null answer falls back; an empty one is returned as-is.
        Ok(response.answer.unwrap_or_else(|| NO_ANSWER.to_string()))
    }

    /// Search and render up to [`CONTEXT_MAX_RESULTS`] results as one
    /// context string of at most `options.max_tokens` characters.
    pub async fn get_search_context(&self, query: &str, options: ContextOptions) -> Result<String> {
        let mut request = SearchRequest::new(query);
        request.search_depth = options.search_depth;
        request.max_results = CONTEXT_MAX_RESULTS;

        let response = self
            .search_request(&request, options.api_key.as_deref())
            .await?;
        let context = build_context(&response.results, options.max_tokens);
        tracing::debug!(
            target: "tavily",
            result_count = response.results.len(),
            context_chars = context.chars().count(),
            max_tokens = options.max_tokens,
            "tavily.context.built"
        );
        Ok(context)
    }

    /// Send a fully specified request. `api_key` overrides the client's key.
    pub async fn search_request(
        &self,
        request: &SearchRequest,
        api_key: Option<&str>,
    ) -> Result<SearchResponse> {
        request.validate()?;
        let api_key = match api_key {
            Some(k) if k.trim().is_empty() => return Err(TavilyError::MissingApiKey),
            Some(k) => k.trim(),
            None => self.api_key.as_str(),
        };

        let query_snippet = snippet(&request.query);
        let started = Instant::now();
        tracing::info!(
            target: "tavily",
            query = %query_snippet,
            search_depth = %request.search_depth,
            topic = %request.topic,
            max_results = request.max_results,
            include_answer = request.include_answer,
            "tavily.search.start"
        );

        let body = WireRequest::new(request, api_key);
        let outcome = match self.http.post_json::<_, Value>(SEARCH_PATH, &body).await {
            Ok(raw) => wire::parse_response(raw),
            Err(e) => Err(http_to_tavily(e)),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(response) => {
                tracing::info!(
                    target: "tavily",
                    query = %query_snippet,
                    elapsed_ms,
                    result_count = response.results.len(),
                    has_answer = response.answer.is_some(),
                    response_time = response.response_time,
                    "tavily.search.success"
                );
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(
                    target: "tavily",
                    query = %query_snippet,
                    elapsed_ms,
                    kind = ?e.kind(),
                    error = %e,
                    "tavily.search.error"
                );
                Err(e)
            }
        }
    }
}

fn snippet(query: &str) -> String {
    if query.chars().count() > QUERY_LOG_MAX {
        let mut s: String = query.chars().take(QUERY_LOG_MAX).collect();
        s.push('…');
        s
    } else {
        query.to_string()
    }
}

/// Translate transport failures into the client's error taxonomy.
fn http_to_tavily(e: HttpError) -> TavilyError {
    match e {
        HttpError::Api {
            status, message, ..
        } => classify_status(status.as_u16(), message),
        HttpError::Network { message, .. } => TavilyError::Api {
            status: None,
            message,
        },
        HttpError::Decode(message, _) => TavilyError::ResponseFormat(message),
        HttpError::Url(message) | HttpError::Build(message) => TavilyError::Api {
            status: None,
            message,
        },
    }
}

fn classify_status(status: u16, message: String) -> TavilyError {
    let lower = message.to_lowercase();
    let mentions_limit = lower.contains("limit") || lower.contains("quota");

    match status {
        401 | 403 if mentions_limit => TavilyError::UsageLimitExceeded { status, message },
        401 | 403 => TavilyError::InvalidApiKey { status, message },
        // 432/433: plan and pay-as-you-go limits.
        429 | 432 | 433 => TavilyError::UsageLimitExceeded { status, message },
        _ => TavilyError::Api {
            status: Some(status),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tavily_common::ErrorKind;

    #[test]
    fn test_client_creation() {
        let client = TavilyClient::new("  tvly-test  ").unwrap();
        assert_eq!(client.api_key, "tvly-test");
        assert_eq!(client.http.base_url().as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn blank_key_is_rejected_before_any_io() {
        for key in ["", "   ", "\n"] {
            assert!(matches!(
                TavilyClient::new(key),
                Err(TavilyError::MissingApiKey)
            ));
        }
    }

    #[test]
    fn debug_output_hides_the_key() {
        let client = TavilyClient::new("tvly-very-secret").unwrap();
        let dbg = format!("{client:?}");
        assert!(!dbg.contains("tvly-very-secret"));
        assert!(dbg.contains("api.tavily.com"));
    }

    #[test]
    fn from_settings_uses_base_url_and_timeout() {
        let settings = TavilyConfig {
            api_key: Some("tvly-x".into()),
            base_url: "http://localhost:9999".into(),
            timeout_secs: 3,
            ..TavilyConfig::default()
        };
        let client = TavilyClient::from_settings(&settings).unwrap();
        assert_eq!(client.http.base_url().as_str(), "http://localhost:9999/");
        assert_eq!(client.http.default_timeout, Duration::from_secs(3));
    }

    #[test]
    fn from_settings_without_key_is_missing_key() {
        let err = TavilyClient::from_settings(&TavilyConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingApiKey);
    }

    #[test]
    fn from_settings_rejects_zero_timeout() {
        let settings = TavilyConfig {
            api_key: Some("tvly-x".into()),
            timeout_secs: 0,
            ..TavilyConfig::default()
        };
        let err = TavilyClient::from_settings(&settings).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("timeout_secs"), "{err}");
    }

    #[test]
    fn from_settings_with_bad_url_is_config_error() {
        let settings = TavilyConfig {
            api_key: Some("tvly-x".into()),
            base_url: "::not a url::".into(),
            ..TavilyConfig::default()
        };
        let err = TavilyClient::from_settings(&settings).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn status_classification() {
        assert_eq!(
            classify_status(401, "Unauthorized: missing or invalid API key.".into()).kind(),
            ErrorKind::InvalidApiKey
        );
        assert_eq!(classify_status(403, "forbidden".into()).kind(), ErrorKind::InvalidApiKey);
        assert_eq!(
            classify_status(403, "Monthly quota exhausted".into()).kind(),
            ErrorKind::UsageLimitExceeded
        );
        for status in [429, 432, 433] {
            assert_eq!(
                classify_status(status, "slow down".into()).kind(),
                ErrorKind::UsageLimitExceeded
            );
        }
        let err = classify_status(500, "internal".into());
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn network_and_decode_errors_map_to_taxonomy() {
        let err = http_to_tavily(HttpError::Network {
            message: "connection refused".into(),
            timeout: false,
        });
        assert!(matches!(err, TavilyError::Api { status: None, .. }));

        let err = http_to_tavily(HttpError::Decode("eof".into(), String::new()));
        assert!(matches!(err, TavilyError::ResponseFormat(_)));
    }

    #[test]
    fn long_queries_are_snipped_for_logs() {
        let q = "é".repeat(400);
        let s = snippet(&q);
        assert_eq!(s.chars().count(), QUERY_LOG_MAX + 1);
        assert_eq!(snippet("short"), "short");
    }
}
