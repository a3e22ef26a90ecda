//! Request, response and option records for the Tavily search API.
//!
//! These are plain values: built per call, default-filled at construction,
//! never mutated by the client afterwards.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tavily_common::{Result, TavilyError};
use tavily_config::SearchDefaults;

pub const DEFAULT_MAX_RESULTS: u32 = 5;
pub const CONTEXT_MAX_RESULTS: u32 = 10;
pub const DEFAULT_CONTEXT_MAX_TOKENS: usize = 4000;

/// Effort/quality tier of a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    #[default]
    Basic,
    Advanced,
}

impl SearchDepth {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchDepth {
    type Err = TavilyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "advanced" => Ok(Self::Advanced),
            other => Err(TavilyError::InvalidRequest(format!(
                "unknown search depth '{other}' (expected basic or advanced)"
            ))),
        }
    }
}

/// Search category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    #[default]
    General,
    News,
}

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::News => "news",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = TavilyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "news" => Ok(Self::News),
            other => Err(TavilyError::InvalidRequest(format!(
                "unknown topic '{other}' (expected general or news)"
            ))),
        }
    }
}

/// A normalized search request, ready for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub search_depth: SearchDepth,
    pub topic: Topic,
    /// Lookback window in days (news topic).
    pub days: Option<u32>,
    pub max_results: u32,
    pub include_images: bool,
    pub include_answer: bool,
    pub include_raw_content: bool,
    /// Passed through as given: no dedup, no domain syntax checks.
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            search_depth: SearchDepth::default(),
            topic: Topic::default(),
            days: None,
            max_results: DEFAULT_MAX_RESULTS,
            include_images: false,
            include_answer: false,
            include_raw_content: false,
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
        }
    }

    /// Check the invariants that must hold before transmission.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(TavilyError::InvalidRequest("query must not be empty".into()));
        }
        if self.max_results == 0 {
            return Err(TavilyError::InvalidRequest(
                "max_results must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Parsed reply of the `search` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub query: String,
    #[serde(default)]
    pub answer: Option<String>,
    /// Sorted by relevance; empty when the service omits it.
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<SearchResult>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub follow_up_questions: Vec<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    /// Server-side processing time in seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub response_time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(default)]
    pub raw_content: Option<String>,
    /// Opaque date string as sent by the service.
    #[serde(default)]
    pub published_date: Option<String>,
}

fn null_as_default<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// Options for [`crate::TavilyClient::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub search_depth: SearchDepth,
    pub topic: Topic,
    pub days: Option<u32>,
    pub max_results: u32,
    pub include_images: bool,
    pub include_answer: bool,
    pub include_raw_content: bool,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
    /// Per-call override of the client's key.
    pub api_key: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            search_depth: SearchDepth::Basic,
            topic: Topic::General,
            days: None,
            max_results: DEFAULT_MAX_RESULTS,
            include_images: false,
            include_answer: false,
            include_raw_content: false,
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
            api_key: None,
        }
    }
}

impl SearchOptions {
    /// Build options from configured defaults, falling back to the built-ins.
    ///
    /// ```
    /// use tavily_client::{SearchDepth, SearchOptions};
    /// use tavily_config::SearchDefaults;
    ///
    /// let defaults = SearchDefaults {
    ///     search_depth: Some("Advanced".into()),
    ///     max_results: Some(3),
    ///     ..SearchDefaults::default()
    /// };
    /// let opts = SearchOptions::from_defaults(&defaults)?;
    /// assert_eq!(opts.search_depth, SearchDepth::Advanced);
    /// assert_eq!(opts.max_results, 3);
    /// # Ok::<(), tavily_common::TavilyError>(())
    /// ```
    pub fn from_defaults(defaults: &SearchDefaults) -> Result<Self> {
        let base = Self::default();
        let config_err = |e: TavilyError| TavilyError::Config(format!("search defaults: {e}"));
        Ok(Self {
            search_depth: match &defaults.search_depth {
                Some(s) => s.parse().map_err(config_err)?,
                None => base.search_depth,
            },
            topic: match &defaults.topic {
                Some(s) => s.parse().map_err(config_err)?,
                None => base.topic,
            },
            days: defaults.days,
            max_results: defaults.max_results.unwrap_or(base.max_results),
            include_images: defaults.include_images.unwrap_or(base.include_images),
            include_answer: defaults.include_answer.unwrap_or(base.include_answer),
            include_raw_content: defaults
                .include_raw_content
                .unwrap_or(base.include_raw_content),
            include_domains: defaults.include_domains.clone(),
            exclude_domains: defaults.exclude_domains.clone(),
            api_key: None,
        })
    }

    pub(crate) fn into_request(self, query: &str) -> (SearchRequest, Option<String>) {
        let request = SearchRequest {
            query: query.to_string(),
            search_depth: self.search_depth,
            topic: self.topic,
            days: self.days,
            max_results: self.max_results,
            include_images: self.include_images,
            include_answer: self.include_answer,
            include_raw_content: self.include_raw_content,
            include_domains: self.include_domains,
            exclude_domains: self.exclude_domains,
        };
        (request, self.api_key)
    }
}

/// Options for [`crate::TavilyClient::qna`]. The answer is always requested.
#[derive(Debug, Clone, PartialEq)]
pub struct QnaOptions {
    pub search_depth: SearchDepth,
    pub max_results: u32,
    pub api_key: Option<String>,
}

impl Default for QnaOptions {
    fn default() -> Self {
        Self {
            search_depth: SearchDepth::Advanced,
            max_results: DEFAULT_MAX_RESULTS,
            api_key: None,
        }
    }
}

/// Options for [`crate::TavilyClient::get_search_context`].
#[derive(Debug, Clone, PartialEq)]
pub struct ContextOptions {
    /// Character budget for the returned context.
    pub max_tokens: usize,
    pub search_depth: SearchDepth,
    pub api_key: Option<String>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_CONTEXT_MAX_TOKENS,
            search_depth: SearchDepth::Basic,
            api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_defaults_match_documented_values() {
        let search = SearchOptions::default();
        assert_eq!(search.search_depth, SearchDepth::Basic);
        assert_eq!(search.max_results, 5);
        assert!(!search.include_images && !search.include_answer);
        assert!(search.api_key.is_none());

        let qna = QnaOptions::default();
        assert_eq!(qna.search_depth, SearchDepth::Advanced);
        assert_eq!(qna.max_results, 5);

        let ctx = ContextOptions::default();
        assert_eq!(ctx.max_tokens, 4000);
        assert_eq!(ctx.search_depth, SearchDepth::Basic);
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("ADVANCED".parse::<SearchDepth>().unwrap(), SearchDepth::Advanced);
        assert_eq!(" news ".parse::<Topic>().unwrap(), Topic::News);
        assert!(matches!(
            "deep".parse::<SearchDepth>(),
            Err(TavilyError::InvalidRequest(_))
        ));
        assert_eq!(SearchDepth::Advanced.to_string(), "advanced");
        assert_eq!(Topic::General.to_string(), "general");
    }

    #[test]
    fn validation_rejects_blank_query_and_zero_results() {
        assert!(SearchRequest::new("   ").validate().is_err());

        let mut req = SearchRequest::new("Who is Captain Jean-Luc Picard?");
        assert!(req.validate().is_ok());
        req.max_results = 0;
        assert!(matches!(req.validate(), Err(TavilyError::InvalidRequest(_))));
    }

    #[test]
    fn bad_configured_depth_is_a_config_error() {
        let defaults = SearchDefaults {
            search_depth: Some("ludicrous".into()),
            ..SearchDefaults::default()
        };
        assert!(matches!(
            SearchOptions::from_defaults(&defaults),
            Err(TavilyError::Config(_))
        ));
    }

    #[test]
    fn options_keep_domain_order() {
        let opts = SearchOptions {
            include_domains: vec!["b.example".into(), "a.example".into(), "b.example".into()],
            api_key: Some("tvly-override".into()),
            ..SearchOptions::default()
        };
        let (req, key) = opts.into_request("q");
        assert_eq!(req.include_domains, vec!["b.example", "a.example", "b.example"]);
        assert_eq!(key.as_deref(), Some("tvly-override"));
    }

    #[test]
    fn null_collections_become_empty() {
        let resp: SearchResponse = serde_json::from_str(
            r#"{"query":"q","results":null,"follow_up_questions":null,"response_time":null}"#,
        )
        .unwrap();
        assert!(resp.results.is_empty());
        assert!(resp.follow_up_questions.is_empty());
        assert_eq!(resp.response_time, 0.0);
    }
}
