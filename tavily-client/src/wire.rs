//! Wire schema of the `search` endpoint.
//!
//! Outbound field names are fixed by [`WireRequest`]'s serde derive. Inbound
//! keys are matched case-insensitively through [`RESPONSE_FIELDS`]: a key is
//! folded (lowercase, `_` dropped) and looked up, so `FollowUpQuestions`,
//! `follow_up_questions` and `FOLLOW_UP_QUESTIONS` all land on the same field.
use crate::types::{SearchDepth, SearchRequest, SearchResponse, Topic};
use serde::Serialize;
use serde_json::{Map, Value};
use tavily_common::{Result, TavilyError};

pub const SEARCH_PATH: &str = "search";

/// Folded key → canonical snake_case name, for the response and its results.
pub const RESPONSE_FIELDS: &[(&str, &str)] = &[
    ("query", "query"),
    ("answer", "answer"),
    ("results", "results"),
    ("followupquestions", "follow_up_questions"),
    ("images", "images"),
    ("responsetime", "response_time"),
    ("title", "title"),
    ("url", "url"),
    ("content", "content"),
    ("score", "score"),
    ("rawcontent", "raw_content"),
    ("publisheddate", "published_date"),
];

/// Body of `POST /search`.
#[derive(Debug, Serialize)]
pub struct WireRequest<'a> {
    pub api_key: &'a str,
    pub query: &'a str,
    pub search_depth: SearchDepth,
    pub topic: Topic,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    pub max_results: u32,
    pub include_images: bool,
    pub include_answer: bool,
    pub include_raw_content: bool,
    pub include_domains: &'a [String],
    pub exclude_domains: &'a [String],
}

impl<'a> WireRequest<'a> {
    pub fn new(request: &'a SearchRequest, api_key: &'a str) -> Self {
        Self {
            api_key,
            query: &request.query,
            search_depth: request.search_depth,
            topic: request.topic,
            days: request.days,
            max_results: request.max_results,
            include_images: request.include_images,
            include_answer: request.include_answer,
            include_raw_content: request.include_raw_content,
            include_domains: &request.include_domains,
            exclude_domains: &request.exclude_domains,
        }
    }
}

fn fold(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn canonical_key(key: &str) -> Option<&'static str> {
    let folded = fold(key);
    RESPONSE_FIELDS
        .iter()
        .find(|(wire, _)| *wire == folded)
        .map(|(_, canonical)| *canonical)
}

/// Rewrite object keys to their canonical names, recursively.
///
/// Unknown keys are kept as-is; if two keys fold to the same field, the
/// first non-null one wins.
pub fn normalize_keys(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (k, val) in map {
                let key = canonical_key(&k).map(str::to_string).unwrap_or(k);
                let val = normalize_keys(val);
                let keep_existing = out.get(&key).is_some_and(|e| !e.is_null());
                if !keep_existing {
                    out.insert(key, val);
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Map a decoded success body onto [`SearchResponse`].
pub fn parse_response(body: Value) -> Result<SearchResponse> {
    if !body.is_object() {
        return Err(TavilyError::ResponseFormat(format!(
            "expected a JSON object, got {}",
            kind_of(&body)
        )));
    }
    serde_json::from_value(normalize_keys(body))
        .map_err(|e| TavilyError::ResponseFormat(e.to_string()))
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
