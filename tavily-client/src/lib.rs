//! Async client for the Tavily web search API.
//!
//! - `client`: [`TavilyClient`] with `search`, `qna` and `get_search_context`
//! - `types`: request/response models and per-operation option records
//! - `wire`: outbound body and case-insensitive response decoding
//! - `context`: rendering results into a bounded context string
//!
//! All operations share one `POST /search` exchange and report failures as
//! [`TavilyError`].

pub mod client;
pub mod context;
pub mod types;
pub mod wire;

pub use client::{ClientConfig, NO_ANSWER, TavilyClient};
pub use tavily_common::{ErrorKind, Result, TavilyError};
pub use types::{
    ContextOptions, QnaOptions, SearchDepth, SearchOptions, SearchRequest, SearchResponse,
    SearchResult, Topic,
};
