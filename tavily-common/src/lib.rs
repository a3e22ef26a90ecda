//! Common types shared across the Tavily crates.
//!
//! - [`TavilyError`] and [`Result`]: the error taxonomy every client
//!   operation reports through
//! - [`ErrorKind`]: a fieldless view of [`TavilyError`] for branching
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use tavily_common::{ErrorKind, TavilyError};
//!
//! let err = TavilyError::UsageLimitExceeded {
//!     status: 429,
//!     message: "slow down".into(),
//! };
//! assert_eq!(err.kind(), ErrorKind::UsageLimitExceeded);
//! assert!(err.is_api_error());
//! ```

pub mod observability;

/// Errors surfaced by the Tavily client.
///
/// `Api`, `InvalidApiKey` and `UsageLimitExceeded` all originate from the
/// remote call; the latter two are the status-classified forms of `Api`.
#[derive(thiserror::Error, Debug)]
pub enum TavilyError {
    /// Transport failure (no status) or a non-success HTTP status.
    #[error("HTTP request failed: {}", api_detail(.status, .message))]
    Api {
        status: Option<u16>,
        message: String,
    },

    /// No API key was supplied.
    #[error("API key is missing. Please provide a valid API key.")]
    MissingApiKey,

    /// The service rejected the credentials.
    #[error("Invalid API key provided. Please check your API key. ({status}: {message})")]
    InvalidApiKey { status: u16, message: String },

    /// The service reported quota exhaustion.
    #[error(
        "Usage limit exceeded. Please check your plan's usage limits or consider upgrading. ({status}: {message})"
    )]
    UsageLimitExceeded { status: u16, message: String },

    /// A success body could not be parsed into the response schema.
    #[error("Failed to deserialize the response: {0}")]
    ResponseFormat(String),

    /// The request failed local validation and was never sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Fieldless discriminant of [`TavilyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Api,
    MissingApiKey,
    InvalidApiKey,
    UsageLimitExceeded,
    ResponseFormat,
    InvalidRequest,
    Config,
}

impl TavilyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Api { .. } => ErrorKind::Api,
            Self::MissingApiKey => ErrorKind::MissingApiKey,
            Self::InvalidApiKey { .. } => ErrorKind::InvalidApiKey,
            Self::UsageLimitExceeded { .. } => ErrorKind::UsageLimitExceeded,
            Self::ResponseFormat(_) => ErrorKind::ResponseFormat,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// True for every failure reported by (or on the way to) the remote service.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::InvalidApiKey { .. } | Self::UsageLimitExceeded { .. }
        )
    }

    /// HTTP status attached to the error, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            Self::InvalidApiKey { status, .. } | Self::UsageLimitExceeded { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

fn api_detail(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("status {code}: {message}"),
        None => message.to_string(),
    }
}

/// Convenient alias for results that use [`TavilyError`].
pub type Result<T> = std::result::Result<T, TavilyError>;
