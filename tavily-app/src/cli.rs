use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tavily_client::{ContextOptions, QnaOptions, SearchDepth, SearchOptions, Topic};

#[derive(Parser, Debug)]
#[command(name = "tavily", version, about = "Search the web through the Tavily API")]
pub struct Cli {
    /// Extra YAML/TOML/JSON config file, merged over the default one.
    #[arg(long, global = true, env = "TAVILY_CONFIG")]
    pub config: Option<PathBuf>,
    /// API key; falls back to TAVILY_API_KEY, then the config file, then a prompt.
    #[arg(long, global = true)]
    pub api_key: Option<String>,
    /// Print raw JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
    /// Mirror logs to stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a search and list the results.
    Search(SearchArgs),
    /// Ask a question and print the answer.
    Qna(QnaArgs),
    /// Build a context string from search results.
    Context(ContextArgs),
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    pub query: String,
    #[arg(long)]
    pub depth: Option<SearchDepth>,
    #[arg(long)]
    pub topic: Option<Topic>,
    #[arg(long)]
    pub days: Option<u32>,
    #[arg(long)]
    pub max_results: Option<u32>,
    #[arg(long)]
    pub images: bool,
    #[arg(long)]
    pub answer: bool,
    #[arg(long)]
    pub raw_content: bool,
    /// Restrict results to this domain (repeatable).
    #[arg(long = "include-domain")]
    pub include_domains: Vec<String>,
    /// Drop results from this domain (repeatable).
    #[arg(long = "exclude-domain")]
    pub exclude_domains: Vec<String>,
}

impl SearchArgs {
    /// Flags win over configured defaults; boolean flags can only switch on.
    pub fn apply(self, mut opts: SearchOptions) -> (String, SearchOptions) {
        if let Some(depth) = self.depth {
            opts.search_depth = depth;
        }
        if let Some(topic) = self.topic {
            opts.topic = topic;
        }
        if self.days.is_some() {
            opts.days = self.days;
        }
        if let Some(n) = self.max_results {
            opts.max_results = n;
        }
        opts.include_images |= self.images;
        opts.include_answer |= self.answer;
        opts.include_raw_content |= self.raw_content;
        if !self.include_domains.is_empty() {
            opts.include_domains = self.include_domains;
        }
        if !self.exclude_domains.is_empty() {
            opts.exclude_domains = self.exclude_domains;
        }
        (self.query, opts)
    }
}

#[derive(Args, Debug)]
pub struct QnaArgs {
    pub query: String,
    #[arg(long)]
    pub depth: Option<SearchDepth>,
    #[arg(long)]
    pub max_results: Option<u32>,
}

impl QnaArgs {
    pub fn options(&self) -> QnaOptions {
        let base = QnaOptions::default();
        QnaOptions {
            search_depth: self.depth.unwrap_or(base.search_depth),
            max_results: self.max_results.unwrap_or(base.max_results),
            api_key: None,
        }
    }
}

#[derive(Args, Debug)]
pub struct ContextArgs {
    pub query: String,
    /// Character budget of the printed context.
    #[arg(long)]
    pub max_tokens: Option<usize>,
    #[arg(long)]
    pub depth: Option<SearchDepth>,
}

impl ContextArgs {
    pub fn options(&self) -> ContextOptions {
        let base = ContextOptions::default();
        ContextOptions {
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
            search_depth: self.depth.unwrap_or(base.search_depth),
            api_key: None,
        }
    }
}
