use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use tavily_client::{SearchOptions, SearchResponse, TavilyClient};
use tavily_common::observability::{LogConfig, init_logging};
use tavily_config::{TavilyConfig, TavilyConfigLoader};
mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LogConfig {
        emit_stderr: cli.verbose > 0,
        default_filter: match cli.verbose {
            0 | 1 => "info",
            _ => "debug",
        },
        ..LogConfig::default()
    })?;

    // Default file, then --config, then TAVILY_* env (env wins).
    let mut loader = TavilyConfigLoader::new().with_default_file();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let mut settings: TavilyConfig = loader.load().context("loading configuration")?;

    let api_key = match cli.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(key) => key.to_string(),
        None => match settings.api_key() {
            Some(key) => key.to_string(),
            None => prompt_api_key()?,
        },
    };
    settings.api_key = Some(api_key);

    let client = TavilyClient::from_settings(&settings)?;
    tracing::debug!(target: "tavily", base_url = %settings.base_url, "client ready");

    match cli.command {
        Command::Search(args) => {
            let defaults = SearchOptions::from_defaults(&settings.search)?;
            let (query, opts) = args.apply(defaults);
            let response = client.search(&query, opts).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_search(&response);
            }
        }
        Command::Qna(args) => {
            let answer = client.qna(&args.query, args.options()).await?;
            if cli.json {
                println!("{}", serde_json::json!({ "answer": answer }));
            } else {
                println!("{answer}");
            }
        }
        Command::Context(args) => {
            let context = client
                .get_search_context(&args.query, args.options())
                .await?;
            if cli.json {
                println!("{}", serde_json::json!({ "context": context }));
            } else {
                println!("{context}");
            }
        }
    }

    Ok(())
}

fn prompt_api_key() -> Result<String> {
    eprint!("Enter your Tavily API key: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let key = line.trim();
    if key.is_empty() {
        bail!("no API key given (use --api-key, TAVILY_API_KEY or the config file)");
    }
    Ok(key.to_string())
}

fn print_search(response: &SearchResponse) {
    if let Some(answer) = &response.answer {
        println!("{answer}\n");
    }
    for (i, r) in response.results.iter().enumerate() {
        println!("{}. {} ({:.2})", i + 1, r.title, r.score);
        println!("   {}", r.url);
        if let Some(date) = &r.published_date {
            println!("   published {date}");
        }
        if !r.content.is_empty() {
            println!("   {}", r.content);
        }
    }
    if !response.follow_up_questions.is_empty() {
        println!("\nFollow-up questions:");
        for q in &response.follow_up_questions {
            println!("  - {q}");
        }
    }
    if let Some(images) = response.images.as_ref().filter(|i| !i.is_empty()) {
        println!("\nImages:");
        for url in images {
            println!("  {url}");
        }
    }
    tracing::debug!(response_time = response.response_time, "search printed");
}
