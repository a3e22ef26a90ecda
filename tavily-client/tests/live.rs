//! Live checks against api.tavily.com. Run with
//! `TAVILY_API_KEY=... cargo test -p tavily-client --test live -- --ignored`.
mod common;

use tavily_client::{ContextOptions, ErrorKind, QnaOptions, SearchOptions, TavilyClient};
use tavily_common::Result;

fn make_client_or_skip() -> TavilyClient {
    let key = std::env::var("TAVILY_API_KEY").unwrap_or_else(|_| {
        tracing::debug!("Skipping: TAVILY_API_KEY not set");
        panic!("SKIP");
    });
    TavilyClient::new(key).expect("client")
}

#[tokio::test]
#[ignore]
async fn live_search_picard() -> Result<()> {
    common::init_test_tracing();
    let client = make_client_or_skip();

    let resp = client
        .search("Who is Captain Jean-Luc Picard?", SearchOptions::default())
        .await?;
    assert!(!resp.results.is_empty());
    assert!(resp.results.len() <= 5);
    assert!(resp.results.iter().all(|r| !r.url.is_empty()));
    assert!(
        resp.results
            .iter()
            .any(|r| r.title.to_lowercase().contains("picard")),
        "no result title mentions Picard"
    );
    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_qna_prime_directive() -> Result<()> {
    common::init_test_tracing();
    let client = make_client_or_skip();

    let answer = client
        .qna("What is the Prime Directive in Star Trek?", QnaOptions::default())
        .await?;
    assert!(
        answer.to_lowercase().contains("prime directive"),
        "unexpected answer: {answer}"
    );
    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_context_within_budget() -> Result<()> {
    common::init_test_tracing();
    let client = make_client_or_skip();

    let max_tokens = 1500;
    let context = client
        .get_search_context(
            "History of the Klingon Empire",
            ContextOptions {
                max_tokens,
                ..ContextOptions::default()
            },
        )
        .await?;
    assert!(!context.is_empty());
    assert!(context.chars().count() <= max_tokens);
    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_invalid_key_is_rejected() {
    common::init_test_tracing();
    // Only meaningful when the network is reachable.
    let _ = make_client_or_skip();

    let client = TavilyClient::new("invalid_api_key").expect("client");
    let err = client
        .search("Who is Captain Jean-Luc Picard?", SearchOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidApiKey, "{err}");
}
