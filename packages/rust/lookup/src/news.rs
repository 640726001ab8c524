//! Headline lookup from a news syndication feed (RSS or Atom).

use reqwest::Client;
use scout_shared::{Result, ScoutError};
use tracing::debug;

use crate::check_status;

/// Fetch the feed for `query` and return up to `max` entry titles.
pub(crate) async fn fetch_titles(
    client: &Client,
    endpoint: &str,
    query: &str,
    max: usize,
) -> Result<Vec<String>> {
    debug!(endpoint, query, "fetching news feed");

    let response = client
        .get(endpoint)
        .query(&[("q", query), ("hl", "en-US"), ("gl", "US"), ("ceid", "US:en")])
        .send()
        .await
        .map_err(|e| ScoutError::Network(format!("{endpoint}: {e}")))?;

    let body = check_status(response)?
        .bytes()
        .await
        .map_err(|e| ScoutError::Network(format!("{endpoint}: failed to read body: {e}")))?;

    parse_titles(&body, max)
}

/// Parse a feed document and keep the first `max` non-blank titles.
fn parse_titles(feed: &[u8], max: usize) -> Result<Vec<String>> {
    let feed = feed_rs::parser::parse(feed)
        .map_err(|e| ScoutError::parse(format!("invalid news feed: {e}")))?;

    Ok(feed
        .entries
        .into_iter()
        .filter_map(|entry| entry.title)
        .map(|title| title.content.trim().to_string())
        .filter(|title| !title.is_empty())
        .take(max)
        .collect())
}
