//! Encyclopedia summary lookup (MediaWiki `action=query` extracts).

use std::collections::BTreeMap;

use reqwest::Client;
use scout_shared::{Result, ScoutError, truncate_chars};
use serde::Deserialize;
use tracing::debug;

use crate::check_status;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: BTreeMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    extract: Option<String>,
}

/// Fetch the introductory plain-text extract for `title`.
///
/// `Ok(None)` means the API answered but the page is missing or has no
/// extract.
pub(crate) async fn fetch_extract(
    client: &Client,
    endpoint: &str,
    title: &str,
    max_chars: usize,
) -> Result<Option<String>> {
    debug!(endpoint, title, "querying encyclopedia");

    let response = client
        .get(endpoint)
        .query(&[
            ("action", "query"),
            ("format", "json"),
            ("titles", title),
            ("prop", "extracts"),
            ("exintro", "true"),
            ("explaintext", "true"),
        ])
        .send()
        .await
        .map_err(|e| ScoutError::Network(format!("{endpoint}: {e}")))?;

    let body: QueryResponse = check_status(response)?
        .json()
        .await
        .map_err(|e| ScoutError::parse(format!("{endpoint}: invalid query response: {e}")))?;

    first_extract(body, max_chars)
}

/// Pull the first page's extract out of a decoded response.
fn first_extract(body: QueryResponse, max_chars: usize) -> Result<Option<String>> {
    let page = body
        .query
        .and_then(|q| q.pages.into_values().next())
        .ok_or_else(|| ScoutError::parse("query response has no pages"))?;

    let extract = page.extract.unwrap_or_default();
    if extract.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(truncate_chars(&extract, max_chars).to_string()))
}
