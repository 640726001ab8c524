//! Official-website resolution: deterministic guess, then search abstract.

use std::time::Duration;

use reqwest::Client;
use scout_shared::{Result, SLUG_PLACEHOLDER, ScoutError};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::check_status;

/// Search-abstract API response; only the abstract URL matters.
#[derive(Debug, Deserialize)]
struct AbstractResponse {
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
}

/// Build the guessed website for `name` from `template`.
///
/// The slug is the lower-cased name with all whitespace removed. Returns
/// `None` when the slug is empty or the result is not a valid URL.
pub fn guess_url(template: &str, name: &str) -> Option<String> {
    let slug: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    if slug.is_empty() {
        return None;
    }

    let guess = template.replace(SLUG_PLACEHOLDER, &slug);
    Url::parse(&guess).ok().map(|_| guess)
}

/// `HEAD` the URL (following redirects); reachable means a 2xx answer.
pub(crate) async fn probe(client: &Client, url: &str, timeout: Duration) -> bool {
    match client.head(url).timeout(timeout).send().await {
        Ok(response) => {
            let status = response.status();
            debug!(url, %status, "website probe answered");
            status.is_success()
        }
        Err(e) => {
            debug!(url, error = %e, "website probe failed");
            false
        }
    }
}

/// Ask the search-abstract API for the company's official site.
pub(crate) async fn search_abstract_url(
    client: &Client,
    endpoint: &str,
    name: &str,
) -> Result<Option<String>> {
    let query = format!("{name} official site");
    debug!(endpoint, %query, "searching for website");

    let response = client
        .get(endpoint)
        .query(&[("q", query.as_str()), ("format", "json")])
        .send()
        .await
        .map_err(|e| ScoutError::Network(format!("{endpoint}: {e}")))?;

    let body: AbstractResponse = check_status(response)?
        .json()
        .await
        .map_err(|e| ScoutError::parse(format!("{endpoint}: invalid search response: {e}")))?;

    let url = body.abstract_url.trim();
    Ok((!url.is_empty()).then(|| url.to_string()))
}
