//! Best-effort web lookups for company research.
//!
//! Three independent sources feed a report: an encyclopedia summary API, a
//! website resolver (guess + existence probe, then a search-abstract API), and
//! a news syndication feed. Every lookup returns a [`Lookup`] instead of an
//! error so one dead endpoint never stops a research run.

mod encyclopedia;
mod news;
mod pause;
mod website;

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use scout_shared::{Lookup, LookupConfig, Result, ScoutError};
use tracing::{debug, info, instrument, warn};

pub use pause::{Pause, TokioPause};
pub use website::guess_url;

/// Maximum number of redirects followed by any lookup request.
const MAX_REDIRECTS: usize = 5;

/// User-Agent string for lookup requests.
const USER_AGENT: &str = concat!("scout/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// WebLookup
// ---------------------------------------------------------------------------

/// The lookups a research run needs from the web.
///
/// Implementations must not fail: transport or decode problems are reported
/// as [`Lookup::Failed`], a source with no answer as [`Lookup::Empty`].
pub trait WebLookup: Send + Sync {
    /// Introductory encyclopedia extract for `name`, truncated to the
    /// configured character budget.
    fn fetch_summary(&self, name: &str) -> impl Future<Output = Lookup<String>> + Send;

    /// Official website for `name`.
    fn resolve_website(&self, name: &str) -> impl Future<Output = Lookup<String>> + Send;

    /// Up to the configured number of headline titles, in feed order.
    fn fetch_headlines(&self, name: &str) -> impl Future<Output = Lookup<Vec<String>>> + Send;
}

// ---------------------------------------------------------------------------
// WebClient
// ---------------------------------------------------------------------------

/// HTTP implementation of [`WebLookup`].
pub struct WebClient<P = TokioPause> {
    client: Client,
    config: LookupConfig,
    pause: P,
}

impl WebClient<TokioPause> {
    /// Create a client that pauses on the tokio timer.
    pub fn new(config: LookupConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.request_timeout)?,
            config,
            pause: TokioPause,
        })
    }
}

impl<P: Pause> WebClient<P> {
    /// Swap the pause used before the search fallback.
    pub fn with_pause<Q: Pause>(self, pause: Q) -> WebClient<Q> {
        WebClient {
            client: self.client,
            config: self.config,
            pause,
        }
    }
}

impl<P: Pause> WebLookup for WebClient<P> {
    #[instrument(skip_all, fields(company = %name))]
    async fn fetch_summary(&self, name: &str) -> Lookup<String> {
        let result = encyclopedia::fetch_extract(
            &self.client,
            &self.config.encyclopedia_url,
            name,
            self.config.max_context_chars,
        )
        .await;

        match &result {
            Ok(Some(extract)) => info!(chars = extract.chars().count(), "encyclopedia extract found"),
            Ok(None) => info!("encyclopedia has no extract"),
            Err(e) => warn!(error = %e, "encyclopedia lookup failed"),
        }
        result.into()
    }

    #[instrument(skip_all, fields(company = %name))]
    async fn resolve_website(&self, name: &str) -> Lookup<String> {
        match guess_url(&self.config.website_guess, name) {
            Some(guess) => {
                if website::probe(&self.client, &guess, self.config.probe_timeout).await {
                    info!(website = %guess, "website guess is reachable");
                    return Lookup::Found(guess);
                }
                debug!(website = %guess, "website guess not reachable");
            }
            None => debug!("no usable website guess"),
        }

        self.pause.pause(self.config.fallback_delay).await;

        let result = website::search_abstract_url(&self.client, &self.config.search_url, name).await;
        match &result {
            Ok(Some(url)) => info!(website = %url, "website found via search"),
            Ok(None) => info!("search returned no website"),
            Err(e) => warn!(error = %e, "website search failed"),
        }
        result.into()
    }

    #[instrument(skip_all, fields(company = %name))]
    async fn fetch_headlines(&self, name: &str) -> Lookup<Vec<String>> {
        let result =
            news::fetch_titles(&self.client, &self.config.news_url, name, self.config.max_headlines)
                .await
                .map(|titles| Some(titles).filter(|t| !t.is_empty()));

        match &result {
            Ok(Some(titles)) => info!(count = titles.len(), "headlines found"),
            Ok(None) => info!("feed has no headlines"),
            Err(e) => warn!(error = %e, "news feed lookup failed"),
        }
        result.into()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with appropriate settings.
fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(timeout)
        .build()
        .map_err(|e| ScoutError::Network(format!("failed to build HTTP client: {e}")))
}

/// Reject non-2xx responses, keeping the URL in the error.
fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(ScoutError::Network(format!(
            "{}: HTTP {status}",
            response.url()
        )));
    }
    Ok(response)
}
