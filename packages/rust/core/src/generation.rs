//! Text-generation client.
//!
//! Talks to a local Ollama-compatible service over HTTP: `POST /api/generate`
//! for completions and `POST /api/pull` to fetch models before a run.

use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use scout_shared::{GenerationConfig, Result, ScoutError, truncate_chars};

/// User-Agent string for generation requests.
const USER_AGENT: &str = concat!("scout/", env!("CARGO_PKG_VERSION"));

/// How much of an error body is kept in the error message.
const ERROR_BODY_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// TextGenerator
// ---------------------------------------------------------------------------

/// Something that turns a prompt into text.
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`, asking for at most `max_tokens`
    /// output tokens. No retries, no streaming.
    fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    #[serde(default)]
    status: String,
}

// ---------------------------------------------------------------------------
// OllamaClient
// ---------------------------------------------------------------------------

/// HTTP client for an Ollama-compatible generation backend.
pub struct OllamaClient {
    client: Client,
    config: GenerationConfig,
}

impl OllamaClient {
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ScoutError::Generation(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Ask the backend to download `model`, waiting until it is ready.
    #[instrument(skip(self))]
    pub async fn pull_model(&self, model: &str) -> Result<()> {
        let url = self.endpoint("api/pull");
        info!(%url, "pulling model");

        let response = self
            .client
            .post(&url)
            .timeout(self.config.pull_timeout)
            .json(&PullRequest {
                model,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| ScoutError::Generation(format!("{url}: {e}")))?;

        let body: PullResponse = ensure_success(&url, response)
            .await?
            .json()
            .await
            .map_err(|e| ScoutError::Generation(format!("{url}: invalid pull response: {e}")))?;

        if body.status != "success" {
            return Err(ScoutError::Generation(format!(
                "pull of {model} ended with status '{}'",
                body.status
            )));
        }

        info!("model ready");
        Ok(())
    }

    /// Pull every model in `models`, logging failures instead of returning
    /// them. Returns how many models are ready.
    pub async fn prepare_models(&self, models: &[String]) -> usize {
        let mut ready = 0;
        for model in models {
            match self.pull_model(model).await {
                Ok(()) => ready += 1,
                Err(e) => warn!(%model, error = %e, "could not prepare model, continuing"),
            }
        }
        ready
    }
}

impl TextGenerator for OllamaClient {
    #[instrument(skip(self, prompt), fields(model = %self.config.model, prompt_chars = prompt.len()))]
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let url = self.endpoint("api/generate");

        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .timeout(self.config.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ScoutError::Generation(format!("{url}: {e}")))?;

        let body: GenerateResponse = ensure_success(&url, response)
            .await?
            .json()
            .await
            .map_err(|e| ScoutError::Generation(format!("{url}: invalid response: {e}")))?;

        debug!(response_chars = body.response.len(), "generation complete");
        Ok(body.response)
    }
}

/// Turn a non-2xx reply into an error carrying the start of its body.
async fn ensure_success(url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ScoutError::Generation(format!(
        "{url}: HTTP {status}: {}",
        truncate_chars(body.trim(), ERROR_BODY_CHARS)
    )))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
