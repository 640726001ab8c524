//! Application configuration for scout.
//!
//! User config lives at `~/.scout/scout.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ScoutError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "scout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".scout";

/// Placeholder replaced by the company slug in `website_guess`.
pub const SLUG_PLACEHOLDER: &str = "{slug}";

// ---------------------------------------------------------------------------
// Config structs (matching scout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Text and result budgets.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Lookup endpoints.
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Request timeouts and pauses.
    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    /// Generation backend settings.
    #[serde(default)]
    pub generation: GenerationBackendConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory reports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Companies researched when none are given on the command line.
    #[serde(default = "default_companies")]
    pub companies: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            companies: default_companies(),
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_companies() -> Vec<String> {
    vec!["Motorola".into(), "Apple".into()]
}

/// `[limits]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Character budget for the encyclopedia extract.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,

    /// Context slice passed to the description prompt.
    #[serde(default = "default_description_context_chars")]
    pub description_context_chars: usize,

    /// Context slice passed to each extraction prompt.
    #[serde(default = "default_extraction_context_chars")]
    pub extraction_context_chars: usize,

    /// Maximum number of headlines kept.
    #[serde(default = "default_max_headlines")]
    pub max_headlines: usize,

    /// Output length hint sent with every generation call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_context_chars: default_max_context_chars(),
            description_context_chars: default_description_context_chars(),
            extraction_context_chars: default_extraction_context_chars(),
            max_headlines: default_max_headlines(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_max_context_chars() -> usize {
    1000
}
fn default_description_context_chars() -> usize {
    500
}
fn default_extraction_context_chars() -> usize {
    800
}
fn default_max_headlines() -> usize {
    3
}
fn default_max_tokens() -> u32 {
    100
}

/// `[endpoints]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Encyclopedia query API.
    #[serde(default = "default_encyclopedia_url")]
    pub encyclopedia_url: String,

    /// Search-abstract API used when the website guess fails.
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// News syndication feed search.
    #[serde(default = "default_news_url")]
    pub news_url: String,

    /// Website guess template; `{slug}` is replaced by the squashed name.
    #[serde(default = "default_website_guess")]
    pub website_guess: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            encyclopedia_url: default_encyclopedia_url(),
            search_url: default_search_url(),
            news_url: default_news_url(),
            website_guess: default_website_guess(),
        }
    }
}

fn default_encyclopedia_url() -> String {
    "https://en.wikipedia.org/w/api.php".into()
}
fn default_search_url() -> String {
    "https://api.duckduckgo.com/".into()
}
fn default_news_url() -> String {
    "https://news.google.com/rss/search".into()
}
fn default_website_guess() -> String {
    "https://www.{slug}.com".into()
}

/// `[timeouts]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// Timeout for ordinary GET requests.
    #[serde(default = "default_request_secs")]
    pub request_secs: u64,

    /// Timeout for the website existence probe.
    #[serde(default = "default_probe_secs")]
    pub probe_secs: u64,

    /// Pause between a failed website guess and the search fallback.
    #[serde(default = "default_fallback_delay_ms")]
    pub fallback_delay_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            request_secs: default_request_secs(),
            probe_secs: default_probe_secs(),
            fallback_delay_ms: default_fallback_delay_ms(),
        }
    }
}

fn default_request_secs() -> u64 {
    10
}
fn default_probe_secs() -> u64 {
    5
}
fn default_fallback_delay_ms() -> u64 {
    2000
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationBackendConfig {
    /// Base URL of the local generation service.
    #[serde(default = "default_generation_url")]
    pub base_url: String,

    /// Model used for every generation call.
    #[serde(default = "default_model")]
    pub model: String,

    /// Models pulled once at process start (best-effort).
    #[serde(default = "default_prepare_models")]
    pub prepare_models: Vec<String>,

    /// Timeout for a single generation call.
    #[serde(default = "default_generation_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for a single model pull.
    #[serde(default = "default_pull_timeout")]
    pub pull_timeout_secs: u64,
}

impl Default for GenerationBackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_url(),
            model: default_model(),
            prepare_models: default_prepare_models(),
            request_timeout_secs: default_generation_timeout(),
            pull_timeout_secs: default_pull_timeout(),
        }
    }
}

fn default_generation_url() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "gemma:2b".into()
}
fn default_prepare_models() -> Vec<String> {
    vec!["gemma:2b".into(), "phi".into()]
}
fn default_generation_timeout() -> u64 {
    120
}
fn default_pull_timeout() -> u64 {
    600
}

// ---------------------------------------------------------------------------
// Runtime configs (derived from AppConfig)
// ---------------------------------------------------------------------------

/// Runtime configuration for the web lookup client.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub encyclopedia_url: String,
    pub search_url: String,
    pub news_url: String,
    pub website_guess: String,
    /// Character budget for the encyclopedia extract.
    pub max_context_chars: usize,
    pub max_headlines: usize,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    /// Pause before falling back to the search API.
    pub fallback_delay: Duration,
}

impl From<&AppConfig> for LookupConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            encyclopedia_url: config.endpoints.encyclopedia_url.clone(),
            search_url: config.endpoints.search_url.clone(),
            news_url: config.endpoints.news_url.clone(),
            website_guess: config.endpoints.website_guess.clone(),
            max_context_chars: config.limits.max_context_chars,
            max_headlines: config.limits.max_headlines,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
            probe_timeout: Duration::from_secs(config.timeouts.probe_secs),
            fallback_delay: Duration::from_millis(config.timeouts.fallback_delay_ms),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Runtime configuration for the generation client.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
    pub request_timeout: Duration,
    pub pull_timeout: Duration,
}

impl From<&AppConfig> for GenerationConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.generation.base_url.clone(),
            model: config.generation.model.clone(),
            request_timeout: Duration::from_secs(config.generation.request_timeout_secs),
            pull_timeout: Duration::from_secs(config.generation.pull_timeout_secs),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Runtime configuration for the enrichment pipeline.
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    pub description_context_chars: usize,
    pub extraction_context_chars: usize,
    pub max_headlines: usize,
    pub max_tokens: u32,
}

impl From<&AppConfig> for ResearchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            description_context_chars: config.limits.description_context_chars,
            extraction_context_chars: config.limits.extraction_context_chars,
            max_headlines: config.limits.max_headlines,
            max_tokens: config.limits.max_tokens,
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.scout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| ScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.scout/scout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ScoutError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ScoutError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check endpoints and limits before any request goes out.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let endpoints = [
        ("endpoints.encyclopedia_url", &config.endpoints.encyclopedia_url),
        ("endpoints.search_url", &config.endpoints.search_url),
        ("endpoints.news_url", &config.endpoints.news_url),
        ("generation.base_url", &config.generation.base_url),
    ];
    for (key, value) in endpoints {
        Url::parse(value).map_err(|e| ScoutError::config(format!("{key} '{value}': {e}")))?;
    }

    if !config.endpoints.website_guess.contains(SLUG_PLACEHOLDER) {
        return Err(ScoutError::config(format!(
            "endpoints.website_guess must contain {SLUG_PLACEHOLDER}"
        )));
    }

    let limits = &config.limits;
    if limits.max_context_chars == 0
        || limits.description_context_chars == 0
        || limits.extraction_context_chars == 0
        || limits.max_tokens == 0
    {
        return Err(ScoutError::config("limits must be greater than zero"));
    }

    if config.generation.model.trim().is_empty() {
        return Err(ScoutError::config("generation.model is empty"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("gemma:2b"));
        assert!(toml_str.contains("{slug}"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.limits.max_context_chars, 1000);
        assert_eq!(parsed.limits.max_headlines, 3);
        assert_eq!(parsed.defaults.companies, vec!["Motorola", "Apple"]);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
companies = ["Acme Co"]

[timeouts]
fallback_delay_ms = 0
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.companies, vec!["Acme Co"]);
        assert_eq!(config.defaults.output_dir, ".");
        assert_eq!(config.timeouts.fallback_delay_ms, 0);
        assert_eq!(config.timeouts.probe_secs, 5);
        assert_eq!(config.generation.model, "gemma:2b");
    }

    #[test]
    fn runtime_configs_from_app_config() {
        let app = AppConfig::default();

        let lookup = LookupConfig::from(&app);
        assert_eq!(lookup.probe_timeout, Duration::from_secs(5));
        assert_eq!(lookup.request_timeout, Duration::from_secs(10));
        assert_eq!(lookup.fallback_delay, Duration::from_secs(2));
        assert_eq!(lookup.max_context_chars, 1000);

        let research = ResearchConfig::from(&app);
        assert_eq!(research.description_context_chars, 500);
        assert_eq!(research.extraction_context_chars, 800);
        assert_eq!(research.max_tokens, 100);

        let generation = GenerationConfig::from(&app);
        assert_eq!(generation.base_url, "http://localhost:11434");
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn validation_rejects_bad_endpoint() {
        let mut config = AppConfig::default();
        config.endpoints.news_url = "not a url".into();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("endpoints.news_url"));
    }

    #[test]
    fn validation_rejects_guess_without_slug() {
        let mut config = AppConfig::default();
        config.endpoints.website_guess = "https://www.example.com".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn validation_rejects_zero_limits() {
        let mut config = AppConfig::default();
        config.limits.max_tokens = 0;
        assert!(validate_config(&config).is_err());
    }
}
