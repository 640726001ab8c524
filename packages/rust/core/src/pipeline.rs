//! Research pipeline: company name → lookups → generation → report.
//!
//! Every step always runs, in a fixed order. A failing step only changes the
//! content of its own fields; the encyclopedia context is the one value
//! shared between steps.

use std::fmt;

use tracing::{info, instrument, warn};

use scout_lookup::{WebClient, WebLookup};
use scout_shared::{
    AppConfig, CompanyReport, GenerationConfig, INFORMATION_UNAVAILABLE, Lookup, LookupConfig,
    NO_CONTEXT, ResearchConfig, Result, SUMMARY_UNAVAILABLE, truncate_chars,
};

use crate::generation::{OllamaClient, TextGenerator};
use crate::prompts::{self, Extraction};

// ---------------------------------------------------------------------------
// Steps & progress
// ---------------------------------------------------------------------------

/// The pipeline's steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchStep {
    Summary,
    Website,
    Description,
    Extraction,
    News,
}

impl fmt::Display for ResearchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary => write!(f, "Getting encyclopedia summary"),
            Self::Website => write!(f, "Finding website"),
            Self::Description => write!(f, "Generating summary"),
            Self::Extraction => write!(f, "Extracting key people, products, locations"),
            Self::News => write!(f, "Checking news"),
        }
    }
}

/// Progress callback for reporting pipeline status.
pub trait ResearchProgress: Send + Sync {
    /// Called when a step starts.
    fn step(&self, company: &str, step: ResearchStep);
    /// Called once the report is assembled.
    fn done(&self, report: &CompanyReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ResearchProgress for SilentProgress {
    fn step(&self, _company: &str, _step: ResearchStep) {}
    fn done(&self, _report: &CompanyReport) {}
}

// ---------------------------------------------------------------------------
// Trace
// ---------------------------------------------------------------------------

/// What actually happened behind one report field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Real data was obtained.
    Found,
    /// The source answered with nothing.
    Empty,
    /// The call failed; the field holds a sentinel.
    Failed(String),
    /// The call was not attempted.
    Skipped,
}

impl<T> From<&Lookup<T>> for StepOutcome {
    fn from(lookup: &Lookup<T>) -> Self {
        match lookup {
            Lookup::Found(_) => Self::Found,
            Lookup::Empty => Self::Empty,
            Lookup::Failed(reason) => Self::Failed(reason.clone()),
        }
    }
}

/// Per-field outcomes of one research run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchTrace {
    /// Encyclopedia context (not a report field, but it drives extraction).
    pub summary_context: StepOutcome,
    pub website: StepOutcome,
    pub summary: StepOutcome,
    pub key_people: StepOutcome,
    pub products_services: StepOutcome,
    pub locations: StepOutcome,
    pub recent_news: StepOutcome,
}

impl ResearchTrace {
    /// `(field, reason)` for every failed step, in pipeline order.
    pub fn failures(&self) -> Vec<(&'static str, &str)> {
        [
            ("summary_context", &self.summary_context),
            ("website", &self.website),
            ("summary", &self.summary),
            ("key_people", &self.key_people),
            ("products_services", &self.products_services),
            ("locations", &self.locations),
            ("recent_news", &self.recent_news),
        ]
        .into_iter()
        .filter_map(|(field, outcome)| match outcome {
            StepOutcome::Failed(reason) => Some((field, reason.as_str())),
            _ => None,
        })
        .collect()
    }
}

/// A report together with how each of its fields was obtained.
#[derive(Debug, Clone)]
pub struct ResearchRun {
    pub report: CompanyReport,
    pub trace: ResearchTrace,
}

// ---------------------------------------------------------------------------
// Researcher
// ---------------------------------------------------------------------------

/// Runs the research pipeline against a lookup source and a generator.
pub struct Researcher<W, G> {
    lookup: W,
    generator: G,
    config: ResearchConfig,
}

/// The production wiring: HTTP lookups and an Ollama backend.
pub type DefaultResearcher = Researcher<WebClient, OllamaClient>;

impl DefaultResearcher {
    /// Build the HTTP clients from application config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let lookup = WebClient::new(LookupConfig::from(config))?;
        let generator = OllamaClient::new(GenerationConfig::from(config))?;
        Ok(Self::new(lookup, generator, ResearchConfig::from(config)))
    }
}

impl<W: WebLookup, G: TextGenerator> Researcher<W, G> {
    pub fn new(lookup: W, generator: G, config: ResearchConfig) -> Self {
        Self {
            lookup,
            generator,
            config,
        }
    }

    #[cfg(test)]
    pub(crate) fn generator(&self) -> &G {
        &self.generator
    }

    /// Research one company. Never fails: degraded steps show up as
    /// sentinel text in the report.
    pub async fn research(&self, company: &str, progress: &dyn ResearchProgress) -> CompanyReport {
        self.research_traced(company, progress).await.report
    }

    /// Research one company and keep the per-step outcomes.
    ///
    /// 1. Encyclopedia summary (context)
    /// 2. Official website
    /// 3. Short description
    /// 4. Key people, products/services, locations
    /// 5. Recent headlines
    #[instrument(skip_all, fields(company = %company))]
    pub async fn research_traced(
        &self,
        company: &str,
        progress: &dyn ResearchProgress,
    ) -> ResearchRun {
        info!("starting research");

        // --- Step 1: Encyclopedia context ---
        progress.step(company, ResearchStep::Summary);
        let context = self.lookup.fetch_summary(company).await;
        // A blank extract counts as no context.
        let context = match context {
            Lookup::Found(text) if text.trim().is_empty() => Lookup::Empty,
            other => other,
        };
        let summary_context = StepOutcome::from(&context);
        let context = context.found();

        // --- Step 2: Website ---
        progress.step(company, ResearchStep::Website);
        let website_lookup = self.lookup.resolve_website(company).await;
        let website_outcome = StepOutcome::from(&website_lookup);
        let website = website_lookup.unwrap_or_default();

        // --- Step 3: Description ---
        progress.step(company, ResearchStep::Description);
        let description_context = context
            .as_deref()
            .map(|c| truncate_chars(c, self.config.description_context_chars));
        let prompt = prompts::describe(company, description_context, Some(website.as_str()));
        let (summary, summary_outcome) = match self.generate(&prompt).await {
            Ok(text) => {
                let outcome = if text.trim().is_empty() {
                    StepOutcome::Empty
                } else {
                    StepOutcome::Found
                };
                (text, outcome)
            }
            Err(reason) => {
                warn!(error = %reason, "description generation failed");
                (SUMMARY_UNAVAILABLE.to_string(), StepOutcome::Failed(reason))
            }
        };

        // --- Step 4: Extraction ---
        progress.step(company, ResearchStep::Extraction);
        let (key_people, products_services, locations) = match context.as_deref() {
            Some(context) => {
                let short = truncate_chars(context, self.config.extraction_context_chars);
                (
                    self.extract(Extraction::KeyPeople, company, short).await,
                    self.extract(Extraction::ProductsServices, company, short).await,
                    self.extract(Extraction::Locations, company, short).await,
                )
            }
            None => {
                info!("no encyclopedia context, skipping extraction");
                let skipped = || (NO_CONTEXT.to_string(), StepOutcome::Skipped);
                (skipped(), skipped(), skipped())
            }
        };

        // --- Step 5: News ---
        progress.step(company, ResearchStep::News);
        let news = self.lookup.fetch_headlines(company).await;
        let news_outcome = StepOutcome::from(&news);
        let mut recent_news = news.unwrap_or_default();
        recent_news.truncate(self.config.max_headlines);

        let report = CompanyReport {
            company_name: company.to_string(),
            website,
            summary,
            key_people: key_people.0,
            products_services: products_services.0,
            locations: locations.0,
            recent_news,
        };

        let trace = ResearchTrace {
            summary_context,
            website: website_outcome,
            summary: summary_outcome,
            key_people: key_people.1,
            products_services: products_services.1,
            locations: locations.1,
            recent_news: news_outcome,
        };

        let failures = trace.failures();
        info!(
            failed_steps = failures.len(),
            headlines = report.recent_news.len(),
            has_website = !report.website.is_empty(),
            "research complete"
        );

        progress.done(&report);
        ResearchRun { report, trace }
    }

    /// One generation call with the configured length hint.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, String> {
        self.generator
            .generate(prompt, self.config.max_tokens)
            .await
            .map_err(|e| e.to_string())
    }

    /// One extraction call; failures become [`INFORMATION_UNAVAILABLE`].
    async fn extract(
        &self,
        kind: Extraction,
        company: &str,
        context: &str,
    ) -> (String, StepOutcome) {
        let prompt = prompts::extract(kind, company, context);
        match self.generate(&prompt).await {
            Ok(text) => {
                let text = text.trim().to_string();
                let outcome = if text.is_empty() {
                    StepOutcome::Empty
                } else {
                    StepOutcome::Found
                };
                (text, outcome)
            }
            Err(reason) => {
                warn!(field = kind.field(), error = %reason, "extraction failed");
                (INFORMATION_UNAVAILABLE.to_string(), StepOutcome::Failed(reason))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use scout_shared::ScoutError;

    use super::*;

    /// Canned lookup results.
    struct FakeLookup {
        summary: Lookup<String>,
        website: Lookup<String>,
        news: Lookup<Vec<String>>,
    }

    impl FakeLookup {
        fn found(summary: &str) -> Self {
            Self {
                summary: Lookup::Found(summary.to_string()),
                website: Lookup::Found("https://www.acmeco.com".into()),
                news: Lookup::Found(vec!["Acme opens plant".into()]),
            }
        }
    }

    impl WebLookup for FakeLookup {
        async fn fetch_summary(&self, _name: &str) -> Lookup<String> {
            self.summary.clone()
        }

        async fn resolve_website(&self, _name: &str) -> Lookup<String> {
            self.website.clone()
        }

        async fn fetch_headlines(&self, _name: &str) -> Lookup<Vec<String>> {
            self.news.clone()
        }
    }

    /// Records prompts and answers from a fixed reply (or fails).
    struct FakeGenerator {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl TextGenerator for FakeGenerator {
        async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
            assert_eq!(max_tokens, 100);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .ok_or_else(|| ScoutError::Generation("connection refused".into()))
        }
    }

    struct RecordingProgress(Mutex<Vec<ResearchStep>>);

    impl ResearchProgress for RecordingProgress {
        fn step(&self, _company: &str, step: ResearchStep) {
            self.0.lock().unwrap().push(step);
        }
        fn done(&self, _report: &CompanyReport) {}
    }

    fn researcher(
        lookup: FakeLookup,
        generator: FakeGenerator,
    ) -> Researcher<FakeLookup, FakeGenerator> {
        Researcher::new(lookup, generator, ResearchConfig::default())
    }

    #[tokio::test]
    async fn acme_end_to_end() {
        let r = researcher(
            FakeLookup::found("Acme Corporation is a fictional company."),
            FakeGenerator::replying("  Acme makes anvils.  "),
        );
        let progress = RecordingProgress(Mutex::new(Vec::new()));

        let run = r.research_traced("Acme Co", &progress).await;
        let report = run.report;

        assert_eq!(report.company_name, "Acme Co");
        assert_eq!(report.website, "https://www.acmeco.com");
        // Description is kept as generated; extractions are trimmed.
        assert_eq!(report.summary, "  Acme makes anvils.  ");
        assert_eq!(report.key_people, "Acme makes anvils.");
        assert_eq!(report.products_services, "Acme makes anvils.");
        assert_eq!(report.locations, "Acme makes anvils.");
        assert_eq!(report.recent_news, vec!["Acme opens plant".to_string()]);
        assert!(run.trace.failures().is_empty());

        let prompts = r.generator().prompts();
        assert_eq!(prompts.len(), 4);
        assert!(prompts[0].contains("Website: https://www.acmeco.com"));
        assert!(prompts[1].contains("key people"));
        assert!(prompts[2].contains("products or services"));
        assert!(prompts[3].contains("headquarters locations"));

        assert_eq!(
            *progress.0.lock().unwrap(),
            vec![
                ResearchStep::Summary,
                ResearchStep::Website,
                ResearchStep::Description,
                ResearchStep::Extraction,
                ResearchStep::News,
            ]
        );
    }

    #[tokio::test]
    async fn context_is_sliced_per_prompt() {
        let context = "Ω".repeat(1000);
        let r = researcher(FakeLookup::found(&context), FakeGenerator::replying("ok"));
        r.research("Acme Co", &SilentProgress).await;

        let prompts = r.generator().prompts();
        let omegas = |p: &str| p.chars().filter(|c| *c == 'Ω').count();
        assert_eq!(omegas(&prompts[0]), 500);
        for prompt in &prompts[1..] {
            assert_eq!(omegas(prompt), 800);
        }
    }

    #[tokio::test]
    async fn missing_context_skips_extraction() {
        let lookup = FakeLookup {
            summary: Lookup::Empty,
            website: Lookup::Empty,
            news: Lookup::Found(Vec::new()),
        };
        let r = researcher(lookup, FakeGenerator::replying("A company."));
        let run = r.research_traced("Nobody Inc", &SilentProgress).await;

        assert_eq!(run.report.website, "");
        assert_eq!(run.report.summary, "A company.");
        assert_eq!(run.report.key_people, NO_CONTEXT);
        assert_eq!(run.report.products_services, NO_CONTEXT);
        assert_eq!(run.report.locations, NO_CONTEXT);
        assert!(run.report.recent_news.is_empty());
        assert_eq!(run.trace.key_people, StepOutcome::Skipped);

        let prompts = r.generator().prompts();
        assert_eq!(prompts.len(), 1);
        assert!(!prompts[0].contains("Website:"));
        assert!(prompts[0].ends_with("Context: No context available"));
    }

    #[tokio::test]
    async fn blank_context_skips_extraction() {
        for blank in ["", "  \n\t"] {
            let mut lookup = FakeLookup::found(blank);
            lookup.website = Lookup::Empty;
            let r = researcher(lookup, FakeGenerator::replying("hallucinated"));
            let run = r.research_traced("Acme Co", &SilentProgress).await;

            assert_eq!(run.report.key_people, NO_CONTEXT);
            assert_eq!(run.report.products_services, NO_CONTEXT);
            assert_eq!(run.report.locations, NO_CONTEXT);
            assert_eq!(run.trace.summary_context, StepOutcome::Empty);
            assert_eq!(run.trace.locations, StepOutcome::Skipped);

            let prompts = r.generator().prompts();
            assert_eq!(prompts.len(), 1);
            assert!(prompts[0].ends_with("Context: No context available"));
        }
    }

    #[tokio::test]
    async fn generation_failure_uses_sentinels() {
        let r = researcher(FakeLookup::found("Acme context"), FakeGenerator::failing());
        let run = r.research_traced("Acme Co", &SilentProgress).await;

        assert_eq!(run.report.summary, SUMMARY_UNAVAILABLE);
        assert_eq!(run.report.key_people, INFORMATION_UNAVAILABLE);
        assert_eq!(run.report.products_services, INFORMATION_UNAVAILABLE);
        assert_eq!(run.report.locations, INFORMATION_UNAVAILABLE);
        assert_eq!(run.report.website, "https://www.acmeco.com");

        let failed: Vec<_> = run.trace.failures().into_iter().map(|(f, _)| f).collect();
        assert_eq!(
            failed,
            vec!["summary", "key_people", "products_services", "locations"]
        );
    }

    #[tokio::test]
    async fn lookup_failures_degrade_to_empty_fields() {
        let lookup = FakeLookup {
            summary: Lookup::Failed("timeout".into()),
            website: Lookup::Failed("dns".into()),
            news: Lookup::Failed("502".into()),
        };
        let r = researcher(lookup, FakeGenerator::replying("text"));
        let run = r.research_traced("Acme Co", &SilentProgress).await;

        assert_eq!(run.report.website, "");
        assert!(run.report.recent_news.is_empty());
        assert_eq!(run.report.key_people, NO_CONTEXT);
        assert_eq!(run.trace.summary_context, StepOutcome::Failed("timeout".into()));
        assert_eq!(run.trace.recent_news, StepOutcome::Failed("502".into()));
    }

    /// Skips the fallback delay in HTTP tests.
    struct NoPause;

    impl scout_lookup::Pause for NoPause {
        async fn pause(&self, _duration: std::time::Duration) {}
    }

    #[tokio::test]
    async fn acme_with_unreachable_encyclopedia_over_http() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let base = server.uri();

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/sites/acmeco"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rss/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<rss version=\"2.0\"><channel><title>News</title>\
                 <item><title>Acme opens plant</title></item></channel></rss>",
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "response": "Acme is a company." })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let lookup = WebClient::new(LookupConfig {
            encyclopedia_url: format!("{base}/w/api.php"),
            search_url: format!("{base}/search"),
            news_url: format!("{base}/rss/search"),
            website_guess: format!("{base}/sites/{{slug}}"),
            ..LookupConfig::default()
        })
        .unwrap()
        .with_pause(NoPause);
        let generator = OllamaClient::new(GenerationConfig {
            base_url: base.clone(),
            ..GenerationConfig::default()
        })
        .unwrap();

        let r = Researcher::new(lookup, generator, ResearchConfig::default());
        let run = r.research_traced("Acme Co", &SilentProgress).await;

        assert!(matches!(run.trace.summary_context, StepOutcome::Failed(_)));
        assert_eq!(run.report.website, format!("{base}/sites/acmeco"));
        assert_eq!(run.report.summary, "Acme is a company.");
        assert_eq!(run.report.key_people, NO_CONTEXT);
        assert_eq!(run.report.products_services, NO_CONTEXT);
        assert_eq!(run.report.locations, NO_CONTEXT);
        assert_eq!(run.report.recent_news, vec!["Acme opens plant"]);
    }

    #[tokio::test]
    async fn news_is_capped() {
        let mut lookup = FakeLookup::found("ctx");
        lookup.news = Lookup::Found((1..=5).map(|i| format!("headline {i}")).collect());
        let r = researcher(lookup, FakeGenerator::replying("x"));
        let report = r.research("Acme Co", &SilentProgress).await;
        assert_eq!(report.recent_news, vec!["headline 1", "headline 2", "headline 3"]);
    }
}
