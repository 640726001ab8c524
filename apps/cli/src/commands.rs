//! CLI command definitions, routing, and tracing setup.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use scout_core::generation::{OllamaClient, TextGenerator};
use scout_core::pipeline::{DefaultResearcher, ResearchProgress, ResearchStep, Researcher};
use scout_core::report;
use scout_lookup::WebLookup;
use scout_shared::{
    AppConfig, CompanyReport, GenerationConfig, init_config, load_config, load_config_from,
    validate_config,
};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// scout: quick company research from public sources and a local model.
#[derive(Parser)]
#[command(
    name = "scout",
    version,
    about = "Research companies from public web sources and a local text-generation model.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Research one or more companies and save a JSON report for each.
    Research {
        /// Company names (defaults to `defaults.companies` from the config).
        names: Vec<String>,

        /// Directory the reports are written to (defaults to `defaults.output_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Do not ask the generation backend to pull models first.
        #[arg(long)]
        skip_prepare: bool,

        /// Config file to use instead of ~/.scout/scout.toml.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the summary of a saved report.
    Show {
        /// Path to a `<company>_report.json` file.
        path: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "scout=info",
        1 => "scout=debug",
        _ => "scout=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Research {
            names,
            out,
            skip_prepare,
            config,
        } => cmd_research(names, out, skip_prepare, config.as_deref()).await,
        Command::Show { path } => cmd_show(&path),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_research(
    names: Vec<String>,
    out: Option<PathBuf>,
    skip_prepare: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    validate_config(&config)?;

    let companies: Vec<String> = if names.is_empty() {
        config.defaults.companies.clone()
    } else {
        names
    };
    let companies: Vec<String> = companies
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if companies.is_empty() {
        return Err(eyre!("no company names given and defaults.companies is empty"));
    }

    let out_dir = out.unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir));

    if !skip_prepare {
        prepare_models(&config).await?;
    }

    let researcher = DefaultResearcher::from_config(&config)?;
    info!(count = companies.len(), out = %out_dir.display(), "researching companies");

    let batch = research_batch(&researcher, &companies, &out_dir, CliProgress::new).await;

    println!();
    batch.ensure_any_saved(&out_dir)?;
    if !batch.failed.is_empty() {
        warn!(
            failed = batch.failed.len(),
            total = companies.len(),
            "some reports could not be saved"
        );
    }
    Ok(())
}

/// Saved reports and per-company failures of one batch.
#[derive(Debug, Default)]
pub(crate) struct BatchOutcome {
    pub saved: Vec<PathBuf>,
    pub failed: Vec<(String, String)>,
}

impl BatchOutcome {
    /// A batch that saved nothing is an error for the process exit status.
    pub(crate) fn ensure_any_saved(&self, out_dir: &Path) -> Result<()> {
        if self.saved.is_empty() {
            return Err(eyre!(
                "no report could be saved to {} ({} failed)",
                out_dir.display(),
                self.failed.len()
            ));
        }
        Ok(())
    }
}

/// Research and save every company in turn. A failed save is reported and
/// the batch moves on to the next company.
pub(crate) async fn research_batch<W, G, P, F>(
    researcher: &Researcher<W, G>,
    companies: &[String],
    out_dir: &Path,
    progress: F,
) -> BatchOutcome
where
    W: WebLookup,
    G: TextGenerator,
    P: ResearchProgress,
    F: Fn() -> P,
{
    let mut outcome = BatchOutcome::default();
    for company in companies {
        println!();
        println!("  Researching {company}...");

        let run = researcher.research_traced(company, &progress()).await;

        for (field, reason) in run.trace.failures() {
            warn!(%company, field, %reason, "step degraded");
        }

        match report::save_to_dir(&run.report, out_dir) {
            Ok(path) => {
                println!("  Report saved to {}", path.display());
                print!("{}", render_summary(&run.report));
                outcome.saved.push(path);
            }
            Err(e) => {
                eprintln!("  Failed to research {company}: {e}");
                outcome.failed.push((company.clone(), e.to_string()));
            }
        }
    }
    outcome
}

/// Pull the configured models. Failures leave the run in minimal mode.
async fn prepare_models(config: &AppConfig) -> Result<()> {
    let models = &config.generation.prepare_models;
    if models.is_empty() {
        return Ok(());
    }

    let client = OllamaClient::new(GenerationConfig::from(config))?;
    let spinner = spinner();
    spinner.set_message(format!("Downloading models: {}", models.join(", ")));
    let ready = client.prepare_models(models).await;
    spinner.finish_and_clear();

    if ready < models.len() {
        println!("  Couldn't download every model. Using minimal mode.");
    }
    Ok(())
}

fn cmd_show(path: &Path) -> Result<()> {
    let report = report::load(path)?;
    print!("{}", render_summary(&report));
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Console summary
// ---------------------------------------------------------------------------

/// Condensed, human-readable view of a report.
pub(crate) fn render_summary(report: &CompanyReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "  {} Summary:", report.company_name);
    let _ = writeln!(out, "  {}", report.summary.trim());
    if !report.website.is_empty() {
        let _ = writeln!(out, "  Website:            {}", report.website);
    }
    let _ = writeln!(out, "  Key People:         {}", report.key_people);
    let _ = writeln!(out, "  Products/Services:  {}", report.products_services);
    let _ = writeln!(out, "  Locations:          {}", report.locations);
    if !report.recent_news.is_empty() {
        let _ = writeln!(out, "  Recent News:");
        for headline in &report.recent_news {
            let _ = writeln!(out, "    - {headline}");
        }
    }
    out
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    spinner.set_style(style);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        Self { spinner: spinner() }
    }
}

impl ResearchProgress for CliProgress {
    fn step(&self, _company: &str, step: ResearchStep) {
        self.spinner.set_message(format!("{step}..."));
    }

    fn done(&self, _report: &CompanyReport) {
        self.spinner.finish_and_clear();
    }
}
