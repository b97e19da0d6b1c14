//! CLI command definitions, routing, and tracing setup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use phonespec_core::{
    HttpFetcher, ProgressReporter, marketplace_prices, scrape_kimovil, search_phone, suggest_devices,
};
use phonespec_extract::{ExtractionOutcome, SourceRegistry, SystemClock, extract_spec_detected, extract_with};
use phonespec_pricing::{Marketplace, price_page};
use phonespec_shared::{
    AppConfig, FetchConfig, PhoneSpecError, format_slug, init_config, load_config, load_config_from,
    validate_config,
};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// PhoneSpec: phone spec extraction and marketplace price reconciliation.
#[derive(Parser)]
#[command(
    name = "phonespec",
    version,
    about = "Extract phone specs from catalogue pages and reconcile marketplace prices.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.phonespec/phonespec.toml.
    #[arg(long, global = true, env = "PHONESPEC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds (overrides config).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

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
    /// Look a phone up by name and print its normalized spec draft.
    Search {
        /// Free-text phone name, e.g. "Galaxy S24 Ultra".
        term: String,
    },

    /// Suggest Kimovil phone models matching a partial name.
    Suggest {
        /// At least three characters of a phone name, e.g. "galaxy s2".
        name: String,
    },

    /// Scrape a Kimovil device page.
    Kimovil {
        /// Device path as used by Kimovil, e.g. "samsung-galaxy-s24".
        path: String,
    },

    /// Summarize marketplace prices for one model and storage size.
    Prices {
        /// Marketplace to query: olx, amazon or mercadolivre. Queries all when omitted.
        #[arg(short, long)]
        marketplace: Option<Marketplace>,

        /// Model name, e.g. "Apple iPhone 15 Pro".
        #[arg(short, long)]
        name: String,

        /// Storage size, e.g. "256GB".
        #[arg(short, long)]
        storage: String,
    },

    /// Extract a spec draft from a saved HTML page (offline).
    Extract {
        /// HTML file to read.
        #[arg(short, long)]
        file: PathBuf,

        /// Device slug used for title/brand fallback.
        #[arg(long)]
        slug: String,

        /// Source id (oficinadanet, kimovil). Detected from the page when omitted.
        #[arg(long)]
        source: Option<String>,
    },

    /// Filter and summarize listings from a saved marketplace page (offline).
    Filter {
        /// HTML file to read.
        #[arg(short, long)]
        file: PathBuf,

        /// Marketplace the page came from.
        #[arg(short, long)]
        marketplace: Marketplace,

        /// Model name to match.
        #[arg(short, long)]
        name: String,

        /// Storage size to match.
        #[arg(short, long)]
        storage: String,
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
///
/// Logs go to stderr so stdout stays clean JSON.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "phonespec=info",
        1 => "phonespec=debug",
        _ => "phonespec=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

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
    let settings = ConfigSettings {
        path: cli.config,
        timeout: cli.timeout,
    };

    match cli.command {
        Command::Search { term } => cmd_search(&settings.load()?, &term).await,
        Command::Suggest { name } => cmd_suggest(&settings.load()?, &name).await,
        Command::Kimovil { path } => cmd_kimovil(&settings.load()?, &path).await,
        Command::Prices {
            marketplace,
            name,
            storage,
        } => cmd_prices(&settings.load()?, marketplace, &name, &storage).await,
        Command::Extract { file, slug, source } => cmd_extract(&file, &slug, source.as_deref()),
        Command::Filter {
            file,
            marketplace,
            name,
            storage,
        } => cmd_filter(&file, marketplace, &name, &storage),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&settings),
        },
    }
}

/// Where config comes from, plus CLI overrides.
struct ConfigSettings {
    path: Option<PathBuf>,
    timeout: Option<u64>,
}

impl ConfigSettings {
    /// Load config from the chosen file (or the default location) and apply overrides.
    fn load(&self) -> Result<AppConfig> {
        let mut config = match &self.path {
            Some(path) => load_config_from(path)?,
            None => load_config()?,
        };
        if let Some(secs) = self.timeout {
            config.fetch.timeout_secs = secs;
            validate_config(&config)?;
        }
        Ok(config)
    }
}

/// Attach the caller-facing message to a pipeline error.
fn user_facing(err: PhoneSpecError) -> Report {
    let message = err.user_message();
    Report::new(err).wrap_err(message)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report_outcome(outcome: &ExtractionOutcome) -> Result<()> {
    if outcome.is_no_signal() {
        warn!(
            title = %outcome.draft.title,
            "no specification fields found; variants hold default values"
        );
    }
    print_json(&outcome.draft)
}

async fn cmd_search(config: &AppConfig, term: &str) -> Result<()> {
    let fetcher = HttpFetcher::new(&FetchConfig::from(config))?;
    let reporter = CliProgress::new();
    let outcome = search_phone(&fetcher, &config.sources, term, &reporter).await;
    reporter.clear();
    report_outcome(&outcome.map_err(user_facing)?)
}

async fn cmd_suggest(config: &AppConfig, name: &str) -> Result<()> {
    let fetcher = HttpFetcher::new(&FetchConfig::from(config))?;
    let reporter = CliProgress::new();
    let suggestions = suggest_devices(&fetcher, &config.sources, name, &reporter).await;
    reporter.clear();
    print_json(&suggestions.map_err(user_facing)?)
}

async fn cmd_kimovil(config: &AppConfig, path: &str) -> Result<()> {
    let fetcher = HttpFetcher::new(&FetchConfig::from(config))?;
    let reporter = CliProgress::new();
    let outcome = scrape_kimovil(&fetcher, &config.sources, path, &reporter).await;
    reporter.clear();
    report_outcome(&outcome.map_err(user_facing)?)
}

async fn cmd_prices(
    config: &AppConfig,
    marketplace: Option<Marketplace>,
    name: &str,
    storage: &str,
) -> Result<()> {
    let fetcher = HttpFetcher::new(&FetchConfig::from(config))?;
    let targets = marketplace.map_or_else(|| Marketplace::ALL.to_vec(), |m| vec![m]);

    let mut results = Vec::with_capacity(targets.len());
    for target in targets {
        let reporter = CliProgress::new();
        let summary = marketplace_prices(&fetcher, &config.sources, target, name, storage, &reporter).await;
        reporter.clear();
        results.push((target, summary.map_err(user_facing)?));
    }

    match results.as_slice() {
        [(_, summary)] => print_json(summary),
        all => print_json(
            &all.iter()
                .map(|(m, summary)| (m.id(), summary))
                .collect::<BTreeMap<_, _>>(),
        ),
    }
}

fn read_page(file: &Path) -> Result<String> {
    std::fs::read_to_string(file)
        .map_err(|e| PhoneSpecError::io(file, e))
        .wrap_err("could not read HTML file")
}

fn cmd_extract(file: &Path, slug: &str, source: Option<&str>) -> Result<()> {
    let html = read_page(file)?;
    let slug = format_slug(slug);

    let outcome = match source {
        Some(id) => {
            let registry = SourceRegistry::new();
            extract_with(&html, registry.get(id)?, &slug, &SystemClock)
        }
        None => extract_spec_detected(&html, &slug),
    };
    info!(source = %outcome.draft.source, "extracted from file");
    report_outcome(&outcome)
}

fn cmd_filter(file: &Path, marketplace: Marketplace, name: &str, storage: &str) -> Result<()> {
    let html = read_page(file)?;
    print_json(&price_page(marketplace, &html, name, storage))
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn clear(&self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, summary: &str) {
        self.spinner.finish_with_message(summary.to_string());
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(settings: &ConfigSettings) -> Result<()> {
    let config = settings.load()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prices_command() {
        let cli = Cli::try_parse_from([
            "phonespec",
            "prices",
            "--marketplace",
            "mercadolivre",
            "--name",
            "Galaxy S24",
            "--storage",
            "256GB",
        ])
        .unwrap();
        match cli.command {
            Command::Prices {
                marketplace, name, ..
            } => {
                assert_eq!(marketplace, Some(Marketplace::MercadoLivre));
                assert_eq!(name, "Galaxy S24");
            }
            _ => panic!("expected prices"),
        }
    }

    #[test]
    fn parses_suggest_command() {
        let cli = Cli::try_parse_from(["phonespec", "suggest", "galaxy s2"]).unwrap();
        match cli.command {
            Command::Suggest { name } => assert_eq!(name, "galaxy s2"),
            _ => panic!("expected suggest"),
        }
    }

    #[test]
    fn rejects_unknown_marketplace() {
        let result = Cli::try_parse_from([
            "phonespec", "filter", "-f", "x.html", "-m", "ebay", "-n", "x", "-s", "128GB",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["phonespec", "search", "Moto G84", "-vv", "--timeout", "5"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.timeout, Some(5));
    }

    #[test]
    fn user_facing_error_message() {
        let report = user_facing(PhoneSpecError::not_found("https://example.com/x"));
        assert_eq!(report.to_string(), "Phone not found. Check the name and try again.");
    }
}
