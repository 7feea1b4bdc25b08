//! CLI command definitions, routing, and tracing setup.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use paramexport_core::pipeline::{ExportConfig, ExportResult, ProgressReporter};
use paramexport_jenkins::JenkinsClient;
use paramexport_shared::{AppConfig, init_config, load_config, resolve_token};
use paramexport_store::CacheStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// paramexport — export Jenkins build parameters as a JSON schema.
#[derive(Parser)]
#[command(
    name = "paramexport",
    version,
    about = "Export Jenkins job parameter definitions into a consolidated JSON schema.",
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
    /// Export parameter definitions for all jobs under a folder.
    Export {
        /// Slash-joined path of the Jenkins folder to export.
        #[arg(short, long)]
        folder: Option<String>,

        /// Export the whole server instead of a single folder.
        #[arg(long, conflicts_with = "folder")]
        all: bool,

        /// Reuse cached job paths and catalog from a previous run.
        #[arg(long)]
        cache: bool,
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
        0 => "paramexport=info",
        1 => "paramexport=debug",
        _ => "paramexport=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Export { folder, all, cache } => cmd_export(folder.as_deref(), all, cache).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

async fn cmd_export(folder: Option<&str>, all: bool, cache: bool) -> Result<()> {
    let config = load_config()?;

    let root = match (folder, all) {
        (Some(folder), _) => folder.trim_matches('/').to_string(),
        (None, true) => String::new(),
        (None, false) => {
            return Err(eyre!("either --folder <path> or --all is required"));
        }
    };

    let token = resolve_token(&config)?;
    let client = JenkinsClient::new(&config.jenkins, token)?;
    let store = CacheStore::new(&config.export.cache_dir);

    let export_config = ExportConfig {
        root,
        use_cache: cache,
        exclude_patterns: config.export.exclude_patterns.clone(),
    };

    info!(
        root = %export_config.root,
        server = %config.jenkins.url,
        use_cache = cache,
        "starting export"
    );

    // Ctrl-C flips the flag; the pipeline stops between jobs and keeps
    // the last checkpoint.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, finishing current job");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let reporter = CliProgress::new();
    let result =
        paramexport_core::pipeline::export(&export_config, &client, &store, &reporter, &cancel)
            .await?;

    println!();
    if result.cancelled {
        println!("  Export cancelled — partial schema kept.");
    } else {
        println!("  Export complete!");
    }
    println!("  Jobs:          {}", result.job_count);
    println!("  Parameterized: {}", result.parameterized_count);
    println!("  Failed:        {}", result.report.failed_jobs.len());
    println!("  Schema:        {}", result.schema_path.display());
    println!("  Time:          {:.1}s", result.elapsed.as_secs_f64());
    println!();

    for (job, error) in &result.report.failed_jobs {
        println!("  failed: {job}: {error}");
    }
    if !result.report.unmapped.is_empty() {
        println!("  Parameter kinds without a normalizer:");
        for (job, identifier) in &result.report.unmapped {
            println!("    {job}: {identifier}");
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
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
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn job_processed(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Exporting [{current}/{total}] {path}"));
    }

    fn done(&self, _result: &ExportResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
