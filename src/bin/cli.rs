//! smx: sitemap manager CLI
//!
//! Every invocation loads the config, runs one command against the output
//! directory, and exits; concurrent invocations coordinate through the
//! output directory's lock file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sitemaptool::{
    config::ConfigFile,
    error::{AppError, Result},
    models::{ChangeFreq, Config},
    pipeline::{self, AddRequest, SitemapContext},
    services::{UpdateChecker, updates},
    utils::http,
};

/// SitemapTool - Cross-platform sitemap manager
#[derive(Parser, Debug)]
#[command(
    name = "smx",
    version,
    about = "Manage partitioned XML sitemaps with a regenerated sitemap index"
)]
struct Cli {
    /// Path to the config file (default: ~/.sitemaptool/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a URL to the current sitemap
    Add {
        url: String,

        /// always, hourly, daily, weekly, monthly, yearly, never
        #[arg(long, value_parser = parse_changefreq)]
        changefreq: Option<ChangeFreq>,

        /// Priority between 0.0 and 1.0
        #[arg(long)]
        priority: Option<f64>,
    },

    /// Seal the current sitemap and start a new one
    Create,

    /// Show the config, one value, or set a value
    Config { key: Option<String>, value: Option<String> },

    /// Show sitemap statistics
    Stats,

    /// Ping search engines with the sitemap index
    Ping,

    /// Show version information
    Version,

    /// Check for a newer release
    Update,
}

fn parse_changefreq(value: &str) -> std::result::Result<ChangeFreq, String> {
    value.parse().map_err(|e: AppError| e.to_string())
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_rejection() => {
            eprintln!("Rejected: {e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let load_config = || -> Result<(ConfigFile, Config)> {
        let path = match &cli.config {
            Some(path) => path.clone(),
            None => ConfigFile::default_path()?,
        };
        let file = ConfigFile::new(path);
        let config = file.load_or_init()?;
        log::debug!("Loaded configuration from {}", file.path().display());
        Ok((file, config))
    };

    match cli.command {
        Command::Version => print_version(),

        Command::Add {
            url,
            changefreq,
            priority,
        } => {
            let (_, config) = load_config()?;
            spawn_update_check(&config);
            let ctx = SitemapContext::new(config)?;
            let outcome = pipeline::run_add(
                &ctx,
                AddRequest {
                    url,
                    changefreq,
                    priority,
                },
            )?;
            println!("✓ Added URL: {}", outcome.url);

            if ctx.config().ping_on_update {
                match pipeline::http_notifier(&ctx) {
                    Ok(notifier) => {
                        pipeline::ping_after_update(&ctx, notifier);
                    }
                    Err(e) => log::warn!("Skipping ping: {e}"),
                }
            }
        }

        Command::Create => {
            let (_, config) = load_config()?;
            spawn_update_check(&config);
            let ctx = SitemapContext::new(config)?;
            let filename = pipeline::run_create(&ctx)?;
            println!("✓ Created new sitemap: {filename}");
        }

        Command::Config { key, value } => {
            let (config_file, config) = load_config()?;
            match (key, value) {
                (None, _) => {
                    println!("{}", serde_json::to_string_pretty(&config)?);
                    println!("\nConfig file: {}", config_file.path().display());
                }
                (Some(key), None) => match config.get(&key)? {
                    serde_json::Value::String(s) => println!("{s}"),
                    other => println!("{other}"),
                },
                (Some(key), Some(value)) => {
                    let mut config = config;
                    config.set(&key, &value)?;
                    config_file.save(&config)?;
                    println!("✓ Updated {key} = {value}");
                }
            }
        }

        Command::Stats => {
            let (_, config) = load_config()?;
            spawn_update_check(&config);
            let ctx = SitemapContext::new(config)?;
            print!("{}", pipeline::run_stats(&ctx)?);
        }

        Command::Ping => {
            let (_, config) = load_config()?;
            let ctx = SitemapContext::new(config)?;
            let notifier = pipeline::http_notifier(&ctx)?;

            println!("Pinging search engines...");
            let report = pipeline::run_ping(&ctx, notifier.as_ref()).await;
            for engine in &report.succeeded {
                println!("Pinged {engine} successfully");
            }
            for (engine, e) in &report.failed {
                println!("Failed to ping {engine}: {e}");
            }
        }

        Command::Update => {
            let (_, config) = load_config()?;
            let checker = UpdateChecker::new(http::create_client(&config)?);
            let status = checker.check().await?;
            if status.newer_available {
                println!(
                    "New version available: {} (current: {})",
                    status.latest, status.current
                );
                println!("Download from: {}", status.download_url);
            } else {
                println!("sitemaptool {} is up to date", status.current);
            }
        }
    }

    Ok(())
}

fn print_version() {
    println!("SitemapTool v{}", updates::CURRENT_VERSION);
    println!("OS: {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
}

/// Look for a newer release without holding up the command.
fn spawn_update_check(config: &Config) {
    if !config.check_updates {
        return;
    }
    match http::create_client(config) {
        Ok(client) => updates::spawn_check(UpdateChecker::new(client)),
        Err(e) => log::debug!("Update check skipped: {e}"),
    }
}
