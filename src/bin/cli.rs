//! Internship Digest CLI
//!
//! Local execution entry point: one-shot runs and the daily scheduler.

use std::path::PathBuf;

use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use internship_digest::{
    error::{AppError, Result},
    models::{Config, MailConfig},
    notify::{Notifier, SmtpNotifier, StdoutNotifier},
    pipeline::{self, CollectOptions, RunContext},
    services::SourceRegistry,
    storage::{PostingStore, SqliteStore},
    utils::http,
};

/// Environment variable holding a comma-separated list of sources to poll.
const SOURCES_ENV: &str = "INTERNSHIP_SOURCES";

/// Internship Digest - daily e-mail of new internship postings
#[derive(Parser, Debug)]
#[command(
    name = "internship-digest",
    version,
    about = "Polls career pages and e-mails new internship postings"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Env file with mail settings (ignored if missing)
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Override the database path from the config
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect, record, and send the digest once
    Run {
        /// Date to record postings under (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Print the digest instead of sending it
        #[arg(long)]
        dry_run: bool,

        /// Only poll these sources (repeatable)
        #[arg(long = "source")]
        sources: Vec<String>,
    },

    /// Run every day at a fixed local time
    Schedule {
        /// Daily run time, HH:MM (default: from config)
        #[arg(long)]
        at: Option<String>,

        /// Do not run immediately on start
        #[arg(long)]
        skip_initial: bool,

        /// Print digests instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// List postings first seen on a date
    New {
        /// Date to query (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List the sources that would be polled
    Sources,

    /// Validate configuration and mail settings
    Validate,

    /// Show database info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Sources named on the command line, else in the environment.
fn selected_sources(flags: Vec<String>) -> Vec<String> {
    if !flags.is_empty() {
        return flags;
    }
    std::env::var(SOURCES_ENV)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Mail settings are only required when the digest is really sent.
fn load_mail(dry_run: bool) -> Result<Option<MailConfig>> {
    if dry_run {
        return Ok(None);
    }
    MailConfig::from_env().map(Some)
}

fn build_notifier(mail: Option<&MailConfig>) -> Result<Box<dyn Notifier>> {
    match mail {
        Some(mail) => Ok(Box::new(SmtpNotifier::new(mail)?)),
        None => Ok(Box::new(StdoutNotifier)),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match dotenvy::from_path(&cli.env_file) {
        Ok(()) => log::debug!("Loaded environment from {}", cli.env_file.display()),
        Err(e) if e.not_found() => {
            log::debug!("No env file at {}", cli.env_file.display())
        }
        Err(e) => {
            return Err(AppError::config(format!(
                "Failed to read {}: {}",
                cli.env_file.display(),
                e
            )));
        }
    }

    log::info!("Internship Digest starting...");

    let mut config = match Config::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Config load failed from {}: {}", cli.config.display(), e);
            return Err(e);
        }
    };
    if let Some(database) = cli.database {
        config.storage.database = database;
    }
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Run {
            date,
            dry_run,
            sources,
        } => {
            // Everything is checked before the store or the network is touched.
            let mail = load_mail(dry_run)?;
            let registry =
                SourceRegistry::from_config(&config.sources, &selected_sources(sources))?;
            let notifier = build_notifier(mail.as_ref())?;
            let recipient = mail
                .as_ref()
                .map_or("(dry run)", |m| m.recipient_email.as_str());

            let store = SqliteStore::open(&config.storage.database)?;
            let client = http::create_async_client(&config.crawler)?;
            let ctx = RunContext {
                registry: &registry,
                client: &client,
                store: &store,
                notifier: &*notifier,
                recipient,
                options: CollectOptions::from(&config.crawler),
            };

            let as_of = date.unwrap_or_else(|| Local::now().date_naive());
            let result = pipeline::run_once(&ctx, as_of).await?;
            store.close()?;

            log::info!(
                "Run complete: {} new of {} postings ({} rejected)",
                result.new_count,
                result.total_count,
                result.rejected_count
            );
            if !result.failed_sources.is_empty() {
                log::warn!("Failed sources: {}", result.failed_sources.join(", "));
            }
        }

        Command::Schedule {
            at,
            skip_initial,
            dry_run,
        } => {
            let at = match at {
                Some(at) => NaiveTime::parse_from_str(at.trim(), "%H:%M").map_err(|e| {
                    AppError::validation(format!("--at '{at}' is not HH:MM: {e}"))
                })?,
                None => config.schedule.daily_time()?,
            };
            let run_on_start = config.schedule.run_on_start && !skip_initial;

            let mail = load_mail(dry_run)?;
            let registry =
                SourceRegistry::from_config(&config.sources, &selected_sources(Vec::new()))?;
            let notifier = build_notifier(mail.as_ref())?;
            let recipient = mail
                .as_ref()
                .map_or("(dry run)", |m| m.recipient_email.as_str());

            let store = SqliteStore::open(&config.storage.database)?;
            let client = http::create_async_client(&config.crawler)?;
            let ctx = RunContext {
                registry: &registry,
                client: &client,
                store: &store,
                notifier: &*notifier,
                recipient,
                options: CollectOptions::from(&config.crawler),
            };

            pipeline::run_scheduled(at, run_on_start, |as_of| {
                let ctx = &ctx;
                async move { pipeline::run_once(ctx, as_of).await }
            })
            .await?;
            store.close()?;
        }

        Command::New { date } => {
            let as_of = date.unwrap_or_else(|| Local::now().date_naive());
            let store = SqliteStore::open(&config.storage.database)?;
            let postings = store.query_new_as_of(as_of)?;
            let digest = pipeline::compose_stored(as_of, &postings);
            print!("{}", digest.to_text());
            log::info!("{} posting(s) first seen on {}", postings.len(), as_of);
        }

        Command::Sources => {
            let registry =
                SourceRegistry::from_config(&config.sources, &selected_sources(Vec::new()))?;
            for source in &config.sources {
                let kind = if source.workday.is_some() { "workday" } else { "html" };
                let status = if registry.get(&source.name).is_some() {
                    "enabled"
                } else {
                    "disabled"
                };
                println!("{:<12} {:<8} {}", source.name, kind, status);
            }
            log::info!("{} of {} sources enabled", registry.len(), config.sources.len());
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            log::info!("✓ Config OK ({} sources)", config.sources.len());

            if let Err(e) = MailConfig::from_env() {
                log::error!("Mail settings invalid: {}", e);
                return Err(e);
            }
            log::info!("✓ Mail settings OK");

            log::info!("All validations passed!");
        }

        Command::Info => {
            let path = &config.storage.database;
            log::info!("Database: {}", path.display());
            if path.exists() {
                let store = SqliteStore::open(path)?;
                log::info!("Stored postings: {}", store.count()?);
            } else {
                log::info!("No database found yet.");
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
