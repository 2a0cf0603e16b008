//! playranks CLI
//!
//! Collects Google Play ranking charts and developer app catalogs into
//! append-only NDJSON files.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use playranks::{
    error::{AppError, Result},
    logging,
    models::{Config, is_locale_code},
    pipeline,
    services::{HttpAppSource, SearchQuery},
    storage::NdjsonSink,
};

const DEFAULT_CONFIG_PATH: &str = "data/config.toml";

/// playranks - Google Play rank collector
#[derive(Parser, Debug)]
#[command(name = "playranks", version, about = "Google Play rank collector")]
struct Cli {
    /// Path to the TOML config file (default: data/config.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured country code
    #[arg(long)]
    country: Option<String>,

    /// Duplicate log output into this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect ranked charts across the category/collection grid
    Ranks {
        /// Apps to request per category/collection pair
        #[arg(long)]
        num: Option<u32>,

        /// Directory partitions are written into
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Restrict the run to these category tokens
        #[arg(long, value_delimiter = ',')]
        categories: Option<Vec<String>>,

        /// Restrict the run to these collection tokens
        #[arg(long, value_delimiter = ',')]
        collections: Option<Vec<String>>,
    },

    /// Expand developer ids into their published app ids
    Developers {
        /// Newline-delimited developer-id input file
        #[arg(long)]
        input: Option<PathBuf>,

        /// Apps to request per developer
        #[arg(long)]
        num: Option<u32>,
    },

    /// Search the store and print the raw JSON payload
    Search {
        /// Search term
        term: String,

        /// Number of results to request
        #[arg(long, default_value_t = 5)]
        num: u32,

        /// Result language
        #[arg(long)]
        lang: Option<String>,
    },

    /// Validate the configuration file
    Validate,
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // The logger is down if startup failed before init.
            if log::log_enabled!(log::Level::Error) {
                log::error!("{error}");
            } else {
                eprintln!("Error: {error}");
            }
            if error.is_fatal() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // An explicitly given config file must load; the default path is
    // optional and falls back to built-in defaults.
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(DEFAULT_CONFIG_PATH)?,
    };

    if let Some(country) = cli.country {
        config.collect.country = country;
    }
    if let Some(path) = cli.log_file {
        config.logging.file = Some(path);
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    logging::init(&config.logging.level, config.logging.file.as_deref())?;
    log::info!("playranks starting...");

    let command = cli.command.unwrap_or(Command::Ranks {
        num: None,
        output_dir: None,
        categories: None,
        collections: None,
    });
    apply_overrides(&mut config, &command);
    config.validate()?;

    match command {
        Command::Ranks { .. } => {
            let source = HttpAppSource::new(&config.source)?;
            let sink = NdjsonSink::new(&config.paths.output_dir);
            pipeline::run_ranks(&source, &sink, &config.collect).await?;
        }

        Command::Developers { .. } => {
            let source = HttpAppSource::new(&config.source)?;
            pipeline::run_developers(&source, &config.paths, &config.collect).await?;
        }

        Command::Search { term, num, lang } => {
            if let Some(lang) = &lang {
                if !is_locale_code(lang) {
                    return Err(AppError::input(format!(
                        "language must be a two-letter code, got {lang:?}"
                    )));
                }
            }
            let source = HttpAppSource::new(&config.source)?;
            let query = SearchQuery {
                term,
                num,
                country: config.collect.country.clone(),
                lang,
            };
            let document = pipeline::run_search(&source, &query).await?;
            println!("{document}");
        }

        Command::Validate => {
            log::info!(
                "Configuration OK: {} categories, {} collections, country {}",
                config.collect.categories.len(),
                config.collect.collections.len(),
                config.collect.country
            );
        }
    }

    log::info!("Done!");
    Ok(())
}

/// Fold command-line overrides into the loaded configuration.
fn apply_overrides(config: &mut Config, command: &Command) {
    match command {
        Command::Ranks {
            num,
            output_dir,
            categories,
            collections,
        } => {
            if let Some(num) = num {
                config.collect.num_apps = *num;
            }
            if let Some(dir) = output_dir {
                config.paths.output_dir = dir.clone();
            }
            if let Some(categories) = categories {
                config.collect.categories = categories.clone();
            }
            if let Some(collections) = collections {
                config.collect.collections = collections.clone();
            }
        }

        Command::Developers { input, num } => {
            if let Some(input) = input {
                config.paths.developers_file = input.clone();
            }
            if let Some(num) = num {
                config.collect.developer_num_apps = *num;
            }
        }

        Command::Search { .. } | Command::Validate => {}
    }
}
