//! interview-analyzer - decision-support tool for structured interview preparation
//!
//! Compares a job description with a candidate CV, scores capability overlap,
//! explains gaps for the interviewer and optionally asks Gemini for an
//! overview.

mod adapters;
mod commands;
mod domain;
mod error;
mod ports;
mod utils;

use adapters::document::JdSource;
use adapters::services::llm::GoogleService;
use adapters::storage::SqliteStorage;
use anyhow::Context;
use clap::{ArgGroup, CommandFactory, Parser, Subcommand};
use commands::analyze::AnalyzeRequest;
use commands::config::UpdateLlmConfigRequest;
use ports::llm::LlmServicePort;
use ports::storage::StoragePort;
use std::path::PathBuf;
use std::sync::Arc;
use utils::keychain::{KeychainManager, KeychainPort, GEMINI_API_KEY_ENV};

/// Application state shared across commands
pub struct AppState {
    pub storage: Arc<dyn StoragePort>,
    pub keychain: Arc<dyn KeychainPort>,
}

#[derive(Parser, Debug)]
#[command(name = "interview-analyzer")]
#[command(about = "Decision-support tool for structured interview preparation", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// SQLite database path (defaults to the per-user data directory)
    #[arg(long, global = true, env = "INTERVIEW_ANALYZER_DB")]
    db: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a CV against a job description and explain the gaps
    #[command(group(
        ArgGroup::new("jd_source")
            .required(true)
            .args(["jd", "jd_file", "jd_stdin"])
    ))]
    Analyze {
        /// Job description text
        #[arg(long)]
        jd: Option<String>,

        /// Read the job description from a text file
        #[arg(long)]
        jd_file: Option<PathBuf>,

        /// Read the job description from stdin
        #[arg(long)]
        jd_stdin: bool,

        /// Candidate CV (.docx or plain text)
        #[arg(long)]
        cv: PathBuf,

        /// Candidate label stored with the analysis
        #[arg(long)]
        label: Option<String>,

        /// Custom capability taxonomy (JSON)
        #[arg(long)]
        taxonomy: Option<PathBuf>,

        /// Gemini model for the overview (overrides stored config)
        #[arg(long)]
        model: Option<String>,

        /// Skip the LLM overview
        #[arg(long)]
        no_overview: bool,

        /// Regenerate the overview even if a cached one exists
        #[arg(long)]
        refresh_overview: bool,

        /// Do not persist this analysis
        #[arg(long)]
        no_save: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Browse saved analyses
    #[command(subcommand)]
    History(HistoryCommands),

    /// Manage the Gemini API key in the OS keychain
    #[command(subcommand)]
    Key(KeyCommands),

    /// Show or change LLM settings
    #[command(subcommand)]
    Config(ConfigCommands),

    /// List Gemini models available to the configured key
    Models {
        #[arg(long)]
        json: bool,
    },

    /// Print the overview prompt template
    Prompt,
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// List saved analyses, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: i32,
        #[arg(long, default_value_t = 0)]
        offset: i32,
        #[arg(long)]
        json: bool,
    },
    /// Show one analysis
    Show {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Delete one analysis
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
enum KeyCommands {
    /// Store the API key
    Set { api_key: String },
    /// Show whether a key is available (masked)
    Status,
    /// Remove the stored key
    Delete,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current LLM settings, active provider and keychain status
    Show,
    /// Update LLM settings
    Set {
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long)]
        max_tokens: Option<u32>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Open the database and run migrations
fn initialize_app(db: Option<&std::path::Path>) -> anyhow::Result<AppState> {
    let db_path = utils::paths::resolve_db_path(db).context("Failed to resolve database path")?;

    let storage = SqliteStorage::new(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    storage
        .run_migrations()
        .context("Failed to run database migrations")?;

    Ok(AppState {
        storage: Arc::new(storage),
        keychain: Arc::new(KeychainManager::new()),
    })
}

fn gemini_key_from_env() -> Option<String> {
    std::env::var(GEMINI_API_KEY_ENV).ok()
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let state = initialize_app(cli.db.as_deref())?;

    match command {
        Commands::Analyze {
            jd,
            jd_file,
            jd_stdin,
            cv,
            label,
            taxonomy,
            model,
            no_overview,
            refresh_overview,
            no_save,
            json,
        } => {
            let jd = match (jd, jd_file) {
                (Some(text), _) => JdSource::Inline(text),
                (None, Some(path)) => JdSource::File(path),
                (None, None) if jd_stdin => JdSource::Stdin,
                (None, None) => anyhow::bail!("Provide --jd, --jd-file or --jd-stdin"),
            };

            let llm = if no_overview {
                None
            } else {
                match commands::config::api_key_for_run(&state, gemini_key_from_env()) {
                    Some(key) => Some(GoogleService::new(key)?),
                    None => None,
                }
            };

            let request = AnalyzeRequest {
                jd,
                cv_path: cv,
                label,
                taxonomy_path: taxonomy,
                model,
                overview: !no_overview,
                refresh_overview,
                save: !no_save,
            };

            let outcome = commands::analyze::run_analysis(
                &state,
                llm.as_ref().map(|l| l as &dyn LlmServicePort),
                request,
                std::io::stdin(),
            )
            .await
            .context("Analysis failed")?;

            if json {
                print_json(&outcome)?;
            } else {
                print!("{}", commands::report::render_outcome(&outcome));
            }
        }

        Commands::History(HistoryCommands::List {
            limit,
            offset,
            json,
        }) => {
            let records =
                commands::history::list_analyses(&state, Some(limit), Some(offset)).await?;
            if json {
                print_json(&records)?;
            } else {
                print!("{}", commands::report::render_history(&records));
            }
        }

        Commands::History(HistoryCommands::Show { id, json }) => {
            let record = commands::history::get_analysis(&state, id).await?;
            if json {
                print_json(&record)?;
            } else {
                print!("{}", commands::report::render_record(&record));
            }
        }

        Commands::History(HistoryCommands::Delete { id }) => {
            commands::history::delete_analysis(&state, id).await?;
            println!("Deleted analysis #{}", id);
        }

        Commands::Key(KeyCommands::Set { api_key }) => {
            commands::config::save_api_key(&state, &api_key)
                .context("Failed to store API key")?;
            println!("API key saved");
        }

        Commands::Key(KeyCommands::Status) => {
            let status = commands::config::get_api_key_status(&state, gemini_key_from_env());
            match (status.masked_key, status.source) {
                (Some(masked), Some(source)) => println!("API key {} from {}", masked, source),
                _ => println!("No API key configured"),
            }
        }

        Commands::Key(KeyCommands::Delete) => {
            commands::config::delete_api_key(&state).context("Failed to delete API key")?;
            println!("API key deleted");
        }

        Commands::Config(ConfigCommands::Show) => {
            let overview = commands::config::show_config(&state).await?;
            print_json(&overview)?;
        }

        Commands::Config(ConfigCommands::Set {
            model,
            temperature,
            max_tokens,
        }) => {
            let config = commands::config::update_llm_config(
                &state,
                UpdateLlmConfigRequest {
                    model,
                    temperature,
                    max_tokens,
                },
            )
            .await?;
            print_json(&config)?;
        }

        Commands::Models { json } => {
            let key = commands::config::api_key_for_run(&state, gemini_key_from_env())
                .unwrap_or_default();
            let service = GoogleService::new(key)?;
            let models = commands::llm::fetch_llm_models(&service).await?;
            if json {
                print_json(&models)?;
            } else {
                print!("{}", commands::report::render_models(&models));
            }
        }

        Commands::Prompt => {
            println!("{}", commands::llm::default_overview_prompt());
        }
    }

    Ok(())
}
