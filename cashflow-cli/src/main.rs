use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use cashflow_cli::app::{self, OutputFormat, SaveOutcome};
use cashflow_cli::config::{Config, FileConfig, Overrides};
use cashflow_cli::{input, logging};
use cashflow_core::{ApplicationRepository, ApplicationStatus};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Comprehensive cash flow analysis for small-business loan applications.
///
/// Computes EBITDA, debt service and the Debt Service Coverage Ratio for the
/// prior year, current year and year to date, and keeps applications in a
/// local database.
#[derive(Debug, Parser)]
#[command(name = "cashflow", version)]
struct Cli {
    /// Config file (defaults to ./cashflow.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database backend to use.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `cashflow.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Log filter, e.g. `debug` or `info,cashflow_core=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze an application file without saving it.
    Analyze {
        /// Application file (TOML).
        file: PathBuf,
        /// Debt schedule CSV; replaces the file's [[debts]].
        #[arg(long)]
        debts: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Save an application file as a new record, or over an existing one.
    Save {
        file: PathBuf,
        #[arg(long)]
        debts: Option<PathBuf>,
        /// Update this application instead of creating a new one.
        #[arg(long)]
        id: Option<i64>,
        /// Mark the application as submitted rather than draft.
        #[arg(long)]
        submit: bool,
    },
    /// Print the report for a saved application.
    Show {
        id: i64,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List saved applications, newest first.
    List {
        /// Only `draft` or `submitted` applications.
        #[arg(long, value_parser = app::parse_status)]
        status: Option<ApplicationStatus>,
    },
    /// Delete a saved application.
    Delete { id: i64 },
}

async fn open_repository(config: &Config) -> anyhow::Result<Box<dyn ApplicationRepository>> {
    debug!("connecting to {} backend", config.db.backend);
    let registry = app::build_registry();
    Ok(registry.open(&config.db).await?)
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = FileConfig::discover(cli.config.as_deref())?;
    let config = Config::resolve(
        file_config,
        Overrides {
            backend: cli.backend,
            db: cli.db,
            log_level: cli.log_level,
            log_file: cli.log_file,
        },
    );

    logging::init_logging(config.log_level.as_deref());
    if let Some(path) = &config.log_file {
        logging::enable_file_logging(path)?;
    }
    debug!(?config, "resolved configuration");

    match cli.command {
        Command::Analyze {
            file,
            debts,
            format,
        } => {
            let input = input::load_application(&file, debts.as_deref())
                .with_context(|| format!("Failed to load {}", file.display()))?;
            print!("{}", app::render(&input, format, config.base_year)?);
        }
        Command::Save {
            file,
            debts,
            id,
            submit,
        } => {
            let input = input::load_application(&file, debts.as_deref())
                .with_context(|| format!("Failed to load {}", file.display()))?;
            let status = if submit {
                ApplicationStatus::Submitted
            } else {
                ApplicationStatus::Draft
            };
            let repo = open_repository(&config).await?;
            match app::save(&*repo, input, id, status).await? {
                SaveOutcome::Created(id) => println!("Created application {id}"),
                SaveOutcome::Updated(id) => println!("Updated application {id}"),
                SaveOutcome::Unchanged(id) => println!("Application {id} unchanged"),
            }
        }
        Command::Show { id, format } => {
            let repo = open_repository(&config).await?;
            print!("{}", app::show(&*repo, id, format, config.base_year).await?);
        }
        Command::List { status } => {
            let repo = open_repository(&config).await?;
            print!("{}", app::format_listings(&app::list(&*repo, status).await?));
        }
        Command::Delete { id } => {
            let repo = open_repository(&config).await?;
            app::delete(&*repo, id).await?;
            println!("Deleted application {id}");
        }
    }

    Ok(())
}
