pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use coverquote_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "coverquote",
    about = "Coverquote operator CLI",
    long_about = "Drive the insurance quote lifecycle: submit, modify, accept, and bookmark \
                  quotes, plus config inspection and readiness checks.",
    after_help = "Examples:\n  coverquote submit --insurance-type workers-comp --form form.json\n  coverquote accept 3f6c…\n  coverquote doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Process a validated submission form and create a quote")]
    Submit {
        #[arg(long, help = "Line of business, e.g. workers-comp | temp-staffing | trucking")]
        insurance_type: String,
        #[arg(long, help = "Path to the submission form JSON")]
        form: PathBuf,
    },
    #[command(about = "Replace a quote's policy details and recompute its premium")]
    Modify {
        id: String,
        #[arg(long, help = "Path to the updated policy details JSON")]
        details: PathBuf,
        #[arg(long, help = "Free-form note stored with the history snapshot")]
        notes: Option<String>,
    },
    #[command(about = "Mark a quote accepted (bind-ready)")]
    Accept { id: String },
    #[command(about = "Add a quote to the saved set")]
    Save { id: String },
    #[command(about = "Remove a quote from the saved set")]
    Unsave { id: String },
    #[command(about = "List all quotes in the local collection")]
    List,
    #[command(about = "Show one quote, history included")]
    Show { id: String },
    #[command(about = "List quotes currently in the saved set")]
    Saved,
    #[command(about = "Inspect effective configuration values with redaction")]
    Config,
    #[command(about = "Validate config and storage readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

fn init_logging() {
    use tracing::Level;

    // Logging must come up even when the config is broken; readiness
    // commands report config problems themselves.
    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub async fn run() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Submit { insurance_type, form } => {
            commands::quotes::submit(&insurance_type, &form).await
        }
        Command::Modify { id, details, notes } => {
            commands::quotes::modify(&id, &details, notes).await
        }
        Command::Accept { id } => commands::quotes::accept(&id).await,
        Command::Save { id } => commands::quotes::save(&id).await,
        Command::Unsave { id } => commands::quotes::unsave(&id).await,
        Command::List => commands::quotes::list(),
        Command::Show { id } => commands::quotes::show(&id),
        Command::Saved => commands::quotes::saved(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
