use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use shabyt_assistant::commands::{self, AppState};
use shabyt_assistant::services::database::DEFAULT_HISTORY_LIMIT;
use shabyt_assistant::{
    logging, utils, AskQuestionRequest, Assistant, CannedResponseTable, GeminiClient, GeminiConfig,
    HistoryStore,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "shabyt", version, about = "Shabyt ЕНТ AI assistant")]
struct Cli {
    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// History database path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Canned response table (JSON) replacing the built-in one
    #[arg(long, global = true)]
    responses: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask the assistant a question
    Ask {
        question: String,

        #[arg(long, default_value = "student")]
        role: String,

        #[arg(long, default_value = "local")]
        user: String,

        /// Do not store the interaction
        #[arg(long)]
        no_history: bool,
    },
    /// Evaluate an arithmetic expression only
    Eval { expression: String },
    /// Show stored interactions, newest first
    History {
        #[arg(long, default_value = "local")]
        user: String,

        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
}

fn open_history(path: Option<PathBuf>) -> Result<HistoryStore> {
    let path = path.unwrap_or_else(utils::get_database_path);
    HistoryStore::open(&path)
}

fn load_responses(path: Option<PathBuf>) -> Result<CannedResponseTable> {
    match path {
        Some(path) => {
            info!("Loading canned responses from {}", path.display());
            CannedResponseTable::load(&path)
        }
        None => Ok(CannedResponseTable::builtin()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::setup_logging(logging::resolve_level(cli.log_level.as_deref()))
        .context("failed to initialize logging")?;

    match cli.command {
        Command::Ask {
            question,
            role,
            user,
            no_history,
        } => {
            let config = GeminiConfig::from_env()?;
            let client = GeminiClient::new(config)?;
            let responses = Arc::new(load_responses(cli.responses)?);
            let history = if no_history {
                None
            } else {
                Some(open_history(cli.db)?)
            };

            let state = AppState::new(Assistant::with_responses(client, responses), history);
            let dto = commands::ask_question(&state, &user, &role, AskQuestionRequest { question })
                .await
                .map_err(anyhow::Error::msg)?;

            println!("{}", dto.response);
        }
        Command::Eval { expression } => match commands::evaluate_math(&expression) {
            Ok(value) => println!("{}", value),
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        },
        Command::History { user, limit } => {
            let history = open_history(cli.db)?;
            let interactions = history.history(&user, limit)?;

            if interactions.is_empty() {
                println!("No interactions for user '{}'", user);
            }
            for interaction in interactions {
                println!(
                    "[{}] {}\n  -> {}",
                    interaction.created_at.format("%Y-%m-%d %H:%M:%S"),
                    interaction.question,
                    interaction.response
                );
            }
        }
    }

    Ok(())
}
