//! Terminal chat front-end for vocabulary training.
//!
//! Each input line is one chat message from a single owner.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use services::{Clock, Reply, TrainingConfig, TrainingService, texts};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use vocab_core::model::OwnerId;

/// Vocabulary trainer: quiz yourself on stored words from the terminal.
#[derive(Parser, Debug)]
#[command(name = "vocab")]
#[command(version, about, long_about = None)]
struct Args {
    /// SQLite database URL
    #[arg(long, env = "VOCAB_DB_URL", default_value = "sqlite:vocab.sqlite3?mode=rwc")]
    db: String,

    /// Owner whose vocabulary is trained
    #[arg(long, env = "VOCAB_OWNER", default_value_t = OwnerId::new(1))]
    owner: OwnerId,

    /// Current language of the owner
    #[arg(long, env = "VOCAB_LANGUAGE")]
    language: Option<String>,

    /// Path to configuration file (default: vocab.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command<'a> {
    Train,
    Words,
    Help,
    Quit,
    Message(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed {
            "/train" => Command::Train,
            "/words" => Command::Words,
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Message(trimmed),
        })
    }
}

fn help(config: &TrainingConfig) -> String {
    format!(
        "Commands:\n\
         - /train to choose training strategy and start training.\n\
         - {} to stop training session without saving the results.\n\
         - {} to leave training setup.\n\
         - /words to list your words with their scores.\n\
         - /quit to leave.",
        config.stop_command, config.cancel_command
    )
}

const RESUMING: &str = "You have an unfinished training. Send your next answer to continue.";

fn render(reply: &Reply) -> String {
    if reply.options.is_empty() {
        return reply.text.clone();
    }
    let buttons: Vec<String> = reply.options.iter().map(|o| format!("[{o}]")).collect();
    format!("{}\n{}", reply.text, buttons.join(" "))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = config::load_config(args.config.as_deref())?;
    tracing::debug!(?config, "training config loaded");

    let clock = Clock::system();
    let storage = Storage::sqlite(&args.db, clock)
        .await
        .map_err(|e| anyhow::anyhow!("failed to open database '{}': {e}", args.db))?;
    tracing::info!(db = %args.db, owner = %args.owner, language = ?args.language, "storage ready");

    let owner = args.owner;
    let language = args.language.as_deref();
    let service = TrainingService::from_storage(clock, &storage).with_config(config);

    let help_text = help(service.config());
    println!("{help_text}");
    if service.is_active(owner).await? {
        println!("{RESUMING}\n");
    }
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        let outcome = match command {
            Command::Quit => break,
            Command::Help => {
                println!("{help_text}");
                continue;
            }
            Command::Train => service.start(owner, language).await,
            Command::Words => match language {
                Some(language) => service
                    .words(owner, language)
                    .await
                    .map(|words| vec![Reply::text(texts::word_listing(language, &words))]),
                None => Ok(vec![Reply::text(texts::NO_LANGUAGE_IS_SET)]),
            },
            Command::Message(text) => service.handle(owner, text).await,
        };

        match outcome {
            Ok(replies) => {
                for reply in &replies {
                    println!("{}\n", render(reply));
                }
            }
            Err(err) => {
                tracing::error!(owner = %owner, error = %err, "turn failed");
                println!("Something went wrong, please try again.\n");
            }
        }
    }
    Ok(())
}
