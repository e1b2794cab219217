mod chat;
mod cli;
mod config;
mod discord;
mod llm;
mod query;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "querybot", version, about = "Natural-language SQL and a persona chat bot")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask questions about the database interactively
    Query,
    /// Answer a single question and exit
    Ask {
        question: String,

        /// Print the full report as JSON
        #[arg(long, conflicts_with = "csv")]
        json: bool,

        /// Print result rows as CSV
        #[arg(long)]
        csv: bool,
    },
    /// Run the Discord chat bot
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = config::Config::from_file(&cli.config)?;
    let model = llm::create_model(&config).context("Failed to create model client")?;

    match cli.command {
        Command::Query => {
            let pipeline = query::create_pipeline(&config, model)?;
            cli::repl(&pipeline).await?;
        }
        Command::Ask {
            question,
            json,
            csv,
        } => {
            let format = match (json, csv) {
                (true, _) => cli::OutputFormat::Json,
                (_, true) => cli::OutputFormat::Csv,
                _ => cli::OutputFormat::Text,
            };
            let pipeline = query::create_pipeline(&config, model)?;
            cli::ask(&pipeline, &question, format).await?;
        }
        Command::Chat => run_chat(&config, model).await?,
    }

    Ok(())
}

async fn run_chat(config: &config::Config, model: Arc<dyn llm::LanguageModel>) -> Result<()> {
    let token = config.require_discord_token()?;
    let chat = Arc::new(chat::create_service(config, model));
    let bot = discord::Bot::new(token, chat.clone());

    let bot_handle = tokio::spawn(async move {
        if let Err(e) = bot.start().await {
            error!("Discord bot error: {}", e);
        }
    });

    tokio::signal::ctrl_c().await?;
    info!(
        "Shutdown signal received, dropping {} sessions",
        chat.store().session_count().await
    );

    bot_handle.abort();
    info!("Shutdown complete");

    Ok(())
}
