use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use fixit_completion::{CloudBackend, LocalBackend};
use fixit_config::Config;
use fixit_config::completion::Provider;
use fixit_core::{KnowledgeStore, Resolution, Resolver};
use fixit_types::TextSource;
use tracing_subscriber::EnvFilter;

mod controller;
mod events;
mod io;
mod output;
mod profile;
mod state;


use self::controller::AppController;
use self::output::render;
use self::state::AppState;

#[derive(Parser)]
#[command(name = "fixit", about = "Look up fixes for on-screen error messages")]
struct Cli {
    /// Config file (defaults to ./config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Knowledge base first, then the completion backend; caches new answers
    Resolve {
        /// Captured text (read from stdin when omitted)
        text: Option<String>,
        /// Copy the suggested fix to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Knowledge-base lookup only
    Find {
        /// Captured text (read from stdin when omitted)
        text: Option<String>,
    },
    /// Add or replace a curated entry
    Add {
        #[arg(long)]
        category: String,
        #[arg(long)]
        solution: String,
        /// Error text the entry is keyed on
        text: String,
    },
    /// Resolve every new clipboard text until Ctrl+C
    Watch,
    /// Check the knowledge base and the configured completion backend
    Check,
    /// Write the current defaults to a config file
    InitConfig {
        #[arg(default_value = profile::DEFAULT_CONFIG_FILE)]
        path: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::InitConfig { path, force } = &cli.command {
        let path = profile::init_config(path, *force)?;
        println!("Wrote {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config = profile::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Resolve { text, copy } => resolve(config, text, copy).await,
        Command::Find { text } => find(config, text),
        Command::Add {
            category,
            solution,
            text,
        } => {
            let resolver = Resolver::from_config(&config);
            let key = resolver.curate(&text, &category, &solution)?;
            println!("Saved under '{key}'");
            Ok(ExitCode::SUCCESS)
        }
        Command::Watch => watch(config).await,
        Command::Check => check(config).await,
        Command::InitConfig { .. } => Ok(ExitCode::SUCCESS),
    }
}

fn read_text(text: Option<String>) -> anyhow::Result<String> {
    let (text, source) = match text {
        Some(text) => (text, TextSource::Manual),
        None => (std::io::read_to_string(std::io::stdin())?, TextSource::Stdin),
    };

    if text.trim().is_empty() {
        anyhow::bail!("No text detected");
    }
    tracing::debug!("Read {} chars from {}", text.len(), source);
    Ok(text)
}

async fn resolve(config: Config, text: Option<String>, copy: bool) -> anyhow::Result<ExitCode> {
    let text = read_text(text)?;
    let resolver = Resolver::from_config(&config);

    let backend = resolver.backend().metadata();
    tracing::debug!("Fallback backend: {} ({})", backend.name, backend.model);

    let resolution = resolver.resolve(&text).await;
    println!("{}", render(&text, &resolution));

    if copy
        && let Some(record) = resolution.record()
        && let Err(e) = fixit_io::clipboard::copy_to_clipboard(&record.solution)
    {
        tracing::warn!("Failed to copy to clipboard: {}", e);
    }

    Ok(match resolution {
        Resolution::Failed { .. } => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

fn find(config: Config, text: Option<String>) -> anyhow::Result<ExitCode> {
    let text = read_text(text)?;
    let resolver = Resolver::from_config(&config);

    match resolver.find(&text)? {
        Some(found) => {
            println!("{}", render(&text, &Resolution::Matched(found)));
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("No match found in local DB.");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn watch(config: Config) -> anyhow::Result<ExitCode> {
    let state = Arc::new(AppState::new(config));
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks();

    tracing::info!("Watching the clipboard. Press Ctrl+C to exit.");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::warn!("task exited"),
                Ok(Err(e)) => tracing::error!("task failed: {e}"),
                Err(e) => tracing::error!("task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    tasks.shutdown().await;
    Ok(ExitCode::SUCCESS)
}

async fn check(config: Config) -> anyhow::Result<ExitCode> {
    let mut healthy = true;

    let store = KnowledgeStore::new(&config.knowledge.path);
    match store.load() {
        Ok(base) => println!(
            "Knowledge base: {} entries at {}",
            base.len(),
            store.path().display()
        ),
        Err(e) => {
            healthy = false;
            println!("Knowledge base: {e}");
        }
    }

    match config.completion.provider {
        Provider::Local => {
            let backend = LocalBackend::new(&config.completion.local);
            match backend.check_connection().await {
                Ok(status) => println!("Local backend: {status}"),
                Err(e) => {
                    healthy = false;
                    println!("Local backend: {e}");
                }
            }
            match backend.list_models().await {
                Ok(models) => {
                    println!("Available models:");
                    for model in models {
                        println!(" - {model}");
                    }
                }
                Err(e) => println!("Failed to list models: {e}"),
            }
        }
        Provider::Cloud => {
            let backend = CloudBackend::new(&config.completion.cloud);
            match backend.check_connection().await {
                Ok(reply) => println!("Cloud backend: connected ({})", reply.text.trim()),
                Err(e) => {
                    healthy = false;
                    println!("Cloud backend: {e}");
                }
            }
        }
    }

    Ok(if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
