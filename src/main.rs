mod agent;
mod app;
mod config;
mod error;
mod model;
mod plan;
mod store;
mod types;
mod ui;

use std::{fs, io, path::Path};

use anyhow::{Context, Result};
use tracing::info;

use agent::provider::{LlmProvider, build_http_client};
use app::coach::Coach;
use config::CoachConfig;
use plan::breakdown::Planner;
use store::SessionStore;
use ui::{input::Prompter, timer::TerminalTimer};

fn setup_logging(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir).context("Failed to create log directory")?;
    }
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    // The terminal belongs to the coach; logs only go to the file.
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = CoachConfig::load()?;
    setup_logging(&config.log_file)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        provider = config.llm.provider.as_str(),
        model = config.llm.model(),
        "task-coach starting"
    );

    let http_client = build_http_client()?;
    let provider = LlmProvider::new(http_client, config.llm.clone())?;
    let store = SessionStore::open(&config.data_file)?;
    info!(path = %store.path().display(), sessions_completed = store.completed_count(), "session store ready");
    let planner = Planner::new(provider, config.max_retries);
    let prompter = Prompter::new(io::stdin().lock(), io::stdout());

    let mut coach = Coach::new(
        store,
        planner,
        prompter,
        TerminalTimer,
        config.max_regenerations,
    );
    coach.run(&config.llm).await
}
