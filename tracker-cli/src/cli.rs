use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use std::{fmt, sync::Arc};
use tracker_core::{
    Candidate, Config, Detail, FileSelectionStore, Orchestrator, provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "tracker", version, about = "City weather tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com API key.
    Configure,

    /// Search for a city and optionally pin one of the results.
    Search {
        /// Free-text city name, e.g. "Washington".
        query: String,
    },

    /// Show current conditions for the pinned city.
    Show,

    /// Forget the pinned city.
    Clear,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { query } => search(&query).await,
            Command::Show => show().await,
            Command::Clear => clear().await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Text::new("WeatherAPI.com API key:")
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

/// Wire up the orchestrator from on-disk config; the startup restore of a
/// previously pinned city runs inside `Orchestrator::new`.
async fn build_orchestrator() -> anyhow::Result<Orchestrator> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let store = FileSelectionStore::open()?;

    Ok(Orchestrator::new(Arc::new(provider), Arc::new(store)).await)
}

struct Row(Candidate);

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.0.name, self.0.country)?;
        match self.0.enrichment.temp_c() {
            Some(temp_c) => write!(f, " ({temp_c:.1}°C)"),
            None => write!(f, " (no live data)"),
        }
    }
}

async fn search(query: &str) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator().await?;
    orchestrator.search(query).await;

    if let Some(message) = orchestrator.error_message() {
        anyhow::bail!(message);
    }

    let candidates = orchestrator.candidates();
    if candidates.is_empty() {
        println!("No cities matched {query:?}.");
        return Ok(());
    }

    let rows: Vec<Row> = candidates.into_iter().map(Row).collect();
    let picked = Select::new("Pin a city (Esc to skip):", rows)
        .prompt_skippable()
        .context("Failed to read selection")?;

    if let Some(Row(candidate)) = picked {
        orchestrator.select(Some(&candidate)).await;
        if let Some(message) = orchestrator.error_message() {
            anyhow::bail!(message);
        }
        println!("Pinned {}, {}.", candidate.name, candidate.country);
    }

    Ok(())
}

async fn show() -> anyhow::Result<()> {
    let orchestrator = build_orchestrator().await?;

    match orchestrator.selected() {
        Some(detail) => print_detail(&detail),
        None => println!("No city selected. Use `tracker search <query>` to pin one."),
    }

    Ok(())
}

async fn clear() -> anyhow::Result<()> {
    let orchestrator = build_orchestrator().await?;
    orchestrator.select(None).await;

    if let Some(message) = orchestrator.error_message() {
        anyhow::bail!(message);
    }

    println!("Selection cleared.");
    Ok(())
}

fn print_detail(detail: &Detail) {
    println!("{}", detail.name);
    println!(
        "  {}  {:.1}°C (feels like {:.1}°C)",
        detail.condition, detail.temp_c, detail.feels_like_c
    );
    println!("  Humidity {}%  UV {:.1}", detail.humidity_pct, detail.uv);
}
