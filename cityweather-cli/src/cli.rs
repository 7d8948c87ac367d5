use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use cityweather_core::{Config, HistoryStore, WeatherClient, provider_from_config};
use inquire::{Password, Text};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "City weather lookups with search history")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeather API key and endpoint.
    Configure,

    /// Show current conditions and the daily forecast for a city.
    Show {
        /// City or place name.
        city: String,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,

        /// Do not record the city in the search history.
        #[arg(long)]
        no_history: bool,
    },

    /// Inspect or edit the search history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// List previously searched cities.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Record a city without looking up its weather.
    Add { name: String },
    /// Remove an entry by id.
    Remove { id: String },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                city,
                json,
                no_history,
            } => show(&city, json, no_history).await,
            Command::History { action } => history(action).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key cannot be empty");
    }

    let base_url = Text::new("API base URL:")
        .with_default(&config.base_url)
        .prompt()
        .context("Failed to read base URL")?;

    config.set_api_key(api_key.trim().to_string());
    config.base_url = base_url.trim().to_string();
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: &str, json: bool, no_history: bool) -> anyhow::Result<()> {
    let config = Config::load_with_env()?;
    let provider = provider_from_config(&config)?;
    let client = WeatherClient::with_date_style(provider, config.date.clone())
        .context("Invalid [date] settings in configuration")?;

    let forecast = match client.get_weather_for_city(city).await {
        Ok(forecast) => forecast,
        Err(e) => {
            tracing::error!(error = %e, city, "weather lookup failed");
            bail!("{}", e.user_message());
        }
    };

    if !no_history {
        let store = HistoryStore::open(config.history_file_path()?);
        // History write failures are logged; the forecast is still printed.
        if let Err(e) = store.add(city).await {
            tracing::warn!(error = %e, "failed to record city in history");
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
    } else {
        print!("{}", output::render_forecast(&forecast));
    }
    Ok(())
}

async fn history(action: HistoryAction) -> anyhow::Result<()> {
    let config = Config::load_with_env()?;
    let store = HistoryStore::open(config.history_file_path()?);

    match action {
        HistoryAction::List { json } => {
            let entries = store.list().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print!("{}", output::render_history(&entries));
            }
        }
        HistoryAction::Add { name } => {
            let entry = store.add(&name).await?;
            println!("{}  {}", entry.id, entry.name);
        }
        HistoryAction::Remove { id } => {
            if !store.remove(&id).await? {
                bail!("History entry not found: {id}");
            }
            println!("Removed {id}");
        }
    }

    Ok(())
}
