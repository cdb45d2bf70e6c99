use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfort_core::Config;
use inquire::{Password, PasswordDisplayMode, Text};

use crate::app::App;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "comfort", version, about = "Weather comfort dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the backend URL and store an access token.
    Configure,

    /// Forget the stored access token.
    Logout,

    /// Show every city ranked by comfort.
    Dashboard {
        /// Bypass the backend cache.
        #[arg(long)]
        refresh: bool,

        /// Only show cities whose name or country contains this text.
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Keep the dashboard open and refresh it periodically until Ctrl-C.
    Watch {
        /// Seconds between refreshes.
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,

        #[arg(long, default_value = "")]
        search: String,
    },

    /// Show weather and the comfort breakdown for one city.
    City {
        id: String,

        /// Bypass the backend cache.
        #[arg(long)]
        refresh: bool,
    },

    /// List the cities the backend supports.
    Cities,

    /// Check that the backend is up.
    Health,

    /// Show backend cache state for one city.
    CacheStatus { id: String },

    /// Open an application path such as `/dashboard` or `/weather/<id>`.
    Open { path: String },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Logout => {
                let mut config = Config::load()?;
                config.clear_access_token();
                config.save()?;
                println!("Signed out.");
                Ok(())
            }
            command => {
                let config = Config::load()?.with_env_overrides();
                let app = App::from_config(&config)?;
                dispatch(&app, command).await
            }
        }
    }
}

async fn dispatch(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Dashboard { refresh, search } => app.dashboard(refresh, search.trim()).await,
        Command::Watch { interval, search } => {
            app.watch(Duration::from_secs(interval), search.trim()).await
        }
        Command::City { id, refresh } => app.city(&id, refresh).await,
        Command::Cities => app.cities().await,
        Command::Health => app.health().await,
        Command::CacheStatus { id } => app.cache_status(&id).await,
        Command::Open { path } => app.open(&path).await,
        Command::Configure | Command::Logout => Ok(()),
    }
}

/// Interactive configuration. Stored values are used as defaults; an empty
/// token answer keeps the current one.
fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_url = Text::new("Backend API URL:")
        .with_default(&config.api_url)
        .prompt()
        .context("Failed to read API URL")?;
    config.api_url = api_url.trim().to_string();
    config
        .api_base_url()
        .context("The API URL was not saved")?;

    let token = Password::new("Access token (leave empty to keep the current one):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read access token")?;
    let token = token.trim();
    if !token.is_empty() {
        config.set_access_token(token.to_string());
    }

    config.save()?;
    let path = Config::config_file_path()?;
    println!("Configuration saved to {}", path.display());
    if !config.is_signed_in() {
        println!("No access token stored; protected views will stay locked.");
    }
    Ok(())
}
