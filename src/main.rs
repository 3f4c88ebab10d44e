//! citysearch - Look up cities by name from the terminal
//!
//! Resolves city names through the Open-Meteo geocoding API, caching every
//! non-empty answer and keeping a short list of recent searches on disk.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use citysearch::cli::{format_city, format_recent, Cli, CliError, Command};
use citysearch::{Config, FileStore, GeocodingClient, SearchSession};

/// Sets up logging to stderr, filtered by `RUST_LOG`
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "citysearch=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.override_config(Config::from_env()?);
    let store = FileStore::new(&config.store_dir);
    let provider = GeocodingClient::from_config(&config)?;
    let mut session = SearchSession::open(store, provider, &config).await;

    match cli.command {
        Command::Search { query } => {
            let cities = session.search(&query).await?;
            if cities.is_empty() {
                println!("No cities found for '{}'", query);
            }
            for city in &cities {
                println!("{}", format_city(city));
            }
        }
        Command::Select { city_id } => {
            if session.recent().is_empty() {
                return Err(CliError::NoRecentSearch.into());
            }
            let city = session
                .select_by_id(city_id)
                .await
                .ok_or(CliError::UnknownCity(city_id))?;
            println!("Selected {}", format_city(&city).trim_start());
        }
        Command::Recent => {
            print!("{}", format_recent(session.recent()));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
