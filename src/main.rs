//! # Fishing Oracle Application Entry Point
//!
//! Fetches the forecast for one zone and date, classifies the requested hours and
//! prints the result as a table (default) or JSON (`--json`).

mod logging;

use anyhow::{anyhow, Context};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::info;

use fishing_oracle_lib::classify::{Classifier, HourRange};
use fishing_oracle_lib::config::{Config, DEFAULT_CONFIG_PATH};
use fishing_oracle_lib::marine_data::MarineClient;
use fishing_oracle_lib::renderer::{draw_ascii, render_json};

/// Hourly fishing conditions for the Valencian coast.
#[derive(Parser)]
#[command(name = "fishing-oracle", version, about)]
struct Cli {
    /// Zone name as listed by --list-zones (case-insensitive)
    #[arg(short, long)]
    zone: Option<String>,

    /// Forecast date (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// First hour to show
    #[arg(long, default_value_t = 6)]
    from: u8,

    /// Last hour to show (inclusive)
    #[arg(long, default_value_t = 12)]
    to: u8,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,

    /// List configured zones and exit
    #[arg(long)]
    list_zones: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load_from_path(&cli.config);

    if cli.list_zones {
        for zone in &config.zones {
            println!("{} ({:.2}, {:.2})", zone.name, zone.latitude, zone.longitude);
        }
        return Ok(());
    }

    let zone_name = match &cli.zone {
        Some(name) => name.as_str(),
        None => config
            .zones
            .first()
            .map(|z| z.name.as_str())
            .ok_or_else(|| anyhow!("no zones configured"))?,
    };
    let zone = config.zone(zone_name).ok_or_else(|| {
        let known: Vec<&str> = config.zones.iter().map(|z| z.name.as_str()).collect();
        anyhow!("unknown zone '{zone_name}', expected one of: {}", known.join(", "))
    })?;

    let range = HourRange::new(cli.from, cli.to).context("invalid hour range")?;
    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());

    info!(zone = %zone.name, %date, from = cli.from, to = cli.to, "preparing forecast");

    let client = MarineClient::new(&config).context("failed to build HTTP client")?;

    // Create Tokio runtime for the provider requests
    let rt = tokio::runtime::Runtime::new()?;
    let series = rt
        .block_on(client.fetch_day(zone, date))
        .with_context(|| format!("could not fetch forecast for {}", zone.name))?;

    let classifier = Classifier::new(config.thresholds_for(zone));
    let rows = classifier.classify_series(&series, range);

    if cli.json {
        render_json(&mut io::stdout().lock(), &zone.name, date, &series, &rows)?;
    } else {
        draw_ascii(&zone.name, &series, &rows)?;
    }

    Ok(())
}
