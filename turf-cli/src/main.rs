//! Turf CLI Entry Point
//!
//! Configuration is loaded from environment variables (via .env file);
//! command-line arguments override environment variables.
//!
//! Usage:
//!   turf init     - Initialize the database schema, optionally seed a map
//!   turf serve    - Start the API server
//!   turf settle   - Run one settlement batch and print the report

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turf_api::{build_app, ApiConfig, AppState, AuthConfig};
use turf_core::{Coordinate, PeriodKey};
use turf_engine::{spawn_listener, EventBus, SettlementEngine, SettlementListener, TerritoryEvent};
use turf_store::TerritoryDatabase;

#[derive(Parser)]
#[command(name = "turf", version, about = "Territory control engine service")]
struct Cli {
    /// SQLite database path
    #[arg(long, default_value = "turf.db", global = true)]
    db: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema and optionally seed a map region
    Init {
        /// Bounding box to seed: min_lat,min_lng,max_lat,max_lng
        #[arg(long)]
        seed: Option<String>,

        /// Region tag for seeded tiles
        #[arg(long, default_value = "urban")]
        region: String,
    },
    /// Start the API server
    Serve {
        /// Listen address
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: String,
    },
    /// Run one settlement batch
    Settle {
        /// ISO week-based year (defaults to the concluded period)
        #[arg(long, requires = "iso_week")]
        iso_year: Option<i32>,

        /// ISO week number
        #[arg(long, requires = "iso_year")]
        iso_week: Option<u32>,
    },
}

/// Achievement collaborator seam: settlement outcomes are consumed from
/// the event bus by a listener registered here at startup.
struct AchievementForwarder;

#[async_trait]
impl SettlementListener for AchievementForwarder {
    async fn on_event(&self, event: TerritoryEvent) {
        match event {
            TerritoryEvent::TerritorySettled {
                tile_id,
                winning_guild_id,
                period,
                ..
            } => {
                tracing::info!(
                    tile = tile_id.as_str(),
                    guild = winning_guild_id.as_str(),
                    period = %period,
                    "territory settled, queueing achievement check"
                );
            }
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "turf_cli=debug,turf_api=debug,turf_engine=debug,turf_store=debug"
    } else {
        "turf_cli=info,turf_api=info,turf_engine=info,turf_store=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Init { seed, region } => {
            let db = TerritoryDatabase::open(&cli.db)?;
            db.init_schema()?;

            if let Some(bounds) = seed {
                let (min, max) = parse_bounds(&bounds)?;
                let created = db.tiles.seed_bounds(min, max, &region, Utc::now())?;
                println!("Seeded {created} new tiles ({} total)", db.tiles.count()?);
            } else {
                println!("Schema initialized");
            }
            Ok(())
        }
        Commands::Serve { addr } => {
            let db = Arc::new(TerritoryDatabase::open(&cli.db)?);
            db.init_schema()?;

            let events = EventBus::default();
            let _listener = spawn_listener(&events, Arc::new(AchievementForwarder));

            let state = AppState::new(db, events)
                .with_config(ApiConfig {
                    listen_addr: addr.clone(),
                    ..Default::default()
                })
                .with_auth(AuthConfig::from_env());
            let app = build_app(state);

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, "turf api listening");
            axum::serve(listener, app).await?;
            Ok(())
        }
        Commands::Settle { iso_year, iso_week } => {
            let db = Arc::new(TerritoryDatabase::open(&cli.db)?);
            db.init_schema()?;

            let events = EventBus::default();
            let _listener = spawn_listener(&events, Arc::new(AchievementForwarder));
            let engine = SettlementEngine::new(db, events);

            let now = Utc::now();
            let report = match (iso_year, iso_week) {
                (Some(year), Some(week)) => engine.run(PeriodKey::new(year, week), now)?,
                _ => engine.run_concluded(now)?,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

/// Parse `min_lat,min_lng,max_lat,max_lng` into a bounding box
fn parse_bounds(raw: &str) -> Result<(Coordinate, Coordinate), Box<dyn std::error::Error>> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid seed bounds {raw:?}: {e}"))?;
    if parts.len() != 4 {
        return Err(format!("seed bounds need 4 numbers, got {}", parts.len()).into());
    }
    let min = Coordinate::new(parts[0], parts[1])?;
    let max = Coordinate::new(parts[2], parts[3])?;
    if min.lat > max.lat || min.lng > max.lng {
        return Err("seed bounds min corner must be south-west of max corner".into());
    }
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bounds() {
        let (min, max) = parse_bounds("52.50,13.40,52.51,13.41").unwrap();
        assert_eq!(min.lat, 52.50);
        assert_eq!(max.lng, 13.41);

        assert!(parse_bounds("52.50,13.40").is_err());
        assert!(parse_bounds("a,b,c,d").is_err());
        assert!(parse_bounds("52.51,13.40,52.50,13.41").is_err());
        assert!(parse_bounds("91.0,13.40,92.0,13.41").is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["turf", "init", "--seed", "52.50,13.40,52.51,13.41"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { .. }));

        let cli = Cli::try_parse_from(["turf", "--db", "/tmp/t.db", "serve", "--addr", "127.0.0.1:8080"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { .. }));

        let cli = Cli::try_parse_from(["turf", "settle", "--iso-year", "2025", "--iso-week", "42"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Settle { iso_year: Some(2025), iso_week: Some(42) }
        ));

        // A week without a year is rejected
        assert!(Cli::try_parse_from(["turf", "settle", "--iso-week", "42"]).is_err());
    }
}
