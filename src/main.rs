//! # Fujinav CLI
//!
//! Runs the gateway server, or a single route / geocode query against the
//! configured backends.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fujinav::{
    wire, Config, CountryCode, DistanceUnit, NavService, RouteRequest, TransportMode,
};
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Command-line interface for fujinav
#[derive(Parser)]
#[command(name = "fujinav")]
#[command(about = "Geocoding and routing gateway for low-memory retro clients")]
#[command(version = env!("FUJINAV_VERSION"))]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Override the port of the configured listen address
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Route once and print the result
    Route {
        /// Start coordinate (lat,lng)
        #[arg(long, allow_hyphen_values = true)]
        from: String,
        /// End coordinate (lat,lng)
        #[arg(long, allow_hyphen_values = true)]
        to: String,
        /// walking, biking, auto or transit
        #[arg(long, default_value = "auto")]
        mode: TransportMode,
        /// km or mi
        #[arg(long, default_value = "km")]
        units: DistanceUnit,
        /// Two-letter country code
        #[arg(long)]
        country: Option<CountryCode>,
        /// Print the plain-text line format instead of JSON
        #[arg(long)]
        plain: bool,
    },
    /// Geocode a query and print the candidates
    Geocode {
        /// Free-text place or address
        query: String,
        /// Print the plain-text line format instead of JSON
        #[arg(long)]
        plain: bool,
    },
}

/// Logs go to stderr so `--plain` output stays clean
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Err(e) = run(cli).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Commands::Serve { port } => {
            let config = match port {
                Some(port) => config.with_port(port),
                None => config,
            };
            let service = Arc::new(NavService::new(config.nav)?);
            fujinav::server::run_server(service, &config.listen).await?;
        }
        Commands::Route {
            from,
            to,
            mode,
            units,
            country,
            plain,
        } => {
            let service = NavService::new(config.nav)?;
            let req = RouteRequest::new(
                from.parse().context("invalid --from")?,
                to.parse().context("invalid --to")?,
            )
            .mode(mode)
            .units(units)
            .country(country);

            let route = service.route(&req).await?;
            if plain {
                print!("{}", wire::encode_route_plain(&route));
            } else {
                println!("{}", serde_json::to_string_pretty(&route)?);
            }
        }
        Commands::Geocode { query, plain } => {
            let service = NavService::new(config.nav)?;
            let results = service.geocode(&query).await?;
            if plain {
                print!("{}", wire::encode_geocode_plain(&results));
            } else {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
        }
    }

    Ok(())
}
