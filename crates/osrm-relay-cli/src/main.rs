use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use osrm_relay_cli::commands::download::handle_download;
use osrm_relay_cli::commands::health::handle_health_check;
use osrm_relay_cli::commands::maintenance::{handle_prepare, handle_rebuild};
use osrm_relay_cli::commands::parse_param;
use osrm_relay_cli::commands::query::{handle_query, QueryCommandArgs};
use osrm_relay_cli::commands::route::{handle_route, RouteCommandArgs};
use osrm_relay_cli::output::OutputFormat;
use osrm_relay_lib::maintenance::{
    DEFAULT_EXTRACT_PATH, DEFAULT_EXTRACT_URL, DEFAULT_GRAPH_PATH, DEFAULT_PROFILE_LUA,
};
use osrm_relay_lib::{Algorithm, EngineConfig, Locale, Operation, RoutingClient};

#[derive(Parser, Debug)]
#[command(author, version, about = "OSRM relay queries and routing data maintenance")]
struct Cli {
    /// Routing engine base URL (overrides OSRM_URL).
    #[arg(long, global = true)]
    osrm_url: Option<String>,

    /// Preprocessing pipeline: mld or ch (overrides OSRM_ALGORITHM).
    #[arg(long, global = true)]
    algorithm: Option<Algorithm>,

    /// Output format. Defaults to text, except for health-check (json).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Route between two points, retrying with road-snapped endpoints.
    Route {
        /// Start as lon,lat.
        #[arg(long)]
        start: String,
        /// Destination as lon,lat.
        #[arg(long)]
        end: String,
        /// Intermediate point as lon,lat (repeatable, in order).
        #[arg(long)]
        via: Vec<String>,
        /// Extra engine parameter as key=value (repeatable).
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Print a readable summary of the route.
        #[arg(long)]
        summary: bool,
        /// Summary language: ru or en (default: SUMMARY_LOCALE or ru).
        #[arg(long)]
        lang: Option<Locale>,
        /// Report the direct attempt without snapping endpoints.
        #[arg(long)]
        no_fallback: bool,
    },
    /// Send a table, nearest, match or trip request and print the engine JSON.
    Query {
        /// Engine operation.
        operation: Operation,
        /// Points as lon,lat pairs joined by ';'.
        #[arg(long)]
        points: String,
        /// Extra engine parameter as key=value (repeatable).
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Download the OSM extract.
    Download {
        #[arg(long, default_value = DEFAULT_EXTRACT_URL)]
        url: String,
        /// Where to store the extract.
        #[arg(long, default_value = DEFAULT_EXTRACT_PATH)]
        output: PathBuf,
    },
    /// Build the routing graph from an extract (extract, then partition and
    /// customize for mld or contract for ch).
    Prepare {
        #[arg(long, default_value = DEFAULT_EXTRACT_PATH)]
        pbf: PathBuf,
        /// Lua routing profile passed to osrm-extract.
        #[arg(long, default_value = DEFAULT_PROFILE_LUA)]
        profile: PathBuf,
        /// Print the commands without running them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Refresh weights of a prepared graph (customize for mld, contract for ch).
    Rebuild {
        #[arg(long, default_value = DEFAULT_GRAPH_PATH)]
        graph: PathBuf,
        /// Print the commands without running them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Check the extract on disk and send a sample route to the engine.
    HealthCheck {
        /// Directory the extract path is resolved against.
        #[arg(long, default_value = ".")]
        data_root: PathBuf,
        /// Exit with an error when any check fails.
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = EngineConfig::from_env().context("invalid OSRM_* environment")?;
    if let Some(url) = cli.osrm_url {
        config = config.with_base_url(url);
    }
    if let Some(algorithm) = cli.algorithm {
        config = config.with_algorithm(algorithm);
    }
    let format = cli.format.unwrap_or_default();

    match cli.command {
        Command::Route {
            start,
            end,
            via,
            params,
            summary,
            lang,
            no_fallback,
        } => {
            let locale = match lang {
                Some(locale) => locale,
                None => default_locale()?,
            };
            let args = RouteCommandArgs {
                start,
                end,
                via,
                params,
                summary,
                locale,
                no_fallback,
            };
            let client = RoutingClient::new(config).context("failed to build routing client")?;
            handle_route(&client, &args, format).await
        }
        Command::Query {
            operation,
            points,
            params,
        } => {
            let args = QueryCommandArgs {
                operation,
                points,
                params,
            };
            let client = RoutingClient::new(config).context("failed to build routing client")?;
            handle_query(&client, &args).await
        }
        Command::Download { url, output } => handle_download(&url, &output, format).await,
        Command::Prepare {
            pbf,
            profile,
            dry_run,
        } => handle_prepare(&pbf, &profile, config.algorithm, dry_run, format),
        Command::Rebuild { graph, dry_run } => {
            handle_rebuild(&graph, config.algorithm, dry_run, format)
        }
        Command::HealthCheck { data_root, strict } => {
            let format = cli.format.unwrap_or(OutputFormat::Json);
            handle_health_check(&config, &data_root, strict, format).await
        }
    }
}

/// `SUMMARY_LOCALE`, falling back to Russian.
fn default_locale() -> Result<Locale> {
    match std::env::var("SUMMARY_LOCALE") {
        Ok(value) if !value.trim().is_empty() => value
            .parse()
            .map_err(|msg: String| anyhow::anyhow!("invalid SUMMARY_LOCALE: {}", msg)),
        _ => Ok(Locale::default()),
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
