//! gpswe - GPS telemetry ingest server for Wialon IPS and EGTS devices.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use gpswe as app;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use app::analytics::summarize;
use app::config::{AppConfig, ConfigLoadResult, LoggingConfig};
use app::db::PgStore;
use app::server::Server;
use app::store::{MemoryStore, Store};

/// GPS telemetry ingest server for Wialon IPS and EGTS devices.
#[derive(Parser)]
#[command(name = "gpswe", version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use config.toml from current directory (dev mode)
    #[arg(long, global = true)]
    dev: bool,

    /// Keep everything in memory instead of PostgreSQL
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Accept device connections (default)
    Serve,
    /// Create the database schema and tables
    InitDb,
    /// Print distance and average speed of a device track
    Track {
        #[arg(long)]
        imei: String,
        /// Range start, RFC 3339
        #[arg(long)]
        from: DateTime<Utc>,
        /// Range end, RFC 3339
        #[arg(long)]
        to: DateTime<Utc>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match (&cli.config, cli.dev) {
        (Some(path), _) => path.clone(),
        (None, true) => PathBuf::from("config.toml"),
        (None, false) => AppConfig::default_path(),
    };

    let (config, missing) = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => (config, false),
        ConfigLoadResult::Missing => (AppConfig::default(), true),
        ConfigLoadResult::Invalid(e) => {
            anyhow::bail!("Config {} is invalid: {e}", config_path.display())
        }
    };

    let _log_guard = init_logging(&config.logging)?;
    tracing::info!("gpswe {} starting...", env!("CARGO_PKG_VERSION"));
    if missing {
        tracing::info!("Config {:?} not found, using defaults", config_path);
    } else {
        tracing::info!("Config loaded from {:?}", config_path);
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve if cli.memory => {
            tracing::warn!("Memory store in use: nothing survives a restart");
            serve(&config, Arc::new(MemoryStore::new())).await
        }
        Command::Serve => {
            let store = PgStore::connect(&config.database).await?;
            serve(&config, Arc::new(store)).await
        }
        Command::InitDb => {
            let store = PgStore::connect(&config.database).await?;
            store.init_schema().await?;
            tracing::info!("Schema gpswe is ready");
            Ok(())
        }
        Command::Track { imei, from, to, json } => {
            if cli.memory {
                track(&MemoryStore::new(), &imei, from, to, json).await
            } else {
                let store = PgStore::connect(&config.database).await?;
                track(&store, &imei, from, to, json).await
            }
        }
    }
}

/// Console logging plus, when configured, a daily rolling file.
fn init_logging(logging: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    let Some(dir) = logging.directory.as_deref() else {
        registry.init();
        return Ok(None);
    };

    let (writer, guard) = tracing_appender::non_blocking(file_appender(dir)?);
    registry
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Ok(Some(guard))
}

fn file_appender(dir: &Path) -> anyhow::Result<tracing_appender::rolling::RollingFileAppender> {
    std::fs::create_dir_all(dir).with_context(|| format!("Cannot create log directory {}", dir.display()))?;
    Ok(tracing_appender::rolling::daily(dir, "gpswe.log"))
}

async fn serve<S: Store>(config: &AppConfig, store: Arc<S>) -> anyhow::Result<()> {
    let server = Server::bind(config, store)
        .await
        .with_context(|| format!("Cannot listen on {}", config.server.bind_addr()))?;
    server.run().await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn track<S: Store>(
    store: &S,
    imei: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    json: bool,
) -> anyhow::Result<()> {
    let points = store.positions_in_range(imei, from, to).await?;
    let summary = summarize(&points);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Device:        {imei}");
    println!("Range:         {from} .. {to}");
    println!("Points:        {}", summary.points);
    println!("Distance:      {:.3} km", summary.distance_km);
    match summary.average_speed {
        Some(speed) => println!("Average speed: {speed:.1} km/h"),
        None => println!("Average speed: n/a"),
    }
    Ok(())
}
