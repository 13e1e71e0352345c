//! Metro Clock
//!
//! Run with: cargo run -- serve
//!
//! # Configuration
//!
//! A TOML file (`--config PATH`, or the default search locations) with
//! environment overrides:
//! - `WMATA_API_KEY`: WMATA developer key (rail, bus and incidents need it)
//! - `METRO_CLOCK_HOST` / `METRO_CLOCK_PORT`: Bind address (default: 0.0.0.0:8000)
//! - `METRO_CLOCK_STATIC_DIR`: Built dashboard directory
//! - `METRO_CLOCK_LOG_LEVEL` / `METRO_CLOCK_LOG_FORMAT`: Logging (info, pretty)
//! - `RUST_LOG`: Full filter override

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use metro_clock::api::{serve, AppState};
use metro_clock::config::{generate_default_config, Config, LoggingConfig};
use metro_clock::feeds::LiveFeeds;
use metro_clock::summary::build_summary;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "metro-clock")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Transit, bikeshare and weather wall clock for the DC area")]
struct Cli {
    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Override the bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the bind port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Build one summary and print it as JSON
    Summary {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Write a default config file
    InitConfig {
        /// Destination (default: user config directory)
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => with_bootstrap_logging(Config::load_default),
    };

    init_tracing(&config.logging);

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => run_server(config, host, port).await,
        Commands::Summary { pretty } => print_summary(config, pretty).await,
        Commands::InitConfig { path, force } => init_config(path, force),
    }
}

/// Run `f` under a plain stderr subscriber, for logging that happens before
/// the configured subscriber exists
fn with_bootstrap_logging<T>(f: impl FnOnce() -> T) -> T {
    let bootstrap = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::with_default(bootstrap, f)
}

/// Install the tracing subscriber. Logs go to stderr so `summary` output
/// stays clean on stdout.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("metro_clock={0},tower_http={0}", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run_server(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.api.host = host;
    }
    if let Some(port) = port {
        config.api.port = port;
    }

    tracing::info!("Starting Metro Clock v{}", env!("CARGO_PKG_VERSION"));

    let feeds = LiveFeeds::new(&config.upstream).context("building HTTP client")?;
    if config.upstream.wmata_key().is_none() {
        tracing::warn!("WMATA_API_KEY not set: rail, bus and incidents will report errors");
    }
    if !config.bike_share.enabled {
        tracing::info!("Bikeshare disabled");
    }

    let state = AppState::new(Arc::new(feeds), config);
    serve(state).await?;

    tracing::info!("Metro Clock stopped");
    Ok(())
}

async fn print_summary(config: Config, pretty: bool) -> anyhow::Result<()> {
    let feeds = LiveFeeds::new(&config.upstream).context("building HTTP client")?;
    let summary = build_summary(&feeds, &config).await;

    let json = if pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    println!("{}", json);

    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = match path {
        Some(path) => path,
        None => dirs::config_dir()
            .map(|dir| dir.join("metro-clock").join("config.toml"))
            .context("no user config directory; pass a path")?,
    };

    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(&path, generate_default_config())
        .with_context(|| format!("writing {}", path.display()))?;

    println!("Wrote {}", path.display());
    Ok(())
}
