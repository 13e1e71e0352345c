//! # Metro Clock
//!
//! A wall-clock dashboard for the DC area: live WMATA rail and bus
//! predictions, service incidents, Capital Bikeshare availability and the
//! local weather, served as one JSON snapshot to a Leptos front end.
//!
//! ## Modules
//!
//! - [`feeds`]: Upstream clients (WMATA, Open-Meteo, NWS, GBFS)
//! - [`summary`]: Snapshot types and the concurrent summary builder
//! - [`api`]: HTTP server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use metro_clock::{build_summary, Config, LiveFeeds};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let feeds = LiveFeeds::new(&config.upstream)?;
//!
//!     let summary = build_summary(&feeds, &config).await;
//!     println!("{} rail stations, {} errors", summary.rail.stations.len(), summary.errors.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod feeds;
pub mod geo;
pub mod summary;

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig};

pub use feeds::{Feeds, LiveFeeds, ProviderError};

pub use summary::{build_summary, Summary};
