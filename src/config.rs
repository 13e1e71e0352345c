//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub home: HomeConfig,

    #[serde(default)]
    pub rail: RailConfig,

    #[serde(default)]
    pub bus: BusConfig,

    #[serde(default)]
    pub bike_share: BikeShareConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the dashboard hangs; drives nearest-station discovery and weather
#[derive(Debug, Clone, Deserialize)]
pub struct HomeConfig {
    #[serde(default = "default_lat")]
    pub lat: f64,

    #[serde(default = "default_lon")]
    pub lon: f64,

    #[serde(default = "default_home_radius")]
    pub radius_m: f64,
}

fn default_lat() -> f64 {
    38.8895
}

fn default_lon() -> f64 {
    -77.0353
}

fn default_home_radius() -> f64 {
    1200.0
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            lat: default_lat(),
            lon: default_lon(),
            radius_m: default_home_radius(),
        }
    }
}

/// Metrorail configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RailConfig {
    /// Station codes to show; empty means nearest stations to home
    #[serde(default)]
    pub favorites: Vec<String>,

    #[serde(default = "default_rail_refresh")]
    pub refresh_s: u64,

    #[serde(default = "default_max_stations")]
    pub max_stations: usize,
}

fn default_rail_refresh() -> u64 {
    15
}

fn default_max_stations() -> usize {
    5
}

impl Default for RailConfig {
    fn default() -> Self {
        Self {
            favorites: Vec::new(),
            refresh_s: default_rail_refresh(),
            max_stations: default_max_stations(),
        }
    }
}

/// Metrobus configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Stop ids to show
    #[serde(default)]
    pub favorites: Vec<String>,

    /// Stop ids always included in addition to favorites
    #[serde(default)]
    pub extra_stops: Vec<String>,

    /// Rail station codes whose nearby bus stops are included
    #[serde(default)]
    pub include_near_stations: Vec<String>,

    #[serde(default = "default_near_radius")]
    pub include_near_radius_m: u32,

    #[serde(default = "default_near_max_stops")]
    pub include_near_max_stops: usize,

    #[serde(default = "default_bus_refresh")]
    pub refresh_s: u64,

    #[serde(default = "default_max_stops")]
    pub max_stops: usize,

    #[serde(default = "default_max_arrivals")]
    pub max_arrivals: usize,
}

fn default_near_radius() -> u32 {
    250
}

fn default_near_max_stops() -> usize {
    3
}

fn default_bus_refresh() -> u64 {
    20
}

fn default_max_stops() -> usize {
    3
}

fn default_max_arrivals() -> usize {
    8
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            favorites: Vec::new(),
            extra_stops: Vec::new(),
            include_near_stations: Vec::new(),
            include_near_radius_m: default_near_radius(),
            include_near_max_stops: default_near_max_stops(),
            refresh_s: default_bus_refresh(),
            max_stops: default_max_stops(),
            max_arrivals: default_max_arrivals(),
        }
    }
}

/// Capital Bikeshare configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BikeShareConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_bike_radius")]
    pub radius_m: f64,

    /// Station ids to show; empty means the three nearest within radius
    #[serde(default)]
    pub favorites: Vec<String>,

    #[serde(default = "default_bike_refresh")]
    pub refresh_s: u64,
}

fn default_true() -> bool {
    true
}

fn default_bike_radius() -> f64 {
    800.0
}

fn default_bike_refresh() -> u64 {
    45
}

impl Default for BikeShareConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius_m: default_bike_radius(),
            favorites: Vec::new(),
            refresh_s: default_bike_refresh(),
        }
    }
}

/// Weather configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_refresh")]
    pub refresh_s: u64,

    #[serde(default = "default_hourly_hours")]
    pub hourly_hours: usize,
}

fn default_weather_refresh() -> u64 {
    600
}

fn default_hourly_hours() -> usize {
    12
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            refresh_s: default_weather_refresh(),
            hourly_hours: default_hourly_hours(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the built dashboard (index.html, wasm, js)
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_static_dir() -> String {
    "metro-clock-ui/dist".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Upstream endpoints and credentials
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// WMATA API key; usually supplied through `WMATA_API_KEY`
    #[serde(default)]
    pub wmata_api_key: Option<String>,

    #[serde(default = "default_wmata_url")]
    pub wmata_url: String,

    #[serde(default = "default_open_meteo_url")]
    pub open_meteo_url: String,

    #[serde(default = "default_nws_url")]
    pub nws_url: String,

    #[serde(default = "default_gbfs_url")]
    pub gbfs_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_wmata_url() -> String {
    "https://api.wmata.com".to_string()
}

fn default_open_meteo_url() -> String {
    "https://api.open-meteo.com".to_string()
}

fn default_nws_url() -> String {
    "https://api.weather.gov".to_string()
}

fn default_gbfs_url() -> String {
    "https://gbfs.capitalbikeshare.com/gbfs/gbfs.json".to_string()
}

fn default_user_agent() -> String {
    format!("metro-clock/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    10
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            wmata_api_key: None,
            wmata_url: default_wmata_url(),
            open_meteo_url: default_open_meteo_url(),
            nws_url: default_nws_url(),
            gbfs_url: default_gbfs_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_timeout(),
        }
    }
}

impl UpstreamConfig {
    /// The WMATA key, treating an empty string as unset
    pub fn wmata_key(&self) -> Option<&str> {
        self.wmata_api_key.as_deref().filter(|k| !k.is_empty())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("metro-clock").join("config.toml")),
            Some(PathBuf::from("/etc/metro-clock/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first readable file in `config_paths`, falling back to
    /// defaults with environment overrides
    pub fn load_first(config_paths: &[PathBuf]) -> Self {
        for path_opt in config_paths {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("WMATA_API_KEY") {
            self.upstream.wmata_api_key = Some(key);
        }

        if let Ok(host) = std::env::var("METRO_CLOCK_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("METRO_CLOCK_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }
        if let Ok(dir) = std::env::var("METRO_CLOCK_STATIC_DIR") {
            self.api.static_dir = dir;
        }

        if let Ok(level) = std::env::var("METRO_CLOCK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("METRO_CLOCK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Metro Clock Configuration
#
# Environment variables override these settings:
# - WMATA_API_KEY
# - METRO_CLOCK_HOST
# - METRO_CLOCK_PORT
# - METRO_CLOCK_STATIC_DIR
# - METRO_CLOCK_LOG_LEVEL
# - METRO_CLOCK_LOG_FORMAT

[home]
lat = 38.8895
lon = -77.0353
# Search radius for nearby rail stations and bus stops (meters)
radius_m = 1200

[rail]
# Station codes, e.g. ["A01", "C01"]; empty means nearest to home
favorites = []
refresh_s = 15
max_stations = 5

[bus]
favorites = []
# Always include these stop ids
extra_stops = []
# Include bus stops near these rail station codes
include_near_stations = []
include_near_radius_m = 250
include_near_max_stops = 3
refresh_s = 20
max_stops = 3
max_arrivals = 8

[bike_share]
enabled = true
radius_m = 800
favorites = []
refresh_s = 45

[weather]
refresh_s = 600
hourly_hours = 12

[api]
host = "0.0.0.0"
port = 8000
# Built dashboard (trunk build output)
static_dir = "metro-clock-ui/dist"

[upstream]
# wmata_api_key = ""
request_timeout_secs = 10

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.home.radius_m, 1200.0);
        assert_eq!(config.rail.max_stations, 5);
        assert_eq!(config.bus.max_arrivals, 8);
        assert!(config.bike_share.enabled);
        assert_eq!(config.weather.hourly_hours, 12);
        assert_eq!(config.api.addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = Config::parse(
            r#"
            [rail]
            favorites = ["A01"]

            [bike_share]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.rail.favorites, vec!["A01".to_string()]);
        assert_eq!(config.rail.refresh_s, 15);
        assert!(!config.bike_share.enabled);
        assert_eq!(config.bike_share.radius_m, 800.0);
        assert_eq!(config.home.lat, 38.8895);
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8000);
        assert_eq!(config.bus.include_near_radius_m, 250);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nport = 9100").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api.port, 9100);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/metro-clock.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nport = ").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_load_first_skips_broken_file_and_reports_choice() {
        let mut broken = tempfile::NamedTempFile::new().unwrap();
        writeln!(broken, "[rail\nmax_stations = ").unwrap();
        let mut good = tempfile::NamedTempFile::new().unwrap();
        writeln!(good, "[rail]\nmax_stations = 2").unwrap();

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let paths = vec![
            PathBuf::from("/nonexistent/metro-clock.toml"),
            broken.path().to_path_buf(),
            good.path().to_path_buf(),
        ];
        let config = tracing::subscriber::with_default(subscriber, || Config::load_first(&paths));

        assert_eq!(config.rail.max_stations, 2);
        let text = logs.text();
        assert!(text.contains("Failed to load config from"));
        assert!(text.contains("Loaded config from"));
    }

    #[test]
    fn test_load_first_without_files_uses_defaults() {
        let config = Config::load_first(&[PathBuf::from("/nonexistent/metro-clock.toml")]);
        assert_eq!(config.rail.max_stations, 5);
    }

    #[test]
    fn test_empty_wmata_key_is_unset() {
        let mut upstream = UpstreamConfig::default();
        assert!(upstream.wmata_key().is_none());

        upstream.wmata_api_key = Some(String::new());
        assert!(upstream.wmata_key().is_none());

        upstream.wmata_api_key = Some("abc".into());
        assert_eq!(upstream.wmata_key(), Some("abc"));
    }
}
