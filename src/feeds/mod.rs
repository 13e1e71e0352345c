//! Upstream Feeds
//!
//! Clients for the data sources behind the dashboard:
//! - WMATA (rail predictions, bus predictions, incidents)
//! - Open-Meteo (current conditions, hourly forecast)
//! - National Weather Service (active alerts)
//! - Capital Bikeshare GBFS (station status)
//!
//! Each client caches upstream responses with a per-key TTL.

mod bikeshare;
mod weather;
mod wmata;

pub use bikeshare::BikeshareClient;
pub use weather::{wmo_icon, wmo_summary, WeatherClient};
pub use wmata::WmataClient;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::config::{Config, UpstreamConfig};
use crate::summary::{
    BikeBoard, BusBoard, CurrentWeather, HourlyForecast, Incident, RailBoard, WeatherAlert,
};

/// The set of feeds a summary is assembled from
#[async_trait]
pub trait Feeds: Send + Sync {
    async fn rail(&self, config: &Config) -> Result<RailBoard, ProviderError>;

    async fn bus(&self, config: &Config) -> Result<BusBoard, ProviderError>;

    async fn incidents(&self, config: &Config) -> Result<Vec<Incident>, ProviderError>;

    async fn bikes(&self, config: &Config) -> Result<BikeBoard, ProviderError>;

    async fn weather_now(&self, config: &Config) -> Result<CurrentWeather, ProviderError>;

    async fn weather_hourly(&self, config: &Config) -> Result<Vec<HourlyForecast>, ProviderError>;

    async fn weather_alerts(&self, config: &Config) -> Result<Vec<WeatherAlert>, ProviderError>;

    /// Whether rail/bus/incident feeds have credentials
    fn wmata_configured(&self) -> bool;
}

/// Feeds backed by the real upstream services
pub struct LiveFeeds {
    wmata: WmataClient,
    weather: WeatherClient,
    bikeshare: BikeshareClient,
}

impl LiveFeeds {
    /// Build all clients from upstream configuration
    pub fn new(upstream: &UpstreamConfig) -> Result<Self, ProviderError> {
        let http = http_client(upstream)?;

        Ok(Self {
            wmata: WmataClient::new(http.clone(), upstream),
            weather: WeatherClient::new(http.clone(), upstream),
            bikeshare: BikeshareClient::new(http, upstream),
        })
    }
}

#[async_trait]
impl Feeds for LiveFeeds {
    async fn rail(&self, config: &Config) -> Result<RailBoard, ProviderError> {
        self.wmata.rail_predictions(config).await
    }

    async fn bus(&self, config: &Config) -> Result<BusBoard, ProviderError> {
        self.wmata.bus_predictions(config).await
    }

    async fn incidents(&self, _config: &Config) -> Result<Vec<Incident>, ProviderError> {
        self.wmata.incidents().await
    }

    async fn bikes(&self, config: &Config) -> Result<BikeBoard, ProviderError> {
        self.bikeshare.bike_status(config).await
    }

    async fn weather_now(&self, config: &Config) -> Result<CurrentWeather, ProviderError> {
        self.weather.current(config).await
    }

    async fn weather_hourly(&self, config: &Config) -> Result<Vec<HourlyForecast>, ProviderError> {
        self.weather.hourly(config).await
    }

    async fn weather_alerts(&self, config: &Config) -> Result<Vec<WeatherAlert>, ProviderError> {
        self.weather.alerts(config).await
    }

    fn wmata_configured(&self) -> bool {
        self.wmata.has_key()
    }
}

/// Errors that can occur while talking to an upstream feed
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{0} not set")]
    MissingApiKey(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("{0} not advertised by upstream")]
    NotFound(String),
}

fn http_client(upstream: &UpstreamConfig) -> Result<Client, ProviderError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(upstream.request_timeout_secs))
        .user_agent(upstream.user_agent.clone())
        .build()?;

    Ok(client)
}

/// Send a request and decode a 2xx JSON body
async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ProviderError> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Loose integer: numbers are truncated, numeric strings parsed, rest dropped
fn loose_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Upstream ids arrive as strings or numbers depending on the feed
fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
