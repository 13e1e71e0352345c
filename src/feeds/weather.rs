//! Weather Feeds
//!
//! Current conditions and the hourly forecast come from Open-Meteo
//! (Fahrenheit, mph); active alerts come from the National Weather Service.

use chrono::{NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{fetch_json, ProviderError};
use crate::cache::TtlCache;
use crate::config::{Config, UpstreamConfig};
use crate::summary::{CurrentWeather, HourlyForecast, WeatherAlert};

const HOURLY_TTL: Duration = Duration::from_secs(600);
const ALERTS_TTL: Duration = Duration::from_secs(300);
const MAX_ALERTS: usize = 5;

/// Open-Meteo + NWS client
pub struct WeatherClient {
    http: Client,
    open_meteo_url: String,
    nws_url: String,
    current: TtlCache<CurrentWeather>,
    hourly: TtlCache<Vec<HourlyForecast>>,
    alerts: TtlCache<Vec<WeatherAlert>>,
}

impl WeatherClient {
    /// Create a new weather client
    pub fn new(http: Client, upstream: &UpstreamConfig) -> Self {
        Self {
            http,
            open_meteo_url: upstream.open_meteo_url.trim_end_matches('/').to_string(),
            nws_url: upstream.nws_url.trim_end_matches('/').to_string(),
            current: TtlCache::new(),
            hourly: TtlCache::new(),
            alerts: TtlCache::new(),
        }
    }

    fn forecast_request(&self, config: &Config, extra: &[(&str, &str)]) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}/v1/forecast", self.open_meteo_url))
            .query(&[
                ("latitude", config.home.lat.to_string()),
                ("longitude", config.home.lon.to_string()),
                ("temperature_unit", "fahrenheit".to_string()),
                ("windspeed_unit", "mph".to_string()),
            ])
            .query(extra)
    }

    /// Current conditions at home
    pub async fn current(&self, config: &Config) -> Result<CurrentWeather, ProviderError> {
        let ttl = Duration::from_secs(config.weather.refresh_s);

        self.current
            .get_or_try_load("weather_current", ttl, || async {
                let response: CurrentResponse = fetch_json(
                    self.forecast_request(config, &[("current_weather", "true")]),
                )
                .await?;
                Ok::<_, ProviderError>(current_conditions(response))
            })
            .await
    }

    /// Upcoming hourly forecast, starting with the current hour
    pub async fn hourly(&self, config: &Config) -> Result<Vec<HourlyForecast>, ProviderError> {
        let hours = config.weather.hourly_hours;

        self.hourly
            .get_or_try_load("weather_hourly", HOURLY_TTL, || async {
                let response: HourlyResponse = fetch_json(self.forecast_request(
                    config,
                    &[
                        ("hourly", "temperature_2m,precipitation_probability,weathercode"),
                        ("forecast_days", "2"),
                        ("timezone", "auto"),
                    ],
                ))
                .await?;
                Ok::<_, ProviderError>(hourly_entries(response, Utc::now().timestamp(), hours))
            })
            .await
    }

    /// Active NWS alerts for the home point
    pub async fn alerts(&self, config: &Config) -> Result<Vec<WeatherAlert>, ProviderError> {
        self.alerts
            .get_or_try_load("weather_alerts", ALERTS_TTL, || async {
                let point = format!("{},{}", config.home.lat, config.home.lon);
                let request = self
                    .http
                    .get(format!("{}/alerts/active", self.nws_url))
                    .header("Accept", "application/geo+json")
                    .query(&[("point", point)]);

                let response: AlertsResponse = fetch_json(request).await?;
                Ok::<_, ProviderError>(alert_lines(response))
            })
            .await
    }
}

// ============================================
// UPSTREAM SHAPES
// ============================================

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current_weather: Option<OpenMeteoCurrent>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    temperature: Option<f64>,
    windspeed: Option<f64>,
    weathercode: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    #[serde(default)]
    utc_offset_seconds: i64,
    #[serde(default)]
    hourly: OpenMeteoHourly,
}

#[derive(Debug, Default, Deserialize)]
struct OpenMeteoHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    weathercode: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct AlertsResponse {
    #[serde(default)]
    features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
struct AlertFeature {
    #[serde(default)]
    properties: AlertProperties,
}

#[derive(Debug, Default, Deserialize)]
struct AlertProperties {
    event: Option<String>,
    severity: Option<String>,
    headline: Option<String>,
    ends: Option<String>,
    #[serde(default)]
    parameters: AlertParameters,
}

#[derive(Debug, Default, Deserialize)]
struct AlertParameters {
    #[serde(rename = "NWSheadline", default)]
    nws_headline: Vec<String>,
}

// ============================================
// CONVERSIONS
// ============================================

fn current_conditions(response: CurrentResponse) -> CurrentWeather {
    let Some(cw) = response.current_weather else {
        return CurrentWeather::default();
    };

    CurrentWeather {
        temp_f: cw.temperature,
        wind_mph: cw.windspeed,
        summary: Some(wmo_summary(cw.weathercode).to_string()),
        icon: Some(wmo_icon(cw.weathercode).to_string()),
    }
}

/// Hourly entries from the hour containing `now` onward, at most `hours`.
///
/// Open-Meteo reports local wall-clock times (`timezone=auto`); the
/// response's UTC offset converts them to epoch seconds.
fn hourly_entries(response: HourlyResponse, now: i64, hours: usize) -> Vec<HourlyForecast> {
    let data = response.hourly;
    let len = data
        .time
        .len()
        .min(data.temperature_2m.len())
        .min(data.precipitation_probability.len())
        .min(data.weathercode.len());

    let mut out = Vec::new();
    for i in 0..len {
        if out.len() >= hours {
            break;
        }

        let Ok(local) = NaiveDateTime::parse_from_str(&data.time[i], "%Y-%m-%dT%H:%M") else {
            continue;
        };
        let ts = local.and_utc().timestamp() - response.utc_offset_seconds;
        if ts + 3600 < now {
            continue;
        }

        let code = data.weathercode[i];
        out.push(HourlyForecast {
            time: ts,
            temp_f: data.temperature_2m[i],
            pop: data.precipitation_probability[i],
            icon: wmo_icon(code).to_string(),
            summary: wmo_summary(code).to_string(),
        });
    }

    out
}

fn alert_lines(response: AlertsResponse) -> Vec<WeatherAlert> {
    response
        .features
        .into_iter()
        .take(MAX_ALERTS)
        .map(|f| {
            let p = f.properties;
            let headline = p
                .headline
                .filter(|h| !h.is_empty())
                .or_else(|| p.parameters.nws_headline.into_iter().next());

            WeatherAlert {
                event: p.event,
                severity: p.severity.unwrap_or_default(),
                headline,
                ends: p.ends,
            }
        })
        .collect()
}

/// Short description for a WMO weather code
pub fn wmo_summary(code: Option<i64>) -> &'static str {
    match code {
        Some(0) => "Clear",
        Some(1) => "Mainly clear",
        Some(2) => "Partly cloudy",
        Some(3) => "Overcast",
        Some(45) => "Fog",
        Some(48) => "Depositing rime fog",
        Some(51) => "Light drizzle",
        Some(53) => "Drizzle",
        Some(55) => "Heavy drizzle",
        Some(61) => "Light rain",
        Some(63) => "Rain",
        Some(65) => "Heavy rain",
        Some(71) => "Light snow",
        Some(73) => "Snow",
        Some(75) => "Heavy snow",
        Some(95) => "Thunderstorm",
        Some(96) => "Thunderstorm w/ hail",
        Some(99) => "Thunderstorm w/ heavy hail",
        _ => "Weather",
    }
}

/// Emoji icon for a WMO weather code
pub fn wmo_icon(code: Option<i64>) -> &'static str {
    match code {
        Some(0) => "☀️",
        Some(1) => "🌤️",
        Some(2) => "⛅",
        Some(3) => "☁️",
        Some(45 | 48) => "🌫️",
        Some(51 | 53 | 55 | 61 | 63 | 65) => "🌧️",
        Some(71 | 73 | 75) => "🌨️",
        Some(95 | 96 | 99) => "⛈️",
        _ => "🌡️",
    }
}
