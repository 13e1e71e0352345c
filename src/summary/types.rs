//! Summary Snapshot Types
//!
//! The JSON document served at `GET /v1/summary`. Field names are the wire
//! format the dashboard reads, so they must not be renamed.

use serde::{Deserialize, Serialize};

/// One full dashboard snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    /// Epoch seconds at which the snapshot was assembled
    pub updated_at: i64,
    pub rail: RailBoard,
    pub bus: BusBoard,
    pub bike: BikeBoard,
    pub weather: WeatherBoard,
    pub incidents: Vec<Incident>,
    /// One `"<feed>: <message>"` line per failed feed
    pub errors: Vec<String>,
}

// ============================================
// RAIL
// ============================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RailBoard {
    pub stations: Vec<RailStation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RailStation {
    pub code: String,
    pub name: String,
    pub arrivals: Vec<RailArrival>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RailArrival {
    pub line: Option<String>,
    pub dest: Option<String>,
    pub minutes: Minutes,
    pub cars: Option<i64>,
}

/// Minutes until arrival: a count, or a board label such as `ARR` / `BRD`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Minutes {
    Count(i64),
    Label(String),
}

impl Minutes {
    /// Interpret a WMATA `Min` field: numeric strings become counts, blank
    /// becomes `--`, anything else is kept as the label.
    pub fn from_board(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) => match s.parse::<i64>() {
                Ok(n) => Minutes::Count(n),
                Err(_) if s.is_empty() => Minutes::Label("--".to_string()),
                Err(_) => Minutes::Label(s.to_string()),
            },
            None => Minutes::Label("--".to_string()),
        }
    }
}

// ============================================
// BUS
// ============================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BusBoard {
    pub stops: Vec<BusStop>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusStop {
    pub id: String,
    pub name: String,
    pub arrivals: Vec<BusArrival>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusArrival {
    pub route: Option<String>,
    pub headsign: Option<String>,
    pub minutes: Option<i64>,
}

// ============================================
// BIKESHARE
// ============================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BikeBoard {
    pub stations: Vec<BikeStation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BikeStation {
    pub id: String,
    pub name: String,
    pub bikes: i64,
    pub docks: i64,
    pub ebikes: i64,
}

// ============================================
// WEATHER
// ============================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeatherBoard {
    pub now: CurrentWeather,
    pub hourly: Vec<HourlyForecast>,
    pub alerts: Vec<WeatherAlert>,
}

/// Current conditions; serialized as `{}` when the feed failed
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CurrentWeather {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_f: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_mph: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourlyForecast {
    /// Epoch seconds at the start of the hour
    pub time: i64,
    pub temp_f: Option<f64>,
    pub pop: Option<f64>,
    pub icon: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherAlert {
    pub event: Option<String>,
    pub severity: String,
    pub headline: Option<String>,
    pub ends: Option<String>,
}

// ============================================
// INCIDENTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub text: String,
}
