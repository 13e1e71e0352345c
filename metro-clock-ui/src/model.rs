//! Summary Snapshot
//!
//! Lenient mirror of the `/v1/summary` document. Every field may be absent,
//! null or of the wrong shape; containers fall back to empty, list entries
//! that are not objects are skipped, and scalar fields stay as raw JSON
//! values so they can be shown verbatim.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One poll's worth of dashboard data
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Snapshot {
    pub updated_at: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub rail: RailSection,
    #[serde(deserialize_with = "lenient")]
    pub bus: BusSection,
    #[serde(deserialize_with = "lenient")]
    pub weather: WeatherSection,
    #[serde(deserialize_with = "lenient_list")]
    pub incidents: Vec<IncidentEntry>,
    #[serde(deserialize_with = "lenient")]
    pub bike: BikeSection,
    #[serde(deserialize_with = "lenient_list")]
    pub errors: Vec<Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RailSection {
    #[serde(deserialize_with = "lenient_list")]
    pub stations: Vec<RailStation>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RailStation {
    pub name: Option<Value>,
    pub code: Option<Value>,
    #[serde(deserialize_with = "lenient_list")]
    pub arrivals: Vec<RailArrival>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RailArrival {
    pub line: Option<Value>,
    pub dest: Option<Value>,
    pub minutes: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct BusSection {
    #[serde(deserialize_with = "lenient_list")]
    pub stops: Vec<BusStop>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct BusStop {
    pub name: Option<Value>,
    pub id: Option<Value>,
    #[serde(deserialize_with = "lenient_list")]
    pub arrivals: Vec<BusArrival>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct BusArrival {
    pub route: Option<Value>,
    pub headsign: Option<Value>,
    pub minutes: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherSection {
    #[serde(deserialize_with = "lenient")]
    pub now: WeatherNow,
    #[serde(deserialize_with = "lenient_list")]
    pub hourly: Vec<HourlyEntry>,
    #[serde(deserialize_with = "lenient_list")]
    pub alerts: Vec<AlertEntry>,
}

/// Current conditions; each reading carries either the imperial or the
/// metric member of a unit pair
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherNow {
    pub icon: Option<Value>,
    pub summary: Option<Value>,
    pub temp_f: Option<Value>,
    pub temp_c: Option<Value>,
    pub wind_mph: Option<Value>,
    pub wind_kph: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct HourlyEntry {
    pub time: Option<Value>,
    pub icon: Option<Value>,
    pub temp_f: Option<Value>,
    pub pop: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlertEntry {
    pub event: Option<Value>,
    pub headline: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct IncidentEntry {
    pub text: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct BikeSection {
    #[serde(deserialize_with = "lenient_list")]
    pub stations: Vec<BikeEntry>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct BikeEntry {
    pub name: Option<Value>,
    pub bikes: Option<Value>,
    pub docks: Option<Value>,
    pub ebikes: Option<Value>,
}

/// Treat `null` or a value of the wrong shape like a missing field
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Anything but an array is an empty list; entries that do not decode are
/// dropped
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        _ => return Ok(Vec::new()),
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| T::deserialize(entry).ok())
        .collect())
}
