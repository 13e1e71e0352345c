//! Capital Bikeshare Feed
//!
//! Reads the public GBFS feeds: the discovery document advertises the
//! `station_information` and `station_status` URLs. Stations shown are the
//! configured favorites, or the three nearest to home within the radius.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use super::{fetch_json, id_string, loose_int, ProviderError};
use crate::cache::TtlCache;
use crate::config::{BikeShareConfig, Config, HomeConfig, UpstreamConfig};
use crate::geo::haversine_m;
use crate::summary::{BikeBoard, BikeStation};

const DISCOVERY_TTL: Duration = Duration::from_secs(24 * 3600);
const NEAREST_LIMIT: usize = 3;

/// GBFS client
pub struct BikeshareClient {
    http: Client,
    discovery_url: String,
    feeds: TtlCache<HashMap<String, String>>,
    info: TtlCache<HashMap<String, StationInfo>>,
    status: TtlCache<Vec<BikeStation>>,
}

#[derive(Debug, Clone, PartialEq)]
struct StationInfo {
    name: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl BikeshareClient {
    /// Create a new GBFS client
    pub fn new(http: Client, upstream: &UpstreamConfig) -> Self {
        Self {
            http,
            discovery_url: upstream.gbfs_url.clone(),
            feeds: TtlCache::new(),
            info: TtlCache::new(),
            status: TtlCache::new(),
        }
    }

    async fn feed_url(&self, name: &str) -> Result<String, ProviderError> {
        let feeds = self
            .feeds
            .get_or_try_load("gbfs_feeds", DISCOVERY_TTL, || async {
                let discovery: Value = fetch_json(self.http.get(&self.discovery_url)).await?;
                Ok::<_, ProviderError>(feed_urls(&discovery))
            })
            .await?;

        feeds
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(name.to_string()))
    }

    async fn station_info(&self) -> Result<HashMap<String, StationInfo>, ProviderError> {
        self.info
            .get_or_try_load("gbfs_station_info", DISCOVERY_TTL, || async {
                let url = self.feed_url("station_information").await?;
                let response: GbfsStations<InfoRecord> = fetch_json(self.http.get(&url)).await?;
                Ok::<_, ProviderError>(station_info_map(response))
            })
            .await
    }

    /// Bike and dock availability for the selected stations
    pub async fn bike_status(&self, config: &Config) -> Result<BikeBoard, ProviderError> {
        let ttl = Duration::from_secs(config.bike_share.refresh_s);

        let stations = self
            .status
            .get_or_try_load("gbfs_status", ttl, || async {
                let url = self.feed_url("station_status").await?;
                let status: GbfsStations<StatusRecord> = fetch_json(self.http.get(&url)).await?;
                let info = self.station_info().await?;
                Ok::<_, ProviderError>(select_stations(
                    status.data.stations,
                    &info,
                    &config.home,
                    &config.bike_share,
                ))
            })
            .await?;

        Ok(BikeBoard { stations })
    }
}

// ============================================
// UPSTREAM SHAPES
// ============================================

#[derive(Debug, Deserialize)]
struct GbfsStations<T> {
    data: GbfsStationList<T>,
}

#[derive(Debug, Deserialize)]
struct GbfsStationList<T> {
    #[serde(default = "Vec::new")]
    stations: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct InfoRecord {
    station_id: Option<Value>,
    name: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct StatusRecord {
    station_id: Option<Value>,
    num_bikes_available: Option<Value>,
    num_docks_available: Option<Value>,
    num_ebikes_available: Option<Value>,
    #[serde(default)]
    vehicle_types_available: Vec<VehicleTypeCount>,
}

#[derive(Debug, Deserialize)]
struct VehicleTypeCount {
    vehicle_type_id: Option<String>,
    count: Option<Value>,
}

// ============================================
// CONVERSIONS
// ============================================

/// Feed name → URL from a GBFS discovery document. English feeds are
/// preferred; otherwise the first language block is used. GBFS 3 puts the
/// feed list directly under `data`.
fn feed_urls(discovery: &Value) -> HashMap<String, String> {
    let data = &discovery["data"];
    let block = data
        .get("en")
        .or_else(|| data.as_object().and_then(|langs| langs.values().next()));

    let items = match block {
        Some(Value::Object(lang)) => lang.get("feeds").and_then(Value::as_array),
        Some(Value::Array(list)) => Some(list),
        _ => None,
    };

    items
        .into_iter()
        .flatten()
        .filter_map(|item| {
            let name = item.get("name")?.as_str()?;
            let url = item.get("url")?.as_str()?;
            Some((name.to_string(), url.to_string()))
        })
        .collect()
}

fn station_info_map(response: GbfsStations<InfoRecord>) -> HashMap<String, StationInfo> {
    response
        .data
        .stations
        .into_iter()
        .filter_map(|s| {
            let id = id_string(s.station_id.as_ref())?;
            Some((
                id,
                StationInfo {
                    name: s.name,
                    lat: s.lat,
                    lon: s.lon,
                },
            ))
        })
        .collect()
}

/// E-bike count from `num_ebikes_available`, falling back to the GBFS 2.2
/// per-vehicle-type counts.
fn ebike_count(record: &StatusRecord) -> Option<i64> {
    loose_int(record.num_ebikes_available.as_ref()).or_else(|| {
        record
            .vehicle_types_available
            .iter()
            .find(|vt| {
                vt.vehicle_type_id
                    .as_deref()
                    .is_some_and(|id| id.to_lowercase().contains("ebike"))
            })
            .and_then(|vt| loose_int(vt.count.as_ref()))
    })
}

fn select_stations(
    status: Vec<StatusRecord>,
    info: &HashMap<String, StationInfo>,
    home: &HomeConfig,
    bike: &BikeShareConfig,
) -> Vec<BikeStation> {
    let favorites = &bike.favorites;

    let mut candidates: Vec<(f64, String, StatusRecord)> = status
        .into_iter()
        .filter_map(|record| {
            let id = id_string(record.station_id.as_ref())?;
            if !favorites.is_empty() {
                return favorites.contains(&id).then_some((f64::MAX, id, record));
            }

            let meta = info.get(&id)?;
            let (lat, lon) = meta.lat.zip(meta.lon)?;
            let distance = haversine_m(home.lat, home.lon, lat, lon);
            (distance <= bike.radius_m).then_some((distance, id, record))
        })
        .collect();

    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
    if favorites.is_empty() {
        candidates.truncate(NEAREST_LIMIT);
    }

    candidates
        .into_iter()
        .map(|(_, id, record)| {
            let name = info
                .get(&id)
                .and_then(|m| m.name.clone())
                .unwrap_or_else(|| format!("Station {}", id));

            BikeStation {
                bikes: loose_int(record.num_bikes_available.as_ref()).unwrap_or(0),
                docks: loose_int(record.num_docks_available.as_ref()).unwrap_or(0),
                ebikes: ebike_count(&record).unwrap_or(0),
                name,
                id,
            }
        })
        .collect()
}
