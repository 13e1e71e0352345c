//! WMATA Feeds
//!
//! Metrorail predictions, Metrobus predictions and service incidents from
//! the WMATA developer API. All endpoints require an `api_key` header.
//!
//! Station selection:
//! - configured favorites, otherwise
//! - stations within the home radius, nearest first, otherwise
//! - the nearest stations overall

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::{fetch_json, id_string, loose_int, ProviderError};
use crate::cache::TtlCache;
use crate::config::{Config, HomeConfig, UpstreamConfig};
use crate::geo::haversine_m;
use crate::summary::{
    BusArrival, BusBoard, BusStop, Incident, Minutes, RailArrival, RailBoard, RailStation,
};

const STATIONS_TTL: Duration = Duration::from_secs(24 * 3600);
const NEARBY_STOPS_TTL: Duration = Duration::from_secs(600);
const INCIDENTS_TTL: Duration = Duration::from_secs(60);

/// Fallback search radii (meters) when no stops are found near home
const NEARBY_MIN_RADII: [u32; 3] = [0, 3000, 5000];

/// WMATA API client
pub struct WmataClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    stations: TtlCache<HashMap<String, StationMeta>>,
    rail: TtlCache<Vec<RailArrival>>,
    bus: TtlCache<StopPredictions>,
    nearby: TtlCache<Vec<(String, String)>>,
    incidents: TtlCache<Vec<Incident>>,
}

/// Rail station name and location
#[derive(Debug, Clone, PartialEq)]
pub struct StationMeta {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone)]
struct StopPredictions {
    name: Option<String>,
    arrivals: Vec<BusArrival>,
}

impl WmataClient {
    /// Create a new WMATA client
    pub fn new(http: Client, upstream: &UpstreamConfig) -> Self {
        Self {
            http,
            base_url: upstream.wmata_url.trim_end_matches('/').to_string(),
            api_key: upstream.wmata_key().map(str::to_string),
            stations: TtlCache::new(),
            rail: TtlCache::new(),
            bus: TtlCache::new(),
            nearby: TtlCache::new(),
            incidents: TtlCache::new(),
        }
    }

    /// Whether an API key is configured
    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn require_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey("WMATA_API_KEY"))
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let key = self.require_key()?;
        let request = self
            .http
            .get(format!("{}/{}", self.base_url, path))
            .header("api_key", key)
            .query(query);

        fetch_json(request).await
    }

    /// Station metadata keyed by station code, cached for a day
    async fn stations_meta(&self) -> Result<HashMap<String, StationMeta>, ProviderError> {
        self.stations
            .get_or_try_load("stations_meta", STATIONS_TTL, || async {
                let response: StationsResponse = self.get("Rail.svc/json/jStations", &[]).await?;
                Ok::<_, ProviderError>(station_meta(response))
            })
            .await
    }

    /// Predictions for the configured (or nearest) rail stations
    pub async fn rail_predictions(&self, config: &Config) -> Result<RailBoard, ProviderError> {
        self.require_key()?;

        let favorites = if config.rail.favorites.is_empty() {
            let meta = self.stations_meta().await?;
            nearest_station_codes(&meta, &config.home, config.rail.max_stations)
        } else {
            config.rail.favorites.clone()
        };

        let meta = if favorites.is_empty() {
            HashMap::new()
        } else {
            self.stations_meta().await?
        };

        let ttl = Duration::from_secs(config.rail.refresh_s);
        let mut stations = Vec::with_capacity(favorites.len());

        for code in favorites {
            let arrivals = self
                .rail
                .get_or_try_load(&format!("rail_{}", code), ttl, || async {
                    let response: PredictionResponse = self
                        .get(&format!("StationPrediction.svc/json/GetPrediction/{}", code), &[])
                        .await?;
                    Ok::<_, ProviderError>(rail_arrivals(response))
                })
                .await?;

            let name = meta
                .get(&code)
                .and_then(|m| m.name.clone())
                .unwrap_or_else(|| code.clone());

            stations.push(RailStation {
                code,
                name,
                arrivals,
            });
        }

        Ok(RailBoard { stations })
    }

    /// Predictions for favorite, extra, near-station or nearest bus stops
    pub async fn bus_predictions(&self, config: &Config) -> Result<BusBoard, ProviderError> {
        self.require_key()?;
        let bus = &config.bus;

        let mut favorites: Vec<String> = bus
            .favorites
            .iter()
            .chain(bus.extra_stops.iter())
            .cloned()
            .collect();
        let mut names: HashMap<String, String> = HashMap::new();

        if !bus.include_near_stations.is_empty() {
            let meta = self.stations_meta().await?;
            for station_code in &bus.include_near_stations {
                let Some((lat, lon)) = meta.get(station_code).and_then(|m| m.lat.zip(m.lon)) else {
                    tracing::debug!("Unknown rail station {} in include_near_stations", station_code);
                    continue;
                };

                let stops = self.stops_near(lat, lon, bus.include_near_radius_m).await?;
                for (stop_id, name) in nearest_stops(stops, bus.include_near_max_stops) {
                    favorites.push(stop_id.clone());
                    names.insert(stop_id, name);
                }
            }
        }

        if favorites.is_empty() {
            let nearby = self.nearby_stops(&config.home, bus.max_stops).await?;
            favorites = nearby.iter().map(|(id, _)| id.clone()).collect();
            names = nearby.into_iter().collect();
        }

        let ttl = Duration::from_secs(bus.refresh_s);
        let mut stops = Vec::new();

        for stop_id in dedup_preserving_order(favorites) {
            let entry = self
                .bus
                .get_or_try_load(&format!("bus_{}", stop_id), ttl, || async {
                    let response: NextBusResponse = self
                        .get(
                            "NextBusService.svc/json/jPredictions",
                            &[("StopID", stop_id.clone())],
                        )
                        .await?;
                    Ok::<_, ProviderError>(stop_predictions(response, bus.max_arrivals))
                })
                .await?;

            let name = entry
                .name
                .or_else(|| names.get(&stop_id).cloned())
                .unwrap_or_else(|| format!("Stop {}", stop_id));

            stops.push(BusStop {
                id: stop_id,
                name,
                arrivals: entry.arrivals,
            });
        }

        Ok(BusBoard { stops })
    }

    async fn stops_near(&self, lat: f64, lon: f64, radius_m: u32) -> Result<Vec<WmataStop>, ProviderError> {
        let response: StopsResponse = self
            .get(
                "Bus.svc/json/jStops",
                &[
                    ("lat", lat.to_string()),
                    ("lon", lon.to_string()),
                    ("radius", radius_m.to_string()),
                ],
            )
            .await?;

        Ok(response.stops)
    }

    /// Nearest stops to home, widening the radius until something is found
    async fn nearby_stops(&self, home: &HomeConfig, limit: usize) -> Result<Vec<(String, String)>, ProviderError> {
        self.nearby
            .get_or_try_load("bus_nearby", NEARBY_STOPS_TTL, || async {
                let radius = home.radius_m.max(0.0) as u32;
                for min_radius in NEARBY_MIN_RADII {
                    let stops = self.stops_near(home.lat, home.lon, radius.max(min_radius)).await?;
                    if !stops.is_empty() {
                        return Ok(nearest_stops(stops, limit));
                    }
                }
                Ok::<_, ProviderError>(Vec::new())
            })
            .await
    }

    /// Current rail and bus incidents
    pub async fn incidents(&self) -> Result<Vec<Incident>, ProviderError> {
        self.require_key()?;

        self.incidents
            .get_or_try_load("incidents", INCIDENTS_TTL, || async {
                let response: IncidentsResponse = self.get("Incidents.svc/json/Incidents", &[]).await?;
                Ok::<_, ProviderError>(incident_lines(response))
            })
            .await
    }
}

// ============================================
// UPSTREAM SHAPES
// ============================================

#[derive(Debug, Deserialize)]
struct StationsResponse {
    #[serde(rename = "Stations", default)]
    stations: Vec<WmataStation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WmataStation {
    code: Option<String>,
    name: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(rename = "Trains", default)]
    trains: Vec<Train>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Train {
    line: Option<String>,
    destination_name: Option<String>,
    min: Option<String>,
    car: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct StopsResponse {
    #[serde(rename = "Stops", default)]
    stops: Vec<WmataStop>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WmataStop {
    #[serde(rename = "StopID")]
    stop_id: Option<Value>,
    name: Option<String>,
    distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NextBusResponse {
    stop_name: Option<String>,
    #[serde(default)]
    predictions: Vec<NextBusPrediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NextBusPrediction {
    #[serde(rename = "RouteID")]
    route_id: Option<String>,
    direction_text: Option<String>,
    trip_headsign: Option<String>,
    minutes: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct IncidentsResponse {
    #[serde(rename = "Incidents", default)]
    incidents: Vec<WmataIncident>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WmataIncident {
    incident_type: Option<String>,
    severity: Option<String>,
    description: Option<String>,
}

// ============================================
// CONVERSIONS
// ============================================

fn station_meta(response: StationsResponse) -> HashMap<String, StationMeta> {
    response
        .stations
        .into_iter()
        .filter_map(|s| {
            let code = s.code.filter(|c| !c.is_empty())?;
            Some((
                code,
                StationMeta {
                    name: s.name,
                    lat: s.lat,
                    lon: s.lon,
                },
            ))
        })
        .collect()
}

/// Station codes within the home radius, nearest first; if none are inside
/// the radius, the nearest stations overall.
fn nearest_station_codes(
    meta: &HashMap<String, StationMeta>,
    home: &HomeConfig,
    max_n: usize,
) -> Vec<String> {
    let mut all: Vec<(f64, &String)> = meta
        .iter()
        .filter_map(|(code, m)| {
            let (lat, lon) = m.lat.zip(m.lon)?;
            Some((haversine_m(home.lat, home.lon, lat, lon), code))
        })
        .collect();

    // Code as tiebreaker keeps the order stable across HashMap iteration.
    all.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    let within: Vec<&String> = all
        .iter()
        .filter(|(d, _)| *d <= home.radius_m)
        .map(|(_, code)| *code)
        .collect();

    let chosen = if within.is_empty() {
        all.iter().map(|(_, code)| *code).collect()
    } else {
        within
    };

    chosen.into_iter().take(max_n).cloned().collect()
}

fn rail_arrivals(response: PredictionResponse) -> Vec<RailArrival> {
    response
        .trains
        .into_iter()
        .map(|t| RailArrival {
            line: t.line,
            dest: t.destination_name,
            minutes: Minutes::from_board(t.min.as_deref()),
            cars: loose_int(t.car.as_ref()),
        })
        .collect()
}

fn stop_predictions(response: NextBusResponse, max_arrivals: usize) -> StopPredictions {
    let arrivals = response
        .predictions
        .into_iter()
        .take(max_arrivals)
        .map(|p| BusArrival {
            route: p.route_id,
            headsign: p.direction_text.filter(|s| !s.is_empty()).or(p.trip_headsign),
            minutes: loose_int(p.minutes.as_ref()),
        })
        .collect();

    StopPredictions {
        name: response.stop_name.filter(|s| !s.is_empty()),
        arrivals,
    }
}

/// Closest `limit` stops as `(stop_id, name)`; stops without a distance sort last
fn nearest_stops(mut stops: Vec<WmataStop>, limit: usize) -> Vec<(String, String)> {
    stops.sort_by(|a, b| {
        a.distance
            .unwrap_or(f64::MAX)
            .total_cmp(&b.distance.unwrap_or(f64::MAX))
    });

    stops
        .into_iter()
        .take(limit)
        .filter_map(|s| {
            let id = id_string(s.stop_id.as_ref())?;
            let name = s
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("Stop {}", id));
            Some((id, name))
        })
        .collect()
}

fn incident_lines(response: IncidentsResponse) -> Vec<Incident> {
    response
        .incidents
        .into_iter()
        .map(|i| Incident {
            kind: i.incident_type.unwrap_or_else(|| "rail".to_string()).to_lowercase(),
            severity: i
                .severity
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "info".to_string())
                .to_lowercase(),
            text: i
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "Service advisory".to_string()),
        })
        .collect()
}

fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(entries: &[(&str, f64, f64)]) -> HashMap<String, StationMeta> {
        entries
            .iter()
            .map(|(code, lat, lon)| {
                (
                    code.to_string(),
                    StationMeta {
                        name: Some(format!("Station {}", code)),
                        lat: Some(*lat),
                        lon: Some(*lon),
                    },
                )
            })
            .collect()
    }

    fn home(radius_m: f64) -> HomeConfig {
        HomeConfig {
            lat: 38.8983,
            lon: -77.0281,
            radius_m,
        }
    }

    #[test]
    fn test_station_meta_skips_missing_codes() {
        let response: StationsResponse = serde_json::from_str(
            r#"{"Stations": [
                {"Code": "A01", "Name": "Metro Center", "Lat": 38.8983, "Lon": -77.0281},
                {"Code": "", "Name": "Nowhere"},
                {"Name": "No Code"}
            ]}"#,
        )
        .unwrap();

        let meta = station_meta(response);
        assert_eq!(meta.len(), 1);
        assert_eq!(meta["A01"].name.as_deref(), Some("Metro Center"));
    }

    #[test]
    fn test_nearest_within_radius_sorted() {
        let stations = meta(&[
            ("FAR", 38.95, -77.10),
            ("B01", 38.8983, -77.0219),
            ("A01", 38.8983, -77.0281),
        ]);

        let codes = nearest_station_codes(&stations, &home(1200.0), 5);
        assert_eq!(codes, vec!["A01".to_string(), "B01".to_string()]);
    }

    #[test]
    fn test_nearest_falls_back_to_overall() {
        let stations = meta(&[("FAR", 38.95, -77.10), ("MID", 38.92, -77.05)]);

        let codes = nearest_station_codes(&stations, &home(100.0), 1);
        assert_eq!(codes, vec!["MID".to_string()]);
    }

    #[test]
    fn test_nearest_ignores_stations_without_location() {
        let mut stations = meta(&[("A01", 38.8983, -77.0281)]);
        stations.insert(
            "X99".into(),
            StationMeta {
                name: None,
                lat: None,
                lon: None,
            },
        );

        assert_eq!(nearest_station_codes(&stations, &home(1200.0), 5), vec!["A01".to_string()]);
    }

    #[test]
    fn test_rail_arrivals_minutes_and_cars() {
        let response: PredictionResponse = serde_json::from_str(
            r#"{"Trains": [
                {"Line": "RD", "DestinationName": "Shady Grove", "Min": "4", "Car": "8"},
                {"Line": "RD", "DestinationName": "Glenmont", "Min": "ARR", "Car": "-"},
                {"Line": "--", "DestinationName": "No Passenger", "Min": "", "Car": null}
            ]}"#,
        )
        .unwrap();

        let arrivals = rail_arrivals(response);
        assert_eq!(arrivals[0].minutes, Minutes::Count(4));
        assert_eq!(arrivals[0].cars, Some(8));
        assert_eq!(arrivals[1].minutes, Minutes::Label("ARR".into()));
        assert_eq!(arrivals[1].cars, None);
        assert_eq!(arrivals[2].minutes, Minutes::Label("--".into()));
    }

    #[test]
    fn test_stop_predictions_headsign_and_limit() {
        let response: NextBusResponse = serde_json::from_str(
            r#"{"StopName": "14th St + U St", "Predictions": [
                {"RouteID": "52", "DirectionText": "South to L'Enfant Plaza", "Minutes": 3},
                {"RouteID": "54", "DirectionText": "", "TripHeadsign": "Metro Center", "Minutes": "9"},
                {"RouteID": "52", "DirectionText": "South", "Minutes": 21}
            ]}"#,
        )
        .unwrap();

        let entry = stop_predictions(response, 2);
        assert_eq!(entry.name.as_deref(), Some("14th St + U St"));
        assert_eq!(entry.arrivals.len(), 2);
        assert_eq!(entry.arrivals[0].minutes, Some(3));
        assert_eq!(entry.arrivals[1].headsign.as_deref(), Some("Metro Center"));
        assert_eq!(entry.arrivals[1].minutes, Some(9));
    }

    #[test]
    fn test_nearest_stops_sorted_and_named() {
        let response: StopsResponse = serde_json::from_str(
            r#"{"Stops": [
                {"StopID": "1002", "Name": "Far stop", "Distance": 400.0},
                {"StopID": "1001", "Name": "", "Distance": 50.0},
                {"StopID": null, "Name": "Broken", "Distance": 10.0}
            ]}"#,
        )
        .unwrap();

        let stops = nearest_stops(response.stops, 3);
        assert_eq!(
            stops,
            vec![
                ("1001".to_string(), "Stop 1001".to_string()),
                ("1002".to_string(), "Far stop".to_string()),
            ]
        );
    }

    #[test]
    fn test_incident_defaults() {
        let response: IncidentsResponse = serde_json::from_str(
            r#"{"Incidents": [
                {"IncidentType": "Delay", "Description": "Red Line: Expect residual delays."},
                {"IncidentType": null, "Severity": "Major", "Description": ""}
            ]}"#,
        )
        .unwrap();

        let incidents = incident_lines(response);
        assert_eq!(incidents[0].kind, "delay");
        assert_eq!(incidents[0].severity, "info");
        assert_eq!(incidents[1].kind, "rail");
        assert_eq!(incidents[1].severity, "major");
        assert_eq!(incidents[1].text, "Service advisory");
    }

    #[test]
    fn test_dedup_preserving_order() {
        let ids = vec!["3".to_string(), "1".to_string(), "3".to_string(), "2".to_string()];
        assert_eq!(dedup_preserving_order(ids), vec!["3", "1", "2"]);
    }

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let client = WmataClient::new(Client::new(), &UpstreamConfig::default());
        let err = client.rail_predictions(&Config::default()).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey("WMATA_API_KEY")));
        assert!(!client.has_key());
    }
}
