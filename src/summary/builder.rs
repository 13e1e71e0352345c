//! Summary Builder
//!
//! Runs every feed concurrently. A failing feed never fails the summary:
//! its section falls back to an empty value and one `"<feed>: <error>"`
//! line is appended to `errors`, in a fixed feed order.

use chrono::Utc;

use super::types::{BikeBoard, Summary, WeatherBoard};
use crate::config::Config;
use crate::feeds::{Feeds, ProviderError};

/// Assemble one snapshot from all feeds
pub async fn build_summary(feeds: &dyn Feeds, config: &Config) -> Summary {
    let bikes_enabled = config.bike_share.enabled;

    let (rail, bus, bike, now, hourly, alerts, incidents) = tokio::join!(
        feeds.rail(config),
        feeds.bus(config),
        async {
            if bikes_enabled {
                Some(feeds.bikes(config).await)
            } else {
                None
            }
        },
        feeds.weather_now(config),
        feeds.weather_hourly(config),
        feeds.weather_alerts(config),
        feeds.incidents(config),
    );

    let mut errors = Vec::new();

    let rail = settle("wmata_rail", rail, &mut errors);
    let bus = settle("wmata_bus", bus, &mut errors);
    let bike = match bike {
        Some(result) => settle("bikeshare", result, &mut errors),
        None => BikeBoard::default(),
    };
    let now = settle("weather_now", now, &mut errors);
    let hourly = settle("weather_hourly", hourly, &mut errors);
    let alerts = settle("weather_alerts", alerts, &mut errors);
    let incidents = settle("wmata_incidents", incidents, &mut errors);

    Summary {
        updated_at: Utc::now().timestamp(),
        rail,
        bus,
        bike,
        weather: WeatherBoard {
            now,
            hourly,
            alerts,
        },
        incidents,
        errors,
    }
}

/// Unwrap a feed result, recording the failure and substituting the fallback
fn settle<T: Default>(name: &str, result: Result<T, ProviderError>, errors: &mut Vec<String>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(feed = name, error = %e, "Feed failed, using fallback");
            errors.push(format!("{}: {}", name, e));
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{
        BikeStation, BusBoard, CurrentWeather, HourlyForecast, Incident, Minutes, RailArrival,
        RailBoard, RailStation, WeatherAlert,
    };
    use async_trait::async_trait;
    use std::collections::HashSet;

    /// Feeds that succeed with fixtures unless named in `failing`
    #[derive(Default)]
    struct StubFeeds {
        failing: HashSet<&'static str>,
    }

    impl StubFeeds {
        fn failing(names: &[&'static str]) -> Self {
            Self {
                failing: names.iter().copied().collect(),
            }
        }

        fn check(&self, name: &'static str) -> Result<(), ProviderError> {
            if self.failing.contains(name) {
                Err(ProviderError::Parse(format!("{} exploded", name)))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl Feeds for StubFeeds {
        async fn rail(&self, _config: &Config) -> Result<RailBoard, ProviderError> {
            self.check("rail")?;
            Ok(RailBoard {
                stations: vec![RailStation {
                    code: "A01".into(),
                    name: "Metro Center".into(),
                    arrivals: vec![RailArrival {
                        line: Some("RD".into()),
                        dest: Some("Glenmont".into()),
                        minutes: Minutes::Count(3),
                        cars: Some(8),
                    }],
                }],
            })
        }

        async fn bus(&self, _config: &Config) -> Result<BusBoard, ProviderError> {
            self.check("bus")?;
            Ok(BusBoard::default())
        }

        async fn incidents(&self, _config: &Config) -> Result<Vec<Incident>, ProviderError> {
            self.check("incidents")?;
            Ok(vec![Incident {
                kind: "rail".into(),
                severity: "info".into(),
                text: "Single tracking".into(),
            }])
        }

        async fn bikes(&self, _config: &Config) -> Result<BikeBoard, ProviderError> {
            self.check("bikes")?;
            Ok(BikeBoard {
                stations: vec![BikeStation {
                    id: "1".into(),
                    name: "14th & V St".into(),
                    bikes: 3,
                    docks: 12,
                    ebikes: 2,
                }],
            })
        }

        async fn weather_now(&self, _config: &Config) -> Result<CurrentWeather, ProviderError> {
            self.check("now")?;
            Ok(CurrentWeather {
                temp_f: Some(70.0),
                wind_mph: Some(4.0),
                summary: Some("Clear".into()),
                icon: Some("☀️".into()),
            })
        }

        async fn weather_hourly(&self, _config: &Config) -> Result<Vec<HourlyForecast>, ProviderError> {
            self.check("hourly")?;
            Ok(Vec::new())
        }

        async fn weather_alerts(&self, _config: &Config) -> Result<Vec<WeatherAlert>, ProviderError> {
            self.check("alerts")?;
            Ok(Vec::new())
        }

        fn wmata_configured(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_all_feeds_ok() {
        let summary = build_summary(&StubFeeds::default(), &Config::default()).await;

        assert!(summary.errors.is_empty());
        assert_eq!(summary.rail.stations[0].name, "Metro Center");
        assert_eq!(summary.bike.stations.len(), 1);
        assert_eq!(summary.weather.now.temp_f, Some(70.0));
        assert_eq!(summary.incidents.len(), 1);
        assert!(summary.updated_at > 0);
    }

    #[tokio::test]
    async fn test_failed_feeds_fall_back_and_report() {
        let feeds = StubFeeds::failing(&["rail", "now", "incidents"]);
        let summary = build_summary(&feeds, &Config::default()).await;

        assert!(summary.rail.stations.is_empty());
        assert_eq!(summary.weather.now, CurrentWeather::default());
        assert!(summary.incidents.is_empty());
        assert_eq!(
            summary.errors,
            vec![
                "wmata_rail: unexpected response: rail exploded".to_string(),
                "weather_now: unexpected response: now exploded".to_string(),
                "wmata_incidents: unexpected response: incidents exploded".to_string(),
            ]
        );
        // Unaffected feeds still render
        assert_eq!(summary.bike.stations.len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_bikeshare_is_empty_without_error() {
        let mut config = Config::default();
        config.bike_share.enabled = false;

        let feeds = StubFeeds::failing(&["bikes"]);
        let summary = build_summary(&feeds, &config).await;

        assert!(summary.bike.stations.is_empty());
        assert!(summary.errors.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_json_shape() {
        let feeds = StubFeeds::failing(&["rail", "bus", "bikes", "now", "hourly", "alerts", "incidents"]);
        let summary = build_summary(&feeds, &Config::default()).await;
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["rail"], serde_json::json!({"stations": []}));
        assert_eq!(json["bus"], serde_json::json!({"stops": []}));
        assert_eq!(json["bike"], serde_json::json!({"stations": []}));
        assert_eq!(json["weather"]["now"], serde_json::json!({}));
        assert_eq!(json["weather"]["hourly"], serde_json::json!([]));
        assert_eq!(json["incidents"], serde_json::json!([]));
        assert_eq!(summary.errors.len(), 7);
    }
}
