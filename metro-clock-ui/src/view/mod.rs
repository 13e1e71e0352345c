//! View Model
//!
//! Pure transform from a [`Snapshot`] to everything the page displays.
//! Components only lay these strings out; every fallback and ordering rule
//! lives here so the same snapshot always yields the same view.

mod icon;

pub use icon::icon_for_summary;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::fmt::Display;

use crate::model::{BikeEntry, HourlyEntry, Snapshot, WeatherNow};

/// Header above the incident lines
pub const INCIDENTS_HEADER: &str = "Service Impacts";
/// Header above the bikeshare lines
pub const BIKE_HEADER: &str = "Capital Bikeshare — bikes | docks";

/// Hour and minute plus seconds, shown separately
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClockFace {
    pub hhmm: String,
    pub ss: String,
}

impl ClockFace {
    pub fn at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: Display,
    {
        Self {
            hhmm: format_hhmm(now),
            ss: now.format("%S").to_string(),
        }
    }
}

/// Everything rendered from one snapshot
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SummaryView {
    pub updated: String,
    pub rail: Vec<BoardGroup>,
    pub bus: Vec<BoardGroup>,
    pub weather_icon: String,
    pub weather_text: String,
    pub hourly: Vec<HourCell>,
    pub alerts: Vec<String>,
    pub incidents: Vec<String>,
    pub bikes: Vec<String>,
    pub errors: Vec<String>,
}

/// A station or stop label followed by its arrivals
#[derive(Clone, Debug, PartialEq)]
pub struct BoardGroup {
    pub label: String,
    pub rows: Vec<ArrivalRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrivalRow {
    pub badge: String,
    pub badge_class: String,
    pub dest: String,
    pub minutes: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HourCell {
    pub icon: String,
    pub temp: String,
    pub pop: String,
    pub when: String,
}

impl SummaryView {
    /// Build the view for `snapshot`, formatting times in `now`'s zone
    pub fn build<Tz: TimeZone>(snapshot: &Snapshot, now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: Display,
    {
        let updated_at = number(&snapshot.updated_at)
            .filter(|secs| *secs != 0.0)
            .and_then(|secs| at_epoch(secs, now))
            .unwrap_or_else(|| now.clone());

        let rail = snapshot
            .rail
            .stations
            .iter()
            .map(|station| BoardGroup {
                label: label_for(&[&station.name, &station.code], "Station"),
                rows: station
                    .arrivals
                    .iter()
                    .map(|a| {
                        let line = text(&a.line);
                        ArrivalRow {
                            badge_class: format!("badge {}", line).trim_end().to_string(),
                            badge: line,
                            dest: text(&a.dest),
                            minutes: text(&a.minutes),
                        }
                    })
                    .collect(),
            })
            .collect();

        let bus = snapshot
            .bus
            .stops
            .iter()
            .map(|stop| BoardGroup {
                label: label_for(&[&stop.name, &stop.id], "Stop"),
                rows: stop
                    .arrivals
                    .iter()
                    .map(|a| ArrivalRow {
                        badge: text(&a.route),
                        badge_class: "badge".to_string(),
                        dest: text(&a.headsign),
                        minutes: text(&a.minutes),
                    })
                    .collect(),
            })
            .collect();

        let weather = &snapshot.weather;

        Self {
            updated: format!("Updated: {}", format_hhmm(&updated_at)),
            rail,
            bus,
            weather_icon: weather_icon(&weather.now),
            weather_text: weather_text(&weather.now),
            hourly: weather.hourly.iter().map(|h| hour_cell(h, now)).collect(),
            alerts: weather
                .alerts
                .iter()
                .map(|a| {
                    let event = truthy(&a.event).unwrap_or_else(|| "Alert".to_string());
                    format!("{}: {}", event, text(&a.headline))
                })
                .collect(),
            incidents: snapshot.incidents.iter().map(|i| text(&i.text)).collect(),
            bikes: snapshot.bike.stations.iter().map(bike_line).collect(),
            errors: snapshot.errors.iter().map(value_text).collect(),
        }
    }
}

fn weather_icon(now: &WeatherNow) -> String {
    truthy(&now.icon)
        .unwrap_or_else(|| icon_for_summary(&text(&now.summary)).to_string())
}

/// Temperature, summary and wind joined with " • ", imperial preferred
fn weather_text(now: &WeatherNow) -> String {
    let mut parts = Vec::new();

    if let Some(f) = number(&now.temp_f) {
        parts.push(format!("{}°F", js_round(f)));
    } else if let Some(c) = number(&now.temp_c) {
        parts.push(format!("{}°C", js_round(c)));
    }

    if let Some(summary) = truthy(&now.summary) {
        parts.push(summary);
    }

    if let Some(mph) = number(&now.wind_mph) {
        parts.push(format!("{} mph wind", js_round(mph)));
    } else if let Some(kph) = number(&now.wind_kph) {
        parts.push(format!("{} kph wind", js_round(kph)));
    }

    parts.join(" • ")
}

fn hour_cell<Tz: TimeZone>(entry: &HourlyEntry, now: &DateTime<Tz>) -> HourCell
where
    Tz::Offset: Display,
{
    HourCell {
        icon: text(&entry.icon),
        temp: number(&entry.temp_f)
            .map(|t| format!("{}°", js_round(t)))
            .unwrap_or_default(),
        pop: entry
            .pop
            .as_ref()
            .filter(|p| !p.is_null())
            .map(|p| format!("{}%", value_text(p)))
            .unwrap_or_default(),
        when: number(&entry.time)
            .and_then(|secs| at_epoch(secs, now))
            .map(|t| t.format("%-I %p").to_string())
            .unwrap_or_default(),
    }
}

fn bike_line(station: &BikeEntry) -> String {
    let ebikes = station
        .ebikes
        .as_ref()
        .filter(|e| !e.is_null())
        .map(|e| format!(" • ⚡ {} e-bikes", value_text(e)))
        .unwrap_or_default();

    format!(
        "{}: {} bikes • {} docks{}",
        text(&station.name),
        text(&station.bikes),
        text(&station.docks),
        ebikes
    )
}

/// First non-empty candidate, else the literal fallback
fn label_for(candidates: &[&Option<Value>], fallback: &str) -> String {
    candidates
        .iter()
        .find_map(|c| truthy(c))
        .unwrap_or_else(|| fallback.to_string())
}

/// Locale-style "09:05 PM"
fn format_hhmm<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    time.format("%I:%M %p").to_string()
}

fn at_epoch<Tz: TimeZone>(secs: f64, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis((secs * 1000.0) as i64)
        .map(|utc| utc.with_timezone(&now.timezone()))
}

/// Round half up, matching the browser's `Math.round`
pub fn js_round(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// A JSON scalar as display text; null shows as nothing
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(|f| f.to_string()).unwrap_or_default(),
        },
        other => other.to_string(),
    }
}

fn text(value: &Option<Value>) -> String {
    value.as_ref().map(value_text).unwrap_or_default()
}

/// Display text only when present and non-empty
fn truthy(value: &Option<Value>) -> Option<String> {
    Some(text(value)).filter(|s| !s.is_empty())
}

/// Numeric reading from a number or a numeric string
fn number(value: &Option<Value>) -> Option<f64> {
    match value.as_ref()? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use serde_json::json;

    const NOON_EDT: i64 = 1717257600;

    fn edt() -> FixedOffset {
        FixedOffset::west_opt(4 * 3600).unwrap()
    }

    fn now() -> DateTime<FixedOffset> {
        edt().timestamp_opt(NOON_EDT + 3 * 3600 + 5 * 60 + 9, 0).unwrap()
    }

    fn view(snapshot: serde_json::Value) -> SummaryView {
        let snapshot: Snapshot = serde_json::from_value(snapshot).unwrap();
        SummaryView::build(&snapshot, &now())
    }

    #[test]
    fn test_clock_face() {
        let face = ClockFace::at(&now());
        assert_eq!(face.hhmm, "03:05 PM");
        assert_eq!(face.ss, "09");
    }

    #[test]
    fn test_empty_snapshot_fallbacks() {
        let v = view(json!({}));

        assert_eq!(v.updated, "Updated: 03:05 PM");
        assert!(v.rail.is_empty());
        assert!(v.bus.is_empty());
        assert_eq!(v.weather_icon, "🌡️");
        assert_eq!(v.weather_text, "");
        assert!(v.hourly.is_empty());
        assert!(v.alerts.is_empty());
        assert!(v.incidents.is_empty());
        assert!(v.bikes.is_empty());
        assert!(v.errors.is_empty());
    }

    #[test]
    fn test_updated_at_from_snapshot() {
        assert_eq!(view(json!({"updated_at": NOON_EDT})).updated, "Updated: 12:00 PM");
        // Zero counts as absent
        assert_eq!(view(json!({"updated_at": 0})).updated, "Updated: 03:05 PM");
    }

    #[test]
    fn test_rail_groups() {
        let v = view(json!({"rail": {"stations": [
            {"name": "Metro Center", "code": "A01", "arrivals": [
                {"line": "RD", "dest": "Glenmont", "minutes": 3},
                {"line": "RD", "minutes": "BRD"}
            ]},
            {"code": "C01", "arrivals": []},
            {"name": "", "arrivals": [{"line": "BL", "dest": "Largo", "minutes": null}]}
        ]}}));

        assert_eq!(v.rail[0].label, "Metro Center");
        assert_eq!(
            v.rail[0].rows[0],
            ArrivalRow {
                badge: "RD".into(),
                badge_class: "badge RD".into(),
                dest: "Glenmont".into(),
                minutes: "3".into(),
            }
        );
        assert_eq!(v.rail[0].rows[1].dest, "");
        assert_eq!(v.rail[0].rows[1].minutes, "BRD");
        assert_eq!(v.rail[1].label, "C01");
        assert_eq!(v.rail[2].label, "Station");
        assert_eq!(v.rail[2].rows[0].minutes, "");
    }

    #[test]
    fn test_bus_groups() {
        let v = view(json!({"bus": {"stops": [
            {"id": "1001195", "arrivals": [{"route": "S2", "headsign": "Silver Spring", "minutes": 7}]},
            {"arrivals": [{"route": 70}]}
        ]}}));

        assert_eq!(v.bus[0].label, "1001195");
        assert_eq!(v.bus[0].rows[0].badge, "S2");
        assert_eq!(v.bus[0].rows[0].badge_class, "badge");
        assert_eq!(v.bus[0].rows[0].dest, "Silver Spring");
        assert_eq!(v.bus[1].label, "Stop");
        assert_eq!(v.bus[1].rows[0].badge, "70");
        assert_eq!(v.bus[1].rows[0].dest, "");
    }

    #[test]
    fn test_weather_prefers_fahrenheit_and_mph() {
        let v = view(json!({"weather": {"now": {
            "temp_f": 70, "temp_c": 21, "summary": "Partly cloudy", "wind_mph": 4.5, "wind_kph": 7
        }}}));

        assert_eq!(v.weather_text, "70°F • Partly cloudy • 5 mph wind");
        assert_eq!(v.weather_icon, "☁️");
    }

    #[test]
    fn test_weather_metric_fallback_and_explicit_icon() {
        let v = view(json!({"weather": {"now": {"temp_c": -0.5, "wind_kph": 12.4, "icon": "🌙"}}}));

        assert_eq!(v.weather_text, "0°C • 12 kph wind");
        assert_eq!(v.weather_icon, "🌙");
    }

    #[test]
    fn test_hourly_cells() {
        let v = view(json!({"weather": {"hourly": [
            {"time": NOON_EDT, "icon": "☀️", "temp_f": 74.4, "pop": 20},
            {"time": NOON_EDT + 3600, "temp_f": 73.5, "pop": null},
            {"time": NOON_EDT + 7200}
        ]}}));

        assert_eq!(
            v.hourly[0],
            HourCell {
                icon: "☀️".into(),
                temp: "74°".into(),
                pop: "20%".into(),
                when: "12 PM".into(),
            }
        );
        assert_eq!(v.hourly[1].icon, "");
        assert_eq!(v.hourly[1].temp, "74°");
        assert_eq!(v.hourly[1].pop, "");
        assert_eq!(v.hourly[1].when, "1 PM");
        assert_eq!(v.hourly[2].temp, "");
    }

    #[test]
    fn test_alerts_and_incidents() {
        let v = view(json!({
            "weather": {"alerts": [
                {"event": "Heat Advisory", "headline": "Heat index up to 105"},
                {"headline": "Check local news"},
                {}
            ]},
            "incidents": [{"text": "Red Line: single tracking"}, {}]
        }));

        assert_eq!(
            v.alerts,
            vec![
                "Heat Advisory: Heat index up to 105",
                "Alert: Check local news",
                "Alert: ",
            ]
        );
        assert_eq!(v.incidents, vec!["Red Line: single tracking", ""]);
    }

    #[test]
    fn test_bike_lines() {
        let v = view(json!({"bike": {"stations": [
            {"name": "14th & V St", "bikes": 3, "docks": 12, "ebikes": 2},
            {"name": "15th & P St", "bikes": 0, "docks": 20, "ebikes": null},
            {"name": "Dupont", "bikes": 1, "docks": 1}
        ]}}));

        assert_eq!(v.bikes[0], "14th & V St: 3 bikes • 12 docks • ⚡ 2 e-bikes");
        assert_eq!(v.bikes[1], "15th & P St: 0 bikes • 20 docks");
        assert_eq!(v.bikes[2], "Dupont: 1 bikes • 1 docks");
    }

    #[test]
    fn test_errors_verbatim_or_cleared() {
        assert_eq!(view(json!({"errors": ["feed down"]})).errors, vec!["feed down"]);
        assert!(view(json!({"errors": []})).errors.is_empty());
    }

    #[test]
    fn test_markup_is_plain_text() {
        let v = view(json!({"incidents": [{"text": "<b>Delays</b>"}]}));
        assert_eq!(v.incidents[0], "<b>Delays</b>");
    }

    #[test]
    fn test_build_is_deterministic() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "updated_at": NOON_EDT,
            "rail": {"stations": [{"name": "Metro Center", "arrivals": [{"line": "RD", "minutes": 3}]}]},
            "weather": {"now": {"temp_f": 70, "summary": "Clear"}},
            "errors": ["wmata_bus: boom"]
        }))
        .unwrap();

        assert_eq!(
            SummaryView::build(&snapshot, &now()),
            SummaryView::build(&snapshot, &now())
        );
    }

    #[test]
    fn test_js_round() {
        assert_eq!(js_round(2.5), 3);
        assert_eq!(js_round(-2.5), -2);
        assert_eq!(js_round(-0.4), 0);
        assert_eq!(js_round(71.49), 71);
    }
}
