//! Dashboard Summary
//!
//! The snapshot type served at `/v1/summary` and the builder that assembles
//! it from the upstream feeds.

mod builder;
mod types;

pub use builder::build_summary;
pub use types::{
    BikeBoard, BikeStation, BusArrival, BusBoard, BusStop, CurrentWeather, HourlyForecast,
    Incident, Minutes, RailArrival, RailBoard, RailStation, Summary, WeatherAlert, WeatherBoard,
};
