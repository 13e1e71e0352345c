//! UI Components
//!
//! One component per display region of the dashboard.

pub mod boards;
pub mod clock;
pub mod panels;
pub mod weather;

pub use boards::{BusRows, RailRows};
pub use clock::{Clock, Updated};
pub use panels::{Bikeshare, Errors, Incidents};
pub use weather::{HourlyStrip, WeatherAlerts, WeatherNow};
