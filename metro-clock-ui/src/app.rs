//! App Root Component
//!
//! Lays out the display regions and owns the timers for the page's lifetime.

use leptos::*;

use crate::components::{
    Bikeshare, BusRows, Clock, Errors, HourlyStrip, Incidents, RailRows, Updated, WeatherAlerts,
    WeatherNow,
};
use crate::state::{provide_dashboard_state, ScheduledTasks};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let state = provide_dashboard_state();

    let mut tasks = ScheduledTasks::start(state);
    on_cleanup(move || tasks.cancel());

    view! {
        <div class="dashboard">
            <header class="top">
                <Clock />
                <Updated />
            </header>

            <main class="boards">
                <RailRows />
                <BusRows />
            </main>

            <aside class="side">
                <section class="panel">
                    <WeatherNow />
                    <HourlyStrip />
                    <WeatherAlerts />
                </section>
                <section class="panel">
                    <Incidents />
                </section>
                <section class="panel">
                    <Bikeshare />
                </section>
            </aside>

            <footer>
                <Errors />
            </footer>
        </div>
    }
}
