//! Weather Components
//!
//! Current conditions, the hourly strip and active alerts.

use leptos::*;

use crate::state::DashboardState;

/// Current conditions
#[component]
pub fn WeatherNow() -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");

    view! {
        <div id="weather">
            <span class="icon">
                {move || state.summary.with(|s| s.as_ref().map(|v| v.weather_icon.clone()))}
            </span>
            <span class="text">
                {move || state.summary.with(|s| s.as_ref().map(|v| v.weather_text.clone()))}
            </span>
        </div>
    }
}

/// One cell per forecast hour, in the order received
#[component]
pub fn HourlyStrip() -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");

    view! {
        <div id="hourly">
            {move || {
                state.summary.with(|s| {
                    s.as_ref().map(|v| {
                        v.hourly
                            .iter()
                            .map(|h| {
                                view! {
                                    <div class="hour">
                                        <div class="hicon">{h.icon.clone()}</div>
                                        <div class="htemp">{h.temp.clone()}</div>
                                        <div class="hpop">{h.pop.clone()}</div>
                                        <div class="hwhen">{h.when.clone()}</div>
                                    </div>
                                }
                            })
                            .collect_view()
                    })
                })
            }}
        </div>
    }
}

#[component]
pub fn WeatherAlerts() -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");

    view! {
        <div id="wx-alerts">
            <div class="text">
                {move || state.summary.with(|s| s.as_ref().map(|v| lines(&v.alerts)))}
            </div>
        </div>
    }
}

/// One `<div>` per line, as plain text
pub fn lines(items: &[String]) -> View {
    items
        .iter()
        .map(|line| view! { <div>{line.clone()}</div> })
        .collect_view()
}
