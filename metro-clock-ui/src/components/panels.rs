//! Incidents, Bikeshare and Errors

use leptos::*;

use super::weather::lines;
use crate::state::DashboardState;
use crate::view::{BIKE_HEADER, INCIDENTS_HEADER};

#[component]
pub fn Incidents() -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");

    view! {
        <div id="incidents">
            {move || {
                state.summary.with(|s| {
                    s.as_ref().map(|v| {
                        view! {
                            <h3>{INCIDENTS_HEADER}</h3>
                            {lines(&v.incidents)}
                        }
                    })
                })
            }}
        </div>
    }
}

#[component]
pub fn Bikeshare() -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");

    view! {
        <div id="bike">
            {move || {
                state.summary.with(|s| {
                    s.as_ref().map(|v| {
                        view! {
                            <h3>{BIKE_HEADER}</h3>
                            {lines(&v.bikes)}
                        }
                    })
                })
            }}
        </div>
    }
}

/// Upstream error messages; empty when the server reported none
#[component]
pub fn Errors() -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");

    view! {
        <div id="errors">
            <div class="text">
                {move || state.summary.with(|s| s.as_ref().map(|v| lines(&v.errors)))}
            </div>
        </div>
    }
}
