//! Clock and Updated-At Label

use leptos::*;

use crate::state::DashboardState;

#[component]
pub fn Clock() -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");

    view! {
        <div id="clock">
            <span class="hhmm">{move || state.clock.with(|c| c.hhmm.clone())}</span>
            <span class="ss">{move || state.clock.with(|c| c.ss.clone())}</span>
        </div>
    }
}

#[component]
pub fn Updated() -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");

    view! {
        <div id="updated">
            {move || state.summary.with(|s| s.as_ref().map(|v| v.updated.clone()))}
        </div>
    }
}
