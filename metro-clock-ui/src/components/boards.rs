//! Rail and Bus Arrival Boards
//!
//! A group label per station or stop, then one row per arrival.

use leptos::*;

use crate::state::DashboardState;
use crate::view::BoardGroup;

#[component]
pub fn RailRows() -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");

    view! {
        <section class="panel">
            <h2>"Metro Rail"</h2>
            <div id="rail-rows">
                {move || state.summary.with(|s| s.as_ref().map(|v| board_rows(&v.rail)))}
            </div>
        </section>
    }
}

#[component]
pub fn BusRows() -> impl IntoView {
    let state = use_context::<DashboardState>().expect("DashboardState not found");

    view! {
        <section class="panel">
            <h2>"Metrobus"</h2>
            <div id="bus-rows">
                {move || state.summary.with(|s| s.as_ref().map(|v| board_rows(&v.bus)))}
            </div>
        </section>
    }
}

fn board_rows(groups: &[BoardGroup]) -> View {
    groups
        .iter()
        .map(|group| {
            view! {
                <div class="group-label">{group.label.clone()}</div>
                {group
                    .rows
                    .iter()
                    .map(|row| {
                        view! {
                            <div class="row">
                                <span class={row.badge_class.clone()}>{row.badge.clone()}</span>
                                <div class="dest">{row.dest.clone()}</div>
                                <div class="minutes">{row.minutes.clone()}</div>
                            </div>
                        }
                    })
                    .collect_view()}
            }
        })
        .collect_view()
}
