//! Metro Clock Dashboard
//!
//! Wall display for DC transit, bikeshare and weather, built with Leptos
//! (WASM).
//!
//! # Architecture
//!
//! A client-side rendered (CSR) Leptos application. Every 10 seconds it
//! fetches `/v1/summary` from the server that hosts it, turns the snapshot
//! into a view model, and re-renders each region. A separate one-second
//! timer drives the clock.

use leptos::*;

mod api;
mod app;
mod components;
mod model;
mod state;
mod view;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    mount_to_body(|| view! { <app::App /> });
}
