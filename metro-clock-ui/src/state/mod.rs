//! State Management
//!
//! Reactive signals for the page, the poll sequencing behind them, and the
//! timers that drive both.

pub mod board;
pub mod schedule;

pub use schedule::ScheduledTasks;

use leptos::*;

use crate::view::{ClockFace, SummaryView};

/// Signals every region reads from
#[derive(Clone, Copy)]
pub struct DashboardState {
    /// Last applied view; `None` until the first successful poll
    pub summary: RwSignal<Option<SummaryView>>,
    pub clock: RwSignal<ClockFace>,
}

/// Create the dashboard signals and provide them via context
pub fn provide_dashboard_state() -> DashboardState {
    let state = DashboardState {
        summary: create_rw_signal(None),
        clock: create_rw_signal(ClockFace::default()),
    };
    provide_context(state);
    state
}
