//! Scheduled Tasks
//!
//! The clock tick and the summary poll, each an owned interval timer.
//! Dropping or cancelling [`ScheduledTasks`] stops both.

use chrono::Local;
use gloo_timers::callback::Interval;
use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsValue;

use super::board::{Board, PollOutcome};
use super::DashboardState;
use crate::api;
use crate::view::ClockFace;

pub const CLOCK_PERIOD_MS: u32 = 1_000;
pub const POLL_PERIOD_MS: u32 = 10_000;

pub struct ScheduledTasks {
    clock: Option<Interval>,
    poll: Option<Interval>,
}

impl ScheduledTasks {
    /// Tick the clock and poll once right away, then start both timers
    pub fn start(state: DashboardState) -> Self {
        let board = Rc::new(RefCell::new(Board::default()));

        tick_clock(state);
        poll_once(Rc::clone(&board), state);

        let clock = Interval::new(CLOCK_PERIOD_MS, move || tick_clock(state));
        let poll = Interval::new(POLL_PERIOD_MS, move || poll_once(Rc::clone(&board), state));

        Self {
            clock: Some(clock),
            poll: Some(poll),
        }
    }

    /// Stop both timers. In-flight fetches still finish.
    pub fn cancel(&mut self) {
        if let Some(clock) = self.clock.take() {
            clock.cancel();
        }
        if let Some(poll) = self.poll.take() {
            poll.cancel();
        }
    }
}

fn tick_clock(state: DashboardState) {
    state.clock.set(ClockFace::at(&Local::now()));
}

fn poll_once(board: Rc<RefCell<Board>>, state: DashboardState) {
    spawn_local(async move {
        let ticket = board.borrow_mut().begin_poll();
        let result = api::fetch_summary().await;

        let now = Local::now();
        let outcome = board.borrow_mut().finish_poll(ticket, result, &now);

        match outcome {
            PollOutcome::Applied => {
                state.summary.set(board.borrow().shown().cloned());
                // Keep the clock in step with the re-render
                state.clock.set(ClockFace::at(&now));
            }
            PollOutcome::Stale { ticket, applied } => {
                web_sys::console::log_1(&JsValue::from_str(&format!(
                    "Dropped stale summary (ticket {}, already showing {})",
                    ticket, applied
                )));
            }
            PollOutcome::Failed(e) => {
                web_sys::console::error_1(&JsValue::from_str(&format!("update failed: {}", e)));
            }
        }
    });
}
