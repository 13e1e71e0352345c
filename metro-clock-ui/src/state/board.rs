//! Poll Sequencing
//!
//! Polls may overlap: a slow response can land after a newer one was
//! shown. Every poll takes a ticket, and a response replaces what is shown
//! only when its ticket is newer than the last applied one.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

use crate::model::Snapshot;
use crate::view::SummaryView;

/// What happened to one completed poll
#[derive(Debug, PartialEq)]
pub enum PollOutcome {
    /// The snapshot was rendered and is now shown
    Applied,
    /// A newer response is already shown; this one was dropped
    Stale { ticket: u64, applied: u64 },
    /// Fetch or decode failed; the display is untouched
    Failed(String),
}

/// The currently shown view plus the request counter
#[derive(Debug, Default)]
pub struct Board {
    issued: u64,
    applied: u64,
    shown: Option<SummaryView>,
}

impl Board {
    /// Take the next ticket
    pub fn begin_poll(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn finish_poll<Tz: TimeZone>(
        &mut self,
        ticket: u64,
        result: Result<Snapshot, String>,
        now: &DateTime<Tz>,
    ) -> PollOutcome
    where
        Tz::Offset: Display,
    {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => return PollOutcome::Failed(e),
        };

        if ticket <= self.applied {
            return PollOutcome::Stale {
                ticket,
                applied: self.applied,
            };
        }

        self.applied = ticket;
        self.shown = Some(SummaryView::build(&snapshot, now));
        PollOutcome::Applied
    }

    pub fn shown(&self) -> Option<&SummaryView> {
        self.shown.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn snapshot(error: &str) -> Snapshot {
        serde_json::from_value(json!({"errors": [error]})).unwrap()
    }

    #[test]
    fn test_current_poll_applies() {
        let mut board = Board::default();
        let ticket = board.begin_poll();

        let outcome = board.finish_poll(ticket, Ok(snapshot("a")), &Utc::now());
        assert_eq!(outcome, PollOutcome::Applied);
        assert_eq!(board.shown().unwrap().errors, vec!["a"]);
    }

    #[test]
    fn test_failure_leaves_display_unchanged() {
        let mut board = Board::default();
        let now = Utc::now();

        let first = board.begin_poll();
        board.finish_poll(first, Ok(snapshot("a")), &now);
        let before = board.shown().cloned();

        let second = board.begin_poll();
        let outcome = board.finish_poll(second, Err("Network error".into()), &now);

        assert_eq!(outcome, PollOutcome::Failed("Network error".into()));
        assert_eq!(board.shown().cloned(), before);
    }

    #[test]
    fn test_late_response_is_discarded() {
        let mut board = Board::default();
        let now = Utc::now();

        let older = board.begin_poll();
        let newer = board.begin_poll();

        assert_eq!(
            board.finish_poll(newer, Ok(snapshot("newer")), &now),
            PollOutcome::Applied
        );
        assert_eq!(
            board.finish_poll(older, Ok(snapshot("older")), &now),
            PollOutcome::Stale {
                ticket: older,
                applied: newer
            }
        );
        assert_eq!(board.shown().unwrap().errors, vec!["newer"]);
    }

    #[test]
    fn test_older_response_applies_while_newer_is_pending() {
        let mut board = Board::default();
        let now = Utc::now();

        let older = board.begin_poll();
        let newer = board.begin_poll();

        assert_eq!(
            board.finish_poll(older, Ok(snapshot("older")), &now),
            PollOutcome::Applied
        );
        assert_eq!(board.shown().unwrap().errors, vec!["older"]);

        assert_eq!(
            board.finish_poll(newer, Ok(snapshot("newer")), &now),
            PollOutcome::Applied
        );
        assert_eq!(board.shown().unwrap().errors, vec!["newer"]);
    }

    #[test]
    fn test_slow_in_order_responses_keep_updating() {
        let mut board = Board::default();
        let now = Utc::now();

        // Each response lands only after the next poll has started
        let mut pending = board.begin_poll();
        for round in 0..30 {
            let next = board.begin_poll();
            let label = format!("round {}", round);
            assert_eq!(
                board.finish_poll(pending, Ok(snapshot(&label)), &now),
                PollOutcome::Applied
            );
            assert_eq!(board.shown().unwrap().errors, vec![label]);
            pending = next;
        }
    }

    #[test]
    fn test_failed_poll_does_not_block_older_response() {
        let mut board = Board::default();
        let now = Utc::now();

        let older = board.begin_poll();
        let newer = board.begin_poll();

        assert_eq!(
            board.finish_poll(newer, Err("Network error".into()), &now),
            PollOutcome::Failed("Network error".into())
        );
        assert_eq!(
            board.finish_poll(older, Ok(snapshot("older")), &now),
            PollOutcome::Applied
        );
    }

    #[test]
    fn test_nothing_shown_before_first_poll() {
        assert!(Board::default().shown().is_none());
    }
}
