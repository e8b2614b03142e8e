//! Order status transition rules.
//!
//! ```text
//! pending ──► paid ──► in_progress ──► completed
//!    │          │           │
//!    └──────────┴───────────┴────────► cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal. A status occupies a course seat
//! while it is `paid` or `in_progress`; every seat-counter change in the crate
//! is derived from [`seat_delta`].

use crate::models::orders::Status;

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::Cancelled)
    }

    pub fn occupies_seat(self) -> bool {
        matches!(self, Status::Paid | Status::InProgress)
    }

    pub fn can_be_cancelled(self) -> bool {
        matches!(self, Status::Pending | Status::Paid | Status::InProgress)
    }

    pub fn can_be_deleted(self) -> bool {
        self.is_terminal()
    }

    pub fn can_transition_to(self, next: Status) -> bool {
        use Status::*;
        matches!(
            (self, next),
            (Pending, Paid)
                | (Pending, Cancelled)
                | (Paid, InProgress)
                | (Paid, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }
}

/// Change to the course seat counter caused by moving an order from `from`
/// to `to`. `None` means the order is being created.
///
/// Unchanged status always yields 0, so re-saving an order never counts twice.
pub fn seat_delta(from: Option<Status>, to: Status) -> i32 {
    let was = from.is_some_and(Status::occupies_seat);
    match (was, to.occupies_seat()) {
        (false, true) => 1,
        (true, false) => -1,
        _ => 0,
    }
}

/// Status an order should be promoted to after its progress changed, if any.
///
/// Only `paid` orders with some progress move on, to `in_progress`.
pub fn promotion(status: Status, progress: f64) -> Option<Status> {
    (status == Status::Paid && progress > 0.0).then_some(Status::InProgress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn terminal_states_have_no_way_out() {
        for from in [Status::Completed, Status::Cancelled] {
            for to in Status::iter() {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be illegal");
            }
        }
    }

    #[test]
    fn happy_path_is_legal() {
        assert!(Status::Pending.can_transition_to(Status::Paid));
        assert!(Status::Paid.can_transition_to(Status::InProgress));
        assert!(Status::InProgress.can_transition_to(Status::Completed));
    }

    #[test]
    fn completion_requires_in_progress() {
        assert!(!Status::Pending.can_transition_to(Status::Completed));
        assert!(!Status::Paid.can_transition_to(Status::Completed));
    }

    #[test]
    fn no_backwards_moves() {
        assert!(!Status::InProgress.can_transition_to(Status::Paid));
        assert!(!Status::Paid.can_transition_to(Status::Pending));
    }

    #[test]
    fn cancellable_matches_transition_table() {
        for status in Status::iter() {
            assert_eq!(
                status.can_be_cancelled(),
                status.can_transition_to(Status::Cancelled)
            );
        }
    }

    #[test]
    fn creating_an_occupying_order_takes_a_seat() {
        assert_eq!(seat_delta(None, Status::Paid), 1);
        assert_eq!(seat_delta(None, Status::InProgress), 1);
        assert_eq!(seat_delta(None, Status::Pending), 0);
    }

    #[test]
    fn seat_released_once_when_leaving_occupying_states() {
        assert_eq!(seat_delta(Some(Status::Paid), Status::Cancelled), -1);
        assert_eq!(seat_delta(Some(Status::InProgress), Status::Completed), -1);
        assert_eq!(seat_delta(Some(Status::InProgress), Status::Cancelled), -1);
    }

    #[test]
    fn moving_between_occupying_states_is_free() {
        assert_eq!(seat_delta(Some(Status::Paid), Status::InProgress), 0);
    }

    #[test]
    fn pending_never_held_a_seat() {
        assert_eq!(seat_delta(Some(Status::Pending), Status::Cancelled), 0);
        assert_eq!(seat_delta(Some(Status::Pending), Status::Paid), 1);
    }

    #[test]
    fn unchanged_status_has_no_delta() {
        for status in Status::iter() {
            assert_eq!(seat_delta(Some(status), status), 0);
        }
    }

    #[test]
    fn promotion_only_from_paid_with_progress() {
        assert_eq!(promotion(Status::Paid, 25.0), Some(Status::InProgress));
        assert_eq!(promotion(Status::Paid, 0.0), None);
        assert_eq!(promotion(Status::InProgress, 50.0), None);
        assert_eq!(promotion(Status::Pending, 50.0), None);
    }
}
