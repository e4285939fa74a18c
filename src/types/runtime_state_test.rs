//! Tests for `RuntimeState`.

use super::RuntimeState::{self, *};

#[test]
fn fresh_run_path() {
  assert!(NotStarted.can_transition_to(Running));
  assert!(Running.can_transition_to(Terminal));
  assert!(Running.can_transition_to(Suspended));
}

#[test]
fn resume_path() {
  assert!(Suspended.can_transition_to(Resuming));
  assert!(NotStarted.can_transition_to(Resuming));
  assert!(Resuming.can_transition_to(Running));
  assert!(Resuming.can_transition_to(Terminal));
}

#[test]
fn every_state_may_fault() {
  for s in [NotStarted, Running, Suspended, Resuming, Terminal] {
    assert!(s.can_transition_to(Terminal), "{s} -> TERMINAL");
  }
}

#[test]
fn illegal_transitions() {
  assert!(!NotStarted.can_transition_to(Suspended));
  assert!(!Running.can_transition_to(Resuming));
  assert!(!Running.can_transition_to(Running));
  assert!(!Suspended.can_transition_to(Suspended));
  assert!(!Resuming.can_transition_to(Suspended));
}

#[test]
fn busy_states() {
  assert!(Running.is_busy());
  assert!(Resuming.is_busy());
  assert!(!Suspended.is_busy());
  assert!(!RuntimeState::default().is_busy());
}

#[test]
fn display_names() {
  assert_eq!(NotStarted.to_string(), "NOT_STARTED");
  assert_eq!(Terminal.to_string(), "TERMINAL");
}
