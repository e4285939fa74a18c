//! Lifecycle of one execution inside the resumable runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one execution inside the resumable runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimeState {
  #[default]
  NotStarted,
  Running,
  Suspended,
  Resuming,
  Terminal,
}

impl RuntimeState {
  /// Whether the runtime may move from `self` to `next`.
  ///
  /// A runtime built in a new process starts in `NotStarted` even though the
  /// execution it resumes is persisted as suspended, so `NotStarted -> Resuming`
  /// is allowed. Any state may fault into `Terminal`.
  pub fn can_transition_to(self, next: RuntimeState) -> bool {
    use RuntimeState::*;
    matches!(
      (self, next),
      (_, Terminal)
        | (NotStarted | Suspended | Terminal, Running)
        | (NotStarted | Suspended | Terminal, Resuming)
        | (Resuming, Running)
        | (Running, Suspended)
    )
  }

  /// True while a call is inside the delegate or loading context.
  pub fn is_busy(self) -> bool {
    matches!(self, RuntimeState::Running | RuntimeState::Resuming)
  }
}

impl fmt::Display for RuntimeState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      RuntimeState::NotStarted => "NOT_STARTED",
      RuntimeState::Running => "RUNNING",
      RuntimeState::Suspended => "SUSPENDED",
      RuntimeState::Resuming => "RESUMING",
      RuntimeState::Terminal => "TERMINAL",
    };
    f.write_str(s)
  }
}
