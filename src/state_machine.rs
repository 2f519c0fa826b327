//! Release state machine (C9): the orchestrator advances through these
//! states strictly one step at a time, journaling every transition.

use crate::core::error::{ArmError, ArmResult};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReleaseState {
  New,
  DiffCollected,
  CommitsValidated,
  VersionBumped,
  ChangelogWritten,
  Packaged,
  Completed,
}

impl ReleaseState {
  fn next(self) -> Option<ReleaseState> {
    use ReleaseState::*;
    match self {
      New => Some(DiffCollected),
      DiffCollected => Some(CommitsValidated),
      CommitsValidated => Some(VersionBumped),
      VersionBumped => Some(ChangelogWritten),
      ChangelogWritten => Some(Packaged),
      Packaged => Some(Completed),
      Completed => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    use ReleaseState::*;
    match self {
      New => "NEW",
      DiffCollected => "DIFF_COLLECTED",
      CommitsValidated => "COMMITS_VALIDATED",
      VersionBumped => "VERSION_BUMPED",
      ChangelogWritten => "CHANGELOG_WRITTEN",
      Packaged => "PACKAGED",
      Completed => "COMPLETED",
    }
  }
}

#[derive(Debug, Clone)]
pub struct ReleaseEvent {
  pub from: ReleaseState,
  pub to: ReleaseState,
  pub at: DateTime<Utc>,
  pub reason: String,
  pub artifacts: Vec<String>,
}

/// Carries the machine's current state plus its full event journal for one
/// release attempt. Re-started fresh per attempt; never reused across
/// invocations.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
  pub state: ReleaseState,
  pub events: Vec<ReleaseEvent>,
}

impl Default for ReleaseContext {
  fn default() -> Self {
    Self {
      state: ReleaseState::New,
      events: Vec::new(),
    }
  }
}

impl ReleaseContext {
  pub fn new() -> Self {
    Self::default()
  }

  /// Advance exactly one step forward, journaling the transition. Any
  /// other target — skipping ahead, stepping sideways, or reversing —
  /// is a programmer error surfaced as [`ArmError::StateMachineError`].
  pub fn advance(&mut self, to: ReleaseState, reason: impl Into<String>, artifacts: Vec<String>) -> ArmResult<()> {
    let expected = self.state.next().ok_or_else(|| {
      ArmError::StateMachineError(format!("no transitions remain from {}", self.state.as_str()))
    })?;
    if to != expected {
      return Err(ArmError::StateMachineError(format!(
        "illegal transition {} -> {} (expected {})",
        self.state.as_str(),
        to.as_str(),
        expected.as_str()
      )));
    }

    self.events.push(ReleaseEvent {
      from: self.state,
      to,
      at: Utc::now(),
      reason: reason.into(),
      artifacts,
    });
    self.state = to;
    Ok(())
  }
}
