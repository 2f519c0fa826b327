//! Error types for arm with contextual messages and exit codes
//!
//! One enum covers every failure kind the orchestrator can produce. Each
//! variant maps to exactly one of the three exit codes the CLI surface
//! promises (0 is never constructed here — it belongs to `Ok`).

use std::fmt;
use std::io;

/// Exit codes for arm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// Success
  Success = 0,
  /// Policy violation or side-effect failure (branch, dirty tree, remote-safe, compensation)
  Failure = 1,
  /// Validation or version-decision failure (bad commits, unknown type under `fail`)
  Rejected = 2,
}

impl ExitCode {
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for arm
#[derive(Debug)]
pub enum ArmError {
  /// Branch not allowed, dirty tree, push while remote-safe
  PolicyViolation(String),

  /// Non-conventional commits found in range
  ValidationError { offenders: Vec<(String, String, String)> },

  /// Unknown commit type encountered under `unknown_type_behavior = "fail"`
  DecisionError(String),

  /// Underlying git invocation returned non-zero
  AdapterError { command: String, stderr: String },

  /// Illegal state transition (programmer error; never expected in production)
  StateMachineError(String),

  /// A compensation (or rollback) step itself failed; reported, not propagated further
  RollbackPartialFailure(Vec<String>),

  /// Config file present but fundamentally unreadable as bytes, or unwritable
  Config(String),

  /// I/O error
  Io(io::Error),

  /// Generic error with context, for the few call sites that don't need a dedicated variant
  Other(anyhow::Error),
}

impl ArmError {
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ArmError::PolicyViolation(_) => ExitCode::Failure,
      ArmError::ValidationError { .. } => ExitCode::Rejected,
      ArmError::DecisionError(_) => ExitCode::Rejected,
      ArmError::AdapterError { .. } => ExitCode::Failure,
      ArmError::StateMachineError(_) => ExitCode::Failure,
      ArmError::RollbackPartialFailure(_) => ExitCode::Failure,
      ArmError::Config(_) => ExitCode::Failure,
      ArmError::Io(_) => ExitCode::Failure,
      ArmError::Other(_) => ExitCode::Failure,
    }
  }

  pub fn message(msg: impl Into<String>) -> Self {
    ArmError::Other(anyhow::anyhow!(msg.into()))
  }

  pub fn adapter(command: impl Into<String>, stderr: impl Into<String>) -> Self {
    ArmError::AdapterError {
      command: command.into(),
      stderr: stderr.into(),
    }
  }

  /// Short remediation line, shown under the primary message where one exists.
  pub fn help(&self) -> Option<String> {
    match self {
      ArmError::PolicyViolation(m) if m.starts_with("Branch") => {
        Some("Set [policy] allowed_branches in arm.toml or release from an allowed branch.".to_string())
      }
      ArmError::PolicyViolation(m) if m.contains("Remote-safe") => {
        Some("Pass --no-remote-safe explicitly with --push to allow pushing.".to_string())
      }
      ArmError::PolicyViolation(m) if m.contains("Dirty") => {
        Some("Commit or stash changes, or pass --allow-dirty.".to_string())
      }
      ArmError::Config(_) => Some("Check arm.toml syntax; a missing file falls back to defaults.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for ArmError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ArmError::PolicyViolation(m) => write!(f, "{}", m),
      ArmError::ValidationError { offenders } => {
        for (sha, reason, subject) in offenders {
          writeln!(f, "{} {}: {}", &sha[..sha.len().min(8)], reason, subject)?;
        }
        Ok(())
      }
      ArmError::DecisionError(m) => write!(f, "{}", m),
      ArmError::AdapterError { command, stderr } => write!(f, "command failed: {}\n{}", command, stderr),
      ArmError::StateMachineError(m) => write!(f, "illegal state transition: {}", m),
      ArmError::RollbackPartialFailure(actions) => write!(f, "rollback partially failed: {}", actions.join("; ")),
      ArmError::Config(m) => write!(f, "{}", m),
      ArmError::Io(e) => write!(f, "I/O error: {}", e),
      ArmError::Other(e) => write!(f, "{}", e),
    }
  }
}

impl std::error::Error for ArmError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ArmError::Io(e) => Some(e),
      ArmError::Other(e) => e.source(),
      _ => None,
    }
  }
}

impl From<io::Error> for ArmError {
  fn from(err: io::Error) -> Self {
    ArmError::Io(err)
  }
}

impl From<anyhow::Error> for ArmError {
  fn from(err: anyhow::Error) -> Self {
    ArmError::Other(err)
  }
}

impl From<serde_json::Error> for ArmError {
  fn from(err: serde_json::Error) -> Self {
    ArmError::Other(anyhow::Error::from(err))
  }
}

pub type ArmResult<T> = Result<T, ArmError>;

/// Mirrors anyhow's `Context` for the handful of call sites that want a
/// one-line `.context("...")` without constructing a dedicated variant.
pub trait ResultExt<T> {
  fn context(self, msg: impl Into<String>) -> ArmResult<T>;
  fn with_context<F: FnOnce() -> String>(self, f: F) -> ArmResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn context(self, msg: impl Into<String>) -> ArmResult<T> {
    self.map_err(|e| ArmError::Other(anyhow::Error::new(e).context(msg.into())))
  }

  fn with_context<F: FnOnce() -> String>(self, f: F) -> ArmResult<T> {
    self.map_err(|e| ArmError::Other(anyhow::Error::new(e).context(f())))
  }
}

/// Print an error to stderr. Every kind surfaces as structured JSON for
/// machine consumption, except `ValidationError`, whose `Display` is
/// already the spec's one-line-per-offender text format.
pub fn print_error(err: &ArmError) {
  if let ArmError::ValidationError { .. } = err {
    eprint!("{}", err);
    return;
  }
  let payload = serde_json::json!({
    "error": err.to_string(),
    "help": err.help(),
  });
  eprintln!("{}", serde_json::to_string_pretty(&payload).unwrap_or_else(|_| err.to_string()));
}
