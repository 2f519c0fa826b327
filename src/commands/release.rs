//! `arm release` — the transactional, compensating release flow. See
//! [`crate::orchestrator`] for the phase-by-phase mechanics; this module
//! only adapts CLI flags to [`ReleaseOptions`] and renders the outcome.

use crate::core::error::ArmResult;
use crate::model::BumpType;
use crate::orchestrator::{run_release as orchestrate, ReleaseError, ReleaseOptions};
use crate::policy::ReleasePolicy;
use crate::vcs::GitAdapter;
use serde_json::json;
use std::path::Path;

#[allow(clippy::too_many_arguments)]
pub fn run_release(repo: &Path, policy: &ReleasePolicy, opts: ReleaseOptions) -> ArmResult<()> {
  let git = GitAdapter::new(repo);

  match orchestrate(&git, policy, &opts) {
    Ok(outcome) => {
      println!(
        "{}",
        serde_json::to_string_pretty(&json!({
          "current_version": outcome.current_version.to_string(),
          "next_version": outcome.next_version.to_string(),
          "bump": outcome.bump.to_string(),
          "reason": outcome.reason,
          "tag": outcome.tag,
          "dry_run": outcome.dry_run,
          "remote_safe": outcome.remote_safe,
          "actions": outcome.actions,
          "artifacts": outcome.artifacts,
        }))?
      );
      Ok(())
    }
    Err(ReleaseError::Preflight(err)) => Err(err),
    Err(ReleaseError::Failed(failure)) => {
      eprintln!(
        "{}",
        serde_json::to_string_pretty(&json!({
          "error": failure.error.to_string(),
          "dry_run": failure.dry_run,
          "actions": failure.actions,
          "auto_rollback_actions": failure.auto_rollback_actions,
        }))?
      );
      std::process::exit(1);
    }
  }
}

/// Level string from `--level` to a forced bump, `"auto"` meaning "let
/// the commit fold decide".
pub fn level_to_bump(level: &str) -> ArmResult<Option<BumpType>> {
  if level.eq_ignore_ascii_case("auto") {
    return Ok(None);
  }
  level.parse::<BumpType>().map(Some).map_err(crate::core::error::ArmError::Config)
}
