//! `arm rollback` — undo the last recorded release using its transaction
//! log. Never reverses a push; that limitation is the operator's to know.

use crate::core::error::ArmResult;
use crate::orchestrator::{run_rollback as orchestrate, RollbackOptions};
use crate::vcs::GitAdapter;
use serde_json::json;
use std::path::Path;

pub fn run_rollback(repo: &Path, dry_run: bool, hard: bool, keep_artifacts: bool) -> ArmResult<()> {
  let git = GitAdapter::new(repo);
  let outcome = orchestrate(
    &git,
    &RollbackOptions {
      dry_run,
      hard,
      keep_artifacts,
    },
  )?;

  println!(
    "{}",
    serde_json::to_string_pretty(&json!({
      "dry_run": outcome.dry_run,
      "actions": outcome.actions,
    }))?
  );
  Ok(())
}
