//! `arm status` — a best-effort snapshot of repo state. Never fails on a
//! non-repo; missing fields simply come back null/false.

use crate::core::error::ArmResult;
use crate::vcs::GitAdapter;
use serde_json::json;
use std::path::Path;

pub fn run_status(repo: &Path, tag_prefix: &str) -> ArmResult<()> {
  let git = GitAdapter::new(repo);

  let dirty = git.is_dirty().unwrap_or(false);
  let branch = git.current_branch().ok();
  let last_tag = git.last_tag(tag_prefix).ok().flatten().map(|v| format!("{tag_prefix}{v}"));

  println!(
    "{}",
    serde_json::to_string_pretty(&json!({
      "repo": repo.display().to_string(),
      "dirty": dirty,
      "last_tag": last_tag,
      "branch": branch,
    }))?
  );
  Ok(())
}
