//! `arm plan` — preview the next version and changelog without writing
//! anything.

use crate::changelog::render_release_section;
use crate::commits::validate_commits;
use crate::core::error::{ArmError, ArmResult};
use crate::model::{BumpType, SemVer};
use crate::policy::ReleasePolicy;
use crate::vcs::GitAdapter;
use serde_json::json;
use std::path::Path;

#[allow(clippy::too_many_arguments)]
pub fn run_plan(
  repo: &Path,
  policy: &ReleasePolicy,
  level: Option<BumpType>,
  json_out: bool,
  tag_prefix: &str,
  initial_version: Option<&str>,
  to: &str,
) -> ArmResult<()> {
  let git = GitAdapter::new(repo);

  let last_tag_version = git.last_tag(tag_prefix)?;
  let last_tag_name = last_tag_version.map(|v| format!("{tag_prefix}{v}"));
  let initial = initial_version.unwrap_or(&policy.initial_version);
  let current = match last_tag_version {
    Some(v) => v,
    None => SemVer::parse(initial).map_err(ArmError::Config)?,
  };

  let commits = git.commit_log(last_tag_name.as_deref(), to)?;
  let (parsed, errors) = validate_commits(&commits);
  if !errors.is_empty() {
    return Err(ArmError::ValidationError {
      offenders: errors.into_iter().map(|e| (e.sha, e.reason, e.subject)).collect(),
    });
  }

  let (next, decision) = crate::version::compute_next_version(current, &parsed, policy, level)?;
  let today = chrono::Local::now().date_naive();
  let preview = render_release_section(next, &parsed, today);

  if json_out {
    println!(
      "{}",
      serde_json::to_string_pretty(&json!({
        "from": last_tag_name,
        "to": to,
        "current_version": current.to_string(),
        "next_version": next.to_string(),
        "bump": decision.bump.to_string(),
        "reason": decision.reason,
        "changelog_preview": preview,
      }))?
    );
  } else {
    println!("{current} -> {next} ({}: {})", decision.bump, decision.reason);
    println!("\n{preview}");
  }
  Ok(())
}
