//! `arm validate` — parse a commit range against the conventional-commit
//! grammar and report offenders, without touching policy or versions.

use crate::commits::validate_commits;
use crate::core::error::{ArmError, ArmResult};
use crate::vcs::GitAdapter;
use std::path::Path;

pub fn run_validate(repo: &Path, from: Option<&str>, to: &str, tag_prefix: &str) -> ArmResult<()> {
  let git = GitAdapter::new(repo);
  let from_tag = match from {
    Some(from) => Some(from.to_string()),
    None => git.last_tag(tag_prefix)?.map(|v| format!("{tag_prefix}{v}")),
  };

  let commits = git.commit_log(from_tag.as_deref(), to)?;
  let (parsed, errors) = validate_commits(&commits);

  if !errors.is_empty() {
    return Err(ArmError::ValidationError {
      offenders: errors.into_iter().map(|e| (e.sha, e.reason, e.subject)).collect(),
    });
  }

  println!("OK ({} commits)", parsed.len());
  Ok(())
}
