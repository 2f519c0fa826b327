//! Git adapter (C7): a narrow wrapper over subprocess `git`, isolated from
//! the caller's environment.
//!
//! Grounded on the teacher's `SystemGit::git_cmd()` — env-cleared,
//! PATH/HOME whitelisted, safe config overrides forced — generalized from
//! a read-mostly plumbing wrapper to the handful of read/write operations
//! the orchestrator needs (log, tag, commit, push).

use crate::core::error::{ArmError, ArmResult};
use crate::model::{Commit, SemVer};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

pub struct GitAdapter {
  repo_dir: PathBuf,
}

impl GitAdapter {
  pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
    Self { repo_dir: repo_dir.into() }
  }

  pub fn repo_dir(&self) -> &Path {
    &self.repo_dir
  }

  /// A `git` command rooted at `repo_dir`, environment-isolated, with the
  /// same safe overrides the teacher's adapter forces regardless of the
  /// caller's global config.
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(&self.repo_dir);
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }
    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false");
    cmd
  }

  fn run(&self, args: &[&str]) -> ArmResult<Output> {
    tracing::debug!(repo = %self.repo_dir.display(), argv = %args.join(" "), "git");
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .map_err(|e| ArmError::adapter(format!("git {}", args.join(" ")), e.to_string()))?;
    if !output.status.success() {
      return Err(ArmError::adapter(
        format!("git {}", args.join(" ")),
        String::from_utf8_lossy(&output.stderr).trim().to_string(),
      ));
    }
    Ok(output)
  }

  fn run_stdout(&self, args: &[&str]) -> ArmResult<String> {
    Ok(String::from_utf8_lossy(&self.run(args)?.stdout).trim().to_string())
  }

  /// Any tracked-file modification, staged or not, counts as dirty.
  pub fn is_dirty(&self) -> ArmResult<bool> {
    let status = self.run_stdout(&["status", "--porcelain"])?;
    Ok(!status.is_empty())
  }

  pub fn current_branch(&self) -> ArmResult<String> {
    self.run_stdout(&["rev-parse", "--abbrev-ref", "HEAD"])
  }

  /// The newest tag reachable from HEAD whose name matches `prefix*`, with
  /// the prefix stripped and the remainder parsed as a [`SemVer`].
  ///
  /// Uses `git describe --tags --abbrev=0 --match` rather than
  /// `for-each-ref`, since `describe` walks HEAD's ancestry: a
  /// prefix-matching tag that exists on some other, unmerged branch must
  /// not be picked up as "current". `describe` exits non-zero when no
  /// reachable tag matches, which is "no release yet", not an adapter
  /// failure. A matching tag whose remainder fails to parse as a `SemVer`
  /// is a real error (the repo's tagging scheme doesn't match its own
  /// `tag_prefix`), not silently skipped.
  pub fn last_tag(&self, prefix: &str) -> ArmResult<Option<SemVer>> {
    let match_glob = format!("{prefix}*");
    tracing::debug!(repo = %self.repo_dir.display(), argv = %format!("git describe --tags --abbrev=0 --match {match_glob}"), "git");
    let output = self
      .git_cmd()
      .args(["describe", "--tags", "--abbrev=0", "--match", &match_glob])
      .output()
      .map_err(|e| ArmError::adapter("git describe --tags --abbrev=0 --match", e.to_string()))?;

    if !output.status.success() {
      return Ok(None);
    }

    let tag = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if tag.is_empty() {
      return Ok(None);
    }

    let rest = tag.strip_prefix(prefix).unwrap_or(&tag);
    let version = SemVer::parse(rest).map_err(|e| ArmError::adapter(format!("git describe (tag {tag})"), e))?;
    Ok(Some(version))
  }

  /// Commits strictly after `from` (exclusive) up to and including `to`.
  /// `from` of `None` means "from the repository root".
  ///
  /// Subject and body are recovered exactly, including embedded blank
  /// lines, via a field/record-separator format rather than a line-based
  /// one.
  pub fn commit_log(&self, from: Option<&str>, to: &str) -> ArmResult<Vec<Commit>> {
    let range = match from {
      Some(from) => format!("{from}..{to}"),
      None => to.to_string(),
    };
    let format = format!("--pretty=format:%H{FIELD_SEP}%s{FIELD_SEP}%b{RECORD_SEP}");
    let raw = self.run_stdout(&["log", &format, &range])?;

    let mut commits = Vec::new();
    for record in raw.split(RECORD_SEP) {
      let record = record.trim_start_matches('\n');
      if record.is_empty() {
        continue;
      }
      let mut fields = record.splitn(3, FIELD_SEP);
      let sha = fields.next().unwrap_or_default().to_string();
      let subject = fields.next().unwrap_or_default().to_string();
      let body = fields.next().unwrap_or_default().trim_end_matches('\n').to_string();
      if sha.is_empty() {
        continue;
      }
      commits.push(Commit { sha, subject, body });
    }
    Ok(commits)
  }

  pub fn diff_stat(&self, from: Option<&str>, to: &str) -> ArmResult<String> {
    let range = match from {
      Some(from) => format!("{from}..{to}"),
      None => to.to_string(),
    };
    self.run_stdout(&["diff", "--stat", &range])
  }

  pub fn commit_file(&self, path: &Path, message: &str, sign: bool) -> ArmResult<()> {
    self.run(&["add", "--", &path.to_string_lossy()])?;
    let mut args = vec!["commit", "-m", message];
    if sign {
      args.push("-S");
    }
    self.run(&args)?;
    Ok(())
  }

  pub fn create_tag(&self, name: &str, message: &str) -> ArmResult<()> {
    self.run(&["tag", "-a", name, "-m", message])?;
    Ok(())
  }

  pub fn delete_tag(&self, name: &str) -> ArmResult<()> {
    self.run(&["tag", "-d", name])?;
    Ok(())
  }

  /// Revert the commit at `sha` with a fresh reverting commit, used to
  /// compensate a changelog/version commit during rollback without
  /// rewriting published history.
  pub fn revert_commit(&self, sha: &str) -> ArmResult<()> {
    self.run(&["revert", "--no-edit", sha])?;
    Ok(())
  }

  /// Used only by `rollback --hard`; rewrites history rather than adding
  /// a revert commit, so it is opt-in at the CLI layer.
  pub fn git_reset_hard(&self, rev: &str) -> ArmResult<()> {
    self.run(&["reset", "--hard", rev])?;
    Ok(())
  }

  pub fn push_branch(&self, remote: &str, branch: &str) -> ArmResult<()> {
    self.run(&["push", remote, branch])?;
    Ok(())
  }

  pub fn push_tag(&self, remote: &str, tag: &str) -> ArmResult<()> {
    self.run(&["push", remote, tag])?;
    Ok(())
  }

  pub fn head_sha(&self) -> ArmResult<String> {
    self.run_stdout(&["rev-parse", "HEAD"])
  }
}
