//! Transaction log (C8): the persisted record that makes `rollback`
//! possible after the process that ran `release` has exited.

use crate::core::error::{ArmError, ArmResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseTransaction {
  pub created_at_utc: String,
  pub repo_dir: PathBuf,
  pub version: String,
  pub tag: Option<String>,
  pub changelog_path: Option<PathBuf>,
  pub changelog_commit_sha: Option<String>,
  pub changelog_existed_before: bool,
  pub changelog_before: Option<String>,
  pub artifacts: Vec<PathBuf>,
}

fn transaction_path(repo_dir: &Path) -> PathBuf {
  repo_dir.join(".arm").join("last_release.json")
}

/// Create `<repo>/.arm` if missing and write `last_release.json`
/// (two-space indent, trailing newline).
pub fn write_last_release(repo_dir: &Path, tx: &ReleaseTransaction) -> ArmResult<()> {
  let arm_dir = repo_dir.join(".arm");
  fs::create_dir_all(&arm_dir).with_context(|| format!("failed to create {}", arm_dir.display()))?;

  let mut body = serde_json::to_string_pretty(tx)?;
  body.push('\n');
  let path = transaction_path(repo_dir);
  fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;
  Ok(())
}

/// Read back a previously-written transaction. No schema migration: a
/// file that fails to parse is a hard error, not a best-effort skip.
pub fn read_last_release(repo_dir: &Path) -> ArmResult<ReleaseTransaction> {
  let path = transaction_path(repo_dir);
  let body = fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
  serde_json::from_str(&body).map_err(|e| ArmError::Config(format!("malformed transaction log at {}: {e}", path.display())))
}

/// Best-effort delete; a missing file is not an error.
pub fn delete_last_release(repo_dir: &Path) -> ArmResult<()> {
  let path = transaction_path(repo_dir);
  match fs::remove_file(&path) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e.into()),
  }
}

pub fn exists(repo_dir: &Path) -> bool {
  transaction_path(repo_dir).exists()
}
