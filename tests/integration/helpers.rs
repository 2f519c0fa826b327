//! Test helpers shared by the end-to-end release scenarios.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway git repository used to exercise `arm` end to end.
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "-q", "-b", "main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    Ok(Self { _root: root, path })
  }

  pub fn write_file(&self, rel_path: &str, content: &str) -> Result<()> {
    let full = self.path.join(rel_path);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(full, content)?;
    Ok(())
  }

  /// Write a file and commit it with a conventional-commit subject.
  pub fn commit(&self, rel_path: &str, subject: &str) -> Result<String> {
    self.write_file(rel_path, subject)?;
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", subject])?;
    self.head_sha()
  }

  pub fn commit_with_body(&self, rel_path: &str, subject: &str, body: &str) -> Result<String> {
    self.write_file(rel_path, subject)?;
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", &format!("{subject}\n\n{body}")])?;
    self.head_sha()
  }

  pub fn tag(&self, name: &str) -> Result<()> {
    git(&self.path, &["tag", "-a", name, "-m", name])?;
    Ok(())
  }

  pub fn head_sha(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  pub fn is_clean(&self) -> Result<bool> {
    let output = git(&self.path, &["status", "--porcelain"])?;
    Ok(output.stdout.is_empty())
  }

  pub fn tags(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["tag"])?;
    Ok(String::from_utf8_lossy(&output.stdout).lines().map(String::from).collect())
  }
}

pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the `arm` binary built for this test run.
pub fn run_arm(cwd: &Path, args: &[&str]) -> Result<Output> {
  let arm_bin = env!("CARGO_BIN_EXE_arm");
  Command::new(arm_bin).current_dir(cwd).args(args).output().context("Failed to run arm")
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn json_stdout(output: &Output) -> serde_json::Value {
  serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON")
}
