//! Packager (C6): a deterministic zip snapshot of the working tree.
//!
//! Grounded in the directory-walk-plus-archive shape common across the
//! corpus's release tooling (e.g. `jwodder-rsrepo`, which also reaches for
//! `zip` directly rather than shelling out to a system `zip` binary).

use crate::core::error::{ArmError, ArmResult, ResultExt};
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;

const DEFAULT_EXCLUDES: [&str; 6] = [".git/*", ".arm/*", "dist/*", ".venv/*", "__pycache__/*", "*.pyc"];

pub struct PackageSpec<'a> {
  pub project_name: &'a str,
  pub version: &'a str,
  pub repo_dir: &'a Path,
  pub dist_dir: &'a Path,
  /// Override the default exclude globs. Empty means "use defaults".
  pub excludes: Vec<String>,
}

impl<'a> PackageSpec<'a> {
  pub fn new(project_name: &'a str, version: &'a str, repo_dir: &'a Path, dist_dir: &'a Path) -> Self {
    Self {
      project_name,
      version,
      repo_dir,
      dist_dir,
      excludes: Vec::new(),
    }
  }

  fn exclude_patterns(&self) -> Vec<String> {
    if self.excludes.is_empty() {
      DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect()
    } else {
      self.excludes.clone()
    }
  }
}

/// A path matches an exclude glob either in its bare form or with a
/// trailing slash appended, so that both `".git/*"`-style and directory
/// -name-only exclude entries prune the same subtree.
fn matches_exclude(rel_posix: &str, patterns: &[String]) -> bool {
  patterns.iter().filter_map(|p| glob::Pattern::new(p).ok()).any(|pat| {
    pat.matches(rel_posix) || pat.matches(&format!("{rel_posix}/"))
  })
}

fn to_posix(path: &Path) -> String {
  path.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/")
}

/// Write `<dist_dir>/<project_name>-<version>.zip`, replacing any existing
/// archive of the same name. Returns the archive path.
pub fn build_zip(spec: &PackageSpec) -> ArmResult<PathBuf> {
  let patterns = spec.exclude_patterns();
  fs::create_dir_all(spec.dist_dir).with_context(|| format!("failed to create {}", spec.dist_dir.display()))?;

  let zip_path = spec.dist_dir.join(format!("{}-{}.zip", spec.project_name, spec.version));
  if zip_path.exists() {
    fs::remove_file(&zip_path).with_context(|| format!("failed to remove existing {}", zip_path.display()))?;
  }

  let file = File::create(&zip_path).with_context(|| format!("failed to create {}", zip_path.display()))?;
  let mut writer = zip::ZipWriter::new(file);
  let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

  let walker = WalkDir::new(spec.repo_dir).into_iter().filter_entry(|entry| {
    if entry.depth() == 0 {
      return true;
    }
    let rel = entry.path().strip_prefix(spec.repo_dir).unwrap_or(entry.path());
    let rel_posix = to_posix(rel);
    if entry.file_type().is_dir() {
      !matches_exclude(&rel_posix, &patterns)
    } else {
      true
    }
  });

  for entry in walker {
    let entry = entry.context("failed to walk repository tree")?;
    if entry.depth() == 0 || entry.file_type().is_dir() {
      continue;
    }

    let rel = entry.path().strip_prefix(spec.repo_dir).unwrap_or(entry.path());
    let rel_posix = to_posix(rel);
    if matches_exclude(&rel_posix, &patterns) {
      continue;
    }

    writer
      .start_file(&rel_posix, options)
      .with_context(|| format!("failed to start zip entry {rel_posix}"))?;
    let contents = fs::read(entry.path()).with_context(|| format!("failed to read {}", entry.path().display()))?;
    writer
      .write_all(&contents)
      .with_context(|| format!("failed to write zip entry {rel_posix}"))?;
  }

  writer.finish().map_err(|e| ArmError::message(format!("failed to finalize archive: {e}")))?;
  Ok(zip_path)
}
