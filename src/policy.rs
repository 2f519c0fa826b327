//! Release policy (C3): declarative rules gating the orchestrator.
//!
//! This is the in-memory value type the decision engine and orchestrator
//! consume. [`crate::core::config`] deserializes the wire form (`arm.toml`)
//! into this shape, defaulting anything absent or malformed.

use std::collections::BTreeSet;

/// What to do with a commit type that is neither a recognized feature/patch
/// type nor an explicit no-bump type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownTypeBehavior {
  Patch,
  None,
  Fail,
}

impl UnknownTypeBehavior {
  /// Lower-case, trim, default to `Patch` on anything unrecognized.
  pub fn normalize(raw: &str) -> Self {
    match raw.trim().to_ascii_lowercase().as_str() {
      "none" => UnknownTypeBehavior::None,
      "fail" => UnknownTypeBehavior::Fail,
      _ => UnknownTypeBehavior::Patch,
    }
  }
}

#[derive(Debug, Clone)]
pub struct ReleasePolicy {
  pub patch_types: BTreeSet<String>,
  pub no_bump_types: BTreeSet<String>,
  pub unknown_type_behavior: UnknownTypeBehavior,
  pub initial_version: String,
  pub fail_on_dirty: bool,
  pub allowed_branches: Vec<String>,
  pub remote_safe_default: bool,
  pub default_remote: String,
}

impl Default for ReleasePolicy {
  fn default() -> Self {
    Self {
      patch_types: [
        "fix", "perf", "refactor", "docs", "chore", "test", "build", "ci", "style",
      ]
      .into_iter()
      .map(String::from)
      .collect(),
      no_bump_types: ["revert", "merge"].into_iter().map(String::from).collect(),
      unknown_type_behavior: UnknownTypeBehavior::Patch,
      initial_version: "0.1.0".to_string(),
      fail_on_dirty: true,
      allowed_branches: Vec::new(),
      remote_safe_default: true,
      default_remote: "origin".to_string(),
    }
  }
}

impl ReleasePolicy {
  /// Empty allow-list permits any branch; otherwise shell-style glob match.
  pub fn branch_allowed(&self, branch: &str) -> bool {
    if self.allowed_branches.is_empty() {
      return true;
    }
    self
      .allowed_branches
      .iter()
      .filter_map(|p| glob::Pattern::new(p).ok())
      .any(|pattern| pattern.matches(branch))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_spec() {
    let p = ReleasePolicy::default();
    assert!(p.patch_types.contains("fix"));
    assert!(p.patch_types.contains("style"));
    assert!(p.no_bump_types.contains("revert"));
    assert!(p.no_bump_types.contains("merge"));
    assert_eq!(p.unknown_type_behavior, UnknownTypeBehavior::Patch);
    assert_eq!(p.initial_version, "0.1.0");
    assert!(p.fail_on_dirty);
    assert!(p.allowed_branches.is_empty());
    assert!(p.remote_safe_default);
    assert_eq!(p.default_remote, "origin");
  }

  #[test]
  fn normalize_behavior_defaults_to_patch() {
    assert_eq!(UnknownTypeBehavior::normalize("  NONE "), UnknownTypeBehavior::None);
    assert_eq!(UnknownTypeBehavior::normalize("Fail"), UnknownTypeBehavior::Fail);
    assert_eq!(UnknownTypeBehavior::normalize("bogus"), UnknownTypeBehavior::Patch);
    assert_eq!(UnknownTypeBehavior::normalize(""), UnknownTypeBehavior::Patch);
  }

  #[test]
  fn empty_allow_list_permits_any_branch() {
    let p = ReleasePolicy::default();
    assert!(p.branch_allowed("anything"));
  }

  #[test]
  fn glob_matches_branch_patterns() {
    let mut p = ReleasePolicy::default();
    p.allowed_branches = vec!["release/*".to_string(), "main".to_string()];
    assert!(p.branch_allowed("release/1.0"));
    assert!(p.branch_allowed("main"));
    assert!(!p.branch_allowed("feature/x"));
  }
}
