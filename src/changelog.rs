//! Changelog renderer (C5): one dated, grouped Markdown section per
//! release, prepended to the existing `CHANGELOG.md`.

use crate::model::{ConventionalCommit, SemVer};
use chrono::NaiveDate;

/// Render one release section. `today` is passed in rather than read from
/// the system clock so callers (and tests) can be deterministic.
pub fn render_release_section(version: SemVer, commits: &[ConventionalCommit], today: NaiveDate) -> String {
  let mut out = String::new();
  out.push_str(&format!("## {version} - {}\n", today.format("%Y-%m-%d")));

  let breaking: Vec<&ConventionalCommit> = commits.iter().filter(|c| c.breaking).collect();
  let features: Vec<&ConventionalCommit> = commits
    .iter()
    .filter(|c| !c.breaking && c.commit_type == "feat")
    .collect();
  let fixes: Vec<&ConventionalCommit> = commits
    .iter()
    .filter(|c| !c.breaking && matches!(c.commit_type.as_str(), "fix" | "perf" | "refactor"))
    .collect();
  let placed: std::collections::HashSet<*const ConventionalCommit> = breaking
    .iter()
    .chain(features.iter())
    .chain(fixes.iter())
    .map(|c| *c as *const ConventionalCommit)
    .collect();
  let other: Vec<&ConventionalCommit> = commits
    .iter()
    .filter(|c| !placed.contains(&(*c as *const ConventionalCommit)))
    .collect();

  for (title, group) in [
    ("Breaking Changes", &breaking),
    ("Features", &features),
    ("Fixes", &fixes),
    ("Other", &other),
  ] {
    if group.is_empty() {
      continue;
    }
    out.push('\n');
    out.push_str(&format!("### {title}\n"));
    for c in group.iter() {
      let scope = c.scope.as_deref().map(|s| format!("**{s}**: ")).unwrap_or_default();
      let breaking_suffix = if c.breaking { " (BREAKING)" } else { "" };
      out.push_str(&format!("- {scope}{}{breaking_suffix}\n", c.description));
    }
  }

  out
}

/// Prepend a new section to an existing changelog body.
///
/// - Leading newlines of `existing` are stripped.
/// - If it starts with `# Changelog`, that header line is preserved, the
///   new section follows, then the remainder of the old body.
/// - Otherwise a fresh `# Changelog` header is synthesized.
///
/// Not idempotent by design: running twice prepends twice.
pub fn prepend_changelog(existing: &str, section: &str) -> String {
  let trimmed = existing.trim_start_matches('\n');
  let section = section.trim_end();

  if let Some(rest) = trimmed.strip_prefix("# Changelog") {
    let rest = rest.trim_start_matches('\n');
    format!("# Changelog\n\n{section}\n\n{rest}")
  } else {
    format!("# Changelog\n\n{section}\n\n{trimmed}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cc(commit_type: &str, scope: Option<&str>, description: &str, breaking: bool) -> ConventionalCommit {
    ConventionalCommit {
      sha: "abc".to_string(),
      commit_type: commit_type.to_string(),
      scope: scope.map(String::from),
      description: description.to_string(),
      breaking,
    }
  }

  fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
  }

  #[test]
  fn renders_header_with_version_and_date() {
    let section = render_release_section(SemVer::new(1, 2, 3), &[], date());
    assert!(section.starts_with("## 1.2.3 - 2026-01-15\n"));
  }

  #[test]
  fn groups_in_fixed_order() {
    let commits = vec![
      cc("chore", None, "bump deps", false),
      cc("feat", Some("auth"), "add oauth", false),
      cc("fix", None, "fix crash", false),
      cc("feat", None, "redesign api", true),
    ];
    let section = render_release_section(SemVer::new(2, 0, 0), &commits, date());

    let breaking_idx = section.find("### Breaking Changes").unwrap();
    let features_idx = section.find("### Features").unwrap();
    let fixes_idx = section.find("### Fixes").unwrap();
    let other_idx = section.find("### Other").unwrap();
    assert!(breaking_idx < features_idx);
    assert!(features_idx < fixes_idx);
    assert!(fixes_idx < other_idx);

    assert!(section.contains("- redesign api (BREAKING)"));
    assert!(section.contains("- **auth**: add oauth"));
    assert!(section.contains("- fix crash"));
    assert!(section.contains("- bump deps"));
  }

  #[test]
  fn empty_groups_are_omitted() {
    let commits = vec![cc("feat", None, "only a feature", false)];
    let section = render_release_section(SemVer::new(1, 1, 0), &commits, date());
    assert!(!section.contains("### Breaking Changes"));
    assert!(!section.contains("### Fixes"));
    assert!(!section.contains("### Other"));
  }

  #[test]
  fn prepend_preserves_existing_header() {
    let existing = "# Changelog\n\nSome preamble.\n\n## 1.0.0 - 2025-01-01\n- old entry\n";
    let section = "## 1.1.0 - 2026-01-15\n\n### Features\n- new thing\n";
    let merged = prepend_changelog(existing, section);
    assert!(merged.starts_with("# Changelog\n\n## 1.1.0 - 2026-01-15"));
    assert!(merged.contains("Some preamble."));
    assert!(merged.contains("## 1.0.0 - 2025-01-01"));
  }

  #[test]
  fn prepend_strips_all_leading_newlines_of_remainder_exactly() {
    let existing = "# Changelog\n\nSome preamble.\n";
    let section = "## 1.1.0 - 2026-01-15\n\n### Features\n- new thing\n";
    let merged = prepend_changelog(existing, section);
    assert_eq!(merged, "# Changelog\n\n## 1.1.0 - 2026-01-15\n\n### Features\n- new thing\n\nSome preamble.\n");
  }

  #[test]
  fn prepend_synthesizes_header_when_absent() {
    let existing = "";
    let section = "## 0.1.0 - 2026-01-15\n\n### Features\n- init\n";
    let merged = prepend_changelog(existing, section);
    assert!(merged.starts_with("# Changelog\n\n## 0.1.0 - 2026-01-15"));
  }

  #[test]
  fn prepend_is_not_idempotent() {
    let section = "## 0.1.0 - 2026-01-15\n\n### Features\n- init\n";
    let once = prepend_changelog("", section);
    let twice = prepend_changelog(&once, section);
    assert_eq!(twice.matches("## 0.1.0 - 2026-01-15").count(), 2);
  }

  #[test]
  fn prepend_strips_leading_newlines_of_existing() {
    let existing = "\n\n# Changelog\n\nbody\n";
    let section = "## 1.0.0 - 2026-01-15\n";
    let merged = prepend_changelog(existing, section);
    assert!(merged.starts_with("# Changelog\n\n## 1.0.0"));
  }
}
