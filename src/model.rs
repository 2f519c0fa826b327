//! Core value types shared by the commit parser, policy, and version
//! decision engine.
//!
//! All of these are plain, immutable value records — no behavior beyond
//! parsing, formatting, and ordering lives here. See [`crate::commits`]
//! for the conventional-commit grammar and [`crate::version`] for the
//! fold that turns a list of these into a [`BumpDecision`].

use std::fmt;

/// `MAJOR.MINOR.PATCH`. Parsed from `[v]N.N.N`; the leading `v` is
/// stripped if present. Parse/format round-trip: `parse(format(s)) == s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemVer {
  pub major: u64,
  pub minor: u64,
  pub patch: u64,
}

impl SemVer {
  pub fn new(major: u64, minor: u64, patch: u64) -> Self {
    Self { major, minor, patch }
  }

  /// Parse `[v]N.N.N`. Rejects anything but exactly three integer fields.
  pub fn parse(s: &str) -> Result<Self, String> {
    let stripped = s.strip_prefix('v').unwrap_or(s);
    let mut parts = stripped.split('.');

    let major = parts.next().ok_or_else(|| format!("not a version: {s}"))?;
    let minor = parts.next().ok_or_else(|| format!("not a version: {s}"))?;
    let patch = parts.next().ok_or_else(|| format!("not a version: {s}"))?;
    if parts.next().is_some() {
      return Err(format!("not a version: {s}"));
    }

    let major: u64 = major.parse().map_err(|_| format!("not a version: {s}"))?;
    let minor: u64 = minor.parse().map_err(|_| format!("not a version: {s}"))?;
    let patch: u64 = patch.parse().map_err(|_| format!("not a version: {s}"))?;

    Ok(Self { major, minor, patch })
  }

  /// Apply a bump. `None` returns `self` unchanged.
  pub fn bump(&self, kind: BumpType) -> Self {
    match kind {
      BumpType::None => *self,
      BumpType::Patch => Self::new(self.major, self.minor, self.patch + 1),
      BumpType::Minor => Self::new(self.major, self.minor + 1, 0),
      BumpType::Major => Self::new(self.major + 1, 0, 0),
    }
  }
}

impl fmt::Display for SemVer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
  }
}

/// `none < patch < minor < major`. Derived `Ord` follows declaration
/// order, which is why the order below matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
  None,
  Patch,
  Minor,
  Major,
}

impl fmt::Display for BumpType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      BumpType::None => "none",
      BumpType::Patch => "patch",
      BumpType::Minor => "minor",
      BumpType::Major => "major",
    };
    write!(f, "{s}")
  }
}

impl std::str::FromStr for BumpType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "none" => Ok(BumpType::None),
      "patch" => Ok(BumpType::Patch),
      "minor" => Ok(BumpType::Minor),
      "major" => Ok(BumpType::Major),
      other => Err(format!("unknown bump level: {other}")),
    }
  }
}

/// A raw commit as reported by the VCS adapter.
#[derive(Debug, Clone)]
pub struct Commit {
  pub sha: String,
  pub subject: String,
  pub body: String,
}

/// A commit whose subject matched the Conventional Commits grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
  pub sha: String,
  pub commit_type: String,
  pub scope: Option<String>,
  pub description: String,
  pub breaking: bool,
}

/// A commit that failed to parse, retained for diagnostic output.
#[derive(Debug, Clone)]
pub struct CommitError {
  pub sha: String,
  pub subject: String,
  pub reason: String,
}

/// The outcome of folding a commit list through policy.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BumpDecision {
  pub bump: BumpType,
  pub reason: String,
}
