//! Conventional Commits parser (C2).
//!
//! Parses the *subject* line only; the body is scanned separately for the
//! breaking-change footer. Uses `winnow` parser combinators rather than a
//! regex crate, matching the precision the teacher's own conventional-commit
//! parser (`quality/changelog.rs::ConventionalCommit::parse`) aims for.

use crate::model::{Commit, CommitError, ConventionalCommit};

const BREAKING_FOOTERS: [&str; 2] = ["BREAKING CHANGE:", "BREAKING-CHANGE:"];

/// Parse one commit's subject against `type(scope)!: description`.
///
/// `type` is one or more lowercase ASCII letters. `scope`, if present, is
/// anything but `)`. The bang must sit immediately before the colon. At
/// least one whitespace character must separate the colon from the
/// description. No match is a rejection, not a panic.
fn parse_subject(subject: &str) -> Option<(String, Option<String>, bool, String)> {
  use winnow::ascii::space1;
  use winnow::combinator::{opt, preceded, terminated};
  use winnow::prelude::*;
  use winnow::token::{take_till, take_while};

  let mut parser = (
    take_while(1.., |c: char| c.is_ascii_lowercase()),
    opt(preceded('(', terminated(take_till(1.., ')'), ')'))),
    opt('!'),
    ':',
    space1,
    take_till(0.., ['\n', '\r']),
  );

  let (commit_type, scope, bang, _, _, description): (&str, Option<&str>, Option<char>, char, &str, &str) =
    parser.parse(subject).ok()?;

  Some((
    commit_type.to_string(),
    scope.map(str::to_string),
    bang.is_some(),
    description.trim_end().to_string(),
  ))
}

fn has_breaking_footer(body: &str) -> bool {
  BREAKING_FOOTERS.iter().any(|f| body.contains(f))
}

/// Parse a single raw commit. Returns the original sha/subject/reason on
/// rejection so callers can report diagnostics.
pub fn parse_commit(commit: &Commit) -> Result<ConventionalCommit, CommitError> {
  let Some((commit_type, scope, bang, description)) = parse_subject(&commit.subject) else {
    return Err(CommitError {
      sha: commit.sha.clone(),
      subject: commit.subject.clone(),
      reason: "Non-conventional subject".to_string(),
    });
  };

  let breaking = bang || has_breaking_footer(&commit.body);

  Ok(ConventionalCommit {
    sha: commit.sha.clone(),
    commit_type,
    scope,
    description,
    breaking,
  })
}

/// Parse a whole commit range, partitioning into parsed commits and errors.
pub fn validate_commits(commits: &[Commit]) -> (Vec<ConventionalCommit>, Vec<CommitError>) {
  let mut parsed = Vec::with_capacity(commits.len());
  let mut errors = Vec::new();

  for commit in commits {
    match parse_commit(commit) {
      Ok(c) => parsed.push(c),
      Err(e) => errors.push(e),
    }
  }

  (parsed, errors)
}
