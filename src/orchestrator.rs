//! Orchestrator (C10): drives one release end to end, journaling a state
//! machine transition per phase and running compensating actions in
//! reverse order on any commit-phase failure.
//!
//! Grounded in `cli.py`'s `cmd_release` — same phase order (changelog,
//! commit, tag, archive, transaction log, push) and the same
//! reverse-order compensation on exception, translated from Python's
//! try/except into an explicit compensation stack.

use crate::changelog::{prepend_changelog, render_release_section};
use crate::commits::validate_commits;
use crate::core::error::ArmError;
use crate::model::{BumpDecision, BumpType, Commit, ConventionalCommit, SemVer};
use crate::packager::{build_zip, PackageSpec};
use crate::policy::ReleasePolicy;
use crate::state_machine::{ReleaseContext, ReleaseState};
use crate::transaction::{self, ReleaseTransaction};
use crate::vcs::GitAdapter;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

pub struct ReleaseOptions {
  pub dry_run: bool,
  pub forced: Option<BumpType>,
  pub no_commit: bool,
  pub no_tag: bool,
  pub sign_commit: bool,
  pub sign_tag: bool,
  pub allow_dirty: bool,
  pub push: bool,
  pub remote_safe_override: Option<bool>,
  pub remote: Option<String>,
  pub tag_prefix: String,
  pub initial_version: Option<String>,
  pub project_name: String,
  pub to: String,
}

impl Default for ReleaseOptions {
  fn default() -> Self {
    Self {
      dry_run: false,
      forced: None,
      no_commit: false,
      no_tag: false,
      sign_commit: false,
      sign_tag: false,
      allow_dirty: false,
      push: false,
      remote_safe_override: None,
      remote: None,
      tag_prefix: "v".to_string(),
      initial_version: None,
      project_name: "release".to_string(),
      to: "HEAD".to_string(),
    }
  }
}

pub struct ReleaseOutcome {
  pub current_version: SemVer,
  pub next_version: SemVer,
  pub bump: BumpType,
  pub reason: String,
  pub tag: Option<String>,
  pub dry_run: bool,
  pub remote_safe: bool,
  pub actions: Vec<String>,
  pub artifacts: Vec<String>,
}

/// A commit-phase failure: the underlying error plus everything that was
/// announced and everything attempted as compensation, for the CLI's
/// structured JSON report. Always surfaces as exit code 1.
pub struct CommitPhaseFailure {
  pub error: ArmError,
  pub dry_run: bool,
  pub actions: Vec<String>,
  pub auto_rollback_actions: Vec<String>,
}

pub enum ReleaseError {
  /// Failed before any side effect ran; carries its own exit code.
  Preflight(ArmError),
  Failed(CommitPhaseFailure),
}

impl From<ArmError> for ReleaseError {
  fn from(e: ArmError) -> Self {
    ReleaseError::Preflight(e)
  }
}

enum Compensation {
  DeleteChangelogIfCreated(PathBuf),
  RestoreChangelog(PathBuf, String),
  RevertCommit(String),
  DeleteTag(String),
  DeleteArtifact(PathBuf),
}

fn describe(c: &Compensation) -> String {
  match c {
    Compensation::DeleteChangelogIfCreated(p) => format!("delete {}", p.display()),
    Compensation::RestoreChangelog(p, _) => format!("restore {}", p.display()),
    Compensation::RevertCommit(sha) => format!("revert {sha}"),
    Compensation::DeleteTag(tag) => format!("delete tag {tag}"),
    Compensation::DeleteArtifact(p) => format!("delete {}", p.display()),
  }
}

fn run_compensation(git: &GitAdapter, stack: Vec<Compensation>) -> Vec<String> {
  let mut results = Vec::new();
  for c in stack.into_iter().rev() {
    let desc = describe(&c);
    tracing::debug!(action = %desc, "running compensation");
    let outcome = match &c {
      Compensation::DeleteChangelogIfCreated(p) => fs::remove_file(p).map_err(|e| e.to_string()),
      Compensation::RestoreChangelog(p, before) => fs::write(p, before).map_err(|e| e.to_string()),
      Compensation::RevertCommit(sha) => git.revert_commit(sha).map_err(|e| e.to_string()),
      Compensation::DeleteTag(tag) => git.delete_tag(tag).map_err(|e| e.to_string()),
      Compensation::DeleteArtifact(p) => fs::remove_file(p).map_err(|e| e.to_string()),
    };
    match outcome {
      Ok(()) => results.push(desc),
      Err(e) => results.push(format!("failed {desc}: {e}")),
    }
  }
  results
}

/// Preflight: policy checks, version decision, commit validation. No side
/// effects. Returns everything the commit phase needs.
struct Preflight {
  current: SemVer,
  next: SemVer,
  decision: BumpDecision,
  parsed: Vec<ConventionalCommit>,
  remote_safe_effective: bool,
  changelog_path: PathBuf,
  changelog_existed_before: bool,
  changelog_before: String,
  section: String,
}

#[tracing::instrument(level = "debug", skip_all)]
fn run_preflight(git: &GitAdapter, policy: &ReleasePolicy, opts: &ReleaseOptions) -> Result<Preflight, ReleaseError> {
  let branch = git.current_branch()?;
  tracing::debug!(branch, "checking branch allow-list");
  if !policy.branch_allowed(&branch) {
    tracing::info!(branch, "branch policy violation");
    return Err(ArmError::PolicyViolation(format!("Branch policy violation: '{branch}' is not in allowed_branches")).into());
  }

  let remote_safe_effective = opts.remote_safe_override.unwrap_or(policy.remote_safe_default);
  if opts.push && remote_safe_effective {
    tracing::info!("push requested while remote-safe mode is enabled");
    return Err(ArmError::PolicyViolation(
      "Remote-safe mode is enabled; refusing to push. Pass --no-remote-safe to override.".to_string(),
    )
    .into());
  }

  if policy.fail_on_dirty && !opts.allow_dirty && git.is_dirty()? {
    tracing::info!("working tree is dirty");
    return Err(ArmError::PolicyViolation("Dirty working tree".to_string()).into());
  }

  let last_tag_version = git.last_tag(&opts.tag_prefix)?;
  let last_tag_name = last_tag_version.map(|v| format!("{}{v}", opts.tag_prefix));
  let initial_version = opts.initial_version.as_deref().unwrap_or(&policy.initial_version);
  let current = match last_tag_version {
    Some(v) => v,
    None => SemVer::parse(initial_version).map_err(ArmError::Config)?,
  };
  tracing::debug!(last_tag = last_tag_name.as_deref().unwrap_or("<none>"), %current, "resolved current version");

  let raw_commits: Vec<Commit> = git.commit_log(last_tag_name.as_deref(), &opts.to)?;
  tracing::debug!(count = raw_commits.len(), "collected commit range");
  let (parsed, errors) = validate_commits(&raw_commits);
  if !errors.is_empty() {
    tracing::info!(count = errors.len(), "non-conventional commits in range");
    return Err(
      ArmError::ValidationError {
        offenders: errors.into_iter().map(|e| (e.sha, e.reason, e.subject)).collect(),
      }
      .into(),
    );
  }

  let (next, decision) = crate::version::compute_next_version(current, &parsed, policy, opts.forced)?;
  tracing::info!(%current, %next, bump = %decision.bump, reason = %decision.reason, "version decision");

  let changelog_path = git.repo_dir().join("CHANGELOG.md");
  let changelog_existed_before = changelog_path.exists();
  let changelog_before = if changelog_existed_before {
    fs::read_to_string(&changelog_path).unwrap_or_default()
  } else {
    String::new()
  };
  let today = chrono::Local::now().date_naive();
  let section = render_release_section(next, &parsed, today);

  Ok(Preflight {
    current,
    next,
    decision,
    parsed,
    remote_safe_effective,
    changelog_path,
    changelog_existed_before,
    changelog_before,
    section,
  })
}

#[tracing::instrument(level = "info", skip_all, fields(dry_run = opts.dry_run, push = opts.push))]
pub fn run_release(git: &GitAdapter, policy: &ReleasePolicy, opts: &ReleaseOptions) -> Result<ReleaseOutcome, ReleaseError> {
  tracing::info!("release starting");
  let pre = run_preflight(git, policy, opts)?;
  let mut ctx = ReleaseContext::new();
  let mut actions: Vec<String> = Vec::new();
  let mut compensations: Vec<Compensation> = Vec::new();
  let tag_name = format!("{}{}", opts.tag_prefix, pre.next);

  ctx
    .advance(ReleaseState::DiffCollected, "collected commit range", vec![])
    .map_err(ReleaseError::Preflight)?;
  ctx
    .advance(ReleaseState::CommitsValidated, format!("{} commits parsed", pre.parsed.len()), vec![])
    .map_err(ReleaseError::Preflight)?;
  ctx
    .advance(ReleaseState::VersionBumped, pre.decision.reason.clone(), vec![pre.next.to_string()])
    .map_err(ReleaseError::Preflight)?;

  if opts.dry_run {
    tracing::info!(version = %pre.next, bump = %pre.decision.bump, "dry run: no side effects will be applied");
    actions.push(format!("write {}", pre.changelog_path.display()));
    if !opts.no_commit {
      actions.push(format!("commit_file({}, \"chore(release): {}\", sign={})", pre.changelog_path.display(), tag_name, opts.sign_commit));
    }
    if !opts.no_tag {
      actions.push(format!("create_tag({tag_name}, sign={})", opts.sign_tag));
    }
    actions.push(format!("build archive for {}-{}", opts.project_name, pre.next));
    actions.push("persist transaction".to_string());
    if opts.push {
      if !pre.remote_safe_effective {
        actions.push("push_branch".to_string());
      }
      if !opts.no_tag {
        actions.push("push_tag".to_string());
      }
    }

    return Ok(ReleaseOutcome {
      current_version: pre.current,
      next_version: pre.next,
      bump: pre.decision.bump,
      reason: pre.decision.reason,
      tag: (!opts.no_tag).then_some(tag_name),
      dry_run: true,
      remote_safe: pre.remote_safe_effective,
      actions,
      artifacts: Vec::new(),
    });
  }

  let result = run_commit_phase(git, policy, opts, &pre, &tag_name, &mut actions, &mut compensations, &mut ctx);

  match result {
    Ok((tag, artifacts)) => Ok(ReleaseOutcome {
      current_version: pre.current,
      next_version: pre.next,
      bump: pre.decision.bump,
      reason: pre.decision.reason,
      tag,
      dry_run: false,
      remote_safe: pre.remote_safe_effective,
      actions,
      artifacts,
    }),
    Err(error) => {
      tracing::info!(%error, "commit phase failed, running compensation");
      let auto_rollback_actions = run_compensation(git, compensations);
      Err(ReleaseError::Failed(CommitPhaseFailure {
        error,
        dry_run: false,
        actions,
        auto_rollback_actions,
      }))
    }
  }
}

#[allow(clippy::too_many_arguments)]
#[tracing::instrument(level = "info", skip_all, fields(tag = %tag_name))]
fn run_commit_phase(
  git: &GitAdapter,
  policy: &ReleasePolicy,
  opts: &ReleaseOptions,
  pre: &Preflight,
  tag_name: &str,
  actions: &mut Vec<String>,
  compensations: &mut Vec<Compensation>,
  ctx: &mut ReleaseContext,
) -> Result<(Option<String>, Vec<String>), ArmError> {
  // a. write CHANGELOG.md
  tracing::debug!(path = %pre.changelog_path.display(), "writing changelog");
  let merged = prepend_changelog(&pre.changelog_before, &pre.section);
  fs::write(&pre.changelog_path, &merged)?;
  actions.push(format!("write {}", pre.changelog_path.display()));
  if pre.changelog_existed_before {
    compensations.push(Compensation::RestoreChangelog(pre.changelog_path.clone(), pre.changelog_before.clone()));
  } else {
    compensations.push(Compensation::DeleteChangelogIfCreated(pre.changelog_path.clone()));
  }

  // b. commit
  tracing::debug!(commit = !opts.no_commit, "committing changelog");
  let mut changelog_commit_sha = None;
  if !opts.no_commit {
    let message = format!("chore(release): {tag_name}");
    git.commit_file(&pre.changelog_path, &message, opts.sign_commit)?;
    let sha = git.head_sha()?;
    actions.push(format!("commit_file({}, \"{message}\")", pre.changelog_path.display()));
    compensations.push(Compensation::RevertCommit(sha.clone()));
    changelog_commit_sha = Some(sha);
  }
  ctx.advance(ReleaseState::ChangelogWritten, "changelog committed", vec![pre.changelog_path.to_string_lossy().to_string()])?;

  // c. tag
  tracing::debug!(tag = !opts.no_tag, "tagging release");
  let mut tag = None;
  if !opts.no_tag {
    git.create_tag(tag_name, tag_name)?;
    actions.push(format!("create_tag({tag_name})"));
    compensations.push(Compensation::DeleteTag(tag_name.to_string()));
    tag = Some(tag_name.to_string());
  }

  // d. build archive
  let dist_dir = git.repo_dir().join("dist");
  let next_str = pre.next.to_string();
  let spec = PackageSpec::new(&opts.project_name, &next_str, git.repo_dir(), &dist_dir);
  tracing::debug!(dist_dir = %dist_dir.display(), "building archive");
  let archive_path = build_zip(&spec)?;
  actions.push(format!("build {}", archive_path.display()));
  compensations.push(Compensation::DeleteArtifact(archive_path.clone()));
  ctx.advance(ReleaseState::Packaged, "archive built", vec![archive_path.to_string_lossy().to_string()])?;

  let artifacts = vec![archive_path.to_string_lossy().to_string()];

  // e. persist transaction (not itself compensated; the record is the
  // recovery handle for `rollback`)
  let tx = ReleaseTransaction {
    created_at_utc: Utc::now().to_rfc3339(),
    repo_dir: git.repo_dir().to_path_buf(),
    version: next_str.clone(),
    tag: tag.clone(),
    changelog_path: Some(pre.changelog_path.clone()),
    changelog_commit_sha,
    changelog_existed_before: pre.changelog_existed_before,
    changelog_before: pre.changelog_existed_before.then(|| pre.changelog_before.clone()),
    artifacts: vec![archive_path.clone()],
  };
  transaction::write_last_release(git.repo_dir(), &tx)?;
  actions.push("persist transaction".to_string());

  // f/g. push
  if opts.push {
    let remote = opts.remote.clone().unwrap_or_else(|| policy.default_remote.clone());
    tracing::info!(remote, remote_safe = pre.remote_safe_effective, "pushing");
    if !pre.remote_safe_effective {
      let branch = git.current_branch()?;
      git.push_branch(&remote, &branch)?;
      actions.push(format!("push_branch({remote}, {branch})"));
    }
    if !opts.no_tag {
      git.push_tag(&remote, tag_name)?;
      actions.push(format!("push_tag({remote}, {tag_name})"));
    }
  }

  ctx.advance(ReleaseState::Completed, "release completed", artifacts.clone())?;
  tracing::info!(version = %pre.next, "release completed");
  Ok((tag, artifacts))
}

pub struct RollbackOptions {
  pub dry_run: bool,
  pub hard: bool,
  pub keep_artifacts: bool,
}

pub struct RollbackOutcome {
  pub dry_run: bool,
  pub actions: Vec<String>,
}

/// Undo a completed release using its persisted transaction. Never
/// reverses a push — that limitation is surfaced to the operator by the
/// CLI layer, not hidden here.
#[tracing::instrument(level = "info", skip_all, fields(dry_run = opts.dry_run, hard = opts.hard))]
pub fn run_rollback(git: &GitAdapter, opts: &RollbackOptions) -> Result<RollbackOutcome, ArmError> {
  let tx = transaction::read_last_release(git.repo_dir())?;
  tracing::info!(version = %tx.version, "rolling back last release");
  let mut actions = Vec::new();

  if let Some(tag) = &tx.tag {
    actions.push(format!("delete tag {tag}"));
    if !opts.dry_run {
      let _ = git.delete_tag(tag);
    }
  }

  if let Some(sha) = &tx.changelog_commit_sha {
    if opts.hard {
      actions.push(format!("reset --hard {sha}^"));
      if !opts.dry_run {
        git.git_reset_hard(&format!("{sha}^"))?;
      }
    } else {
      actions.push(format!("revert --no-edit {sha}"));
      if !opts.dry_run {
        git.revert_commit(sha)?;
      }
    }
  } else if let Some(path) = &tx.changelog_path {
    if tx.changelog_existed_before {
      actions.push(format!("restore {}", path.display()));
      if !opts.dry_run {
        fs::write(path, tx.changelog_before.clone().unwrap_or_default())?;
      }
    } else {
      actions.push(format!("delete {}", path.display()));
      if !opts.dry_run && path.exists() {
        fs::remove_file(path)?;
      }
    }
  }

  if !opts.keep_artifacts {
    for artifact in &tx.artifacts {
      if artifact.exists() {
        actions.push(format!("delete {}", artifact.display()));
        if !opts.dry_run {
          fs::remove_file(artifact)?;
        }
      }
    }
  }

  if !opts.dry_run {
    transaction::delete_last_release(git.repo_dir())?;
    actions.push("delete transaction log".to_string());
  }

  tracing::info!(dry_run = opts.dry_run, "rollback complete");
  Ok(RollbackOutcome { dry_run: opts.dry_run, actions })
}
