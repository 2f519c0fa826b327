//! Version decision engine (C4): folds parsed commits through policy to a
//! single bump decision.

use crate::core::error::{ArmError, ArmResult};
use crate::model::{BumpDecision, BumpType, ConventionalCommit, SemVer};
use crate::policy::{ReleasePolicy, UnknownTypeBehavior};

/// The bump a single commit would contribute, and why.
pub fn bump_from_commit(c: &ConventionalCommit, policy: &ReleasePolicy) -> ArmResult<BumpDecision> {
  if c.breaking {
    return Ok(BumpDecision {
      bump: BumpType::Major,
      reason: "breaking change".to_string(),
    });
  }
  if c.commit_type == "feat" {
    return Ok(BumpDecision {
      bump: BumpType::Minor,
      reason: "feat".to_string(),
    });
  }
  if policy.patch_types.contains(&c.commit_type) {
    return Ok(BumpDecision {
      bump: BumpType::Patch,
      reason: c.commit_type.clone(),
    });
  }
  if policy.no_bump_types.contains(&c.commit_type) {
    return Ok(BumpDecision {
      bump: BumpType::None,
      reason: c.commit_type.clone(),
    });
  }

  match policy.unknown_type_behavior {
    UnknownTypeBehavior::None => Ok(BumpDecision {
      bump: BumpType::None,
      reason: format!("unknown:none:{}", c.commit_type),
    }),
    UnknownTypeBehavior::Fail => Err(ArmError::DecisionError(format!(
      "unknown commit type '{}' (sha {}) and unknown_type_behavior is 'fail'",
      c.commit_type, c.sha
    ))),
    UnknownTypeBehavior::Patch => Ok(BumpDecision {
      bump: BumpType::Patch,
      reason: format!("unknown:patch:{}", c.commit_type),
    }),
  }
}

/// Fold `commits` through policy to a single `(next_version, decision)`.
///
/// `forced`, when non-`none`, overrides the fold entirely — including
/// under a `fail` unknown-type policy, since no commit scanning occurs.
pub fn compute_next_version(
  current: SemVer,
  commits: &[ConventionalCommit],
  policy: &ReleasePolicy,
  forced: Option<BumpType>,
) -> ArmResult<(SemVer, BumpDecision)> {
  if let Some(forced) = forced
    && forced != BumpType::None
  {
    let decision = BumpDecision {
      bump: forced,
      reason: "forced".to_string(),
    };
    return Ok((current.bump(forced), decision));
  }

  if commits.is_empty() {
    let decision = BumpDecision {
      bump: BumpType::None,
      reason: "no commits".to_string(),
    };
    return Ok((current, decision));
  }

  let mut best: Option<BumpDecision> = None;
  for c in commits {
    let decision = bump_from_commit(c, policy)?;
    let is_better = match &best {
      None => true,
      Some(b) => decision.bump > b.bump,
    };
    if is_better {
      best = Some(decision);
    }
  }
  let decision = best.expect("non-empty commit list always yields a decision");
  let next = current.bump(decision.bump);
  Ok((next, decision))
}
