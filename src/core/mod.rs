//! Error types shared by every layer of arm.
//!
//! `error` is the only surviving member of this module; the rest of the
//! teacher's `core/` (config, context, executor, mapping, plan, security,
//! split, sync, vcs) addressed monorepo split/sync concerns arm doesn't
//! have. Their equivalents for this crate — config loading, the git
//! adapter, the orchestrator — live as flat top-level modules instead of
//! nested under `core/`, since there's only one of each.

pub mod error;
