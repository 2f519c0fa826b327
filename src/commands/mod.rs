//! CLI commands for arm.
//!
//! Each command is a thin adapter between clap's parsed arguments and the
//! underlying engine (version decision, changelog, orchestrator). All the
//! actual release mechanics live outside this module, in
//! [`crate::orchestrator`] and its collaborators.

pub mod plan;
pub mod release;
pub mod rollback;
pub mod status;
pub mod validate;

pub use plan::run_plan;
pub use release::{level_to_bump, run_release};
pub use rollback::run_rollback;
pub use status::run_status;
pub use validate::run_validate;
