mod changelog;
mod commands;
mod commits;
mod config;
mod core;
mod model;
mod orchestrator;
mod packager;
mod policy;
mod state_machine;
mod transaction;
mod version;
mod vcs;

use clap::{Parser, Subcommand};
use core::error::{print_error, ArmError};
use orchestrator::ReleaseOptions;
use std::path::PathBuf;

/// Autonomous Release Manager: conventional-commit driven versioning,
/// changelogs, and transactional releases.
#[derive(Parser)]
#[command(name = "arm")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Path to the git repo (default: cwd)
  #[arg(long, global = true)]
  repo: Option<PathBuf>,

  /// Path to the arm.toml policy config
  #[arg(long, global = true, default_value = "arm.toml")]
  config: PathBuf,

  /// Increase log verbosity (repeatable: -v, -vv)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,

  /// Suppress all but error-level logging
  #[arg(long, global = true)]
  quiet: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Print repo status (dirty tree, last tag, current branch) as JSON
  Status {
    #[arg(long, default_value = "v")]
    tag_prefix: String,
  },

  /// Validate a commit range against the conventional-commit grammar
  Validate {
    #[arg(long = "from")]
    from: Option<String>,
    #[arg(long = "to", default_value = "HEAD")]
    to: String,
    #[arg(long, default_value = "v")]
    tag_prefix: String,
  },

  /// Preview the next version and changelog without writing anything
  Plan {
    #[arg(long, default_value = "auto")]
    level: String,
    #[arg(long = "json")]
    json: bool,
    #[arg(long, default_value = "v")]
    tag_prefix: String,
    #[arg(long)]
    initial_version: Option<String>,
    #[arg(long = "to", default_value = "HEAD")]
    to: String,
  },

  /// Compute, commit, tag, package, and persist a release
  Release {
    #[arg(long)]
    dry_run: bool,
    #[arg(long, default_value = "auto")]
    level: String,
    #[arg(long)]
    no_commit: bool,
    #[arg(long)]
    no_tag: bool,
    #[arg(long)]
    sign_commit: bool,
    #[arg(long)]
    sign_tag: bool,
    #[arg(long)]
    allow_dirty: bool,
    #[arg(long)]
    push: bool,
    #[arg(long, overrides_with = "no_remote_safe")]
    remote_safe: bool,
    #[arg(long, overrides_with = "remote_safe")]
    no_remote_safe: bool,
    #[arg(long)]
    remote: Option<String>,
    #[arg(long, default_value = "v")]
    tag_prefix: String,
    #[arg(long)]
    initial_version: Option<String>,
    #[arg(long, default_value = "project")]
    project_name: String,
  },

  /// Undo the last recorded release using its transaction log
  Rollback {
    #[arg(long)]
    dry_run: bool,
    #[arg(long)]
    hard: bool,
    #[arg(long)]
    keep_artifacts: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_tracing(verbose: u8, quiet: bool) {
  let level = if quiet {
    "error"
  } else {
    match verbose {
      0 => "warn",
      1 => "info",
      2 => "debug",
      _ => "trace",
    }
  };
  let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose, cli.quiet);

  let repo = cli.repo.clone().unwrap_or_else(|| PathBuf::from("."));
  let policy = config::load_policy(&cli.config);

  let result = match cli.command {
    Commands::Status { tag_prefix } => commands::run_status(&repo, &tag_prefix),

    Commands::Validate { from, to, tag_prefix } => commands::run_validate(&repo, from.as_deref(), &to, &tag_prefix),

    Commands::Plan {
      level,
      json,
      tag_prefix,
      initial_version,
      to,
    } => commands::level_to_bump(&level).and_then(|level| {
      commands::run_plan(&repo, &policy, level, json, &tag_prefix, initial_version.as_deref(), &to)
    }),

    Commands::Release {
      dry_run,
      level,
      no_commit,
      no_tag,
      sign_commit,
      sign_tag,
      allow_dirty,
      push,
      remote_safe,
      no_remote_safe,
      remote,
      tag_prefix,
      initial_version,
      project_name,
    } => commands::level_to_bump(&level).and_then(|forced| {
      let remote_safe_override = if no_remote_safe {
        Some(false)
      } else if remote_safe {
        Some(true)
      } else {
        None
      };
      commands::run_release(
        &repo,
        &policy,
        ReleaseOptions {
          dry_run,
          forced,
          no_commit,
          no_tag,
          sign_commit,
          sign_tag,
          allow_dirty,
          push,
          remote_safe_override,
          remote,
          tag_prefix,
          initial_version,
          project_name,
          to: "HEAD".to_string(),
        },
      )
    }),

    Commands::Rollback { dry_run, hard, keep_artifacts } => commands::run_rollback(&repo, dry_run, hard, keep_artifacts),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ArmError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
